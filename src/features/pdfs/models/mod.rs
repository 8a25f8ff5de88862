mod pdf;

pub use pdf::Pdf;
