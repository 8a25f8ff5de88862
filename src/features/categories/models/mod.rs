mod category;

pub use category::{Category, ParentCategory};
