mod cover_handler;

pub use cover_handler::*;
