mod cover;

pub use cover::{Cover, CoverStatus, NewCover};
