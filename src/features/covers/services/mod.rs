mod cover_service;
mod generation_service;

pub use cover_service::CoverService;
pub use generation_service::GenerationService;
