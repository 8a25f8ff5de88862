//! Generated covers: gallery, detail pages, generation and moderation.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/covers` | No | Visible covers (newest, random or by category) |
//! | GET | `/api/covers/count` | No | Number of covers ever generated |
//! | GET | `/api/covers/{identifier}` | Optional | Detail by slug or uuid |
//! | POST | `/api/covers/generate` | Yes | Generate a cover (costs credits) |
//! | GET | `/api/users/me/covers` | Yes | The caller's covers |
//! | PATCH | `/api/admin/covers/{uuid}/status` | Admin | Show / hide a cover |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{CoverService, GenerationService};
