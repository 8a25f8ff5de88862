//! Free-form tags attached to covers.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/tags` | No | All tags with cover counts |
//! | GET | `/api/tags/{slug}` | No | Single tag |
//! | GET | `/api/tags/{slug}/covers` | No | Visible covers with the tag |
//! | POST | `/api/admin/tags` | Admin | Create |
//! | PUT | `/api/admin/tags/{id}` | Admin | Rename |
//! | DELETE | `/api/admin/tags/{id}` | Admin | Delete |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::TagService;
