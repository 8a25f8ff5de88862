//! Illustration categories: a self-referencing tree.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | Flat list ordered by level |
//! | GET | `/api/categories/tree` | No | Nested forest |
//! | GET | `/api/categories/parents` | No | Roots with child counts |
//! | GET | `/api/categories/options` | No | Indented list for dropdowns |
//! | GET | `/api/categories/{id}` | No | Single category |
//! | GET | `/api/categories/slug/{slug}` | No | Lookup by url-encoded name |
//! | GET | `/api/categories/{id}/children` | No | Direct children |
//! | GET | `/api/categories/{id}/ancestors` | No | Breadcrumb path, root first |
//! | POST | `/api/admin/categories` | Admin | Create |
//! | PUT | `/api/admin/categories/{id}` | Admin | Rename / move |
//! | DELETE | `/api/admin/categories/{id}` | Admin | Delete a leaf |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
