//! Application users and their credit balance.
//!
//! Identities come from the OIDC provider; a row is created the first time a
//! verified email is seen, with the starting credit grant.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Profile, credits and cover count |
//! | PATCH | `/api/users/me` | Update nickname / avatar |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
