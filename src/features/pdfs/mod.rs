//! PDF exports of covers.
//!
//! The client renders the PDF; the server stores it once per cover.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/pdfs?cover_uuid=` | No | Stored PDF for a cover, if any |
//! | POST | `/api/pdfs` | Yes | Upload the PDF for a cover (multipart) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PdfService;
