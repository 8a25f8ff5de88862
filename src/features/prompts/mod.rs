//! Prompt optimisation: expand a short idea into a richer image description.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/prompts/optimize` | No | Expand a prompt with the LLM |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::PromptService;
