//! Credit purchases through Stripe Checkout.
//!
//! Clients name a plan; price and credits come from the server-side catalogue.
//! An order is recorded before the session is created; confirming a paid
//! session marks the order paid and grants its credits exactly once.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/checkout` | Create an order for a plan and a checkout session |
//! | POST | `/api/checkout/confirm` | Settle a completed session |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CheckoutService;
