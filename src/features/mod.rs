pub mod auth;
pub mod categories;
pub mod checkout;
pub mod covers;
pub mod pdfs;
pub mod prompts;
pub mod tags;
pub mod users;
