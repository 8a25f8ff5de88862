//! Modules layer - clients for the external services the features depend on
//!
//! Each client sits behind a trait so features can be tested with fakes.

pub mod generation;
pub mod llm;
pub mod payments;
pub mod storage;
