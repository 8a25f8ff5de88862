pub mod constants;
pub mod pagination;
pub mod prompts;
pub mod text;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
