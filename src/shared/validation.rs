use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs
    /// Lowercase alphanumeric words separated by single hyphens
    /// - Valid: "sunset-over-lake-1a2b3c4d", "cat", "a-b-c"
    /// - Invalid: "-cat", "cat-", "cat--dog", "Cat", "cat_dog"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Pricing plan identifiers such as "pro" or "basic-plan"
    pub static ref PLAN_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_-]{0,31}$").unwrap();
}

/// Reject strings that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Flatten `validator` errors into the `field: message` strings carried in
/// the error envelope.
pub fn describe_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid ({})", field, e.code),
            })
        })
        .collect();
    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("sunset-over-lake-1a2b3c4d"));
        assert!(SLUG_REGEX.is_match("cat"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-cat")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("cat-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("cat--dog")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Cat")); // uppercase
        assert!(!SLUG_REGEX.is_match("cat_dog")); // underscore
        assert!(!SLUG_REGEX.is_match(""));
    }

    #[test]
    fn test_plan_regex() {
        assert!(PLAN_REGEX.is_match("basic-plan"));
        assert!(!PLAN_REGEX.is_match("1pro"));
    }

    #[derive(Validate)]
    struct Named {
        #[validate(custom(function = "not_blank", message = "must not be blank"))]
        name: String,
    }

    #[test]
    fn test_not_blank_and_describe_errors() {
        let named = Named {
            name: "   ".to_string(),
        };
        let errors = named.validate().unwrap_err();
        assert_eq!(describe_errors(&errors), vec!["name: must not be blank"]);

        let ok = Named {
            name: "fox".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
