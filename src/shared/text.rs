//! Text helpers shared by features: slugs, file names and name ordering.

use std::cmp::Ordering;

use deunicode::deunicode;
use uuid::Uuid;

/// Longest slug stem kept before the uuid suffix is appended
const MAX_SLUG_STEM: usize = 60;

/// Longest sanitized file name
const MAX_FILE_NAME: usize = 200;

const FALLBACK_FILE_NAME: &str = "untitled";

/// Transliterate to ASCII, lowercase, and collapse every run of
/// non-alphanumerics into a single hyphen.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode(input).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Unique slug for a cover: a readable stem from the description plus the
/// first eight hex digits of its uuid.
pub fn cover_slug(description: &str, uuid: &Uuid) -> String {
    let mut stem = slugify(description);
    if stem.len() > MAX_SLUG_STEM {
        stem.truncate(MAX_SLUG_STEM);
        while stem.ends_with('-') {
            stem.pop();
        }
    }
    let suffix = &uuid.simple().to_string()[..8];
    if stem.is_empty() {
        format!("cover-{}", suffix)
    } else {
        format!("{}-{}", stem, suffix)
    }
}

/// Make a user supplied title safe to embed in an object key.
///
/// Strips reserved and control characters, turns whitespace into `_` and
/// caps the length. Empty results become `untitled`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(MAX_FILE_NAME)
        .collect();

    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned
    }
}

/// Key used to order names in a locale-aware way.
///
/// Names are transliterated so that accented Latin sorts next to its base
/// letter and Han characters sort by their pinyin reading.
pub fn collation_key(name: &str) -> String {
    deunicode(name).to_lowercase()
}

/// Compare two names by [`collation_key`], falling back to the raw names so
/// the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::SLUG_REGEX;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("A Cat, on a  Mat!"), "a-cat-on-a-mat");
        assert_eq!(slugify("  --Hello--  "), "hello");
        assert_eq!(slugify("Café déjà vu"), "cafe-deja-vu");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_cover_slug_is_valid_and_suffixed() {
        let uuid = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
        assert_eq!(cover_slug("Sunset over lake", &uuid), "sunset-over-lake-1a2b3c4d");
        assert_eq!(cover_slug("???", &uuid), "cover-1a2b3c4d");

        for _ in 0..20 {
            let sentence: String = Sentence(3..40).fake();
            let slug = cover_slug(&sentence, &Uuid::new_v4());
            assert!(SLUG_REGEX.is_match(&slug), "bad slug {:?}", slug);
            assert!(slug.len() <= MAX_SLUG_STEM + 9);
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My: \"Cover\"/v2?"), "My_Coverv2");
        assert_eq!(sanitize_file_name("a b\u{0007}c"), "a_bc");
        assert_eq!(sanitize_file_name("   "), "untitled");
        assert_eq!(sanitize_file_name("<>|*"), "untitled");
        assert_eq!(sanitize_file_name(&"x".repeat(500)).len(), 200);
    }

    #[test]
    fn test_compare_names_is_locale_aware() {
        // "éclair" sorts with "e", not after "z"
        let mut names = vec!["zebra", "éclair", "apple"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["apple", "éclair", "zebra"]);

        // pinyin: bei (北) < nan (南) < shang (上)
        let mut han = vec!["上海", "北京", "南京"];
        han.sort_by(|a, b| compare_names(a, b));
        assert_eq!(han, vec!["北京", "南京", "上海"]);
    }

    #[test]
    fn test_compare_names_is_case_insensitive_with_stable_tie_break() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_ne!(compare_names("Apple", "apple"), Ordering::Equal);
    }
}
