//! Naming utilities for erd_peewee
//!
//! This module provides the identifier and literal conventions used in the
//! generated module.

use crate::models::types::{Tag, TagValue};

/// Default name for a relationship end: the entity name lower-cased
pub fn default_end_name(entity_name: &str) -> String {
    entity_name.to_lowercase()
}

/// Pluralize by appending `s`; irregular forms are not handled
pub fn pluralize(name: &str) -> String {
    format!("{}s", name)
}

/// Junction entity name built from the two end labels
pub fn junction_name(end1_label: &str, end2_label: &str) -> String {
    format!("{}_{}", end1_label, end2_label)
}

/// Quote a value as a single-quoted Python string literal
pub fn python_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Render a Python boolean literal
pub fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Render the value part of a tag as a Python expression
///
/// String values are trimmed and their lines joined with `,`.
pub fn tag_value(value: &TagValue) -> String {
    match value {
        TagValue::String(s) => python_string(&s.trim().lines().collect::<Vec<_>>().join(",")),
        TagValue::Number(n) => n.to_string(),
        TagValue::Boolean(b) => python_bool(*b).to_string(),
        TagValue::Reference(target) => target.clone(),
    }
}

/// Render tags as `(keyword, value)` pairs in declaration order
pub fn tag_arguments(tags: &[Tag]) -> Vec<(String, String)> {
    tags.iter()
        .map(|tag| (tag.name.clone(), tag_value(&tag.value)))
        .collect()
}

/// Whether a documentation text has anything to emit
pub fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_end_name() {
        assert_eq!(default_end_name("Author"), "author");
        assert_eq!(default_end_name("UserProfile"), "userprofile");
    }

    #[test]
    fn test_pluralize_is_suffix_only() {
        assert_eq!(pluralize("course"), "courses");
        assert_eq!(pluralize("person"), "persons");
    }

    #[test]
    fn test_python_string() {
        assert_eq!(python_string("books"), "'books'");
        assert_eq!(python_string("it's"), "'it\\'s'");
    }

    #[test]
    fn test_tag_values() {
        assert_eq!(
            tag_value(&TagValue::String("  line one\nline two ".to_string())),
            "'line one,line two'"
        );
        assert_eq!(tag_value(&TagValue::Number(42.into())), "42");
        assert_eq!(tag_value(&TagValue::Boolean(false)), "False");
        assert_eq!(tag_value(&TagValue::Reference("Author".to_string())), "Author");
    }

    #[test]
    fn test_tag_arguments_keep_order() {
        let tags = vec![
            Tag::new("on_delete", TagValue::String("CASCADE".to_string())),
            Tag::new("lazy_load", TagValue::Boolean(true)),
        ];

        assert_eq!(
            tag_arguments(&tags),
            vec![
                ("on_delete".to_string(), "'CASCADE'".to_string()),
                ("lazy_load".to_string(), "True".to_string()),
            ]
        );
    }
}
