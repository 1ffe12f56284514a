//! Field-level checks shared by the catalog and account mutations.
//!
//! Limits count Unicode scalar values, so "Beyoncé" is seven characters
//! regardless of its UTF-8 length.

use crate::error::ValidationErrors;

pub const ARTIST_NAME_MAX: usize = 100;
pub const ARTIST_NATIONALITY_MAX: usize = 100;
pub const SONG_TITLE_MAX: usize = 100;
pub const SONG_ALBUM_MAX: usize = 100;
pub const SONG_PREVIEW_URL_MAX: usize = 200;
pub const USERNAME_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 8;

/// Records an error when `value` is empty or only whitespace.
pub fn required(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
    }
}

pub fn max_chars(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let count = value.chars().count();
    if count > max {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, count
            ),
        );
    }
}

pub fn min_chars(errors: &mut ValidationErrors, field: &str, value: &str, min: usize) {
    let count = value.chars().count();
    if count < min {
        errors.add(
            field,
            format!(
                "Ensure this value has at least {} characters (it has {}).",
                min, count
            ),
        );
    }
}

/// Letters, digits and `@.+-_` only.
pub fn username_chars(errors: &mut ValidationErrors, field: &str, value: &str) {
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        errors.add(
            field,
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}
