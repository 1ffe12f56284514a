mod artists;
mod favorites;
mod songs;
mod users;

pub use artists::{ArtistChanges, ArtistFields, ArtistFilter, ArtistRepository, DeleteSummary};
pub use favorites::{FavoriteInsert, FavoriteRepository};
pub use songs::{SongChanges, SongFields, SongRepository};
pub use users::UserRepository;

/// Turns a user-supplied prefix into a LIKE pattern with `%` and `_` escaped.
pub(crate) fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::prefix_pattern;

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("Kan"), "Kan%");
        assert_eq!(prefix_pattern("100%"), "100\\%%");
        assert_eq!(prefix_pattern("a_b"), "a\\_b%");
    }
}
