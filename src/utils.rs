use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

pub const DEFAULT_SLUG_LENGTH: usize = 50;

/// Convert text to a URL friendly slug of at most `max_length`
/// characters. Used to build stable event uids from titles when a
/// source has no identifier of its own.
pub fn make_slug(text: &str, max_length: usize) -> String {
    let lower = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lower, "");
    let joined = SEPARATORS.replace_all(&cleaned, "-");
    let slug = joined.trim_matches('-');

    if slug.chars().count() > max_length {
        let cut: String = slug.chars().take(max_length).collect();
        cut.trim_end_matches('-').to_string()
    } else {
        slug.to_string()
    }
}
