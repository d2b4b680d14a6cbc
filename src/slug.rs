use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Derives a URL-safe slug from a note title. Lowercases, collapses every
/// run of non-alphanumeric characters to a single hyphen, and trims hyphens
/// from both ends. Derivation happens once at note creation; updates never
/// recompute the slug.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
