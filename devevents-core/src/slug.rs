use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("invalid slug filter regex"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));
static HYPHENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("invalid hyphen regex"));

/// Derive a URL-safe slug from a title.
///
/// Lowercases, trims, drops everything outside `[a-z0-9\s-]`, turns whitespace
/// runs into a single hyphen, collapses repeated hyphens and strips hyphens
/// from both ends. Pure and deterministic: two titles that reduce to the same
/// slug are not disambiguated here, the unique index on `slug` rejects the
/// second write.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let filtered = DISALLOWED_RE.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE_RE.replace_all(&filtered, "-");
    let collapsed = HYPHENS_RE.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}
