use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("store slug '{0}' is not a safe path segment")]
    Unsafe(String),
    #[error("no slug can be derived from title '{0}'")]
    Underivable(String),
}

/// Convert a title into a URL slug.
///
/// Lower-cases, turns whitespace into hyphens, drops every character that
/// is not an ASCII letter, digit, `_` or `-`, then collapses repeated
/// hyphens and trims them from both ends. Non-ASCII letters are dropped,
/// so a title written entirely in a non-Latin script yields an empty slug.
///
/// ```text
/// "Hello World"        → "hello-world"
/// "Beats & Bass"       → "beats-bass"
/// "Café Tacvba"        → "caf-tacvba"
/// ```
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                Some(c)
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Pick the output slug for an entity: the store slug when present, else
/// one derived from the title.
pub fn output_slug(store_slug: Option<&str>, title: &str) -> Result<String, SlugError> {
    match store_slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) if is_safe_segment(slug) => Ok(slug.to_string()),
        Some(slug) => Err(SlugError::Unsafe(slug.to_string())),
        None => {
            let derived = slugify(title);
            if derived.is_empty() {
                Err(SlugError::Underivable(title.to_string()))
            } else {
                Ok(derived)
            }
        }
    }
}

/// A slug becomes a directory name under `posts/`, so it must stay a single
/// segment.
fn is_safe_segment(slug: &str) -> bool {
    slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.chars().any(char::is_control)
}
