// Metadata synthesis shared by the edge handler and the build-time
// materializer.
//
// Both paths call [`synthesize`]; there is one description policy and one
// escaping function in the whole workspace.

use crate::config::Site;
use crate::types::ContentEntity;
use std::fmt;

/// Descriptions shorter than this get the fallback sentence appended
pub const MIN_DESC_LEN: usize = 100;

/// Descriptions longer than this are cut to `MAX_DESC_LEN - 3` and end in `...`
pub const MAX_DESC_LEN: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OgType {
    Website,
    Article,
}

impl OgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OgType::Website => "website",
            OgType::Article => "article",
        }
    }
}

/// Normalized page metadata. Values are plain text; escaping happens once,
/// at emission, through [`MetadataRecord::escaped`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub title: String,
    pub description: String,
    pub image: String,
    pub url: String,
    pub og_type: OgType,
    pub site_name: String,
    pub category: Option<String>,
    pub published_at: Option<String>,
    pub app_id: Option<String>,
}

/// Build the metadata record for an entity (or the site defaults when there
/// is none) served at `url`.
pub fn synthesize(site: &Site, entity: Option<&ContentEntity>, url: &str) -> MetadataRecord {
    let Some(entity) = entity else {
        return MetadataRecord {
            title: site.name.clone(),
            description: normalize_description(&site.description, &site.fallback_description),
            image: site.default_image.clone(),
            url: url.to_string(),
            og_type: OgType::Website,
            site_name: site.name.clone(),
            category: None,
            published_at: None,
            app_id: site.facebook_app_id.clone(),
        };
    };

    let title = non_blank(Some(&entity.title)).unwrap_or(&site.name);
    let raw_description = non_blank(entity.excerpt.as_ref())
        .or_else(|| non_blank(entity.subheader.as_ref()))
        .unwrap_or("");
    let image = non_blank(entity.image.as_ref()).unwrap_or(&site.default_image);

    MetadataRecord {
        title: title.to_string(),
        description: normalize_description(raw_description, &site.fallback_description),
        image: image.to_string(),
        url: url.to_string(),
        og_type: OgType::Article,
        site_name: site.name.clone(),
        category: non_blank(entity.category.as_ref()).map(str::to_string),
        published_at: non_blank(entity.published_at.as_ref()).map(str::to_string),
        app_id: site.facebook_app_id.clone(),
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Pad short descriptions with `fallback` and cap long ones.
///
/// Lengths count characters, not bytes. The result is within
/// `[MIN_DESC_LEN, MAX_DESC_LEN]` unless `raw` plus `fallback` is itself
/// shorter than `MIN_DESC_LEN`; that case is returned as-is.
pub fn normalize_description(raw: &str, fallback: &str) -> String {
    let description = if raw.chars().count() >= MIN_DESC_LEN {
        raw.to_string()
    } else if raw.is_empty() {
        fallback.to_string()
    } else {
        format!("{} {}", raw, fallback)
    };

    if description.chars().count() > MAX_DESC_LEN {
        let mut cut: String = description.chars().take(MAX_DESC_LEN - 3).collect();
        cut.push_str("...");
        cut
    } else {
        description
    }
}

/// Text that has been HTML-escaped exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaped(String);

impl Escaped {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTML-escape a string for attribute or text context
///
/// Escapes: & < > " '
pub fn escape_html(s: &str) -> Escaped {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Escaped(out)
}

/// A [`MetadataRecord`] with every string field escaped
#[derive(Debug, Clone)]
pub struct EscapedRecord {
    pub title: Escaped,
    pub description: Escaped,
    pub image: Escaped,
    pub url: Escaped,
    pub og_type: OgType,
    pub site_name: Escaped,
    pub category: Option<Escaped>,
    pub published_at: Option<Escaped>,
    pub app_id: Option<Escaped>,
}

impl MetadataRecord {
    /// Escape every field. Runs after normalization, so truncation can never
    /// split an entity reference.
    pub fn escaped(&self) -> EscapedRecord {
        EscapedRecord {
            title: escape_html(&self.title),
            description: escape_html(&self.description),
            image: escape_html(&self.image),
            url: escape_html(&self.url),
            og_type: self.og_type,
            site_name: escape_html(&self.site_name),
            category: self.category.as_deref().map(escape_html),
            published_at: self.published_at.as_deref().map(escape_html),
            app_id: self.app_id.as_deref().map(escape_html),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_site_toml_str;

    fn site() -> Site {
        parse_site_toml_str(
            r#"
[site]
domain = "blog.example.com"

[store]
project_id = "abc123"
"#,
        )
        .unwrap()
        .site
    }

    fn entity(title: &str, excerpt: Option<&str>) -> ContentEntity {
        ContentEntity {
            id: "p1".to_string(),
            title: title.to_string(),
            excerpt: excerpt.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_description_is_padded() {
        let site = site();
        let just_under = "y".repeat(99);
        for raw in ["A short post.", "x", just_under.as_str()] {
            let record = synthesize(&site, Some(&entity("T", Some(raw))), "https://e/x");
            assert!(
                record.description.chars().count() >= MIN_DESC_LEN,
                "too short for {:?}",
                raw
            );
            assert!(record.description.starts_with(raw));
            assert!(record.description.contains(&site.fallback_description));
        }
    }

    #[test]
    fn test_padding_joins_with_single_space() {
        let d = normalize_description("A short post.", "Fallback.");
        assert_eq!(d, "A short post. Fallback.");
    }

    #[test]
    fn test_empty_description_becomes_fallback() {
        let site = site();
        let record = synthesize(&site, Some(&entity("T", None)), "https://e/x");
        assert_eq!(record.description, site.fallback_description);
    }

    #[test]
    fn test_short_fallback_stays_short() {
        // Accepted edge case: padding cannot reach the minimum when the
        // fallback itself is short.
        let d = normalize_description("Tiny.", "Also tiny.");
        assert_eq!(d, "Tiny. Also tiny.");
        assert!(d.chars().count() < MIN_DESC_LEN);
    }

    #[test]
    fn test_long_description_is_truncated() {
        for len in [301, 302, 500, 5000] {
            let raw = "a".repeat(len);
            let d = normalize_description(&raw, "fallback");
            assert_eq!(d.chars().count(), MAX_DESC_LEN);
            assert!(d.ends_with("..."));
        }
    }

    #[test]
    fn test_description_at_bounds_is_unchanged() {
        let exact_max = "b".repeat(MAX_DESC_LEN);
        assert_eq!(normalize_description(&exact_max, "f"), exact_max);

        let exact_min = "c".repeat(MIN_DESC_LEN);
        assert_eq!(normalize_description(&exact_min, "f"), exact_min);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let raw = "é".repeat(400);
        let d = normalize_description(&raw, "f");
        assert_eq!(d.chars().count(), MAX_DESC_LEN);
        assert!(d.ends_with("..."));
    }

    #[test]
    fn test_padding_then_truncation() {
        let raw = "d".repeat(99);
        let fallback = "e".repeat(250);
        let d = normalize_description(&raw, &fallback);
        assert_eq!(d.chars().count(), MAX_DESC_LEN);
        assert!(d.ends_with("..."));
    }

    #[test]
    fn test_subheader_used_when_excerpt_missing() {
        let site = site();
        let mut e = entity("T", None);
        e.subheader = Some("From the subheader".to_string());
        let record = synthesize(&site, Some(&e), "https://e/x");
        assert!(record.description.starts_with("From the subheader "));

        e.excerpt = Some("   ".to_string());
        let record = synthesize(&site, Some(&e), "https://e/x");
        assert!(record.description.starts_with("From the subheader "));
    }

    #[test]
    fn test_title_and_image_fallbacks() {
        let site = site();
        let mut e = entity("", Some("x"));
        e.image = Some(String::new());
        let record = synthesize(&site, Some(&e), "https://e/x");
        assert_eq!(record.title, site.name);
        assert_eq!(record.image, site.default_image);
        assert_eq!(record.og_type, OgType::Article);
    }

    #[test]
    fn test_entity_fields_pass_through() {
        let site = site();
        let mut e = entity("Hello World", Some("A short post."));
        e.image = Some("https://x/img.png".to_string());
        e.category = Some("AI".to_string());
        e.published_at = Some("2024-05-01T10:00:00Z".to_string());
        let record = synthesize(&site, Some(&e), "https://blog.example.com/posts/hello-world");
        assert_eq!(record.title, "Hello World");
        assert_eq!(record.image, "https://x/img.png");
        assert_eq!(record.url, "https://blog.example.com/posts/hello-world");
        assert_eq!(record.category.as_deref(), Some("AI"));
        assert_eq!(record.published_at.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_site_defaults_without_entity() {
        let site = site();
        let record = synthesize(&site, None, "https://blog.example.com/");
        assert_eq!(record.title, site.name);
        assert_eq!(record.image, site.default_image);
        assert_eq!(record.og_type, OgType::Website);
        assert!(record.description.chars().count() >= MIN_DESC_LEN);
        assert!(record.category.is_none());
    }

    #[test]
    fn test_app_id_only_when_configured() {
        let mut site = site();
        assert!(synthesize(&site, None, "u").app_id.is_none());
        site.facebook_app_id = Some("123".to_string());
        assert_eq!(synthesize(&site, None, "u").app_id.as_deref(), Some("123"));
    }

    #[test]
    fn test_escape_html_characters() {
        assert_eq!(escape_html("Hello World").as_str(), "Hello World");
        assert_eq!(
            escape_html("A&B<C>D\"E'F").as_str(),
            "A&amp;B&lt;C&gt;D&quot;E&#39;F"
        );
        assert_eq!(
            escape_html("<script>alert('XSS')</script>").as_str(),
            "&lt;script&gt;alert(&#39;XSS&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("").as_str(), "");
        assert_eq!(escape_html("トラック01").as_str(), "トラック01");
    }

    #[test]
    fn test_escape_is_stable_on_plain_text() {
        let plain = "Plain text without reserved characters";
        let once = escape_html(plain);
        let twice = escape_html(once.as_str());
        assert_eq!(once.as_str(), plain);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_escaped_record_escapes_each_field_once() {
        let site = site();
        let e = entity("Tips & Tricks", Some("Use <kbd> & \"quotes\""));
        let record = synthesize(&site, Some(&e), "https://e/posts/a?x=1&y=2");
        let escaped = record.escaped();
        assert_eq!(escaped.title.as_str(), "Tips &amp; Tricks");
        assert!(escaped.description.as_str().starts_with("Use &lt;kbd&gt; &amp; &quot;quotes&quot;"));
        assert_eq!(escaped.url.as_str(), "https://e/posts/a?x=1&amp;y=2");
        assert!(!escaped.description.as_str().contains("&amp;amp;"));
    }

    #[test]
    fn test_truncation_happens_before_escaping() {
        // An ampersand right at the cut point must survive as a whole entity.
        let mut raw = "a".repeat(MAX_DESC_LEN - 4);
        raw.push('&');
        raw.push_str(&"b".repeat(50));
        let site = site();
        let e = entity("T", Some(&raw));
        let record = synthesize(&site, Some(&e), "u");
        assert_eq!(record.description.chars().count(), MAX_DESC_LEN);
        let escaped = record.escaped();
        assert!(escaped.description.as_str().ends_with("&amp;..."));
    }
}
