use crate::meta::{EscapedRecord, MetadataRecord, OgType};

const OG_IMAGE_WIDTH: u32 = 1200;
const OG_IMAGE_HEIGHT: u32 = 630;

/// `<title>` element for a record
pub fn title_element(record: &MetadataRecord) -> String {
    format!("<title>{}</title>", record.escaped().title)
}

/// Open Graph, Twitter Card and SEO tags for a record, one tag per line,
/// each line prefixed with `indent`.
pub fn head_tags(record: &MetadataRecord, indent: &str) -> String {
    render_head_tags(&record.escaped(), indent)
}

fn render_head_tags(e: &EscapedRecord, indent: &str) -> String {
    let mut tags: Vec<String> = vec![
        format!(r#"<meta property="og:title" content="{}" />"#, e.title),
        format!(r#"<meta property="og:description" content="{}" />"#, e.description),
        format!(r#"<meta property="og:type" content="{}" />"#, e.og_type.as_str()),
        format!(r#"<meta property="og:url" content="{}" />"#, e.url),
        format!(r#"<meta property="og:site_name" content="{}" />"#, e.site_name),
        format!(r#"<meta property="og:image" content="{}" />"#, e.image),
        format!(r#"<meta property="og:image:alt" content="{}" />"#, e.title),
        format!(r#"<meta property="og:image:width" content="{}" />"#, OG_IMAGE_WIDTH),
        format!(r#"<meta property="og:image:height" content="{}" />"#, OG_IMAGE_HEIGHT),
    ];

    if let Some(app_id) = &e.app_id {
        tags.push(format!(r#"<meta property="fb:app_id" content="{}" />"#, app_id));
    }

    tags.extend([
        r#"<meta name="twitter:card" content="summary_large_image" />"#.to_string(),
        format!(r#"<meta name="twitter:title" content="{}" />"#, e.title),
        format!(r#"<meta name="twitter:description" content="{}" />"#, e.description),
        format!(r#"<meta name="twitter:image" content="{}" />"#, e.image),
        format!(r#"<meta name="twitter:image:alt" content="{}" />"#, e.title),
        format!(r#"<meta name="description" content="{}" />"#, e.description),
        format!(r#"<link rel="canonical" href="{}" />"#, e.url),
    ]);

    if e.og_type == OgType::Article {
        if let Some(category) = &e.category {
            tags.push(format!(
                r#"<meta property="article:section" content="{}" />"#,
                category
            ));
        }
        if let Some(published_at) = &e.published_at {
            tags.push(format!(
                r#"<meta property="article:published_time" content="{}" />"#,
                published_at
            ));
        }
    }

    let mut out = String::new();
    for tag in tags {
        out.push_str(indent);
        out.push_str(&tag);
        out.push('\n');
    }
    out
}

/// Standalone document served to crawlers: every tag in the head, plus a
/// small readable body linking to the canonical URL.
pub fn crawler_document(record: &MetadataRecord) -> String {
    let e = record.escaped();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
{tags}</head>
<body>
    <div style="font-family: Arial, sans-serif; text-align: center; padding: 50px;">
        <h1>{title}</h1>
        <p>{description}</p>
        <p><a href="{url}">View full article</a></p>
    </div>
</body>
</html>
"#,
        title = e.title,
        tags = render_head_tags(&e, "    "),
        description = e.description,
        url = e.url,
    )
}

/// Reduced document for when content could not be loaded. Built from site
/// defaults only.
pub fn degraded_document(record: &MetadataRecord) -> String {
    let e = record.escaped();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
{tags}</head>
<body>
    <div style="font-family: Arial, sans-serif; text-align: center; padding: 50px;">
        <h1>{site_name}</h1>
        <p>An error occurred while loading the page content.</p>
        <p><a href="{url}">Visit the main site</a></p>
    </div>
</body>
</html>
"#,
        title = e.title,
        tags = render_head_tags(&e, "    "),
        site_name = e.site_name,
        url = e.url,
    )
}
