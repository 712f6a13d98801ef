// Pre-rendered pages for crawlers that hit the static host directly.
//
// Every known route gets its own copy of the SPA's built `index.html` with
// the page's `<title>` and meta tags spliced into the head, so the SPA's
// script and asset tags survive untouched.
//
// ```text
// dist/
// ├── index.html                 # Home
// ├── about/index.html
// ├── posts/<slug>/index.html    # One per post
// └── 404.html
// ```

use crate::{GenerateError, Result, run_blocking};
use metagate_core::config::Site;
use metagate_core::render::{head_tags, title_element};
use metagate_core::{ContentEntity, Route, about_entity, not_found_entity, synthesize};
use metagate_store::ContentStore;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Head tags that the materializer owns. Template tags carrying any of these
/// are removed before the new set is inserted.
const OWNED_TAG_MARKERS: &[&str] = &[
    "property=\"og:",
    "property=\"fb:",
    "property=\"article:",
    "name=\"twitter:",
    "name=\"description\"",
    "rel=\"canonical\"",
];

/// One post that could not be materialized. The rest of the batch continues.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub id: String,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct PrerenderReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<EntityFailure>,
}

/// The SPA's built document, split around the points where metadata goes
#[derive(Debug, Clone)]
struct BaseTemplate {
    before_title: String,
    after_title: String,
    tail: String,
}

impl BaseTemplate {
    fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GenerateError::TemplateMissing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(GenerateError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&content).map_err(|reason| GenerateError::TemplateInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        // ASCII lower-casing keeps byte offsets intact
        let head_end = content
            .to_ascii_lowercase()
            .find("</head>")
            .ok_or_else(|| "no </head> tag".to_string())?;

        let (head, tail) = content.split_at(head_end);
        let head = strip_owned_tags(head);
        let lower = head.to_ascii_lowercase();

        let (before_title, after_title) = match lower.find("<title") {
            Some(start) => {
                let end = lower[start..]
                    .find("</title>")
                    .map(|offset| start + offset + "</title>".len())
                    .ok_or_else(|| "unclosed <title> element".to_string())?;
                (head[..start].to_string(), head[end..].to_string())
            }
            None => (format!("{}\n    ", head.trim_end()), String::new()),
        };

        Ok(Self {
            before_title,
            after_title: after_title.trim_end().to_string(),
            tail: tail.to_string(),
        })
    }

    fn render(&self, title: &str, tags: &str) -> String {
        format!(
            "{}{}{}\n{}{}",
            self.before_title, title, self.after_title, tags, self.tail
        )
    }
}

/// Remove every `<meta>` / `<link>` tag carrying an owned marker.
///
/// Works on whole tags, so a tag split over several lines is still found and
/// any other markup sharing its line is kept. A removed tag that sat alone on
/// its line takes the line with it.
fn strip_owned_tags(head: &str) -> String {
    let mut out = String::with_capacity(head.len());
    let mut rest = head;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(len) = owned_tag_len(rest) else {
            out.push('<');
            rest = &rest[1..];
            continue;
        };
        rest = &rest[len..];

        // Drop the line too if the tag was the only thing on it
        let line_start = out.rfind('\n').map_or(0, |i| i + 1);
        let after = rest.trim_start_matches([' ', '\t']);
        let rest_of_line_empty = after.is_empty() || after.starts_with(['\n', '\r']);
        if line_start > 0 && out[line_start..].trim().is_empty() && rest_of_line_empty {
            out.truncate(line_start);
            rest = after
                .strip_prefix("\r\n")
                .or_else(|| after.strip_prefix('\n'))
                .unwrap_or(after);
        }
    }

    out.push_str(rest);
    out
}

/// Byte length of the owned tag at the start of `s`, if there is one
fn owned_tag_len(s: &str) -> Option<usize> {
    let lower = s.get(..5)?.to_ascii_lowercase();
    if lower != "<meta" && lower != "<link" {
        return None;
    }
    // Reject longer element names such as `<metadata>`
    match s[5..].chars().next() {
        Some(c) if c.is_ascii_whitespace() || c == '/' || c == '>' => {}
        _ => return None,
    }

    let len = tag_end(s)?;
    let tag = s[..len].to_ascii_lowercase().replace('\'', "\"");
    OWNED_TAG_MARKERS
        .iter()
        .any(|marker| tag.contains(marker))
        .then_some(len)
}

/// Index just past the `>` closing the tag that starts `s`, skipping any `>`
/// inside quoted attribute values
fn tag_end(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone)]
enum PageKind {
    /// Home, about and 404; failing to write one aborts the run
    Fixed,
    Post { id: String, title: String },
}

#[derive(Debug)]
struct Page {
    kind: PageKind,
    output: PathBuf,
    html: String,
}

/// Writes one HTML file per known route
pub struct Materializer {
    store: Arc<dyn ContentStore>,
    site: Site,
    dist: PathBuf,
    template: PathBuf,
}

impl Materializer {
    pub fn new(
        store: Arc<dyn ContentStore>,
        site: Site,
        dist: impl Into<PathBuf>,
        template: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            site,
            dist: dist.into(),
            template: template.into(),
        }
    }

    /// Fetch every post and write home, about, one page per post, and 404.
    ///
    /// A missing template or a store failure aborts before anything is
    /// written. Individual posts that fail are reported and skipped.
    pub async fn write_all(&self) -> Result<PrerenderReport> {
        let template_path = self.template.clone();
        let template = run_blocking(move || BaseTemplate::load(&template_path)).await?;

        let posts = self.store.fetch_posts().await?;
        info!(count = posts.len(), "fetched posts for pre-rendering");

        let (pages, mut skipped) = self.plan(&template, &posts);
        let mut written = Vec::with_capacity(pages.len());

        let results = run_blocking(move || Ok(write_pages(pages))).await?;

        for (kind, result) in results {
            match (kind, result) {
                (_, Ok(path)) => written.push(path),
                (PageKind::Fixed, Err(e)) => return Err(e),
                (PageKind::Post { id, title }, Err(e)) => {
                    warn!(id = %id, error = %e, "failed to write post page, skipping");
                    skipped.push(EntityFailure {
                        id,
                        title,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            written = written.len(),
            skipped = skipped.len(),
            "pre-rendering complete"
        );

        Ok(PrerenderReport { written, skipped })
    }

    fn plan(
        &self,
        template: &BaseTemplate,
        posts: &[ContentEntity],
    ) -> (Vec<Page>, Vec<EntityFailure>) {
        let mut pages = vec![
            self.page(template, PageKind::Fixed, &Route::home(), None, "index.html"),
            self.page(
                template,
                PageKind::Fixed,
                &Route::about(),
                Some(about_entity()),
                "about/index.html",
            ),
        ];
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for post in posts {
            let failure = |reason: String| {
                warn!(id = %post.id, reason = %reason, "skipping post");
                EntityFailure {
                    id: post.id.clone(),
                    title: post.title.clone(),
                    reason,
                }
            };

            let slug = match post.output_slug() {
                Ok(slug) => slug,
                Err(e) => {
                    skipped.push(failure(e.to_string()));
                    continue;
                }
            };

            if !seen.insert(slug.clone()) {
                skipped.push(failure(format!(
                    "slug '{}' is already used by another post",
                    slug
                )));
                continue;
            }

            let kind = PageKind::Post {
                id: post.id.clone(),
                title: post.title.clone(),
            };
            let relative = format!("posts/{}/index.html", slug);
            pages.push(self.page(template, kind, &Route::post(&slug), Some(post), &relative));
        }

        pages.push(self.page(
            template,
            PageKind::Fixed,
            &Route::not_found(),
            Some(not_found_entity()),
            "404.html",
        ));

        (pages, skipped)
    }

    fn page(
        &self,
        template: &BaseTemplate,
        kind: PageKind,
        route: &Route,
        entity: Option<&ContentEntity>,
        relative: &str,
    ) -> Page {
        let url = route.absolute_url(&self.site.domain);
        let record = synthesize(&self.site, entity, &url);
        let html = template.render(&title_element(&record), &head_tags(&record, "    "));

        Page {
            kind,
            output: self.dist.join(relative),
            html,
        }
    }
}

/// Write every page in parallel. Output paths are unique per page, so writes
/// never collide.
fn write_pages(pages: Vec<Page>) -> Vec<(PageKind, Result<PathBuf>)> {
    pages
        .into_par_iter()
        .map(|page| {
            let result = write_page(&page.output, &page.html).map(|_| page.output);
            (page.kind, result)
        })
        .collect()
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    let io_err = |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, html).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use metagate_core::parse_site_toml_str;
    use metagate_store::{StaticStore, StoreError};
    use tempfile::TempDir;
    use walkdir::WalkDir;

    const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <link rel="icon" type="image/svg+xml" href="/vite.svg" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <meta name="description" content="Placeholder description" />
    <title>Vite + React + TS</title>
    <script type="module" crossorigin src="/assets/index-abc123.js"></script>
    <link rel="stylesheet" crossorigin href="/assets/index-def456.css">
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

    struct FailingStore;

    #[async_trait]
    impl ContentStore for FailingStore {
        async fn fetch_post(
            &self,
            _slug: &str,
        ) -> metagate_store::Result<Option<ContentEntity>> {
            Err(StoreError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            })
        }

        async fn fetch_posts(&self) -> metagate_store::Result<Vec<ContentEntity>> {
            Err(StoreError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            })
        }
    }

    fn site() -> Site {
        parse_site_toml_str(
            "[site]\ndomain = \"blog.example.com\"\n\n[store]\nproject_id = \"abc123\"\n",
        )
        .unwrap()
        .site
    }

    fn post(id: &str, title: &str, slug: Option<&str>) -> ContentEntity {
        ContentEntity {
            id: id.to_string(),
            title: title.to_string(),
            excerpt: Some(format!("About {}.", title)),
            slug: slug.map(str::to_string),
            ..Default::default()
        }
    }

    fn setup(posts: Vec<ContentEntity>) -> (TempDir, Materializer) {
        let dir = TempDir::new().unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        fs::write(dist.join("index.html"), TEMPLATE).unwrap();

        let materializer = Materializer::new(
            Arc::new(StaticStore::new(posts)),
            site(),
            &dist,
            dist.join("index.html"),
        );
        (dir, materializer)
    }

    fn html_files(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_write_all_three_posts() {
        let (dir, materializer) = setup(vec![
            post("1", "First Post", Some("first-post")),
            post("2", "Second Post", Some("second-post")),
            post("3", "Third Post", None),
        ]);

        let report = materializer.write_all().await.unwrap();
        assert_eq!(report.written.len(), 6);
        assert!(report.skipped.is_empty());

        let dist = dir.path().join("dist");
        assert_eq!(
            html_files(&dist),
            vec![
                PathBuf::from("404.html"),
                PathBuf::from("about/index.html"),
                PathBuf::from("index.html"),
                PathBuf::from("posts/first-post/index.html"),
                PathBuf::from("posts/second-post/index.html"),
                PathBuf::from("posts/third-post/index.html"),
            ]
        );

        for file in html_files(&dist) {
            let html = fs::read_to_string(dist.join(&file)).unwrap();
            assert!(!html.contains("Vite + React + TS"), "{}", file.display());
            assert_eq!(html.matches("<title>").count(), 1, "{}", file.display());
        }
    }

    #[tokio::test]
    async fn test_pages_keep_spa_assets_and_get_tags() {
        let (dir, materializer) = setup(vec![post("1", "First Post", Some("first-post"))]);
        materializer.write_all().await.unwrap();

        let html =
            fs::read_to_string(dir.path().join("dist/posts/first-post/index.html")).unwrap();
        assert!(html.contains("<title>First Post</title>"));
        assert!(html.contains(r#"<script type="module" crossorigin src="/assets/index-abc123.js">"#));
        assert!(html.contains(r#"<div id="root"></div>"#));
        assert!(html.contains(
            r#"<link rel="canonical" href="https://blog.example.com/posts/first-post" />"#
        ));
        assert!(html.contains(r#"<meta property="og:type" content="article" />"#));
        assert!(!html.contains("Placeholder description"));

        // Tags land right before </head>
        let tags_at = html.find("og:title").unwrap();
        let head_end = html.find("</head>").unwrap();
        let body_at = html.find("<body>").unwrap();
        assert!(tags_at < head_end && head_end < body_at);
    }

    #[tokio::test]
    async fn test_home_and_not_found_pages() {
        let (dir, materializer) = setup(vec![]);
        materializer.write_all().await.unwrap();

        let dist = dir.path().join("dist");
        let home = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(home.contains("<title>Super Productive</title>"));
        assert!(home.contains(r#"<meta property="og:url" content="https://blog.example.com/" />"#));
        assert!(home.contains(r#"content="website""#));

        let not_found = fs::read_to_string(dist.join("404.html")).unwrap();
        assert!(not_found.contains("https://blog.example.com/404"));
        assert!(not_found.contains("Looks like that page doesn&#39;t exist."));
    }

    #[tokio::test]
    async fn test_rerun_does_not_duplicate_tags() {
        let (dir, materializer) = setup(vec![]);
        materializer.write_all().await.unwrap();
        // The home page is also the template; a second run reads its own output
        materializer.write_all().await.unwrap();

        let home = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(home.matches("og:title").count(), 1);
        assert_eq!(home.matches("rel=\"canonical\"").count(), 1);
        assert_eq!(home.matches("<title>").count(), 1);
    }

    #[tokio::test]
    async fn test_bad_posts_are_skipped_not_fatal() {
        let (dir, materializer) = setup(vec![
            post("ok", "Fine Post", Some("fine-post")),
            post("unsafe", "Unsafe", Some("../escape")),
            post("nonascii", "日本語", None),
            post("dupe", "Another Fine Post", Some("fine-post")),
        ]);

        let report = materializer.write_all().await.unwrap();
        assert_eq!(report.written.len(), 4);

        let skipped: Vec<&str> = report.skipped.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(skipped.len(), 3);
        assert!(skipped.contains(&"unsafe"));
        assert!(skipped.contains(&"nonascii"));
        assert!(skipped.contains(&"dupe"));

        assert!(dir.path().join("dist/posts/fine-post/index.html").exists());
        assert!(!dir.path().join("escape").exists());
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal() {
        let dir = TempDir::new().unwrap();
        let dist = dir.path().join("dist");
        let materializer = Materializer::new(
            Arc::new(StaticStore::new(vec![post("1", "A", Some("a"))])),
            site(),
            &dist,
            dist.join("index.html"),
        );

        let result = materializer.write_all().await;
        assert!(matches!(result, Err(GenerateError::TemplateMissing(_))));
        assert!(!dist.exists());
    }

    #[tokio::test]
    async fn test_template_without_head_is_invalid() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("index.html");
        fs::write(&template, "<html><body>no head</body></html>").unwrap();
        let materializer = Materializer::new(
            Arc::new(StaticStore::default()),
            site(),
            dir.path().join("dist"),
            &template,
        );

        assert!(matches!(
            materializer.write_all().await,
            Err(GenerateError::TemplateInvalid { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_before_writing() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("template.html");
        fs::write(&template, TEMPLATE).unwrap();
        let dist = dir.path().join("dist");
        let materializer = Materializer::new(Arc::new(FailingStore), site(), &dist, &template);

        assert!(matches!(
            materializer.write_all().await,
            Err(GenerateError::Store(_))
        ));
        assert!(!dist.exists());
    }

    #[test]
    fn test_template_without_title_gets_one() {
        let template =
            BaseTemplate::parse("<html><head><meta charset=\"UTF-8\"></head><body></body></html>")
                .unwrap();
        let html = template.render("<title>T</title>", "    <meta name=\"x\" />\n");
        assert!(html.contains("<title>T</title>"));
        assert!(html.find("<title>T</title>").unwrap() < html.find("</head>").unwrap());
        assert!(html.contains("<meta name=\"x\" />\n</head>"));
    }

    #[test]
    fn test_strip_keeps_asset_tags_on_shared_line() {
        let template = BaseTemplate::parse(
            "<html>\n  <head>\n    <title>Old</title>\n    <meta name=\"description\" content=\"x\"><link rel=\"stylesheet\" href=\"/assets/app.css\">\n  </head>\n  <body></body>\n</html>\n",
        )
        .unwrap();
        let html = template.render("<title>New</title>", "    <meta name=\"description\" content=\"y\" />\n");

        assert!(html.contains(r#"<link rel="stylesheet" href="/assets/app.css">"#));
        assert!(!html.contains(r#"content="x""#));
        assert_eq!(html.matches("name=\"description\"").count(), 1);
    }

    #[test]
    fn test_strip_multiline_meta_tag() {
        let template = BaseTemplate::parse(
            "<html>\n  <head>\n    <meta\n      name=\"description\"\n      content=\"A long description > wrapped by a formatter\"\n    />\n    <meta\n      property='og:title'\n      content=\"Old\"\n    />\n    <title>Old</title>\n  </head>\n  <body></body>\n</html>\n",
        )
        .unwrap();
        let html = template.render("<title>New</title>", "    <meta name=\"description\" content=\"y\" />\n");

        assert_eq!(html.matches("name=\"description\"").count(), 1);
        assert!(!html.contains("wrapped by a formatter"));
        assert!(!html.contains("og:title"));
        assert!(!html.contains("Old"));
    }

    #[test]
    fn test_strip_leaves_other_markup_untouched() {
        let head = "<head>\n    <meta charset=\"UTF-8\" />\n    <metadata-x></metadata-x>\n    <meta name=\"twitter:card\" content=\"summary\" />\n    <script>if (a < b) {}</script>\n";
        assert_eq!(
            strip_owned_tags(head),
            "<head>\n    <meta charset=\"UTF-8\" />\n    <metadata-x></metadata-x>\n    <script>if (a < b) {}</script>\n"
        );
    }

    #[test]
    fn test_uppercase_head_is_found() {
        let template =
            BaseTemplate::parse("<HTML><HEAD><TITLE>Old</TITLE></HEAD><BODY></BODY></HTML>")
                .unwrap();
        let html = template.render("<title>New</title>", "");
        assert!(html.contains("<title>New</title>"));
        assert!(!html.contains("Old"));
    }
}
