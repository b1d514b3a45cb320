//! Static site builder.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Parser, Tag};
use rayon::prelude::*;
use walkdir::WalkDir;

use folio_mdx::codeblock::extract_title;
use folio_mdx::ParseOptions;
use folio_site::config::{FooterLink, FooterStyle, NavbarItem, Position};
use folio_site::{
    doc_ids, preorder, BrokenLinkPolicy, DocumentStore, LoadError, Manifest, NavNode, SiteConfig,
    ValidatedSite, ValidationError,
};

use crate::assets::AssetPipeline;
use crate::catalog::Capabilities;
use crate::content::{ContentCollection, ContentError, Document};
use crate::links::{BrokenLink, LinkResolver, LinkTarget};
use crate::templates::{
    DocPage, FeatureTile, FooterColumn, HomePage, Link, NavItem, NotFoundPage, PageLink,
    SiteContext, Stylesheet, TemplateEngine, TocEntry,
};

/// Build options on top of the site configuration.
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// Output directory; `build.output` from the site config when unset
    pub output_dir: Option<PathBuf>,

    /// Overrides `build.minify`
    pub minify: Option<bool>,

    /// Script injected into every page by the dev server
    pub live_reload: Option<String>,
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated, including the homepage and 404 page
    pub pages: usize,

    /// Number of documents rendered
    pub documents: usize,

    /// Broken links tolerated by the `warn`/`ignore` policies
    pub broken_links: Vec<BrokenLink>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Invalid site: {0}")]
    Validation(#[from] ValidationError),

    #[error("Found {} broken link(s):\n{}", .0.len(), list_links(.0))]
    BrokenLinks(Vec<BrokenLink>),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Refusing to clear output directory {0}: it contains site sources")]
    UnsafeOutput(PathBuf),
}

fn list_links(links: &[BrokenLink]) -> String {
    links
        .iter()
        .map(|link| format!("  {}", link))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A validated site with its documents, ready to render.
#[derive(Debug)]
pub struct CheckedSite {
    pub site: ValidatedSite,
    pub content: ContentCollection,
    /// Links in page content that do not resolve, in document order
    pub broken_links: Vec<BrokenLink>,
}

/// Static site builder.
pub struct StaticBuilder {
    manifest: Manifest,
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(manifest: Manifest, config: BuildConfig) -> Self {
        Self {
            manifest,
            config,
            templates: TemplateEngine::new(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config
            .output_dir
            .clone()
            .unwrap_or_else(|| self.manifest.path(&self.manifest.config.build.output))
    }

    /// Load documents, validate the manifest against them and find broken links.
    ///
    /// Nothing is written.
    pub fn check(&self) -> Result<CheckedSite, BuildError> {
        let config = &self.manifest.config;

        let content = ContentCollection::load(
            &self.manifest.path(&config.docs.dir),
            &config.docs.route_base,
            parse_options(config),
        )?;

        let site = self.manifest.clone().validate(&content, &Capabilities)?;

        let static_dir = site.path(&site.config.docs.static_dir);
        let broken_links = LinkResolver::new(&site.config, &content, &static_dir).broken_links();

        warn_unhighlighted(&site.config, &content);

        Ok(CheckedSite {
            site,
            content,
            broken_links,
        })
    }

    /// Build the static site.
    ///
    /// The site is validated and link-checked before anything is written.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let CheckedSite {
            site,
            content,
            broken_links,
        } = self.check()?;

        match site.config.site.on_broken_links {
            BrokenLinkPolicy::Throw if !broken_links.is_empty() => {
                return Err(BuildError::BrokenLinks(broken_links));
            }
            BrokenLinkPolicy::Warn => {
                for link in &broken_links {
                    tracing::warn!("Broken link {}", link);
                }
            }
            _ => {}
        }

        let output_dir = self.output_dir();
        reset_output(&site, &output_dir)?;

        let render = RenderContext {
            site_ctx: self.site_context(&site, &content),
            static_dir: site.path(&site.config.docs.static_dir),
            options: parse_options(&site.config),
            site: &site,
            content: &content,
            output_dir: &output_dir,
        };

        // Render documents in parallel
        content
            .documents()
            .par_iter()
            .try_for_each(|doc| self.build_doc(&render, doc))?;

        let mut pages = content.len();

        if content.by_route("/").is_none() {
            self.build_home(&render)?;
            pages += 1;
        } else {
            tracing::debug!("A document is served at the site root; skipping homepage");
        }

        self.build_not_found(&render)?;
        pages += 1;

        self.generate_assets(&render)?;
        self.copy_static(&render)?;
        self.generate_sitemap(&render)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages,
            documents: content.len(),
            broken_links,
            duration_ms: duration.as_millis() as u64,
            output_dir,
        })
    }

    /// Values shared by every page.
    fn site_context(&self, site: &ValidatedSite, content: &ContentCollection) -> SiteContext {
        let config = &site.config;

        let mut navbar_left = Vec::new();
        let mut navbar_right = Vec::new();

        for item in &config.navbar.items {
            let link = match item {
                NavbarItem::DocSidebar { sidebar, label, .. } => {
                    let first = site
                        .sidebars
                        .get(sidebar)
                        .and_then(|nodes| doc_ids(nodes).next())
                        .and_then(|id| content.resolve_path(id));
                    Link {
                        label: label.clone(),
                        href: config.url_for(first.as_deref().unwrap_or("/")),
                        external: false,
                        sidebar: Some(sidebar.clone()),
                    }
                }
                NavbarItem::Doc { id, label, .. } => Link {
                    label: label.clone(),
                    href: config.url_for(&content.resolve_path(id).unwrap_or_default()),
                    external: false,
                    sidebar: site.sidebars.sidebar_of(id).map(str::to_string),
                },
                NavbarItem::Link { href, label, .. } => site_link(config, label, href),
            };

            match item.position() {
                Position::Left => navbar_left.push(link),
                Position::Right => navbar_right.push(link),
            }
        }

        let footer_columns = config
            .footer
            .links
            .iter()
            .map(|column| FooterColumn {
                title: column.title.clone(),
                items: column
                    .items
                    .iter()
                    .map(|item| match item {
                        FooterLink::Internal { label, to } => Link {
                            label: label.clone(),
                            href: config.url_for(to),
                            external: false,
                            sidebar: None,
                        },
                        FooterLink::External { label, href } => site_link(config, label, href),
                    })
                    .collect(),
            })
            .collect();

        SiteContext {
            title: config.site.title.clone(),
            tagline: config.site.tagline.clone(),
            lang: config.i18n.default_locale.clone(),
            base_url: config.site.base_url.clone(),
            favicon: config.site.favicon.as_deref().map(|f| asset_url(config, f)),
            image: config.theme.image.as_deref().map(|image| {
                format!(
                    "{}{}",
                    config.site.url.trim_end_matches('/'),
                    asset_url(config, image)
                )
            }),
            navbar_title: config
                .navbar
                .title
                .clone()
                .unwrap_or_else(|| config.site.title.clone()),
            logo: config.navbar.logo.as_ref().map(|logo| Link {
                label: logo.alt.clone(),
                href: asset_url(config, &logo.src),
                external: false,
                sidebar: None,
            }),
            navbar_left,
            navbar_right,
            footer_style: match config.footer.style {
                FooterStyle::Light => "light".to_string(),
                FooterStyle::Dark => "dark".to_string(),
            },
            footer_columns,
            copyright: config.footer.copyright.clone(),
            stylesheets: Capabilities
                .stylesheets(config)
                .into_iter()
                .map(|sheet| Stylesheet {
                    href: sheet.href,
                    integrity: sheet.integrity,
                    crossorigin: sheet.crossorigin,
                })
                .collect(),
            styles: config
                .theme
                .custom_css
                .iter()
                .map(|css| format!("{}assets/{}", config.site.base_url, file_name(css)))
                .collect(),
            scripts: Capabilities.scripts(config),
            respect_prefers_color_scheme: config.theme.respect_prefers_color_scheme,
            live_reload: self.config.live_reload.clone(),
        }
    }

    /// Render a single document.
    fn build_doc(&self, render: &RenderContext<'_>, doc: &Document) -> Result<(), BuildError> {
        let config = &render.site.config;
        let sidebars = &render.site.sidebars;

        let sidebar_name = sidebars.sidebar_of(&doc.id);
        let nodes = sidebar_name.and_then(|name| sidebars.get(name)).unwrap_or(&[]);

        let (previous, next) = neighbours(nodes, &doc.id, config, render.content);

        let resolver = LinkResolver::new(config, render.content, &render.static_dir);

        let page = DocPage {
            title: doc.title().to_string(),
            description: doc.description().map(str::to_string),
            content: render_markdown(doc, &resolver, config, render.options),
            sidebar_name: sidebar_name.map(str::to_string),
            sidebar: nav_items(nodes, &doc.id, config, render.content),
            breadcrumbs: sidebar_name
                .and_then(|name| sidebars.trail(name, &doc.id))
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect(),
            toc: doc
                .doc
                .toc
                .iter()
                .filter(|e| (2..=3).contains(&e.level))
                .map(|e| TocEntry {
                    title: e.title.clone(),
                    id: e.id.clone(),
                    level: e.level,
                })
                .collect(),
            edit_url: config.docs.edit_url.as_deref().map(|base| {
                let path = doc
                    .relative_path
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                format!(
                    "{}/{}/{}",
                    base.trim_end_matches('/'),
                    config.docs.dir.trim_matches('/'),
                    path
                )
            }),
            previous,
            next,
        };

        let html = self
            .templates
            .render_page("doc.html", &render.site_ctx, &page)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        write_page(&calculate_output_path(render.output_dir, &doc.route), html)
    }

    /// Render the homepage with its feature grid.
    fn build_home(&self, render: &RenderContext<'_>) -> Result<(), BuildError> {
        let config = &render.site.config;
        let grid = &render.site.homepage;

        let page = HomePage {
            title: config.site.title.clone(),
            columns: grid.columns,
            rows: grid
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|card| FeatureTile {
                            title: card.title.clone(),
                            icon: asset_url(config, &card.icon),
                            description: render_inline(&card.description),
                            href: config.url_for(&card.link),
                        })
                        .collect()
                })
                .collect(),
        };

        let html = self
            .templates
            .render_page("home.html", &render.site_ctx, &page)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        write_page(&render.output_dir.join("index.html"), html)
    }

    fn build_not_found(&self, render: &RenderContext<'_>) -> Result<(), BuildError> {
        let page = NotFoundPage {
            title: "Page Not Found".to_string(),
        };

        let html = self
            .templates
            .render_page("404.html", &render.site_ctx, &page)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        write_page(&render.output_dir.join("404.html"), html)
    }

    /// Generate static assets.
    fn generate_assets(&self, render: &RenderContext<'_>) -> Result<(), BuildError> {
        let config = &render.site.config;
        let minify = self.config.minify.unwrap_or(config.build.minify);

        let assets_dir = render.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = minify_if(minify, AssetPipeline::generate_css());
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let js = AssetPipeline::generate_js(config.markdown.has_plugin("katex"));
        fs::write(assets_dir.join("main.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        // Copy custom stylesheets
        for css_path in &config.theme.custom_css {
            let source_path = render.site.path(css_path);
            if !source_path.exists() {
                tracing::warn!("Stylesheet not found: {}", source_path.display());
                continue;
            }

            let css = fs::read_to_string(&source_path)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", source_path.display(), e)))?;
            fs::write(assets_dir.join(file_name(css_path)), minify_if(minify, css))
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
            tracing::debug!("Copied stylesheet from {}", css_path);
        }

        Ok(())
    }

    /// Copy the static directory verbatim into the output.
    fn copy_static(&self, render: &RenderContext<'_>) -> Result<(), BuildError> {
        if !render.static_dir.is_dir() {
            return Ok(());
        }

        for entry in WalkDir::new(&render.static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&render.static_dir).unwrap_or(path);
            let target = render.output_dir.join(relative);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::copy(path, &target).map_err(|e| {
                BuildError::WriteError(format!("{} -> {}: {}", path.display(), target.display(), e))
            })?;
        }

        Ok(())
    }

    /// Generate sitemap.
    fn generate_sitemap(&self, render: &RenderContext<'_>) -> Result<(), BuildError> {
        let config = &render.site.config;

        let urls: Vec<String> = std::iter::once("/")
            .filter(|_| render.content.by_route("/").is_none())
            .chain(render.content.iter().map(|doc| doc.route.as_str()))
            .map(|route| {
                format!(
                    "  <url>\n    <loc>{}</loc>\n  </url>",
                    config.absolute_url(route)
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        fs::write(render.output_dir.join("sitemap.xml"), sitemap)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }
}

/// Everything a page render needs, computed once per build.
struct RenderContext<'a> {
    site_ctx: SiteContext,
    static_dir: PathBuf,
    options: ParseOptions,
    site: &'a ValidatedSite,
    content: &'a ContentCollection,
    output_dir: &'a Path,
}

fn parse_options(config: &SiteConfig) -> ParseOptions {
    ParseOptions {
        math: config.markdown.has_plugin("math"),
    }
}

/// Log once per language used in code blocks that will not be highlighted.
fn warn_unhighlighted(config: &SiteConfig, content: &ContentCollection) {
    let mut unhighlighted: BTreeMap<&str, (&Path, usize)> = BTreeMap::new();

    for doc in content.iter() {
        for block in &doc.doc.code_blocks {
            if let Some(name) = block.language.name() {
                if !Capabilities.highlights(config, name) {
                    unhighlighted
                        .entry(name)
                        .or_insert((doc.relative_path.as_path(), block.line_number));
                }
            }
        }
    }

    for (language, (path, line)) in unhighlighted {
        tracing::warn!(
            "{}:{}: '{}' code blocks are not highlighted; add it to [highlight] languages",
            path.display(),
            line,
            language
        );
    }
}

/// Sidebar tree for a page, with the active document marked.
///
/// Categories on the path to the active document are always expanded.
fn nav_items(
    nodes: &[NavNode],
    active: &str,
    config: &SiteConfig,
    content: &ContentCollection,
) -> Vec<NavItem> {
    nodes
        .iter()
        .map(|node| match node {
            NavNode::DocRef { id, label } => NavItem {
                title: doc_label(id, label.as_deref(), content),
                path: Some(config.url_for(&content.resolve_path(id).unwrap_or_default())),
                children: Vec::new(),
                active: id == active,
                collapsed: false,
            },
            NavNode::Category {
                label,
                collapsed,
                children,
            } => NavItem {
                title: label.clone(),
                path: None,
                children: nav_items(children, active, config, content),
                active: false,
                collapsed: *collapsed && !doc_ids(children).any(|id| id == active),
            },
        })
        .collect()
}

/// Previous and next documents in sidebar order.
fn neighbours(
    nodes: &[NavNode],
    id: &str,
    config: &SiteConfig,
    content: &ContentCollection,
) -> (Option<PageLink>, Option<PageLink>) {
    let docs: Vec<(&str, Option<&str>)> = preorder(nodes)
        .filter_map(|node| match node {
            NavNode::DocRef { id, label } => Some((id.as_str(), label.as_deref())),
            NavNode::Category { .. } => None,
        })
        .collect();

    let Some(index) = docs.iter().position(|(doc, _)| *doc == id) else {
        return (None, None);
    };

    let link = |(id, label): (&str, Option<&str>)| PageLink {
        title: doc_label(id, label, content),
        href: config.url_for(&content.resolve_path(id).unwrap_or_default()),
    };

    let previous = index.checked_sub(1).map(|i| link(docs[i]));
    let next = docs.get(index + 1).map(|&entry| link(entry));

    (previous, next)
}

fn doc_label(id: &str, label: Option<&str>, content: &ContentCollection) -> String {
    label
        .or_else(|| content.get(id).map(Document::sidebar_label))
        .unwrap_or(id)
        .to_string()
}

/// Render document markdown to HTML.
///
/// Heading ids come from the document's table of contents, internal links are
/// rewritten to site URLs, root-relative images get the base path and code
/// block titles are rendered above the block.
fn render_markdown(
    doc: &Document,
    resolver: &LinkResolver<'_>,
    config: &SiteConfig,
    options: ParseOptions,
) -> String {
    let mut headings = doc.doc.toc.iter();
    let mut events = Vec::new();

    for event in Parser::new_ext(&doc.doc.content, options.markdown_options()) {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let id = headings
                    .next()
                    .map(|entry| CowStr::from(entry.id.clone()))
                    .or(id);
                events.push(Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }));
            }

            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match resolver.resolve(doc, &dest_url) {
                    LinkTarget::Internal(href) => CowStr::from(href),
                    LinkTarget::External | LinkTarget::Broken => dest_url,
                };
                events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }

            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = if dest_url.starts_with('/') && !dest_url.starts_with("//") {
                    CowStr::from(asset_url(config, &dest_url))
                } else {
                    dest_url
                };
                events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }

            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                if let Some(title) = extract_title(&info) {
                    events.push(Event::Html(CowStr::from(format!(
                        "<div class=\"code-title\">{}</div>\n",
                        escape_html(&title)
                    ))));
                }
                events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
            }

            other => events.push(other),
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

/// Render inline markdown (feature descriptions) to HTML.
fn render_inline(markdown: &str) -> String {
    let mut html_output = String::new();
    html::push_html(&mut html_output, Parser::new(markdown));
    html_output
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A navbar or footer link given as `href`: site-relative paths get the base path.
fn site_link(config: &SiteConfig, label: &str, href: &str) -> Link {
    let internal = href.starts_with('/') && !href.starts_with("//");
    Link {
        label: label.to_string(),
        href: if internal {
            config.url_for(href)
        } else {
            href.to_string()
        },
        external: !internal,
        sidebar: None,
    }
}

/// URL of a file from the static directory.
fn asset_url(config: &SiteConfig, path: &str) -> String {
    format!(
        "{}{}",
        config.site.base_url,
        path.trim_start_matches('/')
    )
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("style.css")
}

fn minify_if(minify: bool, css: String) -> String {
    if !minify {
        return css;
    }
    match AssetPipeline::minify_css(&css) {
        Ok(minified) => minified,
        Err(e) => {
            tracing::warn!("{}; writing stylesheet unminified", e);
            css
        }
    }
}

/// Output path for a route: `/docs/intro` -> `<out>/docs/intro/index.html`.
fn calculate_output_path(output_dir: &Path, route: &str) -> PathBuf {
    output_dir
        .join(route.trim_start_matches('/'))
        .join("index.html")
}

/// Empty the output directory so pages of removed documents do not linger.
///
/// Fails without touching anything when the directory holds the site root,
/// the docs, the static files or a custom stylesheet.
fn reset_output(site: &ValidatedSite, output_dir: &Path) -> Result<(), BuildError> {
    if output_dir.exists() {
        let output = output_dir
            .canonicalize()
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output_dir.display(), e)))?;

        let root = if site.root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            site.root.clone()
        };
        let mut sources = vec![
            root,
            site.path(&site.config.docs.dir),
            site.path(&site.config.docs.static_dir),
        ];
        sources.extend(site.config.theme.custom_css.iter().map(|css| site.path(css)));

        for source in sources.iter().filter_map(|path| path.canonicalize().ok()) {
            if source.starts_with(&output) {
                return Err(BuildError::UnsafeOutput(output_dir.to_path_buf()));
            }
        }

        tracing::debug!("Clearing {}", output_dir.display());
        fs::remove_dir_all(output_dir)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output_dir.display(), e)))?;
    }

    fs::create_dir_all(output_dir).map_err(|e| BuildError::WriteError(e.to_string()))
}

fn write_page(path: &Path, html: String) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    fs::write(path, html).map_err(|e| BuildError::WriteError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    const SITE_TOML: &str = r#"
[site]
title = "Stat Mech"
tagline = "PhD qualifying problems"
url = "https://example.github.io"
base_url = "/stat-mech/"

[docs]
edit_url = "https://github.com/example/stat-mech/tree/main/site/"

[markdown]
plugins = ["math", "katex"]

[highlight]
languages = ["latex", "bash"]

[[navbar.items]]
type = "doc_sidebar"
sidebar = "problems"
label = "Problems"

[[navbar.items]]
type = "link"
href = "https://github.com/example/stat-mech"
label = "GitHub"
position = "right"

[[footer.links]]
title = "Docs"
items = [
  { label = "Overview", to = "/docs/problems/intro" },
  { label = "GitHub", href = "https://github.com/example/stat-mech" },
]

[homepage]
columns = 2

[[homepage.features]]
title = "Thermodynamics"
icon = "img/thermo.svg"
description = "Problems on the **First Law**."
link = "/docs/problems/thermodynamics/first-law"
"#;

    const SIDEBARS: &str = r#"
problems:
  - type: doc
    id: problems/intro
    label: Overview
  - type: category
    label: "Part I: Thermodynamics"
    collapsed: false
    items:
      - problems/thermodynamics/first-law
      - type: category
        label: Entropy
        items:
          - problems/thermodynamics/entropy
"#;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_site() -> TempDir {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "site.toml", SITE_TOML);
        write(root, "sidebars.yaml", SIDEBARS);
        write(
            root,
            "docs/problems/intro.md",
            "---\ntitle: Problems Overview\n---\n# Problems\n\nStart with [the first law](thermodynamics/first-law.md).\n",
        );
        write(
            root,
            "docs/problems/thermodynamics/first-law.md",
            r#"---
title: First Law
description: Thermodynamic states and the first law
---
# First Law

## Problem 1001

Work is $W = -\int p\,dV$ and ![diagram](/img/thermo.svg).

```python title="problem_1001.py"
W = -p * dV
```

### Solution {#sol-1001}

See [entropy](entropy.md#clausius).
"#,
        );
        write(
            root,
            "docs/problems/thermodynamics/entropy.md",
            "# Entropy\n\nBack to [the overview](/docs/problems/intro).\n",
        );
        write(root, "static/img/thermo.svg", "<svg></svg>");
        temp
    }

    fn builder(root: &Path) -> StaticBuilder {
        let manifest = Manifest::load(&root.join("site.toml")).unwrap();
        StaticBuilder::new(manifest, BuildConfig::default())
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap().replace("&#x2f;", "/")
    }

    #[test]
    fn builds_sample_site() {
        let temp = sample_site();
        let root = temp.path();

        let result = builder(root).build().unwrap();

        assert_eq!(result.documents, 3);
        assert_eq!(result.pages, 5);
        assert_eq!(result.output_dir, root.join("build"));

        let out = root.join("build");
        for page in [
            "index.html",
            "404.html",
            "sitemap.xml",
            "assets/main.css",
            "assets/main.js",
            "img/thermo.svg",
            "docs/problems/intro/index.html",
            "docs/problems/thermodynamics/first-law/index.html",
            "docs/problems/thermodynamics/entropy/index.html",
        ] {
            assert!(out.join(page).is_file(), "missing {}", page);
        }
    }

    #[test]
    fn renders_doc_pages() {
        let temp = sample_site();
        let root = temp.path();
        builder(root).build().unwrap();

        let html = read(root.join("build/docs/problems/thermodynamics/first-law/index.html"));

        // Content
        assert!(html.contains("<title>First Law | Stat Mech</title>"));
        assert!(html.contains("<h2 id=\"problem-1001\">Problem 1001</h2>"));
        assert!(html.contains("<h3 id=\"sol-1001\">"));
        assert!(html.contains("class=\"math math-inline\""));
        assert!(html.contains("<div class=\"code-title\">problem_1001.py</div>"));
        assert!(html.contains("class=\"language-python\""));
        assert!(html.contains("src=\"/stat-mech/img/thermo.svg\""));
        assert!(html.contains("href=\"/stat-mech/docs/problems/thermodynamics/entropy/#clausius\""));

        // Chrome
        assert!(html.contains("class=\"navbar-item active\""));
        assert!(html.contains("aria-current=\"page\""));
        assert!(html.contains("<span class=\"breadcrumb\">Part I: Thermodynamics</span>"));
        assert!(html.contains(
            "href=\"https://github.com/example/stat-mech/tree/main/site/docs/problems/thermodynamics/first-law.md\""
        ));
        assert!(html.contains("class=\"pagination-prev\" href=\"/stat-mech/docs/problems/intro/\""));
        assert!(html.contains("Overview</a>"));
        assert!(html.contains("katex@0.13.24/dist/katex.min.js"));
        assert!(html.contains("katex@0.13.24/dist/katex.min.css"));
        assert!(html.contains("prism-latex.min.js"));
    }

    #[test]
    fn expands_category_of_active_doc() {
        let temp = sample_site();
        let root = temp.path();
        builder(root).build().unwrap();

        let entropy = read(root.join("build/docs/problems/thermodynamics/entropy/index.html"));
        let intro = read(root.join("build/docs/problems/intro/index.html"));

        assert!(!entropy.contains("menu-category collapsed"));
        assert!(intro.contains("menu-category collapsed"));
    }

    #[test]
    fn renders_homepage() {
        let temp = sample_site();
        let root = temp.path();
        builder(root).build().unwrap();

        let html = read(root.join("build/index.html"));

        assert!(html.contains("PhD qualifying problems"));
        assert!(html.contains("<strong>First Law</strong>"));
        assert!(html.contains("href=\"/stat-mech/docs/problems/thermodynamics/first-law/\""));
        assert!(html.contains("src=\"/stat-mech/img/thermo.svg\""));

        let sitemap = read(root.join("build/sitemap.xml"));
        assert!(sitemap.contains("<loc>https://example.github.io/stat-mech/</loc>"));
        assert!(sitemap.contains(
            "<loc>https://example.github.io/stat-mech/docs/problems/thermodynamics/entropy/</loc>"
        ));
    }

    #[test]
    fn writes_nothing_when_validation_fails() {
        let temp = sample_site();
        let root = temp.path();
        write(
            root,
            "sidebars.yaml",
            "problems:\n  - problems/intro\n  - problems/missing\n",
        );

        let err = builder(root).build().unwrap_err();

        assert!(matches!(
            err,
            BuildError::Validation(ValidationError::DanglingReference { ref target, .. })
                if target == "problems/missing"
        ));
        assert!(!root.join("build").exists());
    }

    #[test]
    fn broken_links_follow_policy() {
        let temp = sample_site();
        let root = temp.path();
        write(
            root,
            "docs/problems/thermodynamics/entropy.md",
            "# Entropy\n\nSee [potentials](functions.md).\n",
        );

        let err = builder(root).build().unwrap_err();
        match err {
            BuildError::BrokenLinks(links) => {
                assert_eq!(links.len(), 1);
                assert_eq!(links[0].dest, "functions.md");
                assert_eq!(links[0].line, 3);
            }
            other => panic!("expected broken links, got {other}"),
        }
        assert!(!root.join("build").exists());

        let toml = SITE_TOML.replace(
            "base_url = \"/stat-mech/\"",
            "base_url = \"/stat-mech/\"\non_broken_links = \"warn\"",
        );
        write(root, "site.toml", &toml);

        let result = builder(root).build().unwrap();
        assert_eq!(result.broken_links.len(), 1);
        assert!(root.join("build/docs/problems/thermodynamics/entropy/index.html").exists());
    }

    #[test]
    fn honours_output_override() {
        let temp = sample_site();
        let root = temp.path();
        let out = root.join("dist");

        let manifest = Manifest::load(&root.join("site.toml")).unwrap();
        let builder = StaticBuilder::new(
            manifest,
            BuildConfig {
                output_dir: Some(out.clone()),
                minify: Some(false),
                live_reload: Some("console.log('reload')".to_string()),
            },
        );
        builder.build().unwrap();

        let css = fs::read_to_string(out.join("assets/main.css")).unwrap();
        assert!(css.contains('\n'));
        assert!(read(out.join("404.html")).contains("console.log('reload')"));
    }

    #[test]
    fn rebuild_drops_pages_of_removed_docs() {
        let temp = sample_site();
        let root = temp.path();
        builder(root).build().unwrap();
        fs::write(root.join("build/docs/leftover.html"), "stale").unwrap();

        fs::remove_file(root.join("docs/problems/thermodynamics/entropy.md")).unwrap();
        write(
            root,
            "sidebars.yaml",
            "problems:\n  - problems/intro\n  - problems/thermodynamics/first-law\n",
        );
        write(
            root,
            "docs/problems/thermodynamics/first-law.md",
            "# First Law\n\nNo more cross references.\n",
        );

        let result = builder(root).build().unwrap();

        assert_eq!(result.documents, 2);
        assert!(root.join("build/docs/problems/thermodynamics/first-law/index.html").is_file());
        assert!(!root.join("build/docs/problems/thermodynamics/entropy").exists());
        assert!(!root.join("build/docs/leftover.html").exists());
        assert!(!read(root.join("build/sitemap.xml")).contains("entropy"));
    }

    #[test]
    fn refuses_output_dir_holding_sources() {
        let temp = sample_site();
        let root = temp.path();

        for out in [root.to_path_buf(), root.join("docs/..")] {
            let manifest = Manifest::load(&root.join("site.toml")).unwrap();
            let err = StaticBuilder::new(
                manifest,
                BuildConfig {
                    output_dir: Some(out),
                    ..Default::default()
                },
            )
            .build()
            .unwrap_err();

            assert!(matches!(err, BuildError::UnsafeOutput(_)));
        }

        assert!(root.join("site.toml").is_file());
        assert!(root.join("docs/problems/intro.md").is_file());
        assert!(root.join("static/img/thermo.svg").is_file());
    }

    #[test]
    fn calculates_output_paths() {
        let out = Path::new("build");

        assert_eq!(
            calculate_output_path(out, "/docs/intro"),
            PathBuf::from("build/docs/intro/index.html")
        );
        assert_eq!(
            calculate_output_path(out, "/"),
            PathBuf::from("build/index.html")
        );
    }
}
