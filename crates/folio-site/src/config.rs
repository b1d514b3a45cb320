//! Site configuration (`site.toml`).

use serde::Deserialize;

use crate::error::ValidationError;

/// Plugins and highlight languages supported by a renderer.
pub trait PluginCatalog {
    /// Check whether a content transformation plugin is supported.
    fn knows_plugin(&self, name: &str) -> bool;

    /// Check whether a syntax highlighting language is supported.
    fn knows_language(&self, name: &str) -> bool;
}

/// Immutable site configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    pub site: SiteMeta,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub stylesheets: Vec<Stylesheet>,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub navbar: NavbarConfig,
    #[serde(default)]
    pub footer: FooterConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Global site metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteMeta {
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    /// Deployment origin, e.g. `https://example.github.io`
    pub url: String,
    /// Path prefix the site is served under
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub on_broken_links: BrokenLinkPolicy,
}

/// What to do with links in page content that do not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokenLinkPolicy {
    /// Abort the build
    #[default]
    Throw,
    /// Log and continue
    Warn,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
}

/// Where documents live and how they are routed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocsConfig {
    #[serde(default = "default_docs_dir")]
    pub dir: String,
    #[serde(default = "default_sidebars")]
    pub sidebars: String,
    #[serde(default = "default_route_base")]
    pub route_base: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Prefix for "Edit this page" links; the document's source path is appended
    #[serde(default)]
    pub edit_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_true")]
    pub minify: bool,
}

/// Content transformation plugins applied to every document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarkdownConfig {
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl MarkdownConfig {
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p == name)
    }
}

/// Syntax highlighting languages loaded in addition to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HighlightConfig {
    #[serde(default)]
    pub languages: Vec<String>,
}

/// An external stylesheet linked from every page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Stylesheet {
    pub href: String,
    #[serde(default)]
    pub integrity: Option<String>,
    #[serde(default)]
    pub crossorigin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThemeConfig {
    /// Local stylesheets copied into the output and linked from every page
    #[serde(default)]
    pub custom_css: Vec<String>,
    #[serde(default = "default_true")]
    pub respect_prefers_color_scheme: bool,
    /// Social card image
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NavbarConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub logo: Option<Logo>,
    #[serde(default)]
    pub items: Vec<NavbarItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Logo {
    pub alt: String,
    pub src: String,
}

/// Navbar entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavbarItem {
    /// Links to the first document of a sidebar
    DocSidebar {
        sidebar: String,
        label: String,
        #[serde(default)]
        position: Position,
    },
    Doc {
        id: String,
        label: String,
        #[serde(default)]
        position: Position,
    },
    Link {
        href: String,
        label: String,
        #[serde(default)]
        position: Position,
    },
}

impl NavbarItem {
    pub fn label(&self) -> &str {
        match self {
            Self::DocSidebar { label, .. } | Self::Doc { label, .. } | Self::Link { label, .. } => {
                label
            }
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Self::DocSidebar { position, .. }
            | Self::Doc { position, .. }
            | Self::Link { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FooterConfig {
    #[serde(default)]
    pub style: FooterStyle,
    #[serde(default)]
    pub links: Vec<FooterColumn>,
    #[serde(default)]
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterStyle {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FooterColumn {
    pub title: String,
    #[serde(default)]
    pub items: Vec<FooterLink>,
}

/// Footer link: `to` for site routes, `href` for external URLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FooterLink {
    Internal { label: String, to: String },
    External { label: String, href: String },
}

/// Publishing target for `folio deploy`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeployConfig {
    /// Directory receiving the build output (e.g. a `gh-pages` checkout)
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub cname: Option<String>,
    #[serde(default = "default_true")]
    pub nojekyll: bool,
}

fn default_base_url() -> String {
    "/".to_string()
}
fn default_locale() -> String {
    "en".to_string()
}
fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}
fn default_docs_dir() -> String {
    "docs".to_string()
}
fn default_sidebars() -> String {
    "sidebars.yaml".to_string()
}
fn default_route_base() -> String {
    "docs".to_string()
}
fn default_static_dir() -> String {
    "static".to_string()
}
fn default_output() -> String {
    "build".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locales: default_locales(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: default_docs_dir(),
            sidebars: default_sidebars(),
            route_base: default_route_base(),
            static_dir: default_static_dir(),
            edit_url: None,
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            minify: true,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            custom_css: Vec::new(),
            respect_prefers_color_scheme: true,
            image: None,
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            target: None,
            cname: None,
            nojekyll: true,
        }
    }
}

impl SiteConfig {
    /// Validate the configuration against what the renderer supports.
    pub fn validate(&self, catalog: &dyn PluginCatalog) -> Result<(), ValidationError> {
        if !is_path_prefix(&self.site.base_url) {
            return Err(ValidationError::InvalidBaseUrl(self.site.base_url.clone()));
        }

        if !is_origin(&self.site.url) {
            return Err(ValidationError::InvalidUrl(self.site.url.clone()));
        }

        if !self.i18n.locales.contains(&self.i18n.default_locale) {
            return Err(ValidationError::DefaultLocaleMissing {
                default_locale: self.i18n.default_locale.clone(),
                locales: self.i18n.locales.clone(),
            });
        }

        if let Some(name) = self
            .markdown
            .plugins
            .iter()
            .find(|name| !catalog.knows_plugin(name))
        {
            return Err(ValidationError::UnknownPlugin {
                kind: "markdown plugin",
                name: name.clone(),
            });
        }

        if let Some(name) = self
            .highlight
            .languages
            .iter()
            .find(|name| !catalog.knows_language(name))
        {
            return Err(ValidationError::UnknownPlugin {
                kind: "highlight language",
                name: name.clone(),
            });
        }

        Ok(())
    }

    /// Join a site route onto the base URL: `/docs/intro` -> `/project/docs/intro/`.
    ///
    /// A query or fragment stays after the trailing slash.
    pub fn url_for(&self, route: &str) -> String {
        let (path, suffix) = route.split_at(route.find(['?', '#']).unwrap_or(route.len()));
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{}{}", self.site.base_url, suffix)
        } else {
            format!("{}{}/{}", self.site.base_url, path, suffix)
        }
    }

    /// Absolute URL of a site route, for sitemaps and social cards.
    pub fn absolute_url(&self, route: &str) -> String {
        format!("{}{}", self.site.url.trim_end_matches('/'), self.url_for(route))
    }
}

fn is_path_prefix(base_url: &str) -> bool {
    if base_url == "/" {
        return true;
    }
    let Some(inner) = base_url
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
    else {
        return false;
    };
    inner.split('/').all(|segment| {
        !segment.is_empty()
            && !segment
                .chars()
                .any(|c| c.is_whitespace() || c == '?' || c == '#')
    })
}

fn is_origin(url: &str) -> bool {
    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };
    let host = rest.trim_end_matches('/');
    !host.is_empty() && !host.contains('/') && !host.chars().any(char::is_whitespace)
}
