//! What the renderer can do: markdown plugins and highlight languages.

use folio_site::config::Stylesheet;
use folio_site::{PluginCatalog, SiteConfig};

/// Markdown plugins the renderer understands.
///
/// `math` parses `$...$` and `$$...$$`; `katex` typesets it in the browser.
pub const PLUGINS: &[&str] = &["math", "katex"];

/// Languages highlighted without configuration, in Prism dependency order.
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "markup",
    "css",
    "clike",
    "javascript",
    "jsx",
    "typescript",
    "tsx",
    "json",
    "yaml",
    "markdown",
    "python",
    "rust",
    "go",
    "c",
    "cpp",
];

/// Additional Prism components that can be enabled with `[highlight] languages`.
pub const EXTRA_LANGUAGES: &[&str] = &[
    "bash",
    "diff",
    "docker",
    "fortran",
    "ini",
    "java",
    "julia",
    "latex",
    "makefile",
    "mathematica",
    "matlab",
    "powershell",
    "r",
    "ruby",
    "sql",
    "toml",
];

const PRISM_CDN: &str = "https://cdn.jsdelivr.net/npm/prismjs@1.29.0";
/// KaTeX release whose script is loaded; a configured stylesheet must match it.
pub const KATEX_VERSION: &str = "0.13.24";
const KATEX_CDN: &str = "https://cdn.jsdelivr.net/npm/katex@0.13.24/dist";

/// The plugin catalog of this renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities;

impl PluginCatalog for Capabilities {
    fn knows_plugin(&self, name: &str) -> bool {
        PLUGINS.contains(&name)
    }

    fn knows_language(&self, name: &str) -> bool {
        DEFAULT_LANGUAGES.contains(&name) || EXTRA_LANGUAGES.contains(&name)
    }
}

impl Capabilities {
    /// Whether a code block in `language` gets highlighted under this config.
    pub fn highlights(&self, config: &SiteConfig, language: &str) -> bool {
        DEFAULT_LANGUAGES.contains(&language)
            || config.highlight.languages.iter().any(|l| l == language)
    }

    /// Script URLs to load for highlighting and math, in load order.
    pub fn scripts(&self, config: &SiteConfig) -> Vec<String> {
        let mut scripts = vec![format!("{}/components/prism-core.min.js", PRISM_CDN)];

        scripts.extend(
            DEFAULT_LANGUAGES
                .iter()
                .copied()
                .chain(config.highlight.languages.iter().map(String::as_str))
                .map(|lang| format!("{}/components/prism-{}.min.js", PRISM_CDN, lang)),
        );

        if config.markdown.has_plugin("katex") {
            scripts.push(format!("{}/katex.min.js", KATEX_CDN));
        }

        scripts
    }

    /// External stylesheets to link: the configured ones, plus the KaTeX
    /// stylesheet matching [`scripts`](Self::scripts) when none is configured.
    pub fn stylesheets(&self, config: &SiteConfig) -> Vec<Stylesheet> {
        let mut sheets = config.stylesheets.clone();

        if config.markdown.has_plugin("katex") {
            let katex: Vec<_> = config.stylesheets.iter().filter(|s| s.href.contains("katex")).collect();
            if katex.is_empty() {
                sheets.push(Stylesheet {
                    href: format!("{}/katex.min.css", KATEX_CDN),
                    integrity: None,
                    crossorigin: Some("anonymous".to_string()),
                });
            }
            for sheet in katex {
                if !sheet.href.contains(&format!("@{}/", KATEX_VERSION)) {
                    tracing::warn!(
                        "Stylesheet {} does not match KaTeX {} loaded by pages",
                        sheet.href,
                        KATEX_VERSION
                    );
                }
            }
        }

        sheets
    }
}
