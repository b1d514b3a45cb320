//! Template engine for rendering site pages.

use minijinja::{context, Environment};
use serde::Serialize;

/// A sidebar entry: a document link or a category.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path, `None` for categories
    pub path: Option<String>,
    /// Child items
    pub children: Vec<NavItem>,
    /// Whether this is the active page
    pub active: bool,
    /// Category rendered closed
    pub collapsed: bool,
}

/// A navbar or footer link.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
    /// Opens outside the site
    pub external: bool,
    /// Sidebar this link leads into, for highlighting the active section
    pub sidebar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterColumn {
    pub title: String,
    pub items: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stylesheet {
    pub href: String,
    pub integrity: Option<String>,
    pub crossorigin: Option<String>,
}

/// Values shared by every page of a site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub tagline: Option<String>,
    pub lang: String,
    pub base_url: String,
    pub favicon: Option<String>,
    /// Social card image URL
    pub image: Option<String>,
    pub navbar_title: String,
    pub logo: Option<Link>,
    pub navbar_left: Vec<Link>,
    pub navbar_right: Vec<Link>,
    pub footer_style: String,
    pub footer_columns: Vec<FooterColumn>,
    pub copyright: Option<String>,
    /// External stylesheets
    pub stylesheets: Vec<Stylesheet>,
    /// Site stylesheets under `assets/`
    pub styles: Vec<String>,
    /// External scripts, in load order
    pub scripts: Vec<String>,
    pub respect_prefers_color_scheme: bool,
    /// Dev server client script
    pub live_reload: Option<String>,
}

/// A table of contents entry.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Link to a neighbouring document.
#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    pub title: String,
    pub href: String,
}

/// Context for a documentation page.
#[derive(Debug, Clone, Serialize)]
pub struct DocPage {
    pub title: String,
    pub description: Option<String>,
    /// Rendered content HTML
    pub content: String,
    /// Name of the sidebar shown on this page
    pub sidebar_name: Option<String>,
    pub sidebar: Vec<NavItem>,
    /// Labels of the enclosing categories
    pub breadcrumbs: Vec<String>,
    pub toc: Vec<TocEntry>,
    pub edit_url: Option<String>,
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
}

/// A homepage feature tile.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureTile {
    pub title: String,
    pub icon: String,
    /// Rendered description HTML
    pub description: String,
    pub href: String,
}

/// Context for the homepage.
#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub title: String,
    pub columns: usize,
    pub rows: Vec<Vec<FeatureTile>>,
}

/// Context for the not-found page.
#[derive(Debug, Clone, Serialize)]
pub struct NotFoundPage {
    pub title: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("navbar.html", NAVBAR_TEMPLATE),
            ("footer.html", FOOTER_TEMPLATE),
            ("sidebar.html", SIDEBAR_TEMPLATE),
            ("doc.html", DOC_TEMPLATE),
            ("home.html", HOME_TEMPLATE),
            ("404.html", NOT_FOUND_TEMPLATE),
        ] {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("Failed to add built-in template");
        }

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page<P: Serialize>(
        &self,
        template: &str,
        site: &SiteContext,
        page: &P,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            site => site,
            page => page,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ site.lang }}" data-theme="light">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{{ page.title }} | {{ site.title }}{% endblock %}</title>
  {% if page.description %}<meta name="description" content="{{ page.description }}">
  {% elif site.tagline %}<meta name="description" content="{{ site.tagline }}">
  {% endif %}{% if site.image %}<meta property="og:image" content="{{ site.image }}">
  {% endif %}{% if site.favicon %}<link rel="icon" href="{{ site.favicon }}">
  {% endif %}<script>
    (function() {
      var stored = localStorage.getItem('theme');
      var prefersDark = {% if site.respect_prefers_color_scheme %}true{% else %}false{% endif %} &&
        window.matchMedia('(prefers-color-scheme: dark)').matches;
      document.documentElement.dataset.theme = stored || (prefersDark ? 'dark' : 'light');
    })();
  </script>
  {% for sheet in site.stylesheets %}<link rel="stylesheet" href="{{ sheet.href }}"{% if sheet.integrity %} integrity="{{ sheet.integrity }}"{% endif %}{% if sheet.crossorigin %} crossorigin="{{ sheet.crossorigin }}"{% endif %}>
  {% endfor %}<link rel="stylesheet" href="{{ site.base_url }}assets/main.css">
  {% for style in site.styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}
</head>
<body>
  {% include "navbar.html" %}
  {% block content %}{% endblock %}
  {% include "footer.html" %}
  {% for script in site.scripts %}<script src="{{ script }}" defer></script>
  {% endfor %}<script src="{{ site.base_url }}assets/main.js" defer></script>
  {% if site.live_reload %}<script>{{ site.live_reload | safe }}</script>{% endif %}
</body>
</html>"##;

const NAVBAR_TEMPLATE: &str = r##"<nav class="navbar">
  <button class="menu-btn" type="button" aria-label="Toggle sidebar">&#9776;</button>
  <a class="navbar-brand" href="{{ site.base_url }}">
    {% if site.logo %}<img class="navbar-logo" src="{{ site.logo.href }}" alt="{{ site.logo.label }}">{% endif %}
    <span class="navbar-title">{{ site.navbar_title }}</span>
  </a>
  <div class="navbar-items">
    {% for item in site.navbar_left %}<a class="navbar-item{% if item.sidebar and item.sidebar == page.sidebar_name %} active{% endif %}" href="{{ item.href }}"{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ item.label }}</a>
    {% endfor %}
  </div>
  <div class="navbar-items navbar-right">
    {% for item in site.navbar_right %}<a class="navbar-item{% if item.sidebar and item.sidebar == page.sidebar_name %} active{% endif %}" href="{{ item.href }}"{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ item.label }}</a>
    {% endfor %}
    <button class="theme-toggle" type="button" aria-label="Toggle dark mode">&#9680;</button>
  </div>
</nav>"##;

const FOOTER_TEMPLATE: &str = r##"<footer class="footer footer-{{ site.footer_style }}">
  {% if site.footer_columns %}
  <div class="footer-links">
    {% for column in site.footer_columns %}
    <div class="footer-column">
      <h4>{{ column.title }}</h4>
      <ul>
        {% for item in column.items %}<li><a href="{{ item.href }}"{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ item.label }}</a></li>
        {% endfor %}
      </ul>
    </div>
    {% endfor %}
  </div>
  {% endif %}
  {% if site.copyright %}<div class="footer-copyright">{{ site.copyright }}</div>{% endif %}
</footer>"##;

const SIDEBAR_TEMPLATE: &str = r##"<ul class="menu">
{% for item in page.sidebar recursive %}
  {% if item.path %}
  <li class="menu-item{% if item.active %} active{% endif %}">
    <a href="{{ item.path }}"{% if item.active %} aria-current="page"{% endif %}>{{ item.title }}</a>
  </li>
  {% else %}
  <li class="menu-category{% if item.collapsed %} collapsed{% endif %}">
    <button class="menu-toggle" type="button" aria-expanded="{% if item.collapsed %}false{% else %}true{% endif %}">{{ item.title }}</button>
    <ul class="menu-children">{{ loop(item.children) }}</ul>
  </li>
  {% endif %}
{% endfor %}
</ul>"##;

const DOC_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<div class="layout">
  {% if page.sidebar %}
  <aside class="sidebar">
    {% include "sidebar.html" %}
  </aside>
  {% endif %}
  <main class="main">
    <article class="doc">
      {% if page.breadcrumbs %}
      <nav class="breadcrumbs" aria-label="Breadcrumbs">
        {% for crumb in page.breadcrumbs %}<span class="breadcrumb">{{ crumb }}</span>{% endfor %}
      </nav>
      {% endif %}
      <div class="content">
        {{ page.content | safe }}
      </div>
      {% if page.edit_url %}
      <a class="edit-link" href="{{ page.edit_url }}" target="_blank" rel="noopener noreferrer">Edit this page</a>
      {% endif %}
      {% if page.previous or page.next %}
      <nav class="pagination" aria-label="Docs pages">
        {% if page.previous %}<a class="pagination-prev" href="{{ page.previous.href }}"><span>Previous</span>{{ page.previous.title }}</a>{% endif %}
        {% if page.next %}<a class="pagination-next" href="{{ page.next.href }}"><span>Next</span>{{ page.next.title }}</a>{% endif %}
      </nav>
      {% endif %}
    </article>

    {% if page.toc %}
    <aside class="toc">
      <h2>On this page</h2>
      <ul>
      {% for entry in page.toc %}
        <li class="toc-level-{{ entry.level }}">
          <a href="#{{ entry.id }}">{{ entry.title }}</a>
        </li>
      {% endfor %}
      </ul>
    </aside>
    {% endif %}
  </main>
</div>
{% endblock %}"##;

const HOME_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}{{ site.title }}{% if site.tagline %} | {{ site.tagline }}{% endif %}{% endblock %}

{% block content %}
<header class="hero">
  <h1 class="hero-title">{{ site.title }}</h1>
  {% if site.tagline %}<p class="hero-subtitle">{{ site.tagline }}</p>{% endif %}
</header>
<main class="features">
  {% for row in page.rows %}
  <div class="feature-row" style="--columns: {{ page.columns }}">
    {% for feature in row %}
    <div class="feature">
      <img class="feature-icon" src="{{ feature.icon }}" alt="" role="img">
      <h3>{{ feature.title }}</h3>
      <div class="feature-description">{{ feature.description | safe }}</div>
      <a class="button" href="{{ feature.href }}">Learn More</a>
    </div>
    {% endfor %}
  </div>
  {% endfor %}
</main>
{% endblock %}"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<main class="not-found">
  <h1>Page Not Found</h1>
  <p>We could not find what you were looking for.</p>
  <p><a href="{{ site.base_url }}">Back to the homepage</a></p>
</main>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    /// Undo minijinja's escaping of `/` so URLs can be matched literally.
    fn unescape(html: String) -> String {
        html.replace("&#x2f;", "/")
    }

    fn site() -> SiteContext {
        SiteContext {
            title: "Stat Mech".to_string(),
            tagline: Some("PhD qualifying problems".to_string()),
            lang: "en".to_string(),
            base_url: "/stat-mech/".to_string(),
            favicon: Some("/stat-mech/img/favicon.ico".to_string()),
            image: None,
            navbar_title: "Stat Mech".to_string(),
            logo: None,
            navbar_left: vec![Link {
                label: "Problems".to_string(),
                href: "/stat-mech/docs/problems/intro/".to_string(),
                external: false,
                sidebar: Some("problems".to_string()),
            }],
            navbar_right: vec![Link {
                label: "GitHub".to_string(),
                href: "https://github.com/example".to_string(),
                external: true,
                sidebar: None,
            }],
            footer_style: "dark".to_string(),
            footer_columns: vec![],
            copyright: Some("Copyright 2026".to_string()),
            stylesheets: vec![Stylesheet {
                href: "https://cdn.jsdelivr.net/npm/katex@0.13.24/dist/katex.min.css".to_string(),
                integrity: Some("sha384-abc".to_string()),
                crossorigin: Some("anonymous".to_string()),
            }],
            styles: vec![],
            scripts: vec![],
            respect_prefers_color_scheme: true,
            live_reload: None,
        }
    }

    fn doc(sidebar: Vec<NavItem>) -> DocPage {
        DocPage {
            title: "First Law".to_string(),
            description: None,
            content: "<p>Hello world</p>".to_string(),
            sidebar_name: Some("problems".to_string()),
            sidebar,
            breadcrumbs: vec!["Thermodynamics".to_string()],
            toc: vec![],
            edit_url: None,
            previous: None,
            next: Some(PageLink {
                title: "Entropy".to_string(),
                href: "/stat-mech/docs/problems/entropy/".to_string(),
            }),
        }
    }

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new();

        let html = unescape(engine.render_page("doc.html", &site(), &doc(vec![])).unwrap());

        assert!(html.contains("<title>First Law | Stat Mech</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains("integrity=\"sha384-abc\""));
        assert!(html.contains("class=\"navbar-item active\""));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("Thermodynamics"));
        assert!(html.contains("pagination-next"));
        assert!(!html.contains("pagination-prev"));
        assert!(!html.contains("class=\"sidebar\""));
    }

    #[test]
    fn renders_nested_sidebar() {
        let engine = TemplateEngine::new();
        let sidebar = vec![
            NavItem {
                title: "Introduction".to_string(),
                path: Some("/stat-mech/docs/problems/intro/".to_string()),
                children: vec![],
                active: false,
                collapsed: false,
            },
            NavItem {
                title: "Thermodynamics".to_string(),
                path: None,
                children: vec![NavItem {
                    title: "First Law".to_string(),
                    path: Some("/stat-mech/docs/problems/first-law/".to_string()),
                    children: vec![],
                    active: true,
                    collapsed: false,
                }],
                active: false,
                collapsed: false,
            },
            NavItem {
                title: "Statistical Physics".to_string(),
                path: None,
                children: vec![],
                active: false,
                collapsed: true,
            },
        ];

        let html = unescape(engine.render_page("doc.html", &site(), &doc(sidebar)).unwrap());

        assert!(html.contains("href=\"/stat-mech/docs/problems/intro/\""));
        assert!(html.contains("<li class=\"menu-category\">"));
        assert!(html.contains("<li class=\"menu-category collapsed\">"));
        assert!(html.contains("aria-current=\"page\""));
        assert!(html.contains("Statistical Physics"));
    }

    #[test]
    fn renders_homepage_rows() {
        let engine = TemplateEngine::new();
        let tile = |title: &str| FeatureTile {
            title: title.to_string(),
            icon: "/stat-mech/img/problems.svg".to_string(),
            description: "<p>Solved <strong>exams</strong></p>".to_string(),
            href: "/stat-mech/docs/problems/intro/".to_string(),
        };
        let page = HomePage {
            title: "Stat Mech".to_string(),
            columns: 2,
            rows: vec![vec![tile("Problems"), tile("Solutions")], vec![tile("Code")]],
        };

        let html = engine.render_page("home.html", &site(), &page).unwrap();

        assert!(html.contains("<title>Stat Mech | PhD qualifying problems</title>"));
        assert_eq!(html.matches("class=\"feature-row\"").count(), 2);
        assert!(html.contains("<strong>exams</strong>"));
        assert!(html.contains("--columns: 2"));
    }

    #[test]
    fn escapes_text() {
        let engine = TemplateEngine::new();
        let mut page = doc(vec![]);
        page.title = "<script>".to_string();

        let html = engine.render_page("doc.html", &site(), &page).unwrap();

        assert!(html.contains("&lt;script&gt; | Stat Mech"));
    }

    #[test]
    fn injects_live_reload() {
        let engine = TemplateEngine::new();
        let mut site = site();
        site.live_reload = Some("new WebSocket('ws://localhost:3000/__reload')".to_string());

        let html = engine
            .render_page(
                "404.html",
                &site,
                &NotFoundPage {
                    title: "Page Not Found".to_string(),
                },
            )
            .unwrap();

        assert!(html.contains("new WebSocket('ws://localhost:3000/__reload')"));
        assert!(html.contains("Back to the homepage"));
    }
}
