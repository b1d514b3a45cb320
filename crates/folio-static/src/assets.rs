//! Asset pipeline for CSS and JavaScript processing.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    ///
    /// Math typesetting is included only when the site renders math with KaTeX.
    pub fn generate_js(katex: bool) -> String {
        if katex {
            format!("{}\n{}", DEFAULT_JS, KATEX_JS)
        } else {
            DEFAULT_JS.to_string()
        }
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* folio default theme */

:root {
  --navbar-height: 3.75rem;
  --sidebar-width: 280px;
  --toc-width: 220px;
  --content-max-width: 800px;
  --radius: 0.4rem;

  --background: #ffffff;
  --foreground: #1c1e21;
  --muted: #f5f6f7;
  --muted-foreground: #606770;
  --border: #dadde1;
  --primary: #2e8555;
  --primary-hover: #29784c;
  --primary-foreground: #ffffff;
  --code-background: #f6f8fa;
  --footer-background: #f5f6f7;
  --footer-foreground: #1c1e21;
}

[data-theme='dark'] {
  --background: #1b1b1d;
  --foreground: #e3e3e3;
  --muted: #242526;
  --muted-foreground: #b0b3b8;
  --border: #3a3b3c;
  --primary: #25c2a0;
  --primary-hover: #21af90;
  --primary-foreground: #1b1b1d;
  --code-background: #282a36;
}

.footer-dark {
  --footer-background: #303846;
  --footer-foreground: #ebedf0;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.65;
  min-height: 100vh;
  display: flex;
  flex-direction: column;
}

a {
  color: var(--primary);
}

/* Navbar */
.navbar {
  position: sticky;
  top: 0;
  z-index: 20;
  display: flex;
  align-items: center;
  gap: 1rem;
  height: var(--navbar-height);
  padding: 0 1rem;
  background: var(--background);
  border-bottom: 1px solid var(--border);
}

.navbar-brand {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  font-weight: 700;
  color: var(--foreground);
  text-decoration: none;
}

.navbar-logo {
  height: 2rem;
}

.navbar-items {
  display: flex;
  gap: 0.25rem;
}

.navbar-right {
  margin-left: auto;
}

.navbar-item {
  padding: 0.25rem 0.75rem;
  font-weight: 500;
  color: var(--foreground);
  text-decoration: none;
  border-radius: var(--radius);
}

.navbar-item:hover,
.navbar-item.active {
  color: var(--primary);
}

.theme-toggle,
.menu-btn {
  background: none;
  border: none;
  color: var(--foreground);
  font-size: 1.25rem;
  cursor: pointer;
}

.menu-btn {
  display: none;
}

/* Docs layout */
.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  flex: 1;
}

.sidebar {
  border-right: 1px solid var(--border);
  padding: 1rem 0.75rem;
  position: sticky;
  top: var(--navbar-height);
  height: calc(100vh - var(--navbar-height));
  overflow-y: auto;
}

.menu,
.menu-children {
  list-style: none;
}

.menu-children {
  margin-left: 0.75rem;
}

.menu-category.collapsed > .menu-children {
  display: none;
}

.menu-item a,
.menu-toggle {
  display: block;
  width: 100%;
  padding: 0.35rem 0.75rem;
  color: var(--muted-foreground);
  text-align: left;
  text-decoration: none;
  font: inherit;
  background: none;
  border: none;
  border-radius: var(--radius);
  cursor: pointer;
}

.menu-toggle {
  font-weight: 600;
  color: var(--foreground);
}

.menu-toggle::after {
  content: "\25BE";
  float: right;
}

.menu-category.collapsed > .menu-toggle::after {
  content: "\25B8";
}

.menu-item a:hover,
.menu-toggle:hover {
  background: var(--muted);
}

.menu-item.active > a {
  color: var(--primary);
  background: var(--muted);
  font-weight: 600;
}

/* Main content */
.main {
  display: grid;
  grid-template-columns: 1fr var(--toc-width);
  gap: 2rem;
  padding: 2rem;
  max-width: calc(var(--content-max-width) + var(--toc-width) + 4rem);
}

.doc {
  max-width: var(--content-max-width);
  min-width: 0;
}

.breadcrumbs {
  margin-bottom: 1rem;
  font-size: 0.875rem;
  color: var(--muted-foreground);
}

.breadcrumb + .breadcrumb::before {
  content: " / ";
}

.content h1 {
  font-size: 2.5rem;
  font-weight: 700;
  margin-bottom: 1.5rem;
}

.content h2 {
  font-size: 1.75rem;
  font-weight: 600;
  margin: 2rem 0 1rem;
}

.content h3 {
  font-size: 1.25rem;
  font-weight: 600;
  margin: 1.5rem 0 0.75rem;
}

.content p,
.content ul,
.content ol,
.content table,
.content blockquote {
  margin-bottom: 1rem;
}

.content ul,
.content ol {
  padding-left: 1.5rem;
}

.content table {
  border-collapse: collapse;
}

.content th,
.content td {
  border: 1px solid var(--border);
  padding: 0.5rem 0.75rem;
}

.content blockquote {
  border-left: 4px solid var(--border);
  padding-left: 1rem;
  color: var(--muted-foreground);
}

/* Code blocks */
.code-title {
  font-family: ui-monospace, monospace;
  font-size: 0.8rem;
  padding: 0.5rem 1rem;
  background: var(--muted);
  border: 1px solid var(--border);
  border-bottom: none;
  border-radius: var(--radius) var(--radius) 0 0;
}

.code-title + pre {
  border-top-left-radius: 0;
  border-top-right-radius: 0;
}

.content pre {
  background: var(--code-background);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
  font-family: ui-monospace, monospace;
  font-size: 0.875rem;
  margin-bottom: 1rem;
  position: relative;
}

.content code {
  font-family: ui-monospace, monospace;
  font-size: 0.875em;
  background: var(--muted);
  padding: 0.1rem 0.3rem;
  border-radius: 0.25rem;
}

.content pre code {
  background: none;
  padding: 0;
}

.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.2rem 0.6rem;
  font-size: 0.75rem;
  background: var(--muted);
  color: var(--foreground);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  cursor: pointer;
}

/* Math */
.math-display {
  display: block;
  overflow-x: auto;
  margin: 1rem 0;
  text-align: center;
}

/* Page footer links */
.edit-link {
  display: inline-block;
  margin-top: 2rem;
  font-size: 0.875rem;
}

.pagination {
  display: flex;
  justify-content: space-between;
  gap: 1rem;
  margin-top: 2rem;
}

.pagination a {
  flex: 1;
  padding: 0.75rem 1rem;
  border: 1px solid var(--border);
  border-radius: var(--radius);
  text-decoration: none;
  font-weight: 600;
}

.pagination span {
  display: block;
  font-size: 0.8rem;
  font-weight: 400;
  color: var(--muted-foreground);
}

.pagination-next {
  text-align: right;
}

/* Table of contents */
.toc {
  position: sticky;
  top: calc(var(--navbar-height) + 2rem);
  align-self: start;
}

.toc h2 {
  font-size: 0.75rem;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted-foreground);
  margin-bottom: 0.75rem;
}

.toc ul {
  list-style: none;
}

.toc a {
  font-size: 0.875rem;
  color: var(--muted-foreground);
  text-decoration: none;
}

.toc a:hover {
  color: var(--primary);
}

.toc-level-3 {
  padding-left: 1rem;
}

/* Homepage */
.hero {
  padding: 4rem 2rem;
  text-align: center;
  background: var(--primary);
  color: var(--primary-foreground);
}

.hero-title {
  font-size: 3rem;
}

.hero-subtitle {
  font-size: 1.4rem;
}

.features {
  padding: 2rem;
  max-width: 1140px;
  margin: 0 auto;
  flex: 1;
}

.feature-row {
  display: grid;
  grid-template-columns: repeat(var(--columns, 3), 1fr);
  gap: 2rem;
  margin-bottom: 2rem;
}

.feature {
  text-align: center;
}

.feature-icon {
  height: 200px;
  width: 200px;
}

.feature h3 {
  margin: 1rem 0 0.5rem;
}

.button {
  display: inline-block;
  margin-top: 1rem;
  padding: 0.35rem 1rem;
  background: var(--primary);
  color: var(--primary-foreground);
  border-radius: var(--radius);
  font-weight: 600;
  text-decoration: none;
}

.button:hover {
  background: var(--primary-hover);
}

.not-found {
  flex: 1;
  padding: 4rem 2rem;
  text-align: center;
}

/* Footer */
.footer {
  padding: 2rem;
  background: var(--footer-background);
  color: var(--footer-foreground);
}

.footer-links {
  display: flex;
  justify-content: space-around;
  flex-wrap: wrap;
  gap: 2rem;
  margin-bottom: 1.5rem;
}

.footer-column ul {
  list-style: none;
}

.footer-column a {
  color: inherit;
  text-decoration: none;
  opacity: 0.85;
}

.footer-column a:hover {
  opacity: 1;
  text-decoration: underline;
}

.footer-copyright {
  text-align: center;
  font-size: 0.875rem;
}

/* Responsive */
@media (max-width: 996px) {
  .layout {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: fixed;
    left: -100%;
    z-index: 30;
    width: var(--sidebar-width);
    background: var(--background);
    transition: left 0.3s;
  }

  .sidebar.open {
    left: 0;
  }

  .main {
    grid-template-columns: 1fr;
  }

  .toc {
    display: none;
  }

  .menu-btn {
    display: block;
  }

  .feature-row {
    grid-template-columns: 1fr;
  }
}
"#;

const DEFAULT_JS: &str = r#"// folio runtime
(function() {
  'use strict';

  // Mobile sidebar toggle
  const menuBtn = document.querySelector('.menu-btn');
  const sidebar = document.querySelector('.sidebar');

  if (menuBtn && sidebar) {
    menuBtn.addEventListener('click', () => {
      sidebar.classList.toggle('open');
    });
  }

  // Collapsible sidebar categories
  document.querySelectorAll('.menu-toggle').forEach(toggle => {
    toggle.addEventListener('click', () => {
      const category = toggle.parentElement;
      const collapsed = category.classList.toggle('collapsed');
      toggle.setAttribute('aria-expanded', String(!collapsed));
    });
  });

  // Color mode
  const themeToggle = document.querySelector('.theme-toggle');
  if (themeToggle) {
    themeToggle.addEventListener('click', () => {
      const root = document.documentElement;
      const next = root.dataset.theme === 'dark' ? 'light' : 'dark';
      root.dataset.theme = next;
      localStorage.setItem('theme', next);
    });
  }

  // Copy code button for pre blocks
  document.querySelectorAll('.content pre').forEach(pre => {
    if (pre.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = pre.querySelector('code');
      const text = code ? code.textContent : pre.textContent;

      try {
        await navigator.clipboard.writeText(text || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    pre.appendChild(btn);
  });
})();
"#;

const KATEX_JS: &str = r#"// Math typesetting
(function() {
  'use strict';

  if (!window.katex) return;

  document.querySelectorAll('.math').forEach(el => {
    const displayMode = el.classList.contains('math-display');
    try {
      window.katex.render(el.textContent, el, { displayMode, throwOnError: false });
    } catch (err) {
      console.warn('KaTeX failed to render', el.textContent, err);
    }
  });
})();
"#;
