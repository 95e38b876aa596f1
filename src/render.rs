//! Renders a [`LinkRecord`] into a standalone HTML page. Rendering is pure:
//! it produces a [`String`] and leaves all I/O to [`crate::write`].
//!
//! Every value taken from the record is escaped with
//! [`html_escape::encode_quoted_attribute`], which covers `&`, `<`, `>`, `"`
//! and `'`, so the same escaping is safe in both text and attribute
//! positions.

use std::borrow::Cow;

use url::{Host, Url};

use crate::link::LinkRecord;
use crate::theme::Theme;

/// The default link from a page back to the site's index.
pub const DEFAULT_INDEX_HREF: &str = "../index.html";

/// Theme toggle script shared by every page. It prefers the stored `theme`
/// choice and falls back to the browser's colour-scheme preference.
const THEME_SCRIPT: &str = r#"function toggleTheme() {
  const d = document.documentElement;
  const next = d.getAttribute('data-theme') === 'dark' ? 'light' : 'dark';
  d.setAttribute('data-theme', next);
  document.querySelector('.theme-toggle').textContent = next === 'dark' ? '🌙' : '☀️';
  localStorage.setItem('theme', next);
}
(function() {
  const saved = localStorage.getItem('theme') ||
    (matchMedia('(prefers-color-scheme: dark)').matches ? 'dark' : 'light');
  if (saved === 'dark') {
    document.documentElement.setAttribute('data-theme', 'dark');
    document.querySelector('.theme-toggle').textContent = '🌙';
  }
})();
"#;

/// Renders link pages with a fixed [`Theme`].
pub struct Renderer<'a> {
    /// Presentation settings applied to every page.
    pub theme: &'a Theme,

    /// Where the "back" link and tag pills point. Tag pills append
    /// `?tag={tag}`.
    pub index_href: &'a str,
}

impl<'a> Renderer<'a> {
    pub fn new(theme: &'a Theme, index_href: &'a str) -> Renderer<'a> {
        Renderer { theme, index_href }
    }

    /// Renders the page for `record`.
    pub fn render(&self, record: &LinkRecord) -> String {
        let title = escape(&record.title);
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
{style}</style>
</head>
<body>
<button class="theme-toggle" onclick="toggleTheme()" aria-label="Toggle dark mode">☀️</button>
<div class="container">
  <a class="back" href="{index}">← Back</a>
  <h1>{title}</h1>
  <div class="meta">
{meta}  </div>
  <a class="visit" href="{url}" target="_blank" rel="noopener">Visit original ↗</a>
  <p class="summary">{summary}</p>
  <div class="divider"></div>
  <div class="tags">{pills}</div>
</div>
<script>
{script}</script>
</body>
</html>"#,
            title = title,
            style = self.theme.stylesheet(),
            index = escape(self.index_href),
            meta = self.meta(record),
            url = escape(&record.url),
            summary = escape(&record.summary),
            pills = self.pills(&record.tags),
            script = THEME_SCRIPT,
        )
    }

    // The lines inside `<div class="meta">`: the date, and the domain when
    // the theme shows it.
    fn meta(&self, record: &LinkRecord) -> String {
        let mut meta = format!("    <span>{}</span>\n", escape(&record.date));
        if self.theme.show_domain {
            meta.push_str("    <span class=\"meta-dot\">·</span>\n");
            meta.push_str(&format!("    <span>{}</span>\n", escape(&domain(&record.url))));
        }
        meta
    }

    fn pills(&self, tags: &[String]) -> String {
        let index = escape(self.index_href);
        tags.iter()
            .map(|tag| {
                let tag = escape(tag);
                format!(r#"<a class="pill" href="{}?tag={}">{}</a>"#, index, tag, tag)
            })
            .collect()
    }
}

/// Returns the host of `url` with any leading `www.` removed, or an empty
/// string if `url` can't be parsed or has no host. Internationalized domain
/// names are shown in Unicode rather than punycode, and IPv6 addresses
/// without their brackets.
pub fn domain(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return String::new(),
    };
    match parsed.host() {
        Some(Host::Domain(host)) => {
            let (host, _) = idna::domain_to_unicode(host);
            match host.strip_prefix("www.") {
                Some(stripped) => stripped.to_owned(),
                None => host,
            }
        }
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    }
}

/// HTML-escapes `&`, `<`, `>`, `"`, and `'`.
pub fn escape(s: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(s)
}
