//! Presentation settings for rendered pages. A single [`Theme`] replaces the
//! per-variant copies of the page stylesheet: fonts, colours and corner radii
//! are parameters, and everything else in the stylesheet is fixed.

use serde::{Deserialize, Deserializer};

/// The seven colours a page uses, written as CSS custom properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub bg: String,
    pub text: String,
    pub text_secondary: String,
    pub border: String,
    pub hover: String,
    pub active_tag: String,
    pub badge: String,
}

impl Palette {
    pub fn light() -> Palette {
        Palette {
            bg: String::from("#ffffff"),
            text: String::from("#1a1a1a"),
            text_secondary: String::from("#6b6b6b"),
            border: String::from("#e8e5e1"),
            hover: String::from("#f5f4f2"),
            active_tag: String::from("#eeebe7"),
            badge: String::from("#c5c0b8"),
        }
    }

    pub fn dark() -> Palette {
        Palette {
            bg: String::from("#141312"),
            text: String::from("#e8e6e2"),
            text_secondary: String::from("#8a8680"),
            border: String::from("#2a2826"),
            hover: String::from("#1f1e1c"),
            active_tag: String::from("#2a2826"),
            badge: String::from("#5a5650"),
        }
    }

    fn light_with_overrides<'de, D: Deserializer<'de>>(d: D) -> Result<Palette, D::Error> {
        Ok(PaletteOverrides::deserialize(d)?.apply(Palette::light()))
    }

    fn dark_with_overrides<'de, D: Deserializer<'de>>(d: D) -> Result<Palette, D::Error> {
        Ok(PaletteOverrides::deserialize(d)?.apply(Palette::dark()))
    }

    fn custom_properties(&self) -> String {
        format!(
            "  --bg: {}; --text: {}; --text-secondary: {};\n  \
             --border: {}; --hover: {}; --active-tag: {}; --badge: {};\n",
            self.bg,
            self.text,
            self.text_secondary,
            self.border,
            self.hover,
            self.active_tag,
            self.badge,
        )
    }
}

/// The colours named in a project file's `light` or `dark` section. Unnamed
/// colours keep that mode's default.
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct PaletteOverrides {
    bg: Option<String>,
    text: Option<String>,
    text_secondary: Option<String>,
    border: Option<String>,
    hover: Option<String>,
    active_tag: Option<String>,
    badge: Option<String>,
}

impl PaletteOverrides {
    fn apply(self, base: Palette) -> Palette {
        Palette {
            bg: self.bg.unwrap_or(base.bg),
            text: self.text.unwrap_or(base.text),
            text_secondary: self.text_secondary.unwrap_or(base.text_secondary),
            border: self.border.unwrap_or(base.border),
            hover: self.hover.unwrap_or(base.hover),
            active_tag: self.active_tag.unwrap_or(base.active_tag),
            badge: self.badge.unwrap_or(base.badge),
        }
    }
}

/// Page presentation parameters. Every field may be overridden from the
/// `theme` section of the project file; omitted fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    /// The `font-family` stack for the page body.
    pub font_family: String,

    /// Colours used when the page is in light mode.
    #[serde(deserialize_with = "Palette::light_with_overrides")]
    pub light: Palette,

    /// Colours used when the page is in dark mode.
    #[serde(deserialize_with = "Palette::dark_with_overrides")]
    pub dark: Palette,

    /// Maximum width of the content column.
    pub max_width: String,

    /// Corner radius of the "visit original" button.
    pub button_radius: String,

    /// Corner radius of tag pills.
    pub pill_radius: String,

    /// Whether the metadata line shows the link's domain next to its date.
    pub show_domain: bool,
}

impl Default for Theme {
    fn default() -> Theme {
        Theme {
            font_family: String::from(
                "'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', system-ui, sans-serif",
            ),
            light: Palette::light(),
            dark: Palette::dark(),
            max_width: String::from("640px"),
            button_radius: String::from("6px"),
            pill_radius: String::from("4px"),
            show_domain: true,
        }
    }
}

impl Theme {
    /// Renders the page stylesheet, without the surrounding `<style>` tags.
    pub fn stylesheet(&self) -> String {
        format!(
            r#"*, *::before, *::after {{ margin: 0; padding: 0; box-sizing: border-box; }}
:root {{
{light}}}
[data-theme="dark"] {{
{dark}}}
body {{
  background: var(--bg); color: var(--text);
  font-family: {font_family};
  line-height: 1.7; letter-spacing: -0.01em;
  -webkit-font-smoothing: antialiased;
}}
.container {{ max-width: {max_width}; margin: 0 auto; padding: 80px 24px 120px; }}
.back {{
  color: var(--text-secondary); text-decoration: none; font-size: 13px;
  display: inline-flex; align-items: center; gap: 6px;
  margin-bottom: 40px; transition: color 150ms;
}}
.back:hover {{ color: var(--text); }}
h1 {{
  font-size: 28px; font-weight: 600; letter-spacing: -0.02em;
  line-height: 1.2; margin-bottom: 12px;
}}
.meta {{
  display: flex; align-items: center; gap: 12px;
  color: var(--text-secondary); font-size: 13px; margin-bottom: 32px;
}}
.meta-dot {{ color: var(--badge); }}
.visit {{
  display: inline-flex; align-items: center; gap: 6px;
  padding: 8px 16px; border: 1px solid var(--border); border-radius: {button_radius};
  color: var(--text); text-decoration: none; font-size: 13px; font-weight: 450;
  margin-bottom: 32px; transition: background 150ms, border-color 150ms;
  font-family: inherit; letter-spacing: -0.01em;
}}
.visit:hover {{ background: var(--hover); border-color: var(--badge); }}
.summary {{
  color: var(--text); font-size: 15px; line-height: 1.8; margin-bottom: 32px;
}}
.divider {{ width: 32px; height: 1px; background: var(--border); margin-bottom: 20px; }}
.tags {{ display: flex; flex-wrap: wrap; gap: 6px; }}
.pill {{
  background: var(--hover); color: var(--text-secondary);
  font-size: 12px; font-weight: 450; padding: 4px 10px; border-radius: {pill_radius};
  text-decoration: none; transition: background 150ms; letter-spacing: -0.01em;
}}
.pill:hover {{ background: var(--active-tag); color: var(--text); }}
.theme-toggle {{
  position: fixed; top: 20px; right: 20px; background: none; border: none;
  font-size: 14px; cursor: pointer; color: var(--text-secondary);
  opacity: 0.5; transition: opacity 150ms;
}}
.theme-toggle:hover {{ opacity: 1; }}
@media (max-width: 480px) {{
  .container {{ padding: 60px 16px 80px; }}
  h1 {{ font-size: 22px; }}
}}
"#,
            light = self.light.custom_properties(),
            dark = self.dark.custom_properties(),
            font_family = self.font_family,
            max_width = self.max_width,
            button_radius = self.button_radius,
            pill_radius = self.pill_radius,
        )
    }
}
