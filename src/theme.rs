//! Color helpers used to theme pages: hex parsing with a lavender fallback, shading,
//! contrast selection and the generated `/theme.css`.

use std::fmt::Write;

use crate::config::Theme;
use crate::taxonomy::{Category, Technology};

pub const FALLBACK_COLOR: Rgb = Rgb { r: 230, g: 230, b: 250 };
pub const DARK_TEXT: &str = "#1a1a2e";
pub const LIGHT_TEXT: &str = "#ffffff";
const LIGHT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Accepts `#rrggbb`, `rrggbb`, `#rgb` and `rgb`, in any case.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Rgb {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let double = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Rgb { r: double(0)?, g: double(1)?, b: double(2)? })
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness in `0.0..=1.0`.
    pub fn luminance(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Rgb {
        let apply = |c: u8| f(c as f64).round().clamp(0.0, 255.0) as u8;
        Rgb { r: apply(self.r), g: apply(self.g), b: apply(self.b) }
    }
}

pub fn hex_to_rgb(hex: Option<&str>) -> Rgb {
    hex.and_then(Rgb::from_hex).unwrap_or(FALLBACK_COLOR)
}

/// `r, g, b`, the form used inside `rgba(var(--x-rgb), a)`.
pub fn rgb_triplet(hex: Option<&str>) -> String {
    let Rgb { r, g, b } = hex_to_rgb(hex);
    format!("{}, {}, {}", r, g, b)
}

/// Moves each channel towards white by `factor`.
pub fn lighten(hex: Option<&str>, factor: f64) -> String {
    let factor = factor.clamp(0.0, 1.0);
    hex_to_rgb(hex).map(|c| c + (255.0 - c) * factor).to_hex()
}

/// Moves each channel towards black by `factor`.
pub fn darken(hex: Option<&str>, factor: f64) -> String {
    let factor = factor.clamp(0.0, 1.0);
    hex_to_rgb(hex).map(|c| c * (1.0 - factor)).to_hex()
}

pub fn is_light(hex: Option<&str>) -> bool {
    hex_to_rgb(hex).luminance() > LIGHT_THRESHOLD
}

/// Text color readable on top of `hex`.
pub fn contrast_color(hex: Option<&str>) -> &'static str {
    if is_light(hex) { DARK_TEXT } else { LIGHT_TEXT }
}

pub fn rgba(hex: Option<&str>, alpha: f64) -> String {
    let Rgb { r, g, b } = hex_to_rgb(hex);
    format!("rgba({}, {}, {}, {})", r, g, b, alpha.clamp(0.0, 1.0))
}

/// Normalized color for templates: the parsed value, or the fallback.
pub fn safe_color(hex: Option<&str>) -> String {
    hex_to_rgb(hex).to_hex()
}

fn chip_rule(buf: &mut String, selector: &str, color: Option<&str>, theme: &Theme) {
    let _ = writeln!(buf, "{} {{", selector);
    let _ = writeln!(buf, "  --chip-color: {};", safe_color(color));
    let _ = writeln!(buf, "  --chip-bg: {};", rgba(color, theme.glass_alpha * 2.0));
    let _ = writeln!(buf, "  --chip-text: {};", lighten(color, theme.shade_factor));
    let _ = writeln!(buf, "}}");
}

/// Stylesheet with the accent variables and one rule per category and technology.
pub fn css_variables(theme: &Theme, categories: &[Category], technologies: &[Technology]) -> String {
    let accent = theme.accent_color.as_deref();
    let mut buf = String::new();

    let _ = writeln!(buf, ":root {{");
    let _ = writeln!(buf, "  --accent: {};", safe_color(accent));
    let _ = writeln!(buf, "  --accent-rgb: {};", rgb_triplet(accent));
    let _ = writeln!(buf, "  --accent-light: {};", lighten(accent, theme.shade_factor));
    let _ = writeln!(buf, "  --accent-dark: {};", darken(accent, theme.shade_factor));
    let _ = writeln!(buf, "  --accent-contrast: {};", contrast_color(accent));
    let _ = writeln!(buf, "  --glass-bg: {};", rgba(accent, theme.glass_alpha));
    let _ = writeln!(buf, "  --glass-border: {};", rgba(accent, theme.glass_alpha * 2.0));
    let _ = writeln!(buf, "}}");

    for category in categories {
        chip_rule(&mut buf, &format!(".category-{}", category.slug), category.color.as_deref(), theme);
    }
    for tech in technologies {
        chip_rule(&mut buf, &format!(".tech-{}", tech.slug), tech.color.as_deref(), theme);
    }

    buf
}

#[cfg(test)]
mod tests {
    use crate::taxonomy::TechKind;

    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#ff8000"), Some(Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(Rgb::from_hex("FF8000"), Some(Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(Rgb::from_hex(" #fa0 "), Some(Rgb { r: 255, g: 170, b: 0 }));
        assert_eq!(Rgb::from_hex("#ff80"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#+f8000"), None);
        assert_eq!(Rgb::from_hex(""), None);
        assert_eq!(Rgb::from_hex("#é0000"), None);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(hex_to_rgb(None), FALLBACK_COLOR);
        assert_eq!(hex_to_rgb(Some("purple")), FALLBACK_COLOR);
        assert_eq!(safe_color(Some("not a color")), "#e6e6fa");
        assert_eq!(rgb_triplet(None), "230, 230, 250");
        assert_eq!(rgb_triplet(Some("#102030")), "16, 32, 48");
    }

    #[test]
    fn test_shading() {
        assert_eq!(lighten(Some("#000000"), 0.5), "#808080");
        assert_eq!(lighten(Some("#ff0000"), 1.0), "#ffffff");
        assert_eq!(darken(Some("#ffffff"), 0.5), "#808080");
        assert_eq!(darken(Some("#804020"), 0.0), "#804020");
        assert_eq!(darken(Some("#804020"), 7.0), "#000000");
        assert_eq!(lighten(Some("#804020"), -1.0), "#804020");
    }

    #[test]
    fn test_contrast() {
        assert!(is_light(Some("#ffffff")));
        assert!(!is_light(Some("#000000")));
        assert!(is_light(None));
        assert_eq!(contrast_color(Some("#fde047")), DARK_TEXT);
        assert_eq!(contrast_color(Some("#1e3a8a")), LIGHT_TEXT);
        assert_eq!(rgba(Some("#000"), 0.25), "rgba(0, 0, 0, 0.25)");
        assert_eq!(rgba(None, 2.0), "rgba(230, 230, 250, 1)");
    }

    #[test]
    fn test_css_variables() {
        let theme = Theme { accent_color: Some("#8b5cf6".to_string()), glass_alpha: 0.1, shade_factor: 0.2 };
        let categories = vec![Category {
            name: "Web".to_string(),
            slug: "web".to_string(),
            color: Some("bogus".to_string()),
            description: String::new(),
        }];
        let technologies = vec![Technology {
            name: "Rust".to_string(),
            slug: "rust".to_string(),
            kind: TechKind::Language,
            color: Some("#dea584".to_string()),
        }];

        let css = css_variables(&theme, &categories, &technologies);
        assert!(css.starts_with(":root {\n  --accent: #8b5cf6;\n  --accent-rgb: 139, 92, 246;\n"));
        assert!(css.contains("  --glass-bg: rgba(139, 92, 246, 0.1);\n"));
        assert!(css.contains("  --accent-contrast: #ffffff;\n"));
        assert!(css.contains(".category-web {\n  --chip-color: #e6e6fa;\n"));
        assert!(css.contains(".tech-rust {\n  --chip-color: #dea584;\n"));
    }
}
