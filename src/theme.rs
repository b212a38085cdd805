//! Theme loading: sand palette and UI colours, btop-style `theme[key]="value"` files, hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Desert shades handed out round-robin to new grains.
pub const DESERT_PALETTE: [&str; 37] = [
    "#dad19e", "#ddd69f", "#e9deb5", "#f6eebb", "#b1a972", "#c1bb68", "#bcb47b", "#f5e4ba",
    "#b4b47c", "#b0a971", "#b4ac7c", "#bbb47c", "#bcb486", "#c4c48b", "#c6bb89", "#ccc484",
    "#ccc692", "#d4c495", "#d4cc94", "#d4cd9c", "#dccc9f", "#dcd49c", "#dcd4a4", "#dcd5b4",
    "#dcdca3", "#e0d49c", "#e1d8ac", "#e4daa3", "#e4e4ac", "#e9dcb4", "#ecdeac", "#eee4b7",
    "#efeccc", "#f0e0bc", "#f1ecb4", "#f4e4ac", "#f9f0c0",
];

/// Saturated colours that stay distinct on a dark background.
const HIGH_CONTRAST_PALETTE: [&str; 8] = [
    "#FF5555", "#FFB86C", "#F1FA8C", "#50FA7B", "#8BE9FD", "#6272FF", "#BD93F9", "#FF79C6",
];

/// Sand palette plus the few UI colours the status line and canvas need.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Grain colours, cycled in order. Never empty.
    pub sand: Vec<Color>,
    /// Canvas background.
    pub bg: Color,
    /// Status text.
    pub main_fg: Color,
    /// Highlights (perf readout, PAUSED).
    pub title: Color,
    /// Key help.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::desert()
    }
}

fn palette_colors(hex: &[&str]) -> Vec<Color> {
    hex.iter().filter_map(|h| parse_hex(h).ok()).collect()
}

impl Theme {
    /// Desert sand on a near-black night sky.
    pub fn desert() -> Self {
        Self {
            sand: palette_colors(&DESERT_PALETTE),
            bg: Color::Rgb(0x16, 0x18, 0x1d),
            main_fg: Color::Rgb(0xab, 0xb2, 0xbf),
            title: Color::Rgb(0xe5, 0xc0, 0x7b),
            inactive_fg: Color::Rgb(0x5c, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to defaults if path is None or the file does not exist.
    /// `palette` picks the sand colours; a `sand` key in the file overrides it.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::default_for_palette(palette);
        theme.apply_map(&map)?;
        Ok(theme)
    }

    /// Default theme for a palette when no file is loaded.
    pub fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::desert();
        t.apply_palette(palette);
        t
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Desert => {}
            crate::Palette::HighContrast => {
                self.sand = palette_colors(&HIGH_CONTRAST_PALETTE);
            }
        }
    }

    /// Override colours present in `map`. Unknown keys are ignored; a malformed value is an error.
    fn apply_map(&mut self, map: &HashMap<String, String>) -> Result<(), ThemeError> {
        if let Some(v) = map.get("main_bg") {
            self.bg = parse_hex(v)?;
        }
        if let Some(v) = map.get("main_fg") {
            self.main_fg = parse_hex(v)?;
        }
        if let Some(v) = map.get("title") {
            self.title = parse_hex(v)?;
        }
        if let Some(v) = map.get("inactive_fg") {
            self.inactive_fg = parse_hex(v)?;
        }
        if let Some(v) = map.get("sand") {
            let sand = v
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(parse_hex)
                .collect::<Result<Vec<_>, _>>()?;
            if !sand.is_empty() {
                self.sand = sand;
            }
        }
        Ok(())
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'').trim();
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Palette;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#dad19e").unwrap();
        assert!(matches!(c, Color::Rgb(0xda, 0xd1, 0x9e)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#zzzzzz").is_err());
        assert!(parse_hex("#ééé").is_err());
        assert!(parse_hex("aéaaa").is_err());
    }

    #[test]
    fn test_desert_palette_has_37_colours() {
        let theme = Theme::default();
        assert_eq!(theme.sand.len(), 37);
        assert_eq!(theme.sand[0], parse_hex(DESERT_PALETTE[0]).unwrap());
        assert_ne!(theme.sand[0], theme.sand[1]);
    }

    #[test]
    fn test_high_contrast_palette() {
        let theme = Theme::default_for_palette(Palette::HighContrast);
        assert_eq!(theme.sand.len(), HIGH_CONTRAST_PALETTE.len());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(
            r##"
# comment
theme[main_bg]="#31353F"
theme[sand]='#fff, #000 #123456'
not a theme line
"##,
        );
        assert_eq!(map.get("main_bg"), Some(&"#31353F".to_string()));
        assert_eq!(map.get("sand"), Some(&"#fff, #000 #123456".to_string()));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_apply_map_overrides_sand_and_bg() {
        let mut theme = Theme::default();
        let map = parse_theme_file("theme[main_bg]=\"#000\"\ntheme[sand]=\"#fff,#f00\"");
        theme.apply_map(&map).unwrap();
        assert_eq!(theme.bg, Color::Rgb(0, 0, 0));
        assert_eq!(theme.sand, vec![Color::Rgb(255, 255, 255), Color::Rgb(255, 0, 0)]);
    }

    #[test]
    fn test_apply_map_rejects_bad_colour() {
        let mut theme = Theme::default();
        let map = parse_theme_file("theme[title]=\"#nothex\"");
        assert!(matches!(
            theme.apply_map(&map),
            Err(ThemeError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let theme = Theme::load(Some(Path::new("/nonexistent/sandfall.theme")), Palette::Desert)
            .unwrap();
        assert_eq!(theme.sand.len(), 37);
    }
}
