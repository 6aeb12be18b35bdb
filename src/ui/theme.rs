// Theme palettes.
// Resolved once from preferences; drawing code takes every color from here.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub border: Color,
    pub dim: Color,
    pub text: Color,
    pub pinned: Color,
    pub success: Color,
    pub failure: Color,
    pub warning: Color,
    pub neutral: Color,
    pub highlight_bg: Color,
}

impl Theme {
    /// Look a theme up by preference name. Unknown names fall back to dark.
    pub fn named(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            border: Color::DarkGray,
            dim: Color::DarkGray,
            text: Color::White,
            pinned: Color::Yellow,
            success: Color::Green,
            failure: Color::Red,
            warning: Color::Yellow,
            neutral: Color::Gray,
            highlight_bg: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            accent: Color::Blue,
            border: Color::Gray,
            dim: Color::Gray,
            text: Color::Black,
            pinned: Color::Magenta,
            success: Color::Green,
            failure: Color::Red,
            warning: Color::Yellow,
            neutral: Color::DarkGray,
            highlight_bg: Color::Gray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_theme_falls_back_to_dark() {
        let theme = Theme::named("solarized-disco");
        assert_eq!(theme.accent, Theme::dark().accent);
    }
}
