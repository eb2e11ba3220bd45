use crate::config::Theme;
use ratatui::style::Color;

pub fn parse_color(s: &str) -> Color {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "reset" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" => Color::Gray,
        "darkgray" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => {
            if s.contains(',') {
                let parts: Vec<&str> = s.split(',').collect();
                if parts.len() == 3 {
                    if let (Ok(r), Ok(g), Ok(b)) = (
                        parts[0].trim().parse(),
                        parts[1].trim().parse(),
                        parts[2].trim().parse(),
                    ) {
                        return Color::Rgb(r, g, b);
                    }
                }
            }
            Color::Reset
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeTokens {
    pub border_default: Color,
    pub border_editing: Color,
    pub accent: Color,
    pub muted: Color,
    pub highlight: Color,
    pub timestamp: Color,
}

impl ThemeTokens {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            border_default: parse_color(&theme.border_default),
            border_editing: parse_color(&theme.border_editing),
            accent: parse_color(&theme.accent),
            muted: parse_color(&theme.muted),
            highlight: parse_color(&theme.highlight),
            timestamp: parse_color(&theme.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_colors_case_insensitive() {
        assert_eq!(parse_color("Blue"), Color::Blue);
        assert_eq!(parse_color("lightcyan"), Color::LightCyan);
        assert_eq!(parse_color("DaRkGrAy"), Color::DarkGray);
    }

    #[test]
    fn parses_rgb_values() {
        assert_eq!(parse_color("1,2,3"), Color::Rgb(1, 2, 3));
        assert_eq!(parse_color(" 10 , 20 , 30 "), Color::Rgb(10, 20, 30));
    }

    #[test]
    fn invalid_values_fall_back_to_reset() {
        assert_eq!(parse_color("not-a-color"), Color::Reset);
        assert_eq!(parse_color("1,2"), Color::Reset);
        assert_eq!(parse_color("1,2,3,4"), Color::Reset);
    }

    #[test]
    fn tokens_come_from_theme_strings() {
        let theme = Theme {
            border_default: "Red".to_string(),
            border_editing: "Green".to_string(),
            accent: "Cyan".to_string(),
            muted: "DarkGray".to_string(),
            highlight: "1,2,3".to_string(),
            timestamp: "Blue".to_string(),
        };
        let tokens = ThemeTokens::from_theme(&theme);
        assert_eq!(tokens.border_default, Color::Red);
        assert_eq!(tokens.highlight, Color::Rgb(1, 2, 3));
    }
}
