use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Theme {
    pub panel_bg: Color,
    pub chat_bg: Color,
    pub context_bg: Color,
    pub input_bg: Color,
    pub status_bg: Color,
    pub pseudo_bg: Color,
    pub text_fg: Color,
    pub muted_fg: Color,
    pub accent_fg: Color,
    pub error_fg: Color,
    pub student_fg: Color,
    pub mentor_fg: Color,
    pub system_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            panel_bg: Color::Rgb(40, 40, 40),
            chat_bg: Color::Rgb(50, 50, 50),
            context_bg: Color::Rgb(44, 44, 44),
            input_bg: Color::Rgb(62, 62, 62),
            status_bg: Color::Rgb(34, 34, 34),
            pseudo_bg: Color::Rgb(30, 45, 38),
            text_fg: Color::Rgb(225, 225, 225),
            muted_fg: Color::Rgb(180, 180, 180),
            accent_fg: Color::Rgb(120, 190, 255),
            error_fg: Color::Rgb(245, 130, 120),
            student_fg: Color::Rgb(150, 210, 150),
            mentor_fg: Color::Rgb(120, 190, 255),
            system_fg: Color::Rgb(210, 180, 110),
        }
    }
}

impl Theme {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Self::default();
        }
        match fs::read_to_string(path_ref) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(theme) => theme,
                Err(err) => {
                    eprintln!(
                        "Failed to parse theme file '{}': {err}. Using defaults.",
                        path_ref.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!(
                    "Failed to read theme file '{}': {err}. Using defaults.",
                    path_ref.display()
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let cfg: ThemeToml = toml::from_str(s)?;
        Ok(Self {
            panel_bg: cfg.colors.panel_bg.to_color(),
            chat_bg: cfg.colors.chat_bg.to_color(),
            context_bg: cfg.colors.context_bg.to_color(),
            input_bg: cfg.colors.input_bg.to_color(),
            status_bg: cfg.colors.status_bg.to_color(),
            pseudo_bg: cfg.colors.pseudo_bg.to_color(),
            text_fg: cfg.colors.text_fg.to_color(),
            muted_fg: cfg.colors.muted_fg.to_color(),
            accent_fg: cfg.colors.accent_fg.to_color(),
            error_fg: cfg.colors.error_fg.to_color(),
            student_fg: cfg.colors.student_fg.to_color(),
            mentor_fg: cfg.colors.mentor_fg.to_color(),
            system_fg: cfg.colors.system_fg.to_color(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeToml {
    colors: ThemeColorsToml,
}

#[derive(Debug, Deserialize)]
struct ThemeColorsToml {
    panel_bg: RgbToml,
    chat_bg: RgbToml,
    context_bg: RgbToml,
    input_bg: RgbToml,
    status_bg: RgbToml,
    pseudo_bg: RgbToml,
    text_fg: RgbToml,
    muted_fg: RgbToml,
    accent_fg: RgbToml,
    error_fg: RgbToml,
    student_fg: RgbToml,
    mentor_fg: RgbToml,
    system_fg: RgbToml,
}

#[derive(Debug, Deserialize)]
struct RgbToml {
    r: u8,
    g: u8,
    b: u8,
}

impl RgbToml {
    fn to_color(&self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}
