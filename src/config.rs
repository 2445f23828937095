//! Runtime configuration, read from `WOOD_*` environment variables.

use std::{env, path::PathBuf, str::FromStr};

use crate::lessons::Lesson;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Config {
    pub lesson: Lesson,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub shader_dir: PathBuf,
    pub asset_dir: PathBuf,
    /// Keep going with a broken program instead of failing on shader errors.
    pub lenient_shaders: bool,
    pub vsync: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

fn flag(value: Option<String>) -> Option<bool> {
    value.map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|value| value.trim().parse().ok())
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config from an arbitrary variable source. Missing or unparsable values
    /// fall back to their defaults; zero sizes are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        Self {
            lesson: parse(lookup("WOOD_LESSON")).unwrap_or_default(),
            title: lookup("WOOD_TITLE").unwrap_or_else(|| "WoodInGraphics".to_owned()),
            width: parse(lookup("WOOD_WIDTH"))
                .filter(|width| *width > 0)
                .unwrap_or(DEFAULT_WIDTH),
            height: parse(lookup("WOOD_HEIGHT"))
                .filter(|height| *height > 0)
                .unwrap_or(DEFAULT_HEIGHT),
            shader_dir: lookup("WOOD_SHADER_DIR")
                .map_or_else(|| manifest_dir.join("shaders"), PathBuf::from),
            asset_dir: lookup("WOOD_ASSET_DIR")
                .map_or_else(|| manifest_dir.join("assets"), PathBuf::from),
            lenient_shaders: flag(lookup("WOOD_LENIENT_SHADERS")).unwrap_or(false),
            vsync: flag(lookup("WOOD_VSYNC")).unwrap_or(true),
            log_dir: lookup("WOOD_LOG_DIR").map(PathBuf::from),
        }
    }

    /// The first command-line argument, when present, picks the lesson.
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(lesson) = args.next().and_then(|arg| arg.parse().ok()) {
            self.lesson = lesson;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_tutorial_window() {
        let config = config_from(&[]);
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.lesson, Lesson::TexturedQuad);
        assert!(!config.lenient_shaders);
        assert!(config.vsync);
        assert!(config.shader_dir.ends_with("shaders"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from(&[
            ("WOOD_LESSON", "quad"),
            ("WOOD_WIDTH", "1280"),
            ("WOOD_HEIGHT", "0"),
            ("WOOD_LENIENT_SHADERS", "true"),
            ("WOOD_VSYNC", "0"),
            ("WOOD_SHADER_DIR", "/tmp/shaders"),
        ]);
        assert_eq!(config.lesson, Lesson::IndexedQuad);
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert!(config.lenient_shaders);
        assert!(!config.vsync);
        assert_eq!(config.shader_dir, PathBuf::from("/tmp/shaders"));
    }

    #[test]
    fn first_argument_selects_lesson() {
        let config = config_from(&[("WOOD_LESSON", "quad")])
            .with_args(["2".to_owned()].into_iter());
        assert_eq!(config.lesson, Lesson::Triangle);

        let unchanged = config_from(&[]).with_args(["bogus".to_owned()].into_iter());
        assert_eq!(unchanged.lesson, Lesson::TexturedQuad);
    }
}
