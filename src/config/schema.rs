//! Configuration schema types for `questcard.toml`
//!
//! Defines the structure and validation rules for render settings, card
//! layout coordinates and asset paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration structure for `questcard.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestcardConfig {
    /// Icon scaling and font sizes
    #[serde(default)]
    pub render: RenderConfig,
    /// Group canvas and template coordinates
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Where assets and the catalog live
    #[serde(default)]
    pub paths: PathsConfig,
    /// Category icons offered when authoring quests
    #[serde(default = "default_frequency_options")]
    pub frequency_options: Vec<String>,
}

impl Default for QuestcardConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            layout: LayoutConfig::default(),
            paths: PathsConfig::default(),
            frequency_options: default_frequency_options(),
        }
    }
}

/// Icon rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// One sprite pixel becomes `upscale` x `upscale` icon pixels
    #[serde(default = "default_upscale")]
    pub upscale: u32,
    /// Icon size when a group has at most one icon
    #[serde(default = "default_large_size")]
    pub large_size: u32,
    /// Icon size when a group has two or more icons
    #[serde(default = "default_small_size")]
    pub small_size: u32,
    /// Size of contained-item badges on blueprints
    #[serde(default = "default_blueprint_size")]
    pub blueprint_size: u32,
    #[serde(default = "default_quantity_font_size")]
    pub quantity_font_size: f32,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            upscale: default_upscale(),
            large_size: default_large_size(),
            small_size: default_small_size(),
            blueprint_size: default_blueprint_size(),
            quantity_font_size: default_quantity_font_size(),
            title_font_size: default_title_font_size(),
        }
    }
}

fn default_upscale() -> u32 {
    5
}

fn default_large_size() -> u32 {
    64
}

fn default_small_size() -> u32 {
    40
}

fn default_blueprint_size() -> u32 {
    24
}

fn default_quantity_font_size() -> f32 {
    16.0
}

fn default_title_font_size() -> f32 {
    26.0
}

/// Card layout. Coordinates are pixels on the template image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub group_width: u32,
    pub group_height: u32,
    /// Icons per row inside a group
    pub row_length: u32,
    /// Largest group accepted
    pub max_group_images: u32,
    pub title_x: i64,
    pub title_y: i64,
    /// The grey title shadow is drawn this far below the title
    pub title_shadow_offset: i64,
    /// Gap between the end of the title and the category icon
    pub icon_gap: i64,
    pub icon_y: i64,
    /// Chooseable badge distance right of the category icon
    pub chooseable_dx: i64,
    pub chooseable_y: i64,
    pub input_x: i64,
    pub input_y: i64,
    pub output_x: i64,
    pub output_y: i64,
    /// Rows shared between consecutive stacked cards
    pub stack_overlap: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            group_width: 160,
            group_height: 80,
            row_length: 4,
            max_group_images: 8,
            title_x: 10,
            title_y: 11,
            title_shadow_offset: 2,
            icon_gap: 16,
            icon_y: 7,
            chooseable_dx: 37,
            chooseable_y: 5,
            input_x: 15,
            input_y: 54,
            output_x: 225,
            output_y: 54,
            stack_overlap: 10,
        }
    }
}

/// Asset and data locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of `<sheet>.png` sprite sheets
    pub sheets: PathBuf,
    /// Directory of `<category>.png` icons
    pub icons: PathBuf,
    /// Directory of object XML documents
    pub xml: PathBuf,
    /// Master catalog JSON
    pub catalog: PathBuf,
    pub template: PathBuf,
    pub title_font: PathBuf,
    /// Badge font; the built-in pixel digits when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_font: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sheets: PathBuf::from("assets/sheets"),
            icons: PathBuf::from("assets/icons"),
            xml: PathBuf::from("assets/xml"),
            catalog: PathBuf::from("assets/json/master.json"),
            template: PathBuf::from("assets/template.png"),
            title_font: PathBuf::from("assets/title.ttf"),
            quantity_font: None,
        }
    }
}

fn default_frequency_options() -> Vec<String> {
    ["Repeatable", "Once Per Account", "Once Per Day", "Once Per Week"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// A single configuration problem
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl QuestcardConfig {
    /// Check values serde cannot constrain. Empty when valid.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut issue = |field: &str, message: String| {
            issues.push(ConfigIssue { field: field.to_string(), message });
        };

        let render = &self.render;
        let layout = &self.layout;

        if render.upscale == 0 {
            issue("render.upscale", "must be at least 1".to_string());
        }
        for (field, size) in [
            ("render.large_size", render.large_size),
            ("render.small_size", render.small_size),
            ("render.blueprint_size", render.blueprint_size),
        ] {
            if size == 0 {
                issue(field, "must be at least 1".to_string());
            }
        }
        if render.quantity_font_size <= 0.0 {
            issue("render.quantity_font_size", "must be positive".to_string());
        }
        if render.title_font_size <= 0.0 {
            issue("render.title_font_size", "must be positive".to_string());
        }
        if layout.group_width == 0 || layout.group_height == 0 {
            issue("layout.group_width/group_height", "group canvas must not be empty".to_string());
        }
        let icon_sizes = [
            ("render.large_size", render.large_size),
            ("render.small_size", render.small_size),
        ];
        for (field, size) in icon_sizes {
            if size > layout.group_width || size > layout.group_height {
                issue(
                    field,
                    format!(
                        "{} does not fit the {}x{} group canvas",
                        size, layout.group_width, layout.group_height
                    ),
                );
            }
        }
        if layout.row_length == 0 {
            issue("layout.row_length", "must be at least 1".to_string());
        }
        if layout.max_group_images == 0 {
            issue("layout.max_group_images", "must be at least 1".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(QuestcardConfig::default().validate().is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: QuestcardConfig = toml::from_str(
            r#"
            [render]
            upscale = 4

            [layout]
            stack_overlap = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.render.upscale, 4);
        assert_eq!(config.render.small_size, 40);
        assert_eq!(config.layout.stack_overlap, 12);
        assert_eq!(config.layout.group_width, 160);
        assert_eq!(config.frequency_options.len(), 4);
        assert_eq!(config.paths.quantity_font, None);
    }

    #[test]
    fn test_validate_zero_upscale() {
        let mut config = QuestcardConfig::default();
        config.render.upscale = 0;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "render.upscale");
    }

    #[test]
    fn test_validate_oversized_icons() {
        let mut config = QuestcardConfig::default();
        config.render.large_size = 100;
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| i.to_string().contains("100 does not fit the 160x80 group canvas")));
    }
}
