use crate::error::SlideError;
use crate::theme::Theme;
use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_FILE_NAME: &str = "Dependencies_Dilemma_Slide.pptx";

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#?([0-9A-Fa-f]{6})$").unwrap());

/// Slide size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 13.33,
            height: 7.5,
            margin: 0.4,
        }
    }
}

/// Geometry of the diagram card and the box tree inside the right column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeLayoutConfig {
    /// Card top, measured from the right column top.
    pub card_top_offset: f32,
    /// Card height is the column height minus this.
    pub card_height_trim: f32,
    /// Heading band top, measured from the right column top.
    pub heading_offset: f32,
    pub heading_height: f32,
    /// First level top, measured from the heading band top.
    pub level_offset: f32,
    /// Boxes per row on the grid; levels with exactly this many boxes use it.
    pub column_count: usize,
    pub box_width: f32,
    pub box_height: f32,
    pub vertical_spacing: f32,
    /// Scale applied to the horizontal offset of fan-in connector ends.
    pub connector_damping: f32,
    /// Connector stroke in points.
    pub connector_width: f32,
}

impl Default for TreeLayoutConfig {
    fn default() -> Self {
        Self {
            card_top_offset: 0.4,
            card_height_trim: 1.0,
            heading_offset: 0.5,
            heading_height: 0.4,
            level_offset: 0.5,
            column_count: 4,
            box_width: 1.2,
            box_height: 0.4,
            vertical_spacing: 0.35,
            connector_damping: 0.8,
            connector_width: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendConfig {
    pub swatch_size: f32,
    pub label_width: f32,
    /// Gap between the bottom of the last level and the legend row.
    pub top_offset: f32,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            swatch_size: 0.2,
            label_width: 1.2,
            top_offset: 0.3,
        }
    }
}

/// Outer drop shadow under cards. Blur and offset are in points, angle in
/// degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowConfig {
    pub blur: f32,
    pub offset: f32,
    pub angle: f32,
    pub opacity: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            blur: 10.0,
            offset: 0.05,
            angle: 180.0,
            opacity: 0.15,
        }
    }
}

/// Font sizes in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSizes {
    pub title: f32,
    pub heading: f32,
    pub body: f32,
    pub box_label: f32,
    pub legend: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 30.0,
            heading: 14.0,
            body: 12.0,
            box_label: 8.0,
            legend: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub title_height: f32,
    pub title_gap: f32,
    pub quote_height: f32,
    pub quote_gap: f32,
    pub quote_inset: f32,
    pub column_gap: f32,
    pub panel_gap: f32,
    /// Height shares of the three stacked left-column panels.
    pub panel_ratios: [f32; 3],
    pub panel_inset: f32,
    pub panel_heading_height: f32,
    pub corner_radius: f32,
    pub bullet_size: f32,
    pub bullet_gap: f32,
    pub bullet_offset_y: f32,
    pub bullet_line_height: f32,
    pub bullet_list_offset: f32,
    pub insight_border: f32,
    pub insight_inset: f32,
    pub tree: TreeLayoutConfig,
    pub legend: LegendConfig,
    pub shadow: ShadowConfig,
    pub fonts: FontSizes,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            title_height: 0.6,
            title_gap: 0.1,
            quote_height: 0.7,
            quote_gap: 0.2,
            quote_inset: 0.3,
            column_gap: 0.4,
            panel_gap: 0.2,
            panel_ratios: [0.4, 0.4, 0.2],
            panel_inset: 0.2,
            panel_heading_height: 0.3,
            corner_radius: 0.1,
            bullet_size: 0.15,
            bullet_gap: 0.15,
            bullet_offset_y: 0.1,
            bullet_line_height: 0.4,
            bullet_list_offset: 0.6,
            insight_border: 0.1,
            insight_inset: 0.3,
            tree: TreeLayoutConfig::default(),
            legend: LegendConfig::default(),
            shadow: ShadowConfig::default(),
            fonts: FontSizes::default(),
        }
    }
}

fn check_positive(name: &str, value: f32) -> crate::error::Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SlideError::InvalidCanvasConfig(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f32) -> crate::error::Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SlideError::InvalidCanvasConfig(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn check_fraction(name: &str, value: f32) -> crate::error::Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SlideError::InvalidCanvasConfig(format!(
            "{name} must lie in 0..=1, got {value}"
        )));
    }
    Ok(())
}

impl LayoutConfig {
    /// Rejects values the layout engine cannot place. Sizes must be positive,
    /// spacing must be non-negative and the panel ratios must sum to 1.
    pub fn validate(&self) -> crate::error::Result<()> {
        let tree = &self.tree;
        let fonts = &self.fonts;
        for (name, value) in [
            ("title_height", self.title_height),
            ("quote_height", self.quote_height),
            ("panel_heading_height", self.panel_heading_height),
            ("bullet_size", self.bullet_size),
            ("bullet_line_height", self.bullet_line_height),
            ("tree.heading_height", tree.heading_height),
            ("tree.box_width", tree.box_width),
            ("tree.box_height", tree.box_height),
            ("tree.connector_width", tree.connector_width),
            ("legend.swatch_size", self.legend.swatch_size),
            ("legend.label_width", self.legend.label_width),
            ("fonts.title", fonts.title),
            ("fonts.heading", fonts.heading),
            ("fonts.body", fonts.body),
            ("fonts.box_label", fonts.box_label),
            ("fonts.legend", fonts.legend),
        ] {
            check_positive(name, value)?;
        }
        for (name, value) in [
            ("title_gap", self.title_gap),
            ("quote_gap", self.quote_gap),
            ("quote_inset", self.quote_inset),
            ("column_gap", self.column_gap),
            ("panel_gap", self.panel_gap),
            ("panel_inset", self.panel_inset),
            ("corner_radius", self.corner_radius),
            ("bullet_gap", self.bullet_gap),
            ("bullet_offset_y", self.bullet_offset_y),
            ("bullet_list_offset", self.bullet_list_offset),
            ("insight_border", self.insight_border),
            ("insight_inset", self.insight_inset),
            ("tree.card_top_offset", tree.card_top_offset),
            ("tree.card_height_trim", tree.card_height_trim),
            ("tree.heading_offset", tree.heading_offset),
            ("tree.level_offset", tree.level_offset),
            ("tree.vertical_spacing", tree.vertical_spacing),
            ("legend.top_offset", self.legend.top_offset),
            ("shadow.blur", self.shadow.blur),
            ("shadow.offset", self.shadow.offset),
        ] {
            check_non_negative(name, value)?;
        }
        check_fraction("tree.connector_damping", tree.connector_damping)?;
        check_fraction("shadow.opacity", self.shadow.opacity)?;
        if !self.shadow.angle.is_finite() {
            return Err(SlideError::InvalidCanvasConfig(format!(
                "shadow.angle must be finite, got {}",
                self.shadow.angle
            )));
        }
        if tree.column_count == 0 {
            return Err(SlideError::InvalidCanvasConfig(
                "tree.column_count must be at least 1".to_string(),
            ));
        }

        for ratio in self.panel_ratios {
            check_positive("panel_ratios entry", ratio)?;
        }
        let sum: f32 = self.panel_ratios.iter().sum();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(SlideError::InvalidCanvasConfig(format!(
                "panel_ratios must sum to 1, got {sum}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Pixels per inch for the SVG preview.
    pub px_per_inch: f32,
    pub file_name: String,
    pub author: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            px_per_inch: 96.0,
            file_name: DEFAULT_FILE_NAME.to_string(),
            author: "enablement-slide".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub layout: LayoutConfig,
    pub theme: Theme,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<String>,
    heading_color: Option<String>,
    text_color: Option<String>,
    accent_color: Option<String>,
    card_fill: Option<String>,
    card_border: Option<String>,
    shadow_color: Option<String>,
    bullet_color: Option<String>,
    insight_border: Option<String>,
    insight_fill: Option<String>,
    box_text_color: Option<String>,
    card_shadow: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    column_gap: Option<f32>,
    panel_gap: Option<f32>,
    panel_ratios: Option<[f32; 3]>,
    corner_radius: Option<f32>,
    box_width: Option<f32>,
    box_height: Option<f32>,
    vertical_spacing: Option<f32>,
    connector_damping: Option<f32>,
    connector_width: Option<f32>,
    legend_swatch_size: Option<f32>,
    legend_label_width: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    canvas: Option<CanvasConfigFile>,
    layout: Option<LayoutConfigFile>,
    file_name: Option<String>,
    px_per_inch: Option<f32>,
}

/// Accepts `RRGGBB` or `#RRGGBB` and returns the bare upper-case hex.
pub fn normalize_color(value: &str) -> anyhow::Result<String> {
    let caps = HEX_COLOR_RE
        .captures(value.trim())
        .ok_or_else(|| anyhow!("invalid color {value:?}: expected six hex digits"))?;
    Ok(caps[1].to_ascii_uppercase())
}

fn set_color(slot: &mut String, value: Option<String>) -> anyhow::Result<()> {
    if let Some(v) = value {
        *slot = normalize_color(&v)?;
    }
    Ok(())
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme =
            Theme::by_name(theme_name).ok_or_else(|| anyhow!("unknown theme {theme_name:?}"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        set_color(&mut config.theme.background, vars.background)?;
        set_color(&mut config.theme.heading_color, vars.heading_color)?;
        set_color(&mut config.theme.text_color, vars.text_color)?;
        set_color(&mut config.theme.accent_color, vars.accent_color)?;
        set_color(&mut config.theme.card_fill, vars.card_fill)?;
        set_color(&mut config.theme.card_border, vars.card_border)?;
        set_color(&mut config.theme.shadow_color, vars.shadow_color)?;
        set_color(&mut config.theme.bullet_color, vars.bullet_color)?;
        set_color(&mut config.theme.insight_border, vars.insight_border)?;
        set_color(&mut config.theme.insight_fill, vars.insight_fill)?;
        set_color(&mut config.theme.box_text_color, vars.box_text_color)?;
        if let Some(v) = vars.card_shadow {
            config.theme.card_shadow = v;
        }
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.width {
            config.canvas.width = v;
        }
        if let Some(v) = canvas.height {
            config.canvas.height = v;
        }
        if let Some(v) = canvas.margin {
            config.canvas.margin = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.column_gap {
            config.layout.column_gap = v;
        }
        if let Some(v) = layout.panel_gap {
            config.layout.panel_gap = v;
        }
        if let Some(v) = layout.panel_ratios {
            config.layout.panel_ratios = v;
        }
        if let Some(v) = layout.corner_radius {
            config.layout.corner_radius = v;
        }
        if let Some(v) = layout.box_width {
            config.layout.tree.box_width = v;
        }
        if let Some(v) = layout.box_height {
            config.layout.tree.box_height = v;
        }
        if let Some(v) = layout.vertical_spacing {
            config.layout.tree.vertical_spacing = v;
        }
        if let Some(v) = layout.connector_damping {
            config.layout.tree.connector_damping = v;
        }
        if let Some(v) = layout.connector_width {
            config.layout.tree.connector_width = v;
        }
        if let Some(v) = layout.legend_swatch_size {
            config.layout.legend.swatch_size = v;
        }
        if let Some(v) = layout.legend_label_width {
            config.layout.legend.label_width = v;
        }
    }

    if let Some(v) = parsed.file_name {
        config.render.file_name = v;
    }
    if let Some(v) = parsed.px_per_inch {
        check_positive("pxPerInch", v)?;
        config.render.px_per_inch = v;
    }

    config.layout.validate()?;
    Ok(config)
}
