use enablement_slide::theme::Theme;
use enablement_slide::{Config, SlideContent, generate_with, render_svg_with};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlideOptions {
    theme: Option<String>,
    font_family: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
    px_per_inch: Option<f32>,
}

fn parse_options(options_json: Option<String>) -> Result<SlideOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(SlideOptions::default()),
    }
}

fn build_config(options: SlideOptions) -> Result<Config, String> {
    let mut config = Config::default();
    if let Some(name) = options.theme.as_deref() {
        config.theme = Theme::by_name(name).ok_or_else(|| format!("unknown theme {name:?}"))?;
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(width) = options.width {
        config.canvas.width = width;
    }
    if let Some(height) = options.height {
        config.canvas.height = height;
    }
    if let Some(margin) = options.margin {
        config.canvas.margin = margin;
    }
    if let Some(px_per_inch) = options.px_per_inch {
        config.render.px_per_inch = px_per_inch;
    }
    Ok(config)
}

fn config_from_json(options_json: Option<String>) -> Result<Config, String> {
    build_config(parse_options(options_json)?)
}

#[wasm_bindgen]
pub fn generate_slide_pptx(options_json: Option<String>) -> Result<Vec<u8>, JsValue> {
    let config = config_from_json(options_json).map_err(|error| JsValue::from_str(&error))?;
    generate_with(&config, &SlideContent::default())
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_slide_svg(options_json: Option<String>) -> Result<String, JsValue> {
    let config = config_from_json(options_json).map_err(|error| JsValue::from_str(&error))?;
    render_svg_with(&config, &SlideContent::default())
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
