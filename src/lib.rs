#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use error::{Result, SlideError};
pub use ir::SlideContent;

use emit::{Scene, emit_scene};
use layout::{SlideLayout, compute_layout};
use render::{PptxRenderer, SvgRenderer, render_scene};
use tracing::info;

/// Runs layout and emission without rendering.
pub fn build_scene(config: &Config, content: &SlideContent) -> Result<(SlideLayout, Scene)> {
    let layout = compute_layout(content, &config.canvas, &config.layout)?;
    let scene = emit_scene(&layout, content, &config.theme, &config.layout);
    Ok((layout, scene))
}

/// Builds the Dependencies Dilemma slide with the default configuration and
/// returns the `.pptx` bytes.
pub fn generate() -> Result<Vec<u8>> {
    generate_with(&Config::default(), &SlideContent::default())
}

pub fn generate_with(config: &Config, content: &SlideContent) -> Result<Vec<u8>> {
    let (_, scene) = build_scene(config, content)?;
    let mut renderer = PptxRenderer::new()
        .with_title(content.title.clone())
        .with_author(config.render.author.clone())
        .with_font_family(config.theme.font_family.clone());
    let bytes = render_scene(&scene, &mut renderer)?;
    info!(
        primitives = scene.primitives.len(),
        bytes = bytes.len(),
        "presentation generated"
    );
    Ok(bytes)
}

/// Same slide as an SVG document, for previews.
pub fn render_svg_with(config: &Config, content: &SlideContent) -> Result<String> {
    let (_, scene) = build_scene(config, content)?;
    let mut renderer = SvgRenderer::new(config.render.px_per_inch);
    let bytes = render_scene(&scene, &mut renderer)?;
    String::from_utf8(bytes).map_err(|e| SlideError::RenderFailure(e.to_string()))
}
