mod pptx;
mod svg;

pub use pptx::PptxRenderer;
pub use svg::SvgRenderer;

use crate::emit::{Primitive, Scene, ShapeGeometry, ShapeKind, ShapeStyle, TextPrimitive, TextRun};
use crate::error::Result;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Capability surface the slide pipeline needs from a document backend.
pub trait SlideRenderer {
    /// Page size in inches. Called once, before anything else.
    fn define_custom_layout(&mut self, width: f32, height: f32) -> Result<()>;
    fn add_slide_background(&mut self, color: &str) -> Result<()>;
    fn add_shape(&mut self, kind: ShapeKind, geometry: &ShapeGeometry, style: &ShapeStyle)
    -> Result<()>;
    fn add_text(&mut self, text: &TextPrimitive, font_family: &str) -> Result<()>;
    /// Produces the finished document.
    fn serialize(&mut self) -> Result<Vec<u8>>;
}

/// Feeds a scene to `renderer` in paint order and returns the document bytes.
pub fn render_scene<R: SlideRenderer + ?Sized>(scene: &Scene, renderer: &mut R) -> Result<Vec<u8>> {
    renderer.define_custom_layout(scene.width, scene.height)?;
    renderer.add_slide_background(&scene.background)?;
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Shape(shape) => {
                renderer.add_shape(shape.kind, &shape.geometry, &shape.style)?
            }
            Primitive::Text(text) => renderer.add_text(text, &scene.font_family)?,
        }
    }
    let bytes = renderer.serialize()?;
    debug!(bytes = bytes.len(), "scene rendered");
    Ok(bytes)
}

/// Splits runs into paragraphs at every `\n`. Empty pieces are dropped, but a
/// paragraph with no runs is kept so blank lines survive.
pub(crate) fn paragraphs(runs: &[TextRun]) -> Vec<Vec<(&TextRun, &str)>> {
    let mut out: Vec<Vec<(&TextRun, &str)>> = vec![Vec::new()];
    for run in runs {
        for (idx, piece) in run.text.split('\n').enumerate() {
            if idx > 0 {
                out.push(Vec::new());
            }
            if !piece.is_empty() {
                if let Some(current) = out.last_mut() {
                    current.push((run, piece));
                }
            }
        }
    }
    if out.len() > 1 && out.last().is_some_and(Vec::is_empty) {
        out.pop();
    }
    out
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn write_output(bytes: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(bytes)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, font_family: &str) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = font_family.to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}
