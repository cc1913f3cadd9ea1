mod canvas;
mod connector;
mod legend;
mod tree;
pub(crate) mod types;

pub use canvas::partition_canvas;
pub use connector::to_bounding_box_line;
pub use legend::layout_legend;
pub use tree::{grid_gap, layout_tree};
pub use types::*;

use crate::config::{CanvasConfig, LayoutConfig};
use crate::error::{Result, SlideError};
use crate::ir::SlideContent;

/// Slack allowed when comparing an edge against its container.
const FIT_TOLERANCE: f32 = 1e-4;

/// Runs the partitioner, the tree engine and the legend placement. Pure and
/// deterministic: equal inputs give bit-identical coordinates.
pub fn compute_layout(
    content: &SlideContent,
    canvas: &CanvasConfig,
    config: &LayoutConfig,
) -> Result<SlideLayout> {
    let regions = partition_canvas(canvas, config)?;
    let tree = layout_tree(&content.tree, &regions.right_column, &config.tree)?;
    let tree_bottom = tree
        .levels
        .last()
        .and_then(|level| level.first())
        .map(|b| b.y + b.height)
        .unwrap_or_else(|| tree.bottom());
    let legend = layout_legend(
        &content.legend,
        &regions.right_column,
        tree_bottom,
        &config.legend,
    )?;
    let legend_bottom = legend.y + config.legend.swatch_size;
    if legend_bottom > regions.right_column.bottom() + FIT_TOLERANCE {
        return Err(SlideError::LayoutOverflow(format!(
            "legend ends at {legend_bottom:.3} below a column ending at {:.3}",
            regions.right_column.bottom()
        )));
    }

    Ok(SlideLayout {
        canvas: *canvas,
        regions,
        tree,
        legend,
    })
}
