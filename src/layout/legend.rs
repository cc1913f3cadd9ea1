use crate::config::LegendConfig;
use crate::error::{Result, SlideError};
use crate::ir::LegendEntry;

use super::{LegendItemLayout, LegendLayout, Region};

/// Lays the legend out as one row centered under `column`, starting
/// `top_offset` below `tree_bottom`.
pub fn layout_legend(
    entries: &[LegendEntry],
    column: &Region,
    tree_bottom: f32,
    config: &LegendConfig,
) -> Result<LegendLayout> {
    let item_width = config.swatch_size + config.label_width;
    let total_width = entries.len() as f32 * item_width;
    // The last label overhangs its cell by one swatch width.
    let footprint = total_width + config.swatch_size;
    if footprint.is_nan() || footprint > column.w {
        return Err(SlideError::LayoutOverflow(format!(
            "legend of {} entries needs {footprint:.3} but the column is {:.3} wide",
            entries.len(),
            column.w
        )));
    }

    let x = column.x + (column.w - total_width) / 2.0;
    let y = tree_bottom + config.top_offset;
    let size = config.swatch_size;

    // The swatch sits one swatch width into its cell and the label follows it
    // directly, so a label overhangs its cell by that same width.
    let items = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let cell_x = x + idx as f32 * item_width;
            LegendItemLayout {
                label: entry.label.clone(),
                color: entry.color.clone(),
                x: cell_x,
                swatch: Region::new(cell_x + size, y, size, size),
                label_region: Region::new(cell_x + 2.0 * size, y, config.label_width, size),
            }
        })
        .collect();

    Ok(LegendLayout {
        x,
        y,
        total_width,
        items,
    })
}
