use tracing::debug;

use crate::config::TreeLayoutConfig;
use crate::error::{Result, SlideError};
use crate::ir::{LevelSpec, TreeSpec};

use super::connector::route_transition;
use super::{BoxLayout, FIT_TOLERANCE, NodeRef, Region, TreeLayout};

/// Gap that spreads `count` boxes of `box_width` over `available` with equal
/// outer and inner gaps.
pub fn grid_gap(available: f32, count: usize, box_width: f32) -> f32 {
    (available - count as f32 * box_width) / (count as f32 + 1.0)
}

fn box_width(level: &LevelSpec, config: &TreeLayoutConfig, gap: f32) -> f32 {
    let units = level.width_units.max(1) as f32;
    units * config.box_width + (units - 1.0) * gap
}

fn span_center(boxes: &[BoxLayout]) -> Option<f32> {
    let left = boxes.iter().map(|b| b.x).reduce(f32::min)?;
    let right = boxes.iter().map(|b| b.x + b.width).reduce(f32::max)?;
    Some((left + right) / 2.0)
}

fn place_level(
    level_idx: usize,
    level: &LevelSpec,
    y: f32,
    xs: impl Iterator<Item = f32>,
    width: f32,
    height: f32,
) -> Vec<BoxLayout> {
    level
        .labels
        .iter()
        .zip(xs)
        .enumerate()
        .map(|(index, (label, x))| BoxLayout {
            id: NodeRef {
                level: level_idx,
                index,
            },
            x,
            y,
            width,
            height,
            color: level.color.clone(),
            label: label.clone(),
        })
        .collect()
}

/// Places every level of the tree inside the right column and routes the
/// connectors between adjacent levels.
///
/// Levels that fill the column grid exactly are spread over it; any other
/// level is centered under the span of the level above (or the column, for
/// the first level), keeping the grid gap between its boxes.
pub fn layout_tree(
    spec: &TreeSpec,
    column: &Region,
    config: &TreeLayoutConfig,
) -> Result<TreeLayout> {
    if spec.levels.is_empty() {
        return Err(SlideError::InvalidContent("tree has no levels".to_string()));
    }
    if let Some(level) = spec.levels.iter().find(|level| level.labels.is_empty()) {
        return Err(SlideError::InvalidContent(format!(
            "level {:?} has no boxes",
            level.name
        )));
    }

    let columns = config.column_count;
    let gap = grid_gap(column.w, columns, config.box_width);
    if gap.is_nan() || gap < 0.0 {
        return Err(SlideError::LayoutOverflow(format!(
            "{columns} boxes of width {} do not fit in {:.3}",
            config.box_width, column.w
        )));
    }

    let card = Region::new(
        column.x,
        column.y + config.card_top_offset,
        column.w,
        column.h - config.card_height_trim,
    );
    let heading = Region::new(
        column.x,
        column.y + config.heading_offset,
        column.w,
        config.heading_height,
    );
    let level_top = heading.y + config.level_offset;
    let row_step = config.box_height + config.vertical_spacing;

    if card.h.is_nan() || card.h <= 0.0 {
        return Err(SlideError::LayoutOverflow(format!(
            "column of height {:.3} leaves no room for the tree card",
            column.h
        )));
    }
    let rows_bottom = level_top + (spec.levels.len() - 1) as f32 * row_step + config.box_height;
    if rows_bottom > column.bottom() + FIT_TOLERANCE {
        return Err(SlideError::LayoutOverflow(format!(
            "{} levels reach {rows_bottom:.3} below a column ending at {:.3}",
            spec.levels.len(),
            column.bottom()
        )));
    }

    let mut levels: Vec<Vec<BoxLayout>> = Vec::with_capacity(spec.levels.len());
    for (idx, level) in spec.levels.iter().enumerate() {
        let y = level_top + idx as f32 * row_step;
        let width = box_width(level, config, gap);
        let count = level.labels.len();

        let boxes = if count == columns && level.width_units <= 1 {
            let xs = (0..count).map(|i| column.x + gap + i as f32 * (config.box_width + gap));
            place_level(idx, level, y, xs, width, config.box_height)
        } else {
            let center = levels
                .last()
                .and_then(|prev| span_center(prev))
                .unwrap_or_else(|| column.center_x());
            let total = count as f32 * width + (count as f32 - 1.0) * gap;
            let start = center - total / 2.0;
            let xs = (0..count).map(|i| start + i as f32 * (width + gap));
            place_level(idx, level, y, xs, width, config.box_height)
        };
        levels.push(boxes);
    }

    let mut connectors = Vec::new();
    for transition in &spec.transitions {
        let lower_idx = transition.from_level + 1;
        if lower_idx >= levels.len() {
            return Err(SlideError::InvalidContent(format!(
                "transition from level {} has no level below it",
                transition.from_level
            )));
        }
        connectors.extend(route_transition(
            transition,
            &levels[transition.from_level],
            &levels[lower_idx],
            config,
        )?);
    }

    debug!(
        levels = levels.len(),
        boxes = levels.iter().map(Vec::len).sum::<usize>(),
        connectors = connectors.len(),
        grid_gap = gap,
        "tree laid out"
    );

    Ok(TreeLayout {
        card,
        heading,
        grid_gap: gap,
        levels,
        connectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SlideContent;
    use crate::layout::ConnectorKind;
    use float_cmp::approx_eq;

    fn column() -> Region {
        Region::new(6.865, 2.0, 6.065, 5.1)
    }

    fn default_tree() -> TreeLayout {
        layout_tree(
            &SlideContent::default().tree,
            &column(),
            &TreeLayoutConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn top_levels_sit_on_grid() {
        let tree = default_tree();
        let gap = tree.grid_gap;
        for level in &tree.levels[..2] {
            for (i, b) in level.iter().enumerate() {
                let expected = 6.865 + gap + i as f32 * (1.2 + gap);
                assert!(approx_eq!(f32, b.x, expected, epsilon = 1e-5));
            }
            assert!(level.windows(2).all(|w| w[0].x < w[1].x));
        }
        let right_margin = column().right() - tree.levels[0][3].x - 1.2;
        assert!(approx_eq!(f32, right_margin, gap, epsilon = 1e-4));
    }

    #[test]
    fn rows_step_by_box_height_and_spacing() {
        let tree = default_tree();
        for (k, level) in tree.levels.iter().enumerate() {
            let expected = 2.0 + 0.5 + 0.5 + k as f32 * 0.75;
            assert!(level.iter().all(|b| approx_eq!(f32, b.y, expected, epsilon = 1e-5)));
        }
    }

    #[test]
    fn compliance_level_is_centered_under_products() {
        let tree = default_tree();
        let products = &tree.levels[1];
        let compliance = &tree.levels[2];
        let upper_mid = (products[0].center_x() + products[3].center_x()) / 2.0;
        let lower_mid = (compliance[0].center_x() + compliance[2].center_x()) / 2.0;
        assert!(approx_eq!(f32, upper_mid, lower_mid, epsilon = 1e-4));
        let step = compliance[1].x - compliance[0].x;
        assert!(approx_eq!(f32, step, 1.2 + tree.grid_gap, epsilon = 1e-5));
    }

    #[test]
    fn foundation_spans_two_units() {
        let tree = default_tree();
        let foundation = &tree.levels[3][0];
        assert!(approx_eq!(
            f32,
            foundation.width,
            2.0 * 1.2 + tree.grid_gap,
            epsilon = 1e-6
        ));
        assert!(approx_eq!(
            f32,
            foundation.center_x(),
            tree.levels[2][1].center_x(),
            epsilon = 1e-4
        ));
    }

    #[test]
    fn connector_counts_by_transition() {
        let tree = default_tree();
        let vertical = tree
            .connectors
            .iter()
            .filter(|c| c.kind == ConnectorKind::Vertical)
            .count();
        assert_eq!(vertical, 4);
        assert_eq!(tree.connectors_into(2).count(), 4);
        assert_eq!(tree.connectors_into(3).count(), 3);
        for c in tree.connectors_into(1) {
            assert_eq!(c.line_box().w, 0.0);
            assert_eq!(c.color, "F4B400");
        }
    }

    #[test]
    fn fan_in_targets_first_compliance_box() {
        let tree = default_tree();
        let targets: Vec<usize> = tree.connectors_into(2).map(|c| c.to.index).collect();
        assert_eq!(targets, vec![0, 0, 1, 2]);
    }

    #[test]
    fn overflow_when_grid_does_not_fit() {
        let narrow = Region::new(0.0, 0.0, 4.0, 5.0);
        let err = layout_tree(
            &SlideContent::default().tree,
            &narrow,
            &TreeLayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SlideError::LayoutOverflow(_)));
    }

    #[test]
    fn overflow_when_card_collapses() {
        let short = Region::new(6.865, 2.0, 6.065, 0.6);
        let err = layout_tree(
            &SlideContent::default().tree,
            &short,
            &TreeLayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SlideError::LayoutOverflow(_)));
    }

    #[test]
    fn overflow_when_rows_run_past_column() {
        // The card still has height, but the foundation row ends at 5.65.
        let short = Region::new(6.865, 2.0, 6.065, 3.0);
        let err = layout_tree(
            &SlideContent::default().tree,
            &short,
            &TreeLayoutConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SlideError::LayoutOverflow(_)));
    }

    #[test]
    fn nan_box_width_is_not_a_fit() {
        let config = TreeLayoutConfig {
            box_width: f32::NAN,
            ..TreeLayoutConfig::default()
        };
        let err = layout_tree(&SlideContent::default().tree, &column(), &config).unwrap_err();
        assert!(matches!(err, SlideError::LayoutOverflow(_)));
    }

    #[test]
    fn rejects_empty_level() {
        let mut spec = SlideContent::default().tree;
        spec.levels[2].labels.clear();
        let err = layout_tree(&spec, &column(), &TreeLayoutConfig::default()).unwrap_err();
        assert!(matches!(err, SlideError::InvalidContent(_)));
    }

    #[test]
    fn rejects_transition_past_last_level() {
        let mut spec = SlideContent::default().tree;
        spec.transitions[2].from_level = 3;
        let err = layout_tree(&spec, &column(), &TreeLayoutConfig::default()).unwrap_err();
        assert!(matches!(err, SlideError::InvalidContent(_)));
    }
}
