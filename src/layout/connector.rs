use crate::config::TreeLayoutConfig;
use crate::error::{Result, SlideError};
use crate::ir::{ConnectorMapping, Transition};

use super::{BoxLayout, ConnectorKind, ConnectorLayout, LineBox, NodeRef, Point};

/// Converts a segment into the bounding-box-plus-flips form that line
/// primitives use. `w` and `h` are never negative.
pub fn to_bounding_box_line(p1: Point, p2: Point) -> LineBox {
    LineBox {
        x: p1.x.min(p2.x),
        y: p1.y.min(p2.y),
        w: (p2.x - p1.x).abs(),
        h: (p2.y - p1.y).abs(),
        flip_h: p2.x < p1.x,
        flip_v: p2.y < p1.y,
    }
}

/// Lays out the connectors of one transition. Line starts sit on the bottom
/// center of the source box and ends on the top edge of the target box.
pub(super) fn route_transition(
    transition: &Transition,
    upper: &[BoxLayout],
    lower: &[BoxLayout],
    config: &TreeLayoutConfig,
) -> Result<Vec<ConnectorLayout>> {
    let kind = match transition.mapping {
        ConnectorMapping::Aligned => ConnectorKind::Vertical,
        _ => ConnectorKind::Diagonal,
    };
    let damped = matches!(transition.mapping, ConnectorMapping::FanIn { .. });

    let mut connectors = Vec::new();
    for (from, to) in transition.edges(upper.len()) {
        let source = upper.get(from).ok_or_else(|| {
            SlideError::InvalidContent(format!(
                "level {} has no box {from}",
                transition.from_level
            ))
        })?;
        let target = lower.get(to).ok_or_else(|| {
            SlideError::InvalidContent(format!(
                "level {} has no box {to}",
                transition.from_level + 1
            ))
        })?;

        let start = source.bottom_center();
        let end = if damped {
            let delta = start.x - target.center_x();
            Point::new(target.center_x() + delta * config.connector_damping, target.y)
        } else {
            target.top_center()
        };

        connectors.push(ConnectorLayout {
            from: source.id,
            to: target.id,
            start,
            end,
            color: target.color.clone(),
            stroke_width: config.connector_width,
            kind,
        });
    }
    Ok(connectors)
}
