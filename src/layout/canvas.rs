use tracing::debug;

use crate::config::{CanvasConfig, LayoutConfig};
use crate::error::{Result, SlideError};

use super::{Region, Regions};

fn check_dimension(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SlideError::InvalidCanvasConfig(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

/// Splits the canvas into the title band, quote band, three stacked left
/// panels and the right diagram column.
pub fn partition_canvas(canvas: &CanvasConfig, config: &LayoutConfig) -> Result<Regions> {
    config.validate()?;
    check_dimension("width", canvas.width)?;
    check_dimension("height", canvas.height)?;
    if !canvas.margin.is_finite() || canvas.margin < 0.0 {
        return Err(SlideError::InvalidCanvasConfig(format!(
            "margin must be a non-negative number, got {}",
            canvas.margin
        )));
    }
    if canvas.margin * 2.0 >= canvas.width || canvas.margin * 2.0 >= canvas.height {
        return Err(SlideError::InvalidCanvasConfig(format!(
            "margin {} leaves no room on a {}x{} canvas",
            canvas.margin, canvas.width, canvas.height
        )));
    }

    let margin = canvas.margin;
    let content = Region::new(
        margin,
        margin,
        canvas.width - 2.0 * margin,
        canvas.height - 2.0 * margin,
    );

    let title = Region::new(content.x, content.y, content.w, config.title_height);
    let quote = Region::new(
        content.x,
        title.bottom() + config.title_gap,
        content.w,
        config.quote_height,
    );

    let columns_top = quote.bottom() + config.quote_gap;
    let columns_height = content.bottom() - columns_top;
    let column_width = (content.w - config.column_gap) / 2.0;
    let panel_space = columns_height - 2.0 * config.panel_gap;
    if column_width <= 0.0 || panel_space <= 0.0 {
        return Err(SlideError::InvalidCanvasConfig(format!(
            "content area {:.2}x{:.2} is too small for the column layout",
            content.w, content.h
        )));
    }

    let left_column = Region::new(content.x, columns_top, column_width, columns_height);
    let right_column = Region::new(
        left_column.right() + config.column_gap,
        columns_top,
        column_width,
        columns_height,
    );

    let mut panels = [Region::new(0.0, 0.0, 0.0, 0.0); 3];
    let mut y = columns_top;
    for (panel, ratio) in panels.iter_mut().zip(config.panel_ratios) {
        let h = panel_space * ratio;
        *panel = Region::new(left_column.x, y, column_width, h);
        y += h + config.panel_gap;
    }

    debug!(
        content_w = content.w,
        content_h = content.h,
        column_width,
        "canvas partitioned"
    );

    Ok(Regions {
        content,
        title,
        quote,
        left_column,
        panels,
        right_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn default_regions() -> Regions {
        partition_canvas(&CanvasConfig::default(), &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn columns_share_content_width() {
        let regions = default_regions();
        let expected = (13.33 - 0.8 - 0.4) / 2.0;
        assert!(approx_eq!(f32, regions.left_column.w, expected, epsilon = 1e-5));
        assert!(approx_eq!(f32, regions.right_column.w, expected, epsilon = 1e-5));
        assert!(approx_eq!(
            f32,
            regions.right_column.right(),
            13.33 - 0.4,
            epsilon = 1e-4
        ));
    }

    #[test]
    fn bands_follow_title_and_quote() {
        let regions = default_regions();
        assert_eq!(regions.title.y, 0.4);
        assert!(approx_eq!(f32, regions.quote.y, 1.1, epsilon = 1e-5));
        assert!(approx_eq!(f32, regions.left_column.y, 2.0, epsilon = 1e-5));
        assert!(approx_eq!(f32, regions.left_column.bottom(), 7.1, epsilon = 1e-5));
    }

    #[test]
    fn panels_split_by_ratio() {
        let regions = default_regions();
        let space = regions.left_column.h - 0.4;
        let [a, b, c] = regions.panels;
        assert!(approx_eq!(f32, a.h, space * 0.4, epsilon = 1e-5));
        assert!(approx_eq!(f32, b.h, space * 0.4, epsilon = 1e-5));
        assert!(approx_eq!(f32, c.h, space * 0.2, epsilon = 1e-5));
        assert!(approx_eq!(f32, b.y, a.bottom() + 0.2, epsilon = 1e-5));
        assert!(approx_eq!(
            f32,
            c.bottom(),
            regions.left_column.bottom(),
            epsilon = 1e-4
        ));
    }

    #[test]
    fn rejects_oversized_margin() {
        let canvas = CanvasConfig {
            width: 10.0,
            height: 4.0,
            margin: 2.0,
        };
        let err = partition_canvas(&canvas, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, SlideError::InvalidCanvasConfig(_)));
    }

    #[test]
    fn rejects_non_finite_dimensions() {
        let canvas = CanvasConfig {
            width: f32::NAN,
            height: 7.5,
            margin: 0.4,
        };
        assert!(matches!(
            partition_canvas(&canvas, &LayoutConfig::default()),
            Err(SlideError::InvalidCanvasConfig(_))
        ));
    }

    #[test]
    fn rejects_canvas_too_short_for_columns() {
        let canvas = CanvasConfig {
            width: 13.33,
            height: 2.5,
            margin: 0.4,
        };
        assert!(matches!(
            partition_canvas(&canvas, &LayoutConfig::default()),
            Err(SlideError::InvalidCanvasConfig(_))
        ));
    }

    #[test]
    fn rejects_ratios_that_overfill_the_column() {
        let config = LayoutConfig {
            panel_ratios: [0.6, 0.6, 0.2],
            ..LayoutConfig::default()
        };
        assert!(matches!(
            partition_canvas(&CanvasConfig::default(), &config),
            Err(SlideError::InvalidCanvasConfig(_))
        ));
    }
}
