use super::{SlideRenderer, escape_xml, paragraphs};
use crate::emit::{HAlign, ShapeGeometry, ShapeKind, ShapeStyle, TextPrimitive, VAlign};
use crate::error::{Result, SlideError};

/// Default rounding of a `roundRect` without an explicit radius, as a share of
/// the shorter side.
const DEFAULT_CORNER_SHARE: f32 = 0.16667;
const TEXT_INSET_X: f32 = 0.1;
const TEXT_INSET_Y: f32 = 0.05;
const LINE_HEIGHT: f32 = 1.2;
const ASCENT: f32 = 0.9;

/// Raster-free preview of a scene. Inches are scaled by `px_per_inch`.
#[derive(Debug)]
pub struct SvgRenderer {
    scale: f32,
    width: f32,
    height: f32,
    background: Option<String>,
    body: String,
    filters: usize,
}

impl SvgRenderer {
    pub fn new(px_per_inch: f32) -> Self {
        Self {
            scale: px_per_inch,
            width: 0.0,
            height: 0.0,
            background: None,
            body: String::new(),
            filters: 0,
        }
    }

    fn px(&self, inches: f32) -> f32 {
        inches * self.scale
    }

    fn pt(&self, points: f32) -> f32 {
        points * self.scale / 72.0
    }

    fn paint(&self, style: &ShapeStyle) -> String {
        let fill = style
            .fill
            .as_deref()
            .map(|c| format!("#{c}"))
            .unwrap_or_else(|| "none".to_string());
        let mut out = format!("fill=\"{fill}\"");
        if let Some(stroke) = &style.stroke {
            out.push_str(&format!(
                " stroke=\"#{}\" stroke-width=\"{:.2}\"",
                stroke.color,
                self.pt(stroke.width)
            ));
        }
        out
    }

    /// Emits a drop-shadow filter for `style` and returns the attribute that
    /// references it.
    fn shadow_filter(&mut self, style: &ShapeStyle) -> String {
        let Some(shadow) = &style.shadow else {
            return String::new();
        };
        self.filters += 1;
        let id = format!("shadow{}", self.filters);
        let radians = shadow.angle.to_radians();
        let dx = self.pt(shadow.offset) * radians.cos();
        let dy = self.pt(shadow.offset) * radians.sin();
        self.body.push_str(&format!(
            "<defs><filter id=\"{id}\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\"><feDropShadow dx=\"{dx:.2}\" dy=\"{dy:.2}\" stdDeviation=\"{:.2}\" flood-color=\"#{}\" flood-opacity=\"{:.2}\"/></filter></defs>",
            self.pt(shadow.blur) / 2.0,
            shadow.color,
            shadow.opacity
        ));
        format!(" filter=\"url(#{id})\"")
    }
}

impl SlideRenderer for SvgRenderer {
    fn define_custom_layout(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width > 0.0 && height > 0.0) {
            return Err(SlideError::RenderFailure(format!(
                "slide size {width}x{height} is not positive"
            )));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn add_slide_background(&mut self, color: &str) -> Result<()> {
        self.background = Some(color.to_string());
        Ok(())
    }

    fn add_shape(&mut self, kind: ShapeKind, geometry: &ShapeGeometry, style: &ShapeStyle) -> Result<()> {
        let filter = self.shadow_filter(style);
        let (x, y, w, h) = (
            self.px(geometry.x),
            self.px(geometry.y),
            self.px(geometry.w),
            self.px(geometry.h),
        );
        let element = match kind {
            ShapeKind::Rect => format!(
                "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" {}{filter}/>",
                self.paint(style)
            ),
            ShapeKind::RoundedRect => {
                let r = style
                    .corner_radius
                    .map(|r| self.px(r))
                    .unwrap_or_else(|| w.min(h) * DEFAULT_CORNER_SHARE)
                    .min(w.min(h) / 2.0);
                format!(
                    "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" rx=\"{r:.2}\" ry=\"{r:.2}\" {}{filter}/>",
                    self.paint(style)
                )
            }
            ShapeKind::Ellipse => format!(
                "<ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" {}{filter}/>",
                x + w / 2.0,
                y + h / 2.0,
                w / 2.0,
                h / 2.0,
                self.paint(style)
            ),
            ShapeKind::Line => {
                let (x1, x2) = if geometry.flip_h { (x + w, x) } else { (x, x + w) };
                let (y1, y2) = if geometry.flip_v { (y + h, y) } else { (y, y + h) };
                let (color, width) = style
                    .stroke
                    .as_ref()
                    .map(|s| (s.color.as_str(), self.pt(s.width)))
                    .unwrap_or(("000000", 1.0));
                format!(
                    "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"#{color}\" stroke-width=\"{width:.2}\"{filter}/>"
                )
            }
        };
        self.body.push_str(&element);
        Ok(())
    }

    fn add_text(&mut self, text: &TextPrimitive, font_family: &str) -> Result<()> {
        let frame = text.frame;
        let paras = paragraphs(&text.runs);
        let fallback = text.runs.first().map(|r| r.font_size).unwrap_or(12.0);
        let line_heights: Vec<f32> = paras
            .iter()
            .map(|p| {
                let size = p.iter().map(|(run, _)| run.font_size).fold(0.0, f32::max);
                self.pt(if size > 0.0 { size } else { fallback }) * LINE_HEIGHT
            })
            .collect();
        let block: f32 = line_heights.iter().sum();

        let top = self.px(frame.y + TEXT_INSET_Y);
        let bottom = self.px(frame.bottom() - TEXT_INSET_Y);
        let mut cursor = match text.valign {
            VAlign::Top => top,
            VAlign::Middle => (top + bottom - block) / 2.0,
            VAlign::Bottom => bottom - block,
        };
        let (anchor, x) = match text.align {
            HAlign::Left => ("start", self.px(frame.x + TEXT_INSET_X)),
            HAlign::Center => ("middle", self.px(frame.center_x())),
            HAlign::Right => ("end", self.px(frame.right() - TEXT_INSET_X)),
        };

        let mut out = format!(
            "<text font-family=\"{}\" text-anchor=\"{anchor}\">",
            escape_xml(font_family)
        );
        for (para, line_height) in paras.iter().zip(&line_heights) {
            let baseline = cursor + line_height / LINE_HEIGHT * ASCENT;
            cursor += line_height;
            if para.is_empty() {
                continue;
            }
            out.push_str(&format!("<tspan x=\"{x:.2}\" y=\"{baseline:.2}\">"));
            for (run, piece) in para {
                out.push_str(&format!("<tspan font-size=\"{:.2}\"", self.pt(run.font_size)));
                if run.bold {
                    out.push_str(" font-weight=\"bold\"");
                }
                if run.italic {
                    out.push_str(" font-style=\"italic\"");
                }
                if let Some(color) = &run.color {
                    out.push_str(&format!(" fill=\"#{color}\""));
                }
                out.push_str(&format!(">{}</tspan>", escape_xml(piece)));
            }
            out.push_str("</tspan>");
        }
        out.push_str("</text>");
        self.body.push_str(&out);
        Ok(())
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        let width = self.px(self.width);
        let height = self.px(self.height);
        let mut svg = String::with_capacity(self.body.len() + 512);
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
        ));
        if let Some(color) = &self.background {
            svg.push_str(&format!(
                "<rect width=\"100%\" height=\"100%\" fill=\"#{color}\"/>"
            ));
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        Ok(svg.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Role, Shadow, Stroke, TextRun};
    use crate::layout::Region;

    fn finish(mut renderer: SvgRenderer) -> String {
        String::from_utf8(renderer.serialize().unwrap()).unwrap()
    }

    #[test]
    fn canvas_scales_to_pixels() {
        let mut renderer = SvgRenderer::new(96.0);
        renderer.define_custom_layout(13.33, 7.5).unwrap();
        renderer.add_slide_background("F8F9FB").unwrap();
        let svg = finish(renderer);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("height=\"720\""));
        assert!(svg.contains("fill=\"#F8F9FB\""));
    }

    #[test]
    fn flipped_line_runs_right_to_left() {
        let mut renderer = SvgRenderer::new(100.0);
        renderer.define_custom_layout(10.0, 10.0).unwrap();
        let geometry = ShapeGeometry {
            x: 1.0,
            y: 1.0,
            w: 2.0,
            h: 1.0,
            flip_h: true,
            flip_v: false,
        };
        let style = ShapeStyle {
            stroke: Some(Stroke {
                color: "0F9D58".to_string(),
                width: 1.5,
            }),
            ..ShapeStyle::default()
        };
        renderer.add_shape(ShapeKind::Line, &geometry, &style).unwrap();
        let svg = finish(renderer);
        assert!(svg.contains("x1=\"300.00\" y1=\"100.00\" x2=\"100.00\" y2=\"200.00\""));
    }

    #[test]
    fn shadows_get_distinct_filters() {
        let mut renderer = SvgRenderer::new(96.0);
        renderer.define_custom_layout(13.33, 7.5).unwrap();
        let style = ShapeStyle {
            fill: Some("FFFFFF".to_string()),
            shadow: Some(Shadow {
                color: "000000".to_string(),
                blur: 3.0,
                offset: 2.0,
                angle: 45.0,
                opacity: 0.2,
            }),
            ..ShapeStyle::default()
        };
        let geometry = ShapeGeometry::from(Region::new(1.0, 1.0, 2.0, 2.0));
        renderer.add_shape(ShapeKind::RoundedRect, &geometry, &style).unwrap();
        renderer.add_shape(ShapeKind::RoundedRect, &geometry, &style).unwrap();
        let svg = finish(renderer);
        assert!(svg.contains("url(#shadow1)"));
        assert!(svg.contains("url(#shadow2)"));
    }

    #[test]
    fn text_lines_follow_paragraphs() {
        let mut renderer = SvgRenderer::new(96.0);
        renderer.define_custom_layout(13.33, 7.5).unwrap();
        let text = TextPrimitive {
            frame: Region::new(0.0, 0.0, 1.2, 0.4),
            runs: vec![TextRun {
                text: "KYC/\nIdentity".to_string(),
                font_size: 8.0,
                bold: true,
                italic: false,
                color: Some("FFFFFF".to_string()),
            }],
            align: HAlign::Center,
            valign: VAlign::Middle,
            role: Role::Decoration,
        };
        renderer.add_text(&text, "Arial").unwrap();
        let svg = finish(renderer);
        assert_eq!(svg.matches("<tspan x=").count(), 2);
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("font-weight=\"bold\""));
    }
}
