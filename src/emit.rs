use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::{Ink, SlideContent, Span};
use crate::layout::{ConnectorKind, LineBox, NodeRef, Region, SlideLayout};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeKind {
    Rect,
    RoundedRect,
    Ellipse,
    Line,
}

/// Placement of a shape. Flips only matter for lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeGeometry {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl From<Region> for ShapeGeometry {
    fn from(region: Region) -> Self {
        Self {
            x: region.x,
            y: region.y,
            w: region.w,
            h: region.h,
            flip_h: false,
            flip_v: false,
        }
    }
}

impl From<LineBox> for ShapeGeometry {
    fn from(line: LineBox) -> Self {
        Self {
            x: line.x,
            y: line.y,
            w: line.w,
            h: line.h,
            flip_h: line.flip_h,
            flip_v: line.flip_v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    /// Points.
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shadow {
    pub color: String,
    pub blur: f32,
    pub offset: f32,
    pub angle: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapeStyle {
    pub fill: Option<String>,
    pub stroke: Option<Stroke>,
    /// Inches; `None` keeps the renderer's default rounding.
    pub corner_radius: Option<f32>,
    pub shadow: Option<Shadow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// One styled run. A `\n` inside `text` ends the current paragraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
}

/// What a primitive depicts, so callers can find tree parts in the flat list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Decoration,
    TreeBox(NodeRef),
    TreeLabel(NodeRef),
    Connector(ConnectorKind),
    LegendSwatch,
    LegendLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapePrimitive {
    pub kind: ShapeKind,
    pub geometry: ShapeGeometry,
    pub style: ShapeStyle,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPrimitive {
    pub frame: Region,
    pub runs: Vec<TextRun>,
    pub align: HAlign,
    pub valign: VAlign,
    pub role: Role,
}

impl TextPrimitive {
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    Shape(ShapePrimitive),
    Text(TextPrimitive),
}

impl Primitive {
    pub fn role(&self) -> Role {
        match self {
            Primitive::Shape(shape) => shape.role,
            Primitive::Text(text) => text.role,
        }
    }
}

/// Ordered drawing list for one slide. Later primitives paint over earlier
/// ones.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub font_family: String,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn count_role(&self, pred: impl Fn(Role) -> bool) -> usize {
        self.primitives.iter().filter(|p| pred(p.role())).count()
    }
}

struct Emitter<'a> {
    theme: &'a Theme,
    config: &'a LayoutConfig,
    out: Vec<Primitive>,
}

impl<'a> Emitter<'a> {
    fn shape(&mut self, kind: ShapeKind, geometry: impl Into<ShapeGeometry>, style: ShapeStyle, role: Role) {
        self.out.push(Primitive::Shape(ShapePrimitive {
            kind,
            geometry: geometry.into(),
            style,
            role,
        }));
    }

    fn text(&mut self, frame: Region, runs: Vec<TextRun>, align: HAlign, valign: VAlign, role: Role) {
        self.out.push(Primitive::Text(TextPrimitive {
            frame,
            runs,
            align,
            valign,
            role,
        }));
    }

    fn ink(&self, ink: Ink) -> Option<String> {
        match ink {
            Ink::Heading => Some(self.theme.heading_color.clone()),
            Ink::Body => Some(self.theme.text_color.clone()),
            Ink::Accent => Some(self.theme.accent_color.clone()),
            Ink::Insight => Some(self.theme.insight_border.clone()),
            Ink::Inherit => None,
        }
    }

    fn runs(&self, spans: &[Span]) -> Vec<TextRun> {
        spans
            .iter()
            .map(|span| TextRun {
                text: span.text.clone(),
                font_size: span.font_size,
                bold: span.bold,
                italic: span.italic,
                color: self.ink(span.ink),
            })
            .collect()
    }

    fn run(&self, text: &str, font_size: f32, bold: bool, color: &str) -> Vec<TextRun> {
        vec![TextRun {
            text: text.to_string(),
            font_size,
            bold,
            italic: false,
            color: Some(color.to_string()),
        }]
    }

    /// White rounded card; shadowed, or outlined when the theme has shadows
    /// turned off.
    fn card_style(&self) -> ShapeStyle {
        let mut style = ShapeStyle {
            fill: Some(self.theme.card_fill.clone()),
            corner_radius: Some(self.config.corner_radius),
            ..ShapeStyle::default()
        };
        if self.theme.card_shadow {
            let shadow = &self.config.shadow;
            style.shadow = Some(Shadow {
                color: self.theme.shadow_color.clone(),
                blur: shadow.blur,
                offset: shadow.offset,
                angle: shadow.angle,
                opacity: shadow.opacity,
            });
        } else {
            style.stroke = Some(self.outline());
        }
        style
    }

    fn outline(&self) -> Stroke {
        Stroke {
            color: self.theme.card_border.clone(),
            width: 1.0,
        }
    }

    fn fill(color: &str) -> ShapeStyle {
        ShapeStyle {
            fill: Some(color.to_string()),
            ..ShapeStyle::default()
        }
    }

    fn header(&mut self, layout: &SlideLayout, content: &SlideContent) {
        let regions = &layout.regions;
        let runs = self.run(
            &content.title,
            self.config.fonts.title,
            true,
            &self.theme.heading_color,
        );
        self.text(regions.title, runs, HAlign::Left, VAlign::Top, Role::Decoration);

        self.shape(
            ShapeKind::RoundedRect,
            regions.quote,
            self.card_style(),
            Role::Decoration,
        );
        let frame = regions.quote.inset(self.config.quote_inset, 0.0);
        let runs = self.runs(&content.quote);
        self.text(frame, runs, HAlign::Left, VAlign::Middle, Role::Decoration);
    }

    fn example_panel(&mut self, panel: Region, content: &SlideContent) {
        let style = ShapeStyle {
            fill: Some(self.theme.card_fill.clone()),
            stroke: Some(self.outline()),
            corner_radius: Some(self.config.corner_radius),
            shadow: None,
        };
        self.shape(ShapeKind::RoundedRect, panel, style, Role::Decoration);
        let inset = self.config.panel_inset;
        let runs = self.runs(&content.example);
        self.text(
            panel.inset(inset, inset),
            runs,
            HAlign::Left,
            VAlign::Top,
            Role::Decoration,
        );
    }

    fn mapping_panel(&mut self, panel: Region, content: &SlideContent) {
        let cfg = self.config;
        self.shape(ShapeKind::RoundedRect, panel, self.card_style(), Role::Decoration);

        let inset = cfg.panel_inset;
        let heading = Region::new(
            panel.x + inset,
            panel.y + inset,
            panel.w - 2.0 * inset,
            cfg.panel_heading_height,
        );
        let runs = self.run(
            &content.mapping.heading,
            cfg.fonts.heading,
            true,
            &self.theme.heading_color,
        );
        self.text(heading, runs, HAlign::Left, VAlign::Top, Role::Decoration);

        let bullet_x = panel.x + inset;
        let text_x = bullet_x + cfg.bullet_size + cfg.bullet_gap;
        let list_top = panel.y + cfg.bullet_list_offset;
        for (idx, item) in content.mapping.items.iter().enumerate() {
            let y = list_top + idx as f32 * cfg.bullet_line_height;
            let dot = Region::new(bullet_x, y + cfg.bullet_offset_y, cfg.bullet_size, cfg.bullet_size);
            let style = ShapeStyle {
                fill: Some(self.theme.bullet_color.clone()),
                stroke: Some(Stroke {
                    color: self.theme.bullet_color.clone(),
                    width: 1.0,
                }),
                ..ShapeStyle::default()
            };
            self.shape(ShapeKind::Ellipse, dot, style, Role::Decoration);

            let frame = Region::new(
                text_x,
                y,
                panel.w - (text_x - panel.x),
                cfg.bullet_line_height,
            );
            let runs = self.run(item, cfg.fonts.body, false, &self.theme.text_color);
            self.text(frame, runs, HAlign::Left, VAlign::Middle, Role::Decoration);
        }
    }

    /// Three stacked layers, outer to inner: white base, colored border
    /// layer, lighter fill shifted right by the border width.
    fn insight_panel(&mut self, panel: Region, content: &SlideContent) {
        let cfg = self.config;
        self.shape(
            ShapeKind::RoundedRect,
            panel,
            Self::fill(&self.theme.card_fill),
            Role::Decoration,
        );
        let border = ShapeStyle {
            corner_radius: Some(cfg.corner_radius),
            ..Self::fill(&self.theme.insight_border)
        };
        self.shape(ShapeKind::RoundedRect, panel, border, Role::Decoration);
        let inner = Region::new(
            panel.x + cfg.insight_border,
            panel.y,
            panel.w - cfg.insight_border,
            panel.h,
        );
        let fill = ShapeStyle {
            corner_radius: Some(cfg.corner_radius),
            ..Self::fill(&self.theme.insight_fill)
        };
        self.shape(ShapeKind::RoundedRect, inner, fill, Role::Decoration);

        let frame = panel.inset(cfg.insight_inset, cfg.panel_inset);
        let runs = self.runs(&content.insight);
        self.text(frame, runs, HAlign::Left, VAlign::Top, Role::Decoration);
    }

    fn tree(&mut self, layout: &SlideLayout, content: &SlideContent) {
        let cfg = self.config;
        let tree = &layout.tree;
        self.shape(ShapeKind::RoundedRect, tree.card, self.card_style(), Role::Decoration);
        let runs = self.run(
            &content.tree.heading,
            cfg.fonts.heading,
            false,
            &self.theme.heading_color,
        );
        self.text(tree.heading, runs, HAlign::Center, VAlign::Middle, Role::Decoration);

        for (level_idx, level) in tree.levels.iter().enumerate() {
            for b in level {
                self.shape(
                    ShapeKind::RoundedRect,
                    b.region(),
                    Self::fill(&b.color),
                    Role::TreeBox(b.id),
                );
                let runs = self.run(
                    &b.label,
                    cfg.fonts.box_label,
                    true,
                    &self.theme.box_text_color,
                );
                self.text(b.region(), runs, HAlign::Center, VAlign::Middle, Role::TreeLabel(b.id));
            }
            for connector in tree.connectors_into(level_idx) {
                let style = ShapeStyle {
                    stroke: Some(Stroke {
                        color: connector.color.clone(),
                        width: connector.stroke_width,
                    }),
                    ..ShapeStyle::default()
                };
                self.shape(
                    ShapeKind::Line,
                    connector.line_box(),
                    style,
                    Role::Connector(connector.kind),
                );
            }
        }
    }

    fn legend(&mut self, layout: &SlideLayout) {
        for item in &layout.legend.items {
            self.shape(
                ShapeKind::Rect,
                item.swatch,
                Self::fill(&item.color),
                Role::LegendSwatch,
            );
            let runs = self.run(
                &item.label,
                self.config.fonts.legend,
                false,
                &self.theme.text_color,
            );
            self.text(item.label_region, runs, HAlign::Left, VAlign::Middle, Role::LegendLabel);
        }
    }
}

/// Turns a computed layout and the slide text into the ordered primitive list.
pub fn emit_scene(
    layout: &SlideLayout,
    content: &SlideContent,
    theme: &Theme,
    config: &LayoutConfig,
) -> Scene {
    let mut emitter = Emitter {
        theme,
        config,
        out: Vec::new(),
    };
    let [example, mapping, insight] = layout.regions.panels;

    emitter.header(layout, content);
    emitter.example_panel(example, content);
    emitter.mapping_panel(mapping, content);
    emitter.insight_panel(insight, content);
    emitter.tree(layout, content);
    emitter.legend(layout);

    debug!(primitives = emitter.out.len(), "scene emitted");

    Scene {
        width: layout.canvas.width,
        height: layout.canvas.height,
        background: theme.background.clone(),
        font_family: theme.font_family.clone(),
        primitives: emitter.out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::layout::compute_layout;

    fn default_scene(theme: &Theme) -> Scene {
        let content = SlideContent::default();
        let config = LayoutConfig::default();
        let layout = compute_layout(&content, &CanvasConfig::default(), &config).unwrap();
        emit_scene(&layout, &content, theme, &config)
    }

    fn shapes(scene: &Scene) -> impl Iterator<Item = &ShapePrimitive> {
        scene.primitives.iter().filter_map(|p| match p {
            Primitive::Shape(shape) => Some(shape),
            Primitive::Text(_) => None,
        })
    }

    #[test]
    fn tree_parts_are_counted() {
        let scene = default_scene(&Theme::light());
        assert_eq!(scene.count_role(|r| matches!(r, Role::TreeBox(_))), 12);
        assert_eq!(scene.count_role(|r| matches!(r, Role::TreeLabel(_))), 12);
        assert_eq!(
            scene.count_role(|r| r == Role::Connector(ConnectorKind::Vertical)),
            4
        );
        assert_eq!(
            scene.count_role(|r| r == Role::Connector(ConnectorKind::Diagonal)),
            7
        );
        assert_eq!(scene.count_role(|r| r == Role::LegendSwatch), 4);
    }

    #[test]
    fn title_comes_first() {
        let scene = default_scene(&Theme::light());
        let Primitive::Text(title) = &scene.primitives[0] else {
            panic!("first primitive should be the title");
        };
        assert_eq!(title.plain_text(), "The Dependencies Dilemma");
        assert!(title.runs[0].bold);
    }

    #[test]
    fn quote_runs_keep_order_and_styles() {
        let scene = default_scene(&Theme::light());
        let Primitive::Shape(card) = &scene.primitives[1] else {
            panic!("quote card expected");
        };
        assert_eq!(card.kind, ShapeKind::RoundedRect);
        assert!(card.style.shadow.is_some());
        let Primitive::Text(quote) = &scene.primitives[2] else {
            panic!("quote text expected");
        };
        assert_eq!(quote.runs.len(), 4);
        assert_eq!(quote.runs[1].text, " but what it unlocks ");
        assert_eq!(quote.runs[1].color.as_deref(), Some("53A457"));
        assert!(quote.runs[0].italic);
        assert_eq!(quote.runs[2].color, None);
        assert_eq!(quote.valign, VAlign::Middle);
    }

    #[test]
    fn insight_layers_stack_outer_to_inner() {
        let scene = default_scene(&Theme::light());
        let theme = Theme::light();
        let pos = scene
            .primitives
            .iter()
            .position(|p| match p {
                Primitive::Shape(s) => s.style.fill.as_deref() == Some(theme.insight_border.as_str()),
                Primitive::Text(_) => false,
            })
            .unwrap();
        let layer = |idx: usize| match &scene.primitives[idx] {
            Primitive::Shape(s) => s.clone(),
            Primitive::Text(_) => panic!("shape expected at {idx}"),
        };
        let base = layer(pos - 1);
        let border = layer(pos);
        let inner = layer(pos + 1);
        assert_eq!(base.style.fill.as_deref(), Some("FFFFFF"));
        assert_eq!(inner.style.fill.as_deref(), Some("E8F1EB"));
        assert!(inner.geometry.x > border.geometry.x);
        assert!(inner.geometry.w < border.geometry.w);
        assert!(matches!(scene.primitives[pos + 2], Primitive::Text(_)));
    }

    #[test]
    fn shapes_precede_their_text() {
        let scene = default_scene(&Theme::light());
        for (idx, primitive) in scene.primitives.iter().enumerate() {
            if let Primitive::Text(text) = primitive {
                if let Role::TreeLabel(id) = text.role {
                    assert_eq!(scene.primitives[idx - 1].role(), Role::TreeBox(id));
                }
                if text.role == Role::LegendLabel {
                    assert_eq!(scene.primitives[idx - 1].role(), Role::LegendSwatch);
                }
            }
        }
    }

    #[test]
    fn connectors_follow_their_target_level() {
        let scene = default_scene(&Theme::light());
        let roles: Vec<Role> = scene.primitives.iter().map(Primitive::role).collect();
        let last_level1_box = roles
            .iter()
            .rposition(|r| matches!(r, Role::TreeBox(id) if id.level == 1))
            .unwrap();
        let first_vertical = roles
            .iter()
            .position(|r| *r == Role::Connector(ConnectorKind::Vertical))
            .unwrap();
        let first_level2_box = roles
            .iter()
            .position(|r| matches!(r, Role::TreeBox(id) if id.level == 2))
            .unwrap();
        assert!(last_level1_box < first_vertical);
        assert!(first_vertical < first_level2_box);
    }

    #[test]
    fn line_boxes_are_non_negative() {
        let scene = default_scene(&Theme::light());
        for shape in shapes(&scene).filter(|s| s.kind == ShapeKind::Line) {
            assert!(shape.geometry.w >= 0.0);
            assert!(shape.geometry.h >= 0.0);
            assert!(!shape.geometry.flip_v);
        }
    }

    #[test]
    fn print_theme_outlines_cards() {
        let scene = default_scene(&Theme::print());
        assert!(shapes(&scene).all(|s| s.style.shadow.is_none()));
        assert_eq!(scene.background, "FFFFFF");
    }
}
