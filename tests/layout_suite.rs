use std::io::{Cursor, Read};
use std::path::Path;

use enablement_slide::config::{CanvasConfig, Config, LayoutConfig, load_config};
use enablement_slide::emit::{Role, emit_scene};
use enablement_slide::layout::{ConnectorKind, Region, compute_layout, partition_canvas};
use enablement_slide::theme::Theme;
use enablement_slide::{SlideContent, SlideError, generate, generate_with, render_svg_with};
use float_cmp::approx_eq;
use proptest::prelude::*;

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("not a zip package");
    let mut file = archive.by_name(name).expect("part missing");
    let mut out = String::new();
    file.read_to_string(&mut out).expect("part is not utf-8");
    out
}

fn load_fixture(name: &str) -> Config {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    assert!(path.exists(), "fixture missing: {name}");
    load_config(Some(&path)).expect("fixture config failed to load")
}

#[test]
fn generate_produces_a_presentation() {
    let bytes = generate().unwrap();
    assert_eq!(&bytes[..2], b"PK");
    let slide = read_part(&bytes, "ppt/slides/slide1.xml");
    assert_eq!(slide.matches("<p:cxnSp>").count(), 11);
    assert!(slide.contains("The Dependencies Dilemma"));
    assert!(slide.contains(r#"<a:srgbClr val="F8F9FB"/>"#));
}

#[test]
fn generate_is_byte_identical_across_calls() {
    assert_eq!(generate().unwrap(), generate().unwrap());
}

#[test]
fn slide_text_follows_paint_order() {
    let bytes = generate().unwrap();
    let slide = read_part(&bytes, "ppt/slides/slide1.xml");
    let title = slide.find("The Dependencies Dilemma").unwrap();
    let top_box = slide.find("Banking-as-a-").unwrap();
    let foundation_box = slide.find("KYC/Identity").unwrap();
    assert!(title < top_box);
    assert!(top_box < foundation_box);
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures are added intentionally.
    for name in ["light.json5", "print.json5", "widescreen.json5"] {
        let config = load_fixture(name);
        let bytes = generate_with(&config, &SlideContent::default())
            .unwrap_or_else(|err| panic!("{name}: {err}"));
        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert_eq!(slide.matches("<p:cxnSp>").count(), 11, "{name}");
        let svg = render_svg_with(&config, &SlideContent::default()).unwrap();
        assert!(svg.contains("<svg") && svg.ends_with("</svg>"), "{name}");
    }
}

#[test]
fn svg_preview_shows_every_tree_label() {
    let content = SlideContent::default();
    let svg = render_svg_with(&Config::default(), &content).unwrap();
    for level in &content.tree.levels {
        for label in &level.labels {
            for line in label.split('\n') {
                assert!(svg.contains(line), "missing {line:?}");
            }
        }
    }
}

#[test]
fn print_fixture_changes_theme_only() {
    let config = load_fixture("print.json5");
    assert_eq!(config.theme.font_family, "Helvetica");
    assert_eq!(config.theme.heading_color, "0B1F3A");
    assert!(!config.theme.card_shadow);
    let bytes = generate_with(&config, &SlideContent::default()).unwrap();
    let slide = read_part(&bytes, "ppt/slides/slide1.xml");
    assert!(!slide.contains("outerShdw"));
    assert!(slide.contains(r#"typeface="Helvetica""#));
}

#[test]
fn widescreen_fixture_resizes_slide() {
    let config = load_fixture("widescreen.json5");
    assert_eq!(config.render.file_name, "Dependencies_Dilemma_Widescreen.pptx");
    let bytes = generate_with(&config, &SlideContent::default()).unwrap();
    let pres = read_part(&bytes, "ppt/presentation.xml");
    assert!(pres.contains(r#"<p:sldSz cx="14630400" cy="8229600"/>"#));
}

#[test]
fn invalid_canvas_is_rejected() {
    let config = Config {
        canvas: CanvasConfig {
            width: 0.5,
            height: 7.5,
            margin: 0.4,
        },
        ..Config::default()
    };
    let err = generate_with(&config, &SlideContent::default()).unwrap_err();
    assert!(matches!(err, SlideError::InvalidCanvasConfig(_)));
}

#[test]
fn narrow_column_rejects_legend() {
    let config = Config {
        canvas: CanvasConfig {
            width: 11.0,
            ..CanvasConfig::default()
        },
        ..Config::default()
    };
    let err = generate_with(&config, &SlideContent::default()).unwrap_err();
    assert!(matches!(err, SlideError::LayoutOverflow(_)));
}

#[test]
fn short_canvas_is_rejected() {
    let config = Config {
        canvas: CanvasConfig {
            height: 5.0,
            ..CanvasConfig::default()
        },
        ..Config::default()
    };
    let err = generate_with(&config, &SlideContent::default()).unwrap_err();
    assert!(matches!(err, SlideError::LayoutOverflow(_)));
}

#[test]
fn default_geometry_matches_reference_slide() {
    let layout = compute_layout(
        &SlideContent::default(),
        &CanvasConfig::default(),
        &LayoutConfig::default(),
    )
    .unwrap();
    let column = layout.regions.right_column;
    assert!(approx_eq!(f32, column.x, 6.865, epsilon = 1e-4));
    assert!(approx_eq!(f32, column.y, 2.0, epsilon = 1e-5));
    assert!(approx_eq!(f32, column.w, 6.065, epsilon = 1e-4));
    assert!(approx_eq!(f32, layout.tree.grid_gap, 0.253, epsilon = 1e-4));

    let first = &layout.tree.levels[0][0];
    assert!(approx_eq!(f32, first.x, 7.118, epsilon = 1e-4));
    assert!(approx_eq!(f32, first.y, 3.0, epsilon = 1e-5));
}

#[test]
fn scene_contains_the_whole_tree() {
    let content = SlideContent::default();
    let config = LayoutConfig::default();
    let layout = compute_layout(&content, &CanvasConfig::default(), &config).unwrap();
    let scene = emit_scene(&layout, &content, &Theme::light(), &config);
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

fn contained(inner: &Region, outer: &Region) -> bool {
    const SLACK: f32 = 1e-3;
    inner.x >= outer.x - SLACK
        && inner.y >= outer.y - SLACK
        && inner.right() <= outer.right() + SLACK
        && inner.bottom() <= outer.bottom() + SLACK
}

fn assert_disjoint(regions: &[Region]) {
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
        }
    }
}

proptest! {
    #[test]
    fn regions_never_overlap(width in 12.5f32..30.0, height in 6.0f32..12.0, margin in 0.1f32..0.8) {
        let canvas = CanvasConfig { width, height, margin };
        let regions = partition_canvas(&canvas, &LayoutConfig::default()).unwrap();
        let mut all = vec![regions.title, regions.quote, regions.right_column];
        all.extend(regions.panels);
        assert_disjoint(&all);
        let config = LayoutConfig::default();
        let content = regions.content;
        let right = regions.right_column;
        let panel_heights: f32 = regions.panels.iter().map(|p| p.h).sum();
        prop_assert!((panel_heights + 2.0 * config.panel_gap - right.h).abs() < 1e-3);
        prop_assert!((regions.left_column.w + config.column_gap + right.w - content.w).abs() < 1e-3);
        let stacked = regions.title.h + config.title_gap + regions.quote.h + config.quote_gap + right.h;
        prop_assert!((stacked - content.h).abs() < 1e-3);
        for region in &all {
            prop_assert!(region.x >= regions.content.x - 1e-4);
            prop_assert!(region.right() <= regions.content.right() + 1e-4);
            prop_assert!(region.bottom() <= regions.content.bottom() + 1e-4);
        }
    }

    #[test]
    fn any_canvas_fits_or_fails_typed(
        width in 1.0f32..40.0,
        height in 1.0f32..15.0,
        margin in 0.0f32..2.0,
    ) {
        let canvas = CanvasConfig { width, height, margin };
        match compute_layout(&SlideContent::default(), &canvas, &LayoutConfig::default()) {
            Ok(layout) => {
                let content = layout.regions.content;
                prop_assert!(layout.tree.card.h > 0.0);
                prop_assert!(contained(&layout.tree.card, &content), "card {:?}", layout.tree.card);
                for b in layout.tree.boxes() {
                    prop_assert!(contained(&b.region(), &content), "box {:?}", b.id);
                }
                for item in &layout.legend.items {
                    prop_assert!(contained(&item.swatch, &content), "swatch {}", item.label);
                    prop_assert!(contained(&item.label_region, &content), "label {}", item.label);
                }
            }
            Err(err) => prop_assert!(
                matches!(err, SlideError::InvalidCanvasConfig(_) | SlideError::LayoutOverflow(_)),
                "{err}"
            ),
        }
    }

    #[test]
    fn tree_shape_is_stable_across_widths(width in 12.9f32..30.0) {
        let canvas = CanvasConfig { width, ..CanvasConfig::default() };
        let layout = compute_layout(&SlideContent::default(), &canvas, &LayoutConfig::default()).unwrap();
        prop_assert_eq!(layout.tree.boxes().count(), 12);
        prop_assert_eq!(layout.tree.connectors.len(), 11);

        let column = layout.regions.right_column;
        for b in layout.tree.boxes() {
            prop_assert!(b.x >= column.x - 1e-4);
            prop_assert!(b.x + b.width <= column.right() + 1e-4);
        }
        for c in &layout.tree.connectors {
            let line = c.line_box();
            prop_assert!(line.w >= 0.0 && line.h >= 0.0);
            prop_assert!(!line.flip_v);
        }
    }

    #[test]
    fn legend_is_centered(width in 12.9f32..30.0) {
        let canvas = CanvasConfig { width, ..CanvasConfig::default() };
        let layout = compute_layout(&SlideContent::default(), &canvas, &LayoutConfig::default()).unwrap();
        let column = layout.regions.right_column;
        let center = layout.legend.x + layout.legend.total_width / 2.0;
        prop_assert!((center - column.center_x()).abs() < 1e-3);
        let foundation = &layout.tree.levels[3][0];
        prop_assert!(layout.legend.y > foundation.y + foundation.height);
    }
}
