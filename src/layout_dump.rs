use crate::layout::{ConnectorKind, SlideLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub regions: Vec<RegionDump>,
    pub boxes: Vec<BoxDump>,
    pub connectors: Vec<ConnectorDump>,
    pub legend: Vec<LegendDump>,
}

#[derive(Debug, Serialize)]
pub struct RegionDump {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct BoxDump {
    pub level: usize,
    pub index: usize,
    pub label: String,
    pub color: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub from: [usize; 2],
    pub to: [usize; 2],
    pub kind: String,
    pub color: String,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub flip_h: bool,
    pub flip_v: bool,
}

#[derive(Debug, Serialize)]
pub struct LegendDump {
    pub label: String,
    pub color: String,
    pub swatch: [f32; 2],
    pub label_at: [f32; 2],
}

impl LayoutDump {
    pub fn from_layout(layout: &SlideLayout) -> Self {
        let r = &layout.regions;
        let mut named = vec![
            ("title", r.title),
            ("quote", r.quote),
            ("leftColumn", r.left_column),
            ("rightColumn", r.right_column),
            ("treeCard", layout.tree.card),
        ];
        for (name, panel) in ["example", "mapping", "insight"].into_iter().zip(r.panels) {
            named.push((name, panel));
        }
        let regions = named
            .into_iter()
            .map(|(name, region)| RegionDump {
                name: name.to_string(),
                x: region.x,
                y: region.y,
                width: region.w,
                height: region.h,
            })
            .collect();

        let boxes = layout
            .tree
            .boxes()
            .map(|b| BoxDump {
                level: b.id.level,
                index: b.id.index,
                label: b.label.clone(),
                color: b.color.clone(),
                x: b.x,
                y: b.y,
                width: b.width,
                height: b.height,
            })
            .collect();

        let connectors = layout
            .tree
            .connectors
            .iter()
            .map(|c| {
                let line = c.line_box();
                ConnectorDump {
                    from: [c.from.level, c.from.index],
                    to: [c.to.level, c.to.index],
                    kind: match c.kind {
                        ConnectorKind::Vertical => "vertical".to_string(),
                        ConnectorKind::Diagonal => "diagonal".to_string(),
                    },
                    color: c.color.clone(),
                    start: [c.start.x, c.start.y],
                    end: [c.end.x, c.end.y],
                    flip_h: line.flip_h,
                    flip_v: line.flip_v,
                }
            })
            .collect();

        let legend = layout
            .legend
            .items
            .iter()
            .map(|item| LegendDump {
                label: item.label.clone(),
                color: item.color.clone(),
                swatch: [item.swatch.x, item.swatch.y],
                label_at: [item.label_region.x, item.label_region.y],
            })
            .collect();

        LayoutDump {
            width: layout.canvas.width,
            height: layout.canvas.height,
            regions,
            boxes,
            connectors,
            legend,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &SlideLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
