use serde::Serialize;

use crate::config::CanvasConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in inches, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Shrinks by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }

    /// True when the interiors intersect; shared edges do not count.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Output of the canvas partitioner.
#[derive(Debug, Clone, Serialize)]
pub struct Regions {
    /// Margin-bounded area everything else lives in.
    pub content: Region,
    pub title: Region,
    pub quote: Region,
    pub left_column: Region,
    /// Example, mapping and key-insight panels, top to bottom.
    pub panels: [Region; 3],
    pub right_column: Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    pub level: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxLayout {
    pub id: NodeRef,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub label: String,
}

impl BoxLayout {
    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.center_x(), self.y)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.center_x(), self.y + self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectorKind {
    Vertical,
    Diagonal,
}

/// A connector kept in endpoint form. Renderers get the bounding-box form
/// through [`ConnectorLayout::line_box`].
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorLayout {
    pub from: NodeRef,
    pub to: NodeRef,
    pub start: Point,
    pub end: Point,
    pub color: String,
    pub stroke_width: f32,
    pub kind: ConnectorKind,
}

impl ConnectorLayout {
    pub fn line_box(&self) -> LineBox {
        super::connector::to_bounding_box_line(self.start, self.end)
    }
}

/// A line segment as a non-negative bounding box plus orientation flags.
/// Without flips the line runs from top-left to bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl LineBox {
    pub fn start(&self) -> Point {
        Point::new(
            if self.flip_h { self.x + self.w } else { self.x },
            if self.flip_v { self.y + self.h } else { self.y },
        )
    }

    pub fn end(&self) -> Point {
        Point::new(
            if self.flip_h { self.x } else { self.x + self.w },
            if self.flip_v { self.y } else { self.y + self.h },
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeLayout {
    /// White card behind the diagram.
    pub card: Region,
    pub heading: Region,
    /// Horizontal gap of the column grid, also used between boxes of
    /// centered levels.
    pub grid_gap: f32,
    pub levels: Vec<Vec<BoxLayout>>,
    pub connectors: Vec<ConnectorLayout>,
}

impl TreeLayout {
    pub fn boxes(&self) -> impl Iterator<Item = &BoxLayout> {
        self.levels.iter().flatten()
    }

    pub fn bottom(&self) -> f32 {
        self.boxes()
            .map(|b| b.y + b.height)
            .fold(self.heading.bottom(), f32::max)
    }

    /// Connectors that end in `level`.
    pub fn connectors_into(&self, level: usize) -> impl Iterator<Item = &ConnectorLayout> {
        self.connectors.iter().filter(move |c| c.to.level == level)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendItemLayout {
    pub label: String,
    pub color: String,
    /// Left edge of the item cell (swatch slot plus label).
    pub x: f32,
    pub swatch: Region,
    pub label_region: Region,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendLayout {
    pub x: f32,
    pub y: f32,
    pub total_width: f32,
    pub items: Vec<LegendItemLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlideLayout {
    pub canvas: CanvasConfig,
    pub regions: Regions,
    pub tree: TreeLayout,
    pub legend: LegendLayout,
}
