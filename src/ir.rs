use serde::{Deserialize, Serialize};

pub const REVENUE_COLOR: &str = "A52A2A";
pub const PRODUCT_COLOR: &str = "F4B400";
pub const COMPLIANCE_COLOR: &str = "0F9D58";
pub const FOUNDATION_COLOR: &str = "4285F4";

/// Theme role a span of text is colored with. `Inherit` leaves the color to the
/// renderer default (used for the emoji run in the quote).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ink {
    Heading,
    Body,
    Accent,
    Insight,
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub ink: Ink,
}

impl Span {
    pub fn new(text: impl Into<String>, font_size: f32, ink: Ink) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold: false,
            italic: false,
            ink,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub labels: Vec<String>,
    pub color: String,
    /// Box width in grid units; a box of `n` units also absorbs the `n - 1`
    /// gaps between them.
    pub width_units: u32,
}

impl LevelSpec {
    pub fn new(name: &str, labels: &[&str], color: &str) -> Self {
        Self {
            name: name.to_string(),
            labels: labels.iter().map(|label| label.to_string()).collect(),
            color: color.to_string(),
            width_units: 1,
        }
    }

    pub fn with_width_units(mut self, units: u32) -> Self {
        self.width_units = units;
        self
    }
}

/// How the boxes of one level connect to the boxes of the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConnectorMapping {
    /// Box `i` connects straight down to box `i`.
    Aligned,
    /// Explicit `(from, to)` index pairs.
    Pairs(Vec<(usize, usize)>),
    /// Every box connects to `target`; line ends are pulled toward the
    /// target center by the damping factor instead of meeting in one point.
    FanIn { target: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Index of the upper level; the lower level is `from_level + 1`.
    pub from_level: usize,
    pub mapping: ConnectorMapping,
}

impl Transition {
    /// `(from, to)` box index pairs for this transition, in emission order.
    pub fn edges(&self, from_count: usize) -> Vec<(usize, usize)> {
        match &self.mapping {
            ConnectorMapping::Aligned => (0..from_count).map(|idx| (idx, idx)).collect(),
            ConnectorMapping::Pairs(pairs) => pairs.clone(),
            ConnectorMapping::FanIn { target } => {
                (0..from_count).map(|idx| (idx, *target)).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub heading: String,
    pub levels: Vec<LevelSpec>,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletPanel {
    pub heading: String,
    pub items: Vec<String>,
}

/// Everything the slide says. Geometry never looks inside the strings; only
/// the level sizes and the transitions drive layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideContent {
    pub title: String,
    pub quote: Vec<Span>,
    pub example: Vec<Span>,
    pub mapping: BulletPanel,
    pub insight: Vec<Span>,
    pub tree: TreeSpec,
    pub legend: Vec<LegendEntry>,
}

impl SlideContent {
    pub fn dependencies_dilemma() -> Self {
        let levels = vec![
            LevelSpec::new(
                "revenue",
                &[
                    "Banking-as-a-\nService",
                    "White-Label\nSolutions",
                    "Cross-Border\nPayments",
                    "Institutional\nTrading",
                ],
                REVENUE_COLOR,
            ),
            LevelSpec::new(
                "product",
                &[
                    "International\nMarkets",
                    "Business\nBanking",
                    "Investment\nPlatform",
                    "Lending\nProducts",
                ],
                PRODUCT_COLOR,
            ),
            LevelSpec::new(
                "compliance",
                &["AML\nMonitoring", "Regulatory\nReporting", "Risk\nAssessment"],
                COMPLIANCE_COLOR,
            ),
            LevelSpec::new("foundation", &["KYC/Identity\nVerification"], FOUNDATION_COLOR)
                .with_width_units(2),
        ];

        let transitions = vec![
            Transition {
                from_level: 0,
                mapping: ConnectorMapping::Aligned,
            },
            Transition {
                from_level: 1,
                mapping: ConnectorMapping::Pairs(vec![(0, 0), (1, 0), (2, 1), (3, 2)]),
            },
            Transition {
                from_level: 2,
                mapping: ConnectorMapping::FanIn { target: 0 },
            },
        ];

        Self {
            title: "The Dependencies Dilemma".to_string(),
            quote: vec![
                Span::new(
                    "The value of an initiative isn't just its immediate impact,",
                    16.0,
                    Ink::Body,
                )
                .italic(),
                Span::new(" but what it unlocks ", 16.0, Ink::Accent).italic(),
                Span::new("\u{1F513}", 16.0, Ink::Inherit),
                Span::new(".", 16.0, Ink::Body).italic(),
            ],
            example: vec![
                Span::new("Real-World Example\n", 14.0, Ink::Heading).bold(),
                Span::new(
                    "A fintech startup invested in comprehensive KYC infrastructure that enabled:\n",
                    12.0,
                    Ink::Body,
                ),
                Span::new("\u{2022} Launch in 4 new countries within 12 months\n", 12.0, Ink::Body),
                Span::new("\u{2022} Add 3 regulated financial products\n", 12.0, Ink::Body),
                Span::new("\u{2022} Partner with 2 major banks\n", 12.0, Ink::Body),
                Span::new(
                    "\u{2022} Achieve compliance in weeks instead of months",
                    12.0,
                    Ink::Body,
                ),
            ],
            mapping: BulletPanel {
                heading: "Dependency Mapping".to_string(),
                items: vec![
                    "Foundation capabilities vs. surface features".to_string(),
                    "Regulatory infrastructure unlocks market expansion".to_string(),
                    "Compliance systems enable product diversification".to_string(),
                ],
            },
            insight: vec![
                Span::new("Key Insight: ", 12.0, Ink::Insight).bold(),
                Span::new(
                    "Foundation investments create exponential value through what they unlock, not just their direct impact.",
                    12.0,
                    Ink::Body,
                ),
            ],
            tree: TreeSpec {
                heading: "Feature Enablement Tree".to_string(),
                levels,
                transitions,
            },
            legend: vec![
                LegendEntry {
                    label: "Foundation".to_string(),
                    color: FOUNDATION_COLOR.to_string(),
                },
                LegendEntry {
                    label: "Compliance".to_string(),
                    color: COMPLIANCE_COLOR.to_string(),
                },
                LegendEntry {
                    label: "Products".to_string(),
                    color: PRODUCT_COLOR.to_string(),
                },
                LegendEntry {
                    label: "Revenue".to_string(),
                    color: REVENUE_COLOR.to_string(),
                },
            ],
        }
    }

    pub fn tree_box_count(&self) -> usize {
        self.tree.levels.iter().map(|level| level.labels.len()).sum()
    }
}

impl Default for SlideContent {
    fn default() -> Self {
        Self::dependencies_dilemma()
    }
}
