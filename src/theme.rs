use serde::{Deserialize, Serialize};

/// Slide palette. Colors are six-digit RGB hex strings without a leading `#`,
/// the form both DrawingML and the SVG writer accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub heading_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub card_fill: String,
    pub card_border: String,
    pub shadow_color: String,
    pub bullet_color: String,
    pub insight_border: String,
    pub insight_fill: String,
    pub box_text_color: String,
    pub card_shadow: bool,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Arial".to_string(),
            background: "F8F9FB".to_string(),
            heading_color: "1A294B".to_string(),
            text_color: "000000".to_string(),
            accent_color: "53A457".to_string(),
            card_fill: "FFFFFF".to_string(),
            card_border: "DDDDDD".to_string(),
            shadow_color: "000000".to_string(),
            bullet_color: "4285F4".to_string(),
            insight_border: "58A65C".to_string(),
            insight_fill: "E8F1EB".to_string(),
            box_text_color: "FFFFFF".to_string(),
            card_shadow: true,
        }
    }

    /// Flat white variant for printing: no drop shadows, bordered cards.
    pub fn print() -> Self {
        Self {
            background: "FFFFFF".to_string(),
            card_border: "BFBFBF".to_string(),
            insight_fill: "F2F7F3".to_string(),
            card_shadow: false,
            ..Self::light()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "light" | "default" => Some(Self::light()),
            "print" => Some(Self::print()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
