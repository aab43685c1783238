//! Class color legend.
//!
//! The legend is a strip as wide as the figure and `FIG_MAX_DIM / 8` high,
//! split into one cell per foreground class. Coordinates are in the strip's
//! own space with the origin at the bottom-left:
//!
//! ```text
//!   ┌──────────┐ ┌──────────┐ ┌──────────┐  ─ h
//!   │          │ │          │ │          │
//!   │  Normal  │ │  Stroma  │ │  Tumor   │  ─ h/2 - h/4 (text)
//!   └──────────┘ └──────────┘ └──────────┘  ─ 0
//!        ▲            ▲            ▲
//!     w/2n         3w/2n        5w/2n
//! ```

use serde::Serialize;

use crate::composite::ClassScheme;

/// Longest side of a figure, in pixels
pub const FIG_MAX_DIM: u32 = 600;

/// Height of the legend strip
pub const LEGEND_HEIGHT: u32 = FIG_MAX_DIM / 8;

/// Horizontal gap between cells
pub const CELL_MARGIN: u32 = 10;

/// Fill alpha of every cell
pub const CELL_ALPHA: f64 = 0.8;

/// Channel value above which a cell counts as bright
const BRIGHT_CHANNEL: u8 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    White,
    Black,
}

impl TextColor {
    /// White on cells with a strong red or blue channel, black otherwise.
    pub fn for_fill([r, _, b]: [u8; 3]) -> Self {
        if r > BRIGHT_CHANNEL || b > BRIGHT_CHANNEL {
            TextColor::White
        } else {
            TextColor::Black
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextColor::White => "white",
            TextColor::Black => "black",
        }
    }
}

/// One legend cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendCell {
    pub class_id: u32,
    pub name: String,
    pub x_center: u32,
    pub y_center: u32,
    pub width: u32,
    pub height: u32,
    /// `#rrggbb`
    pub fill: String,
    pub fill_alpha: f64,
    pub text_y: u32,
    pub text_color: TextColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<LegendCell>,
}

/// Lay out one cell per foreground class of `scheme`, ascending by id.
pub fn build_legend(scheme: &ClassScheme, width: u32, height: u32) -> Legend {
    let classes = scheme.foreground();
    let n = classes.len() as u64;

    let cells = classes
        .into_iter()
        .enumerate()
        .map(|(k, class)| {
            let [r, g, b] = class.color;
            LegendCell {
                class_id: class.id,
                name: class.name,
                // floor((k + 0.5) * w / n) in integers
                x_center: ((2 * k as u64 + 1) * width as u64 / (2 * n)) as u32,
                y_center: height / 2,
                width: (width / n as u32).saturating_sub(CELL_MARGIN),
                height,
                fill: format!("#{:02x}{:02x}{:02x}", r, g, b),
                fill_alpha: CELL_ALPHA,
                text_y: height / 2 - height / 4,
                text_color: TextColor::for_fill(class.color),
            }
        })
        .collect();

    Legend {
        width,
        height,
        cells,
    }
}
