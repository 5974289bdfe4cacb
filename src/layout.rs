use serde::{Deserialize, Serialize};

/// Grid span a panel occupies on the fixed page grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelLayout {
    pub column_start: u32,
    pub column_end: u32,
    pub row_start: u32,
    pub row_end: u32,
}

pub const FULL: PanelLayout = PanelLayout {
    column_start: 1,
    column_end: 4,
    row_start: 1,
    row_end: 2,
};

pub const HALF: PanelLayout = PanelLayout {
    column_start: 1,
    column_end: 3,
    row_start: 1,
    row_end: 2,
};

pub const TALL: PanelLayout = PanelLayout {
    column_start: 1,
    column_end: 2,
    row_start: 1,
    row_end: 3,
};

pub const SQUARE: PanelLayout = PanelLayout {
    column_start: 1,
    column_end: 2,
    row_start: 1,
    row_end: 2,
};

/// Maps a planner layout suggestion to its grid span.
///
/// Unrecognized names fall back to `square`; the planner's suggestion is
/// advisory, not validated.
pub fn resolve_layout(name: &str) -> PanelLayout {
    match name {
        "full" => FULL,
        "half" => HALF,
        "tall" => TALL,
        "square" => SQUARE,
        _ => SQUARE,
    }
}
