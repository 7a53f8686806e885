//! The legend describing the magnitude color bands.

use mercalli::Color;

use crate::classify::magnitude_color;

/// Lower bounds of the magnitude bands shown in the legend.
const GRADES: [u32; 6] = [0, 1, 2, 3, 4, 5];

/// One row of the legend: a color swatch and the magnitude interval it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Label of the magnitude interval.
    pub label: String,
    /// Color of the swatch.
    pub color: Color,
}

/// Returns the six legend entries, lowest band first.
///
/// Every band is labeled `lower–upper` except the open-ended top one, labeled `5+`.
/// Swatch colors match [`magnitude_color`] for the band's lower bound.
pub fn legend_entries() -> Vec<LegendEntry> {
    GRADES
        .iter()
        .enumerate()
        .map(|(index, grade)| {
            let label = match GRADES.get(index + 1) {
                Some(next) => format!("{grade}–{next}"),
                None => format!("{grade}+"),
            };

            LegendEntry {
                label,
                color: magnitude_color(f64::from(*grade)),
            }
        })
        .collect()
}
