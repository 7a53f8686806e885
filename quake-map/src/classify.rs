//! Classification of earthquake magnitudes into color bands.

use mercalli::Color;

/// Returns the color of the magnitude band the given magnitude falls into.
///
/// The six bands are half-open intervals, so a boundary magnitude belongs to the band
/// above it: 1.0 is colored as `[1, 2)`, 5.0 as `[5, ∞)`. The mapping is total over
/// `f64`; `NaN` fails every comparison and ends up in the top band.
pub fn magnitude_color(magnitude: f64) -> Color {
    if magnitude < 1.0 {
        Color::from_hex("#6dac00")
    } else if magnitude < 2.0 {
        Color::from_hex("#98ee00")
    } else if magnitude < 3.0 {
        Color::from_hex("#d4ee00")
    } else if magnitude < 4.0 {
        Color::from_hex("#eecc00")
    } else if magnitude < 5.0 {
        Color::from_hex("#ee9c00")
    } else {
        Color::from_hex("#ea822c")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_belong_to_the_upper_band() {
        assert_eq!(magnitude_color(0.99), Color::from_hex("#6dac00"));
        assert_eq!(magnitude_color(1.0), Color::from_hex("#98ee00"));
        assert_eq!(magnitude_color(2.0), Color::from_hex("#d4ee00"));
        assert_eq!(magnitude_color(3.0), Color::from_hex("#eecc00"));
        assert_eq!(magnitude_color(4.0), Color::from_hex("#ee9c00"));
        assert_eq!(magnitude_color(5.0), Color::from_hex("#ea822c"));
    }

    #[test]
    fn mapping_is_total_and_monotonic() {
        let colors: Vec<_> = [-10.0, 0.5, 1.5, 2.5, 3.5, 4.5, 5.5, 100.0]
            .iter()
            .map(|&magnitude| magnitude_color(magnitude))
            .collect();

        // Every sampled magnitude gets a color, neighbors share or advance the band.
        let mut distinct = colors.clone();
        distinct.dedup();
        assert_eq!(distinct.len(), 6);
        assert_eq!(colors[0], colors[1]);
        assert_eq!(colors[6], colors[7]);
    }

    #[test]
    fn nan_gets_the_top_band_color() {
        assert_eq!(magnitude_color(f64::NAN), Color::from_hex("#ea822c"));
    }

    #[test]
    fn negative_magnitudes_get_the_lowest_band_color() {
        assert_eq!(magnitude_color(-1.2), Color::from_hex("#6dac00"));
    }
}
