//! Heuristic text height estimation.

/// Estimates the vertical space (in inches) a wrapped string needs inside a
/// box of known width, without real font metrics.
///
/// The model: character density per inch scales inversely with font size
/// from a reference point (12 chars/inch at 18pt), floored so very large
/// fonts never estimate a degenerate density. Line count is the character
/// count divided by line capacity, inflated by a wrap buffer for uneven
/// word breaks. All constants are public fields so callers and tests can
/// pin exact outputs.
#[derive(Debug, Clone)]
pub struct Estimator {
    /// Font size the character density is calibrated at.
    pub reference_font_pt: f64,
    /// Characters per inch at the reference font size.
    pub chars_per_inch_at_reference: f64,
    /// Density floor for very large fonts.
    pub min_chars_per_inch: f64,
    /// Multiplier on the estimated line count to absorb word-wrap overhead.
    pub wrap_buffer: f64,
    /// Leading multiplier on the font size for line height.
    pub line_spacing: f64,
    /// Height returned for empty text when no minimum is supplied.
    pub empty_height_in: f64,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            reference_font_pt: 18.0,
            chars_per_inch_at_reference: 12.0,
            min_chars_per_inch: 8.0,
            wrap_buffer: 1.2,
            line_spacing: 1.2,
            empty_height_in: 0.5,
        }
    }
}

impl Estimator {
    /// Estimate the height in inches of `text` wrapped into a box
    /// `width_in` inches wide at `font_pt` points, clamped into
    /// `[min_height, max_height]` where supplied.
    pub fn estimate(
        &self,
        text: &str,
        width_in: f64,
        font_pt: f64,
        min_height: Option<f64>,
        max_height: Option<f64>,
    ) -> f64 {
        if text.is_empty() {
            return min_height.unwrap_or(self.empty_height_in);
        }

        let chars_per_inch = (self.chars_per_inch_at_reference * (self.reference_font_pt / font_pt))
            .max(self.min_chars_per_inch);
        // A zero-width box still holds one character per line.
        let chars_per_line = ((width_in * chars_per_inch).floor()).max(1.0);

        let lines = ((text.chars().count() as f64 / chars_per_line).floor() + 1.0).max(1.0);
        let lines = (lines * self.wrap_buffer).floor();

        let line_height_in = font_pt * self.line_spacing / 72.0;
        let mut height = lines * line_height_in;

        if let Some(min) = min_height {
            height = height.max(min);
        }
        if let Some(max) = max_height {
            height = height.min(max);
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_text() {
        let est = Estimator::default();
        assert!(close(est.estimate("", 5.0, 18.0, None, None), 0.5));
        assert!(close(est.estimate("", 5.0, 18.0, Some(0.8), None), 0.8));
    }

    #[test]
    fn test_single_line_at_reference_font() {
        let est = Estimator::default();
        // 12 chars/inch at 18pt, 5" wide -> 60 chars/line. 10 chars is one
        // line, inflated: floor(1 * 1.2) = 1 line of 18 * 1.2 / 72 = 0.3".
        let h = est.estimate("ten chars.", 5.0, 18.0, None, None);
        assert!(close(h, 0.3));
    }

    #[test]
    fn test_wrapped_text_grows() {
        let est = Estimator::default();
        let short = est.estimate(&"x".repeat(10), 5.0, 18.0, None, None);
        let long = est.estimate(&"x".repeat(200), 5.0, 18.0, None, None);
        assert!(long > short);
        // 200 chars / 60 per line -> floor(3.33) + 1 = 4 lines, buffered:
        // floor(4 * 1.2) = 4 lines -> 1.2".
        assert!(close(long, 1.2));
    }

    #[test]
    fn test_density_floor_for_large_fonts() {
        let est = Estimator::default();
        // At 44pt, 12 * 18/44 = 4.9 chars/inch, floored to 8.
        // 5" * 8 = 40 chars/line; 50 chars -> 2 lines, buffered -> 2 lines.
        let h = est.estimate(&"x".repeat(50), 5.0, 44.0, None, None);
        assert!(close(h, 2.0 * 44.0 * 1.2 / 72.0));
    }

    #[test]
    fn test_clamping() {
        let est = Estimator::default();
        let h = est.estimate("short", 5.0, 18.0, Some(0.8), None);
        assert!(close(h, 0.8));
        let h = est.estimate(&"x".repeat(2000), 5.0, 18.0, Some(0.8), Some(3.0));
        assert!(close(h, 3.0));
    }

    #[test]
    fn test_zero_width_box_does_not_divide_by_zero() {
        let est = Estimator::default();
        let h = est.estimate("abc", 0.0, 18.0, None, None);
        assert!(h.is_finite());
        assert!(h > 0.0);
    }

    #[test]
    fn test_monotonic_in_text_length() {
        let est = Estimator::default();
        let mut last = 0.0;
        for len in [1usize, 50, 100, 400, 1600] {
            let h = est.estimate(&"y".repeat(len), 4.0, 14.0, None, None);
            assert!(h >= last);
            last = h;
        }
    }
}
