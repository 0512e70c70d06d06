//! Minimal PresentationML (.pptx) writer.
//!
//! In-memory presentation model plus OPC package serialization. Slides hold
//! shapes (text boxes, preset-geometry boxes, pictures) and optionally raw
//! DrawingML subtrees cloned from a user template; relationship IDs for
//! embedded images are assigned at save time.

pub mod format;
pub mod package;
pub mod pres;
pub mod shape;
pub mod slide;
pub(crate) mod template;
pub(crate) mod xml;

pub use format::{ImageFormat, RunFont};
pub use pres::Presentation;
pub use shape::{Align, Insets, Outline, Paragraph, Shape, TextFrame, TextRun};
pub use slide::{ClonedImage, ClonedShape, Slide};

/// English Metric Units per inch (914,400 EMU = 1 inch).
pub const EMU_PER_INCH: f64 = 914_400.0;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: f64 = 12_700.0;

/// Convert a length in inches to EMUs.
pub fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Convert a length in points to EMUs (line widths, text insets).
pub fn emu_from_points(points: f64) -> i64 {
    (points * EMU_PER_POINT).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_conversions() {
        assert_eq!(emu(1.0), 914_400);
        assert_eq!(emu(0.5), 457_200);
        assert_eq!(emu_from_points(2.0), 25_400);
    }
}
