/// Presentation model and presentation.xml generation.
use std::fmt::Write as FmtWrite;
use std::path::Path;

use super::slide::Slide;
use crate::error::Result;

/// A presentation under construction.
///
/// Dimensions are in EMUs (English Metric Units, 914,400 EMU = 1 inch);
/// the default size is 10" x 7.5" (standard 4:3 aspect ratio).
#[derive(Debug)]
pub struct Presentation {
    pub(crate) slides: Vec<Slide>,
    slide_width: i64,
    slide_height: i64,
}

impl Presentation {
    /// Create a new empty presentation with default dimensions.
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            slide_width: 9_144_000,  // 10 inches
            slide_height: 6_858_000, // 7.5 inches
        }
    }

    /// Add a new slide to the presentation.
    pub fn add_slide(&mut self) -> &mut Slide {
        let slide_id = (self.slides.len() + 256) as u32;
        self.slides.push(Slide::new(slide_id));
        self.slides.last_mut().unwrap()
    }

    /// Get the number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Get the slide width in EMUs.
    pub fn slide_width(&self) -> i64 {
        self.slide_width
    }

    /// Set the slide width in EMUs.
    pub fn set_slide_width(&mut self, width: i64) {
        self.slide_width = width;
    }

    /// Get the slide height in EMUs.
    pub fn slide_height(&self) -> i64 {
        self.slide_height
    }

    /// Set the slide height in EMUs.
    pub fn set_slide_height(&mut self, height: i64) {
        self.slide_height = height;
    }

    /// Save the presentation as a .pptx package.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::package::save(self, path.as_ref())
    }

    /// Generate presentation.xml content with actual slide relationship IDs.
    pub(crate) fn generate_presentation_xml(&self, slide_rel_ids: &[String]) -> Result<String> {
        let mut xml = String::with_capacity(2048);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);

        xml.push_str("<p:sldMasterIdLst>");
        xml.push_str(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#);
        xml.push_str("</p:sldMasterIdLst>");

        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for (index, slide) in self.slides.iter().enumerate() {
                let rel_id = slide_rel_ids.get(index).map(|s| s.as_str()).unwrap_or("rId2");
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="{}"/>"#,
                    slide.slide_id(),
                    rel_id
                )?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.slide_width, self.slide_height
        )?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");

        Ok(xml)
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::format::RunFont;
    use crate::pptx::shape::TextFrame;

    #[test]
    fn test_create_presentation() {
        let pres = Presentation::new();
        assert_eq!(pres.slide_count(), 0);
        assert_eq!(pres.slide_width(), 9_144_000);
        assert_eq!(pres.slide_height(), 6_858_000);
    }

    #[test]
    fn test_add_slide() {
        let mut pres = Presentation::new();
        let slide = pres.add_slide();
        assert_eq!(slide.slide_id(), 256);
        assert_eq!(pres.slide_count(), 1);
    }

    #[test]
    fn test_presentation_xml() {
        let mut pres = Presentation::new();
        pres.add_slide();
        pres.add_slide();

        let xml = pres
            .generate_presentation_xml(&["rId2".to_string(), "rId3".to_string()])
            .unwrap();
        assert!(xml.contains("<p:sldIdLst>"));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(xml.contains(r#"<p:sldId id="257" r:id="rId3"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));
    }

    #[test]
    fn test_slide_content_round_trip() {
        let mut pres = Presentation::new();
        let slide = pres.add_slide();
        slide.add_text_box(
            TextFrame::single("Test", RunFont::default()),
            100,
            100,
            500,
            200,
        );
        let slide_xml = pres.slides[0].to_xml(&[], &[]).unwrap();
        assert!(slide_xml.contains("<a:t>Test</a:t>"));
    }
}
