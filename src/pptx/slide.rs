/// Slide model and slide-part XML generation.
use std::fmt::Write as FmtWrite;

use super::format::ImageFormat;
use super::shape::{Outline, Shape, TextFrame};
use crate::error::{DeckError, Result};

/// An image referenced by a cloned template shape, re-embedded at save time.
#[derive(Debug, Clone)]
pub struct ClonedImage {
    /// Relationship ID inside the template's slide part (e.g. "rId2").
    pub rel_id: String,
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

/// A raw DrawingML subtree cloned verbatim from a template slide.
///
/// Carrying the subtree unchanged preserves run-level formatting exactly;
/// only image relationship IDs are rewritten when the slide is saved.
#[derive(Debug, Clone)]
pub struct ClonedShape {
    pub xml: String,
    pub images: Vec<ClonedImage>,
}

/// A slide in a presentation under construction.
#[derive(Debug, Clone)]
pub struct Slide {
    pub(crate) slide_id: u32,
    /// Solid background fill (hex RGB), if set.
    pub(crate) background: Option<String>,
    /// Template shapes, drawn under the generated content.
    pub(crate) cloned: Vec<ClonedShape>,
    pub(crate) shapes: Vec<Shape>,
}

impl Slide {
    pub(crate) fn new(slide_id: u32) -> Self {
        Self {
            slide_id,
            background: None,
            cloned: Vec::new(),
            shapes: Vec::new(),
        }
    }

    /// Get the slide ID.
    pub fn slide_id(&self) -> u32 {
        self.slide_id
    }

    /// Set a solid background fill color (hex RGB).
    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = Some(color.into());
    }

    /// Append a raw shape cloned from a template slide.
    pub fn push_cloned(&mut self, shape: ClonedShape) {
        self.cloned.push(shape);
    }

    // Generated shape IDs start at 100 to stay clear of the spTree group
    // shape (id 1) and of IDs carried by cloned template shapes.
    fn next_shape_id(&self) -> u32 {
        100 + self.shapes.len() as u32
    }

    /// Add a text box to the slide. Geometry in EMUs.
    pub fn add_text_box(
        &mut self,
        frame: TextFrame,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    ) -> &mut Shape {
        let shape = Shape::new_text_box(self.next_shape_id(), frame, x, y, width, height);
        self.shapes.push(shape);
        self.shapes.last_mut().unwrap()
    }

    /// Add a preset-geometry autoshape ("roundRect", "homePlate", "chevron", ...).
    #[allow(clippy::too_many_arguments)]
    pub fn add_geom_box(
        &mut self,
        preset: &'static str,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        fill_color: Option<String>,
        outline: Option<Outline>,
        frame: Option<TextFrame>,
    ) -> &mut Shape {
        let shape = Shape::new_geom_box(
            self.next_shape_id(),
            preset,
            x,
            y,
            width,
            height,
            fill_color,
            outline,
            frame,
        );
        self.shapes.push(shape);
        self.shapes.last_mut().unwrap()
    }

    /// Add a picture to the slide from bytes. The image format is detected
    /// from the leading magic bytes.
    pub fn add_picture_from_bytes(
        &mut self,
        data: Vec<u8>,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        description: impl Into<String>,
    ) -> Result<()> {
        let format = ImageFormat::detect_from_bytes(&data)
            .ok_or_else(|| DeckError::InvalidFormat("unknown image format".to_string()))?;

        let shape = Shape::new_picture(
            self.next_shape_id(),
            data,
            format,
            x,
            y,
            width,
            height,
            description.into(),
        );
        self.shapes.push(shape);
        Ok(())
    }

    /// Get the number of generated shapes on the slide.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Images from generated picture shapes, in shape order.
    pub(crate) fn picture_images(&self) -> Vec<(&[u8], ImageFormat)> {
        self.shapes.iter().filter_map(|s| s.image_data()).collect()
    }

    /// Generate the slide part XML.
    ///
    /// `picture_rel_ids` are the relationship IDs for generated picture
    /// shapes (in shape order); `cloned_rel_ids[i]` carries the fresh IDs
    /// for `cloned[i].images`, positionally.
    pub(crate) fn to_xml(
        &self,
        picture_rel_ids: &[String],
        cloned_rel_ids: &[Vec<String>],
    ) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" "#,
        );
        xml.push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        xml.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        xml.push_str("<p:cSld>");

        // Background must come before spTree
        if let Some(ref color) = self.background {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                color
            )?;
        }

        xml.push_str("<p:spTree>");
        xml.push_str("<p:nvGrpSpPr>");
        xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
        xml.push_str("<p:cNvGrpSpPr/>");
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvGrpSpPr>");
        xml.push_str("<p:grpSpPr>");
        xml.push_str("<a:xfrm>");
        xml.push_str(r#"<a:off x="0" y="0"/>"#);
        xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
        xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
        xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
        xml.push_str("</a:xfrm>");
        xml.push_str("</p:grpSpPr>");

        // Template shapes first, so generated content draws on top
        for (idx, cloned) in self.cloned.iter().enumerate() {
            let fresh_ids = cloned_rel_ids.get(idx);
            let mut shape_xml = cloned.xml.clone();
            for (img_idx, image) in cloned.images.iter().enumerate() {
                let Some(new_id) = fresh_ids.and_then(|ids| ids.get(img_idx)) else {
                    continue;
                };
                shape_xml = shape_xml
                    .replace(
                        &format!(r#"r:embed="{}""#, image.rel_id),
                        &format!(r#"r:embed="{}""#, new_id),
                    )
                    .replace(
                        &format!(r#"r:link="{}""#, image.rel_id),
                        &format!(r#"r:link="{}""#, new_id),
                    );
            }
            xml.push_str(&shape_xml);
        }

        let mut picture_counter = 0usize;
        for shape in &self.shapes {
            let rel_id = if shape.image_data().is_some() {
                let rid = picture_rel_ids.get(picture_counter).map(|s| s.as_str());
                picture_counter += 1;
                rid
            } else {
                None
            };
            shape.to_xml(&mut xml, rel_id)?;
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
        xml.push_str("</p:sld>");

        Ok(xml)
    }
}
