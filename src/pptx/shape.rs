/// Shape types and DrawingML serialization for generated slides.
use std::fmt::Write as FmtWrite;

use super::format::{ImageFormat, RunFont};
use super::xml::escape_xml;
use crate::error::Result;

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn attr(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
        }
    }
}

/// A formatted run of text within a paragraph.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub font: RunFont,
}

impl TextRun {
    pub fn new(text: impl Into<String>, font: RunFont) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }
}

/// A paragraph of one or more runs.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub align: Option<Align>,
    /// Space after the paragraph, in points.
    pub space_after_pt: Option<f64>,
}

impl Paragraph {
    /// A paragraph holding a single run.
    pub fn single(text: impl Into<String>, font: RunFont) -> Self {
        Self {
            runs: vec![TextRun::new(text, font)],
            align: None,
            space_after_pt: None,
        }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn space_after(mut self, points: f64) -> Self {
        self.space_after_pt = Some(points);
        self
    }
}

/// Text insets inside a frame, in EMUs.
#[derive(Debug, Clone, Copy)]
pub struct Insets {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

/// A text frame holding paragraphs, attached to a text box or a geometry box.
#[derive(Debug, Clone, Default)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
    pub word_wrap: bool,
    pub insets: Option<Insets>,
    /// Anchor text to the vertical center of the frame.
    pub anchor_center: bool,
}

impl TextFrame {
    /// A frame holding one single-run paragraph.
    pub fn single(text: impl Into<String>, font: RunFont) -> Self {
        Self {
            paragraphs: vec![Paragraph::single(text, font)],
            ..Self::default()
        }
    }

    pub fn wrapped(mut self) -> Self {
        self.word_wrap = true;
        self
    }
}

/// Outline styling for a geometry box.
#[derive(Debug, Clone)]
pub struct Outline {
    /// Hex RGB color.
    pub color: String,
    /// Line width in points.
    pub width_pt: f64,
}

/// A shape on a slide.
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) shape_id: u32,
    pub(crate) kind: ShapeKind,
}

#[derive(Debug, Clone)]
pub(crate) enum ShapeKind {
    TextBox {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        frame: TextFrame,
    },
    /// A preset-geometry autoshape ("roundRect", "homePlate", "chevron", ...)
    /// with optional fill, outline and contained text.
    GeomBox {
        preset: &'static str,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        fill_color: Option<String>,
        outline: Option<Outline>,
        frame: Option<TextFrame>,
    },
    Picture {
        data: Vec<u8>,
        format: ImageFormat,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        description: String,
    },
}

impl Shape {
    pub(crate) fn new_text_box(
        shape_id: u32,
        frame: TextFrame,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    ) -> Self {
        Self {
            shape_id,
            kind: ShapeKind::TextBox {
                x,
                y,
                width,
                height,
                frame,
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_geom_box(
        shape_id: u32,
        preset: &'static str,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        fill_color: Option<String>,
        outline: Option<Outline>,
        frame: Option<TextFrame>,
    ) -> Self {
        Self {
            shape_id,
            kind: ShapeKind::GeomBox {
                preset,
                x,
                y,
                width,
                height,
                fill_color,
                outline,
                frame,
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_picture(
        shape_id: u32,
        data: Vec<u8>,
        format: ImageFormat,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        description: String,
    ) -> Self {
        Self {
            shape_id,
            kind: ShapeKind::Picture {
                data,
                format,
                x,
                y,
                width,
                height,
                description,
            },
        }
    }

    /// Get image data if this shape is a picture.
    pub(crate) fn image_data(&self) -> Option<(&[u8], ImageFormat)> {
        match &self.kind {
            ShapeKind::Picture { data, format, .. } => Some((data.as_slice(), *format)),
            _ => None,
        }
    }

    /// Generate DrawingML for this shape.
    ///
    /// For pictures, `image_rel_id` is the relationship ID assigned at save
    /// time for the embedded image part.
    pub(crate) fn to_xml(&self, xml: &mut String, image_rel_id: Option<&str>) -> Result<()> {
        match &self.kind {
            ShapeKind::TextBox {
                x,
                y,
                width,
                height,
                frame,
            } => {
                xml.push_str("<p:sp>");
                xml.push_str("<p:nvSpPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Text Box {}"/>"#,
                    self.shape_id, self.shape_id
                )?;
                xml.push_str("<p:cNvSpPr txBox=\"1\"/>");
                xml.push_str("<p:nvPr/>");
                xml.push_str("</p:nvSpPr>");

                xml.push_str("<p:spPr>");
                write_xfrm(xml, *x, *y, *width, *height)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                xml.push_str("</p:spPr>");

                write_tx_body(xml, frame)?;
                xml.push_str("</p:sp>");
            }
            ShapeKind::GeomBox {
                preset,
                x,
                y,
                width,
                height,
                fill_color,
                outline,
                frame,
            } => {
                xml.push_str("<p:sp>");
                xml.push_str("<p:nvSpPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Shape {}"/>"#,
                    self.shape_id, self.shape_id
                )?;
                xml.push_str("<p:cNvSpPr/>");
                xml.push_str("<p:nvPr/>");
                xml.push_str("</p:nvSpPr>");

                xml.push_str("<p:spPr>");
                write_xfrm(xml, *x, *y, *width, *height)?;
                write!(xml, r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#, preset)?;

                if let Some(color) = fill_color {
                    write!(
                        xml,
                        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                        color
                    )?;
                }

                if let Some(line) = outline {
                    write!(
                        xml,
                        r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                        super::emu_from_points(line.width_pt),
                        line.color
                    )?;
                }

                xml.push_str("</p:spPr>");

                if let Some(frame) = frame {
                    write_tx_body(xml, frame)?;
                }
                xml.push_str("</p:sp>");
            }
            ShapeKind::Picture {
                data: _,
                format: _,
                x,
                y,
                width,
                height,
                description,
            } => {
                xml.push_str("<p:pic>");
                xml.push_str("<p:nvPicPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
                    self.shape_id,
                    self.shape_id,
                    escape_xml(description)
                )?;
                xml.push_str("<p:cNvPicPr/>");
                xml.push_str("<p:nvPr/>");
                xml.push_str("</p:nvPicPr>");

                xml.push_str("<p:blipFill>");
                let rid = image_rel_id.unwrap_or("rIdImagePlaceholder");
                write!(xml, r#"<a:blip r:embed="{}"/>"#, rid)?;
                xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
                xml.push_str("</p:blipFill>");

                xml.push_str("<p:spPr>");
                write_xfrm(xml, *x, *y, *width, *height)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                xml.push_str("</p:spPr>");
                xml.push_str("</p:pic>");
            }
        }

        Ok(())
    }
}

fn write_xfrm(xml: &mut String, x: i64, y: i64, width: i64, height: i64) -> Result<()> {
    xml.push_str("<a:xfrm>");
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, x, y)?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, width, height)?;
    xml.push_str("</a:xfrm>");
    Ok(())
}

fn write_tx_body(xml: &mut String, frame: &TextFrame) -> Result<()> {
    xml.push_str("<p:txBody>");

    xml.push_str("<a:bodyPr");
    write!(xml, r#" wrap="{}""#, if frame.word_wrap { "square" } else { "none" })?;
    if let Some(insets) = frame.insets {
        write!(
            xml,
            r#" lIns="{}" tIns="{}" rIns="{}" bIns="{}""#,
            insets.left, insets.top, insets.right, insets.bottom
        )?;
    }
    if frame.anchor_center {
        xml.push_str(r#" anchor="ctr""#);
    }
    xml.push_str(r#" rtlCol="0"/>"#);
    xml.push_str("<a:lstStyle/>");

    for para in &frame.paragraphs {
        write_paragraph(xml, para)?;
    }
    if frame.paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }

    xml.push_str("</p:txBody>");
    Ok(())
}

fn write_paragraph(xml: &mut String, para: &Paragraph) -> Result<()> {
    xml.push_str("<a:p>");

    if para.align.is_some() || para.space_after_pt.is_some() {
        xml.push_str("<a:pPr");
        if let Some(align) = para.align {
            write!(xml, r#" algn="{}""#, align.attr())?;
        }
        if let Some(space) = para.space_after_pt {
            xml.push('>');
            // spcPts val is in hundredths of a point
            write!(
                xml,
                r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
                (space * 100.0).round() as i64
            )?;
            xml.push_str("</a:pPr>");
        } else {
            xml.push_str("/>");
        }
    }

    for run in &para.runs {
        write_run(xml, run)?;
    }

    xml.push_str("</a:p>");
    Ok(())
}

fn write_run(xml: &mut String, run: &TextRun) -> Result<()> {
    xml.push_str("<a:r>");
    xml.push_str("<a:rPr lang=\"en-US\" dirty=\"0\"");

    if let Some(size) = run.font.size_pt {
        // sz is in hundredths of a point
        write!(xml, " sz=\"{}\"", (size * 100.0).round() as u32)?;
    }
    if run.font.bold {
        xml.push_str(" b=\"1\"");
    }
    if run.font.italic {
        xml.push_str(" i=\"1\"");
    }
    if run.font.underline {
        xml.push_str(" u=\"sng\"");
    }

    let has_children = run.font.color.is_some() || run.font.name.is_some();
    if has_children {
        xml.push('>');
        if let Some(ref color) = run.font.color {
            write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?;
        }
        if let Some(ref name) = run.font.name {
            write!(xml, r#"<a:latin typeface="{}"/>"#, escape_xml(name))?;
        }
        xml.push_str("</a:rPr>");
    } else {
        xml.push_str("/>");
    }

    write!(xml, "<a:t>{}</a:t>", escape_xml(&run.text))?;
    xml.push_str("</a:r>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(shape: &Shape) -> String {
        let mut xml = String::new();
        shape.to_xml(&mut xml, None).unwrap();
        xml
    }

    #[test]
    fn test_text_box_xml() {
        let font = RunFont {
            size_pt: Some(18.0),
            bold: true,
            color: Some("333333".to_string()),
            ..RunFont::default()
        };
        let frame = TextFrame::single("Hello", font).wrapped();
        let shape = Shape::new_text_box(100, frame, 914400, 914400, 4572000, 914400);
        let xml = render(&shape);

        assert!(xml.contains("<p:sp>"));
        assert!(xml.contains(r#"<a:off x="914400" y="914400"/>"#));
        assert!(xml.contains(r#"sz="1800""#));
        assert!(xml.contains(r#"b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="333333"/>"#));
        assert!(xml.contains("<a:t>Hello</a:t>"));
        assert!(xml.contains(r#"wrap="square""#));
    }

    #[test]
    fn test_geom_box_xml() {
        let shape = Shape::new_geom_box(
            101,
            "roundRect",
            0,
            0,
            914400,
            914400,
            Some("F5F5F5".to_string()),
            Some(Outline {
                color: "FF9900".to_string(),
                width_pt: 1.5,
            }),
            None,
        );
        let xml = render(&shape);

        assert!(xml.contains(r#"<a:prstGeom prst="roundRect">"#));
        assert!(xml.contains(r#"<a:srgbClr val="F5F5F5"/>"#));
        assert!(xml.contains(r#"<a:ln w="19050">"#));
    }

    #[test]
    fn test_text_escaped() {
        let frame = TextFrame::single("a < b & c", RunFont::default());
        let shape = Shape::new_text_box(100, frame, 0, 0, 1, 1);
        let xml = render(&shape);
        assert!(xml.contains("<a:t>a &lt; b &amp; c</a:t>"));
    }

    #[test]
    fn test_paragraph_space_after() {
        let mut xml = String::new();
        let para = Paragraph::single("x", RunFont::default()).space_after(8.0);
        write_paragraph(&mut xml, &para).unwrap();
        assert!(xml.contains(r#"<a:spcPts val="800"/>"#));
    }
}
