//! Template slide extraction.
//!
//! Reads one slide out of a user-supplied .pptx and carries its shape
//! subtrees verbatim onto generated slides, so run-level template styling
//! survives untouched. Images the shapes reference are pulled out of the
//! template package and re-embedded with fresh relationship IDs at save
//! time.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::warn;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::{DeckError, Result};
use crate::pptx::{ClonedImage, ClonedShape, ImageFormat};

/// Reusable background and shapes from one template slide.
#[derive(Debug, Clone, Default)]
pub struct SlideTemplate {
    /// Solid background fill (hex RGB), when the slide sets one.
    pub background: Option<String>,
    pub shapes: Vec<ClonedShape>,
}

impl SlideTemplate {
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.shapes.is_empty()
    }
}

/// Load slide `slide_index` (0-based) from a template presentation,
/// logging a warning and returning `None` on any failure. A broken
/// template degrades the branding, not the run.
pub fn load_or_warn(path: &Path, slide_index: usize) -> Option<SlideTemplate> {
    match load(path, slide_index) {
        Ok(template) => Some(template),
        Err(err) => {
            warn!("could not load template {}: {err}", path.display());
            None
        }
    }
}

/// Load slide `slide_index` (0-based) from a template presentation.
pub fn load(path: &Path, slide_index: usize) -> Result<SlideTemplate> {
    let mut archive = ZipArchive::new(File::open(path)?)?;

    let part = format!("ppt/slides/slide{}.xml", slide_index + 1);
    let slide_xml = read_part(&mut archive, &part)
        .map_err(|_| DeckError::PartNotFound(part.clone()))?;

    let rels_part = format!("ppt/slides/_rels/slide{}.xml.rels", slide_index + 1);
    let rel_targets = match read_part(&mut archive, &rels_part) {
        Ok(xml) => parse_relationships(&xml)?,
        // A slide without relationships is legal
        Err(_) => HashMap::new(),
    };

    let (background, shape_spans) = scan_slide(&slide_xml)?;

    let mut shapes = Vec::with_capacity(shape_spans.len());
    'shape: for span in shape_spans {
        let xml = slide_xml[span].to_string();
        let mut images: Vec<ClonedImage> = Vec::new();
        for (attr, rel_id) in relationship_refs(&xml) {
            // Only image embeds can be carried into the new package; a
            // shape wired to any other part (chart, SmartArt, hyperlink)
            // would leave a dangling relationship in the generated slide.
            if attr != "embed" && attr != "link" {
                warn!("skipping template shape with unsupported relationship r:{attr}=\"{rel_id}\"");
                continue 'shape;
            }
            if images.iter().any(|image| image.rel_id == rel_id) {
                continue;
            }
            match load_image(&mut archive, &rel_targets, &rel_id) {
                Ok((data, format)) => images.push(ClonedImage {
                    rel_id,
                    data,
                    format,
                }),
                Err(err) => {
                    warn!("skipping template shape, unresolved image {rel_id}: {err}");
                    continue 'shape;
                }
            }
        }
        shapes.push(ClonedShape { xml, images });
    }

    Ok(SlideTemplate { background, shapes })
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name)?;
    let mut content = String::with_capacity(entry.size() as usize);
    entry.read_to_string(&mut content)?;
    Ok(content)
}

/// Walk the slide part once, returning the background fill (if solid) and
/// the byte spans of the spTree's direct shape children.
fn scan_slide(slide_xml: &str) -> Result<(Option<String>, Vec<std::ops::Range<usize>>)> {
    const SHAPE_ELEMENTS: [&[u8]; 5] = [
        b"p:sp",
        b"p:pic",
        b"p:grpSp",
        b"p:cxnSp",
        b"p:graphicFrame",
    ];

    let mut reader = Reader::from_str(slide_xml);
    let mut background = None;
    let mut spans = Vec::new();
    let mut in_sp_tree = false;
    let mut in_bg = false;

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                if in_sp_tree && SHAPE_ELEMENTS.contains(&name.as_ref()) {
                    reader.read_to_end(name)?;
                    spans.push(start..reader.buffer_position() as usize);
                } else if name.as_ref() == b"p:spTree" {
                    in_sp_tree = true;
                } else if name.as_ref() == b"p:bg" {
                    in_bg = true;
                } else if in_bg && name.as_ref() == b"a:srgbClr" && background.is_none() {
                    // Non-empty form, e.g. <a:srgbClr val="…"><a:alpha …/></a:srgbClr>
                    background = color_val(&e)?;
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                if in_sp_tree && SHAPE_ELEMENTS.contains(&name.as_ref()) {
                    spans.push(start..reader.buffer_position() as usize);
                } else if in_bg && name.as_ref() == b"a:srgbClr" && background.is_none() {
                    background = color_val(&e)?;
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"p:spTree" => in_sp_tree = false,
                b"p:bg" => in_bg = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((background, spans))
}

fn color_val(e: &quick_xml::events::BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"val" {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

/// Parse a .rels part into an Id -> Target map.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).into_owned())
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

/// Every relationship reference in a shape subtree, as
/// `(attribute, rel_id)` pairs in document order. Covers the whole
/// `r:` attribute namespace, not just image blips: charts carry
/// `r:id`, SmartArt carries `r:dm`/`r:lo`/`r:qs`/`r:cs`, hyperlinks
/// carry `r:id` on `a:hlinkClick`.
fn relationship_refs(xml: &str) -> Vec<(String, String)> {
    let mut refs: Vec<(String, String)> = Vec::new();
    let mut rest = xml;
    while let Some(pos) = rest.find(" r:") {
        rest = &rest[pos + 3..];
        let Some(name_len) = rest.find(|c: char| !c.is_ascii_alphanumeric()) else {
            break;
        };
        let attr = &rest[..name_len];
        let tail = &rest[name_len..];
        if attr.is_empty() || !tail.starts_with("=\"") {
            continue;
        }
        let value = &tail[2..];
        let Some(end) = value.find('"') else { break };
        let id = &value[..end];
        if !id.is_empty()
            && !refs
                .iter()
                .any(|(existing_attr, existing_id)| existing_attr == attr && existing_id == id)
        {
            refs.push((attr.to_string(), id.to_string()));
        }
        rest = &value[end..];
    }
    refs
}

fn load_image(
    archive: &mut ZipArchive<File>,
    rel_targets: &HashMap<String, String>,
    rel_id: &str,
) -> Result<(Vec<u8>, ImageFormat)> {
    let target = rel_targets
        .get(rel_id)
        .ok_or_else(|| DeckError::PartNotFound(format!("relationship {rel_id}")))?;

    // Slide-relative targets ("../media/image1.png") resolve under ppt/
    let part = target
        .strip_prefix("../")
        .map(|rest| format!("ppt/{rest}"))
        .unwrap_or_else(|| target.trim_start_matches('/').to_string());

    let mut entry = archive
        .by_name(&part)
        .map_err(|_| DeckError::PartNotFound(part.clone()))?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;

    let format = ImageFormat::detect_from_bytes(&data).ok_or_else(|| {
        DeckError::InvalidFormat(format!("unsupported image format in {part}"))
    })?;
    Ok((data, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_refs() {
        let xml = r#"<p:pic><a:blip r:embed="rId3"/><a:blip r:link="rId4"/><a:blip r:embed="rId3"/></p:pic>"#;
        assert_eq!(
            relationship_refs(xml),
            vec![
                ("embed".to_string(), "rId3".to_string()),
                ("link".to_string(), "rId4".to_string()),
            ]
        );
        assert!(relationship_refs("<p:sp/>").is_empty());
    }

    #[test]
    fn test_relationship_refs_sees_non_image_attributes() {
        let chart = r#"<p:graphicFrame><a:graphic><a:graphicData><c:chart r:id="rId3"/></a:graphicData></a:graphic></p:graphicFrame>"#;
        assert_eq!(
            relationship_refs(chart),
            vec![("id".to_string(), "rId3".to_string())]
        );

        let diagram = r#"<dgm:relIds r:dm="rId5" r:lo="rId6" r:qs="rId7" r:cs="rId8"/>"#;
        let refs = relationship_refs(diagram);
        let attrs: Vec<&str> = refs.iter().map(|(attr, _)| attr.as_str()).collect();
        assert_eq!(attrs, vec!["dm", "lo", "qs", "cs"]);
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="t" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="t" Target="../media/image1.png"/></Relationships>"#;
        let targets = parse_relationships(xml).unwrap();
        assert_eq!(targets["rId2"], "../media/image1.png");
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_scan_slide_captures_shape_spans() {
        let xml = concat!(
            r#"<p:sld><p:cSld>"#,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="112233"/></a:solidFill></p:bgPr></p:bg>"#,
            r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr>"#,
            r#"<p:sp><p:spPr/><p:txBody><a:p><a:r><a:t>kept</a:t></a:r></a:p></p:txBody></p:sp>"#,
            r#"<p:pic><a:blip r:embed="rId2"/></p:pic>"#,
            r#"</p:spTree></p:cSld></p:sld>"#
        );
        let (background, spans) = scan_slide(xml).unwrap();
        assert_eq!(background.as_deref(), Some("112233"));
        assert_eq!(spans.len(), 2);
        let first = &xml[spans[0].clone()];
        assert!(first.starts_with("<p:sp>"));
        assert!(first.ends_with("</p:sp>"));
        assert!(first.contains("kept"));
        assert!(xml[spans[1].clone()].starts_with("<p:pic>"));
    }

    #[test]
    fn test_scan_slide_skips_group_preamble() {
        let xml = r#"<p:sld><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:sld>"#;
        let (background, spans) = scan_slide(xml).unwrap();
        assert!(background.is_none());
        assert!(spans.is_empty());
    }

    #[test]
    fn test_scan_slide_reads_background_with_child_elements() {
        let xml = concat!(
            r#"<p:sld><p:cSld>"#,
            r#"<p:bg><p:bgPr><a:solidFill>"#,
            r#"<a:srgbClr val="112233"><a:alpha val="50000"/></a:srgbClr>"#,
            r#"</a:solidFill></p:bgPr></p:bg>"#,
            r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr></p:spTree>"#,
            r#"</p:cSld></p:sld>"#
        );
        let (background, spans) = scan_slide(xml).unwrap();
        assert_eq!(background.as_deref(), Some("112233"));
        assert!(spans.is_empty());
    }

    #[test]
    fn test_load_drops_shape_wired_to_non_image_part() {
        use std::io::Write;

        let slide_xml = concat!(
            r#"<p:sld><p:cSld><p:spTree>"#,
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr>"#,
            r#"<p:sp><p:spPr/><p:txBody><a:p><a:r><a:t>kept</a:t></a:r></a:p></p:txBody></p:sp>"#,
            r#"<p:graphicFrame><a:graphic><a:graphicData>"#,
            r#"<c:chart r:id="rId3"/>"#,
            r#"</a:graphicData></a:graphic></p:graphicFrame>"#,
            r#"</p:spTree></p:cSld></p:sld>"#
        );
        let rels_xml = concat!(
            r#"<?xml version="1.0"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId3" Type="t" Target="../charts/chart1.xml"/>"#,
            r#"</Relationships>"#
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.pptx");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("ppt/slides/slide1.xml", options).unwrap();
        zip.write_all(slide_xml.as_bytes()).unwrap();
        zip.start_file("ppt/slides/_rels/slide1.xml.rels", options)
            .unwrap();
        zip.write_all(rels_xml.as_bytes()).unwrap();
        zip.finish().unwrap();

        let template = load(&path, 0).unwrap();
        // The chart frame would dangle its rId3 in the generated package
        assert_eq!(template.shapes.len(), 1);
        assert!(template.shapes[0].xml.contains("kept"));
        assert!(!template.shapes[0].xml.contains("rId3"));
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(load(Path::new("/nonexistent/deck.pptx"), 0).is_err());
    }
}
