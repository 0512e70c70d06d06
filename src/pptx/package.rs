//! OPC package serialization.
//!
//! Writes a [`Presentation`](super::pres::Presentation) out as a .pptx ZIP
//! container: content types, package and part relationships, the static
//! master/layout/theme parts, one part per slide, and the media files the
//! slides embed. Image relationship IDs are assigned here, per slide, with
//! a single global counter naming the media parts.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::format::ImageFormat;
use super::pres::Presentation;
use super::template;
use crate::error::Result;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const OFFICE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A media part queued for writing under ppt/media/.
struct MediaFile {
    name: String,
    data: Vec<u8>,
}

/// Serialize the presentation to `path` as a .pptx package.
pub(crate) fn save(pres: &Presentation, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // Resolve per-slide image relationships and collect media up front so
    // slide XML, slide rels and [Content_Types].xml all agree.
    let mut media: Vec<MediaFile> = Vec::new();
    let mut image_formats: BTreeSet<ImageFormat> = BTreeSet::new();
    let mut slide_parts: Vec<(String, String)> = Vec::with_capacity(pres.slides.len());

    for slide in &pres.slides {
        let mut rels = String::new();
        write!(
            rels,
            r#"<Relationship Id="rId1" Type="{OFFICE_REL}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#
        )?;
        let mut next_rel = 2usize;

        let mut add_image = |rels: &mut String,
                             next_rel: &mut usize,
                             data: &[u8],
                             format: ImageFormat|
         -> std::result::Result<String, std::fmt::Error> {
            let rel_id = format!("rId{next_rel}");
            *next_rel += 1;
            let name = format!("image{}.{}", media.len() + 1, format.extension());
            write!(
                rels,
                r#"<Relationship Id="{rel_id}" Type="{OFFICE_REL}/image" Target="../media/{name}"/>"#
            )?;
            image_formats.insert(format);
            media.push(MediaFile {
                name,
                data: data.to_vec(),
            });
            Ok(rel_id)
        };

        let mut cloned_rel_ids: Vec<Vec<String>> = Vec::with_capacity(slide.cloned.len());
        for cloned in &slide.cloned {
            let mut ids = Vec::with_capacity(cloned.images.len());
            for image in &cloned.images {
                ids.push(add_image(&mut rels, &mut next_rel, &image.data, image.format)?);
            }
            cloned_rel_ids.push(ids);
        }

        let mut picture_rel_ids: Vec<String> = Vec::new();
        for (data, format) in slide.picture_images() {
            picture_rel_ids.push(add_image(&mut rels, &mut next_rel, data, format)?);
        }

        let slide_xml = slide.to_xml(&picture_rel_ids, &cloned_rel_ids)?;
        slide_parts.push((slide_xml, wrap_relationships(&rels)));
    }

    write_part(
        &mut zip,
        "[Content_Types].xml",
        &content_types_xml(slide_parts.len(), &image_formats)?,
        options,
    )?;
    write_part(&mut zip, "_rels/.rels", &package_rels_xml()?, options)?;
    write_part(
        &mut zip,
        "docProps/core.xml",
        template::CORE_PROPS_XML,
        options,
    )?;
    write_part(
        &mut zip,
        "docProps/app.xml",
        template::APP_PROPS_XML,
        options,
    )?;

    let slide_rel_ids: Vec<String> = (0..slide_parts.len())
        .map(|i| format!("rId{}", i + 2))
        .collect();
    write_part(
        &mut zip,
        "ppt/presentation.xml",
        &pres.generate_presentation_xml(&slide_rel_ids)?,
        options,
    )?;
    write_part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels_xml(slide_parts.len())?,
        options,
    )?;

    write_part(
        &mut zip,
        "ppt/slideMasters/slideMaster1.xml",
        template::SLIDE_MASTER_XML,
        options,
    )?;
    write_part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &wrap_relationships(&format!(
            concat!(
                r#"<Relationship Id="rId1" Type="{rel}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
                r#"<Relationship Id="rId2" Type="{rel}/theme" Target="../theme/theme1.xml"/>"#
            ),
            rel = OFFICE_REL
        )),
        options,
    )?;
    write_part(
        &mut zip,
        "ppt/slideLayouts/slideLayout1.xml",
        template::SLIDE_LAYOUT_XML,
        options,
    )?;
    write_part(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &wrap_relationships(&format!(
            r#"<Relationship Id="rId1" Type="{OFFICE_REL}/slideMaster" Target="../slideMasters/slideMaster1.xml"/>"#
        )),
        options,
    )?;
    write_part(&mut zip, "ppt/theme/theme1.xml", template::THEME_XML, options)?;
    write_part(&mut zip, "ppt/presProps.xml", template::PRES_PROPS_XML, options)?;
    write_part(&mut zip, "ppt/viewProps.xml", template::VIEW_PROPS_XML, options)?;
    write_part(
        &mut zip,
        "ppt/tableStyles.xml",
        template::TABLE_STYLES_XML,
        options,
    )?;

    for (index, (slide_xml, slide_rels)) in slide_parts.iter().enumerate() {
        let n = index + 1;
        write_part(&mut zip, &format!("ppt/slides/slide{n}.xml"), slide_xml, options)?;
        write_part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            slide_rels,
            options,
        )?;
    }

    for file in &media {
        zip.start_file(format!("ppt/media/{}", file.name), options)?;
        zip.write_all(&file.data)?;
    }

    zip.finish()?;
    Ok(())
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: impl AsRef<[u8]>,
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options)?;
    zip.write_all(content.as_ref())?;
    Ok(())
}

fn wrap_relationships(entries: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="{ns}">{entries}</Relationships>"#
        ),
        ns = REL_NS,
        entries = entries
    )
}

fn package_rels_xml() -> Result<String> {
    let mut entries = String::new();
    write!(
        entries,
        r#"<Relationship Id="rId1" Type="{OFFICE_REL}/officeDocument" Target="ppt/presentation.xml"/>"#
    )?;
    entries.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#);
    write!(
        entries,
        r#"<Relationship Id="rId3" Type="{OFFICE_REL}/extended-properties" Target="docProps/app.xml"/>"#
    )?;
    Ok(wrap_relationships(&entries))
}

fn presentation_rels_xml(slide_count: usize) -> Result<String> {
    let mut entries = String::new();
    write!(
        entries,
        r#"<Relationship Id="rId1" Type="{OFFICE_REL}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#
    )?;
    for index in 0..slide_count {
        write!(
            entries,
            r#"<Relationship Id="rId{}" Type="{OFFICE_REL}/slide" Target="slides/slide{}.xml"/>"#,
            index + 2,
            index + 1
        )?;
    }
    let mut next = slide_count + 2;
    for (kind, target) in [
        ("presProps", "presProps.xml"),
        ("viewProps", "viewProps.xml"),
        ("tableStyles", "tableStyles.xml"),
    ] {
        write!(
            entries,
            r#"<Relationship Id="rId{next}" Type="{OFFICE_REL}/{kind}" Target="{target}"/>"#
        )?;
        next += 1;
    }
    Ok(wrap_relationships(&entries))
}

fn content_types_xml(slide_count: usize, image_formats: &BTreeSet<ImageFormat>) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in image_formats {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.mime_type()
        )?;
    }
    xml.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/presProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/viewProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"/>"#);
    xml.push_str(r#"<Override PartName="/ppt/tableStyles.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    for index in 0..slide_count {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            index + 1
        )?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}
