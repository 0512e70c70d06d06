//! Deck composition.
//!
//! Turns workbook data plus configuration into an ordered slide sequence:
//! title slide, paginated objectives slides, a timeline overview and the
//! per-timeline roadmap detail slides. All lengths are computed in inches
//! and converted to EMUs at the shape boundary.

pub mod template;

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::{Config, LogoPosition, normalize_color};
use crate::error::Result;
use crate::layout::{Estimator, PaginationPlan};
use crate::pptx::{
    Align, Insets, Outline, Paragraph, Presentation, RunFont, Slide, TextFrame, emu,
};
use crate::sheet::{self, ObjectivesData, TimelineGroup, group_roadmap};
use template::SlideTemplate;

const SLIDE_TITLE_TOP_IN: f64 = 0.5;
const SLIDE_TITLE_HEIGHT_IN: f64 = 0.8;
const KEY_ELEMENTS_TITLE_HEIGHT_IN: f64 = 0.6;
const KEY_ELEMENTS_TITLE_SPACING_IN: f64 = 0.8;
const PHASE_HEADER_HEIGHT_IN: f64 = 0.7;
const MIN_ITEM_HEIGHT_IN: f64 = 0.3;

const SECTION_HEADER_PT: f64 = 24.0;
const PHASE_HEADER_PT: f64 = 22.0;
const WORKPACKAGE_PT: f64 = 14.0;
const OVERVIEW_LABEL_PT: f64 = 16.0;
const OVERVIEW_COLUMN_GAP_IN: f64 = 0.25;
const OVERVIEW_ROW_GAP_IN: f64 = 0.4;

/// Template slides resolved once per run.
#[derive(Default)]
struct Templates {
    title: Option<SlideTemplate>,
    content: Option<SlideTemplate>,
}

impl Templates {
    fn load(config: &Config) -> Self {
        Self {
            title: config
                .title_slide_template
                .as_deref()
                .and_then(|p| template::load_or_warn(p, config.template_slide_index)),
            content: config
                .content_slide_template
                .as_deref()
                .and_then(|p| template::load_or_warn(p, config.template_slide_index)),
        }
    }
}

/// Generate the deck for `excel_file` and return the output path.
///
/// When `output` is `None` the deck lands next to the input with a .pptx
/// extension.
pub fn generate_presentation(
    excel_file: &Path,
    output: Option<&Path>,
    config: &Config,
) -> Result<PathBuf> {
    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| excel_file.with_extension("pptx"));

    // Sync clients may hold the workbook open with an exclusive lock; read
    // a private copy instead. The copy keeps the original extension so the
    // reader can sniff the format, and is removed on drop.
    let extension = excel_file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xlsx");
    let temp = tempfile::Builder::new()
        .prefix("roadmap-deck-")
        .suffix(&format!(".{extension}"))
        .tempfile()?;
    fs::copy(excel_file, temp.path())?;

    let objectives = sheet::read_objectives(temp.path());
    let entries = sheet::read_roadmap(temp.path());
    drop(temp);

    info!("found {} roadmap entries", entries.len());
    info!(
        "north star: {}",
        objectives.north_star.as_deref().unwrap_or("not found")
    );
    info!("key elements: {} items", objectives.key_elements.len());

    let groups = group_roadmap(&entries);
    let estimator = Estimator::default();
    let templates = Templates::load(config);

    let mut pres = Presentation::new();
    pres.set_slide_width(emu(config.slide_width_in));
    pres.set_slide_height(emu(config.slide_height_in));

    create_title_slide(&mut pres, &objectives, config, &templates);
    create_objectives_slides(&mut pres, &objectives, config, &estimator, &templates);
    if !groups.is_empty() {
        create_overview_slide(&mut pres, &groups, config, &templates);
        create_roadmap_slides(&mut pres, &groups, config, &templates);
    }

    pres.save(&output_path)?;
    info!(
        "saved {} slides to {}",
        pres.slide_count(),
        output_path.display()
    );
    Ok(output_path)
}

/// Add a slide with background, template shapes and logo applied.
fn start_slide<'a>(
    pres: &'a mut Presentation,
    config: &Config,
    template: Option<&SlideTemplate>,
) -> &'a mut Slide {
    let slide = pres.add_slide();
    slide.set_background(normalize_color(&config.brand_background_color).to_string());

    if let Some(template) = template {
        if let Some(ref background) = template.background {
            slide.set_background(background.clone());
        }
        for shape in &template.shapes {
            slide.push_cloned(shape.clone());
        }
    }

    if let Some(logo_path) = config.logo_path.clone() {
        add_logo(slide, &logo_path, config);
    }
    slide
}

fn add_logo(slide: &mut Slide, logo_path: &Path, config: &Config) {
    let data = match fs::read(logo_path) {
        Ok(data) => data,
        Err(err) => {
            warn!("could not read logo {}: {err}", logo_path.display());
            return;
        }
    };

    let (left_in, top_in) = match config.logo_position {
        LogoPosition::TopLeft => (0.5, 0.3),
        LogoPosition::TopRight => (config.slide_width_in - 1.5, 0.3),
        LogoPosition::BottomLeft => (0.5, config.slide_height_in - 0.8),
        LogoPosition::BottomRight => (
            config.slide_width_in - 1.5,
            config.slide_height_in - 0.8,
        ),
        LogoPosition::Center => ((config.slide_width_in - 1.0) / 2.0, 0.3),
    };

    if let Err(err) =
        slide.add_picture_from_bytes(data, emu(left_in), emu(top_in), emu(1.0), emu(0.7), "Logo")
    {
        warn!("could not embed logo {}: {err}", logo_path.display());
    }
}

fn run_font(name: &str, size_pt: f64, bold: bool, color: &str) -> RunFont {
    RunFont {
        name: Some(name.to_string()),
        size_pt: Some(size_pt),
        bold,
        color: Some(normalize_color(color).to_string()),
        ..RunFont::default()
    }
}

fn page_title(base: &str, page: usize, pages: usize) -> String {
    if pages > 1 {
        format!("{} (Page {} of {})", base, page + 1, pages)
    } else {
        base.to_string()
    }
}

fn add_slide_title(slide: &mut Slide, text: String, config: &Config) {
    let frame = TextFrame::single(
        text,
        run_font(
            &config.title_font_name,
            config.heading_font_pt,
            true,
            &config.brand_primary_color,
        ),
    );
    slide.add_text_box(
        frame,
        emu(config.side_margin_in),
        emu(SLIDE_TITLE_TOP_IN),
        emu(config.content_width_in()),
        emu(SLIDE_TITLE_HEIGHT_IN),
    );
}

fn create_title_slide(
    pres: &mut Presentation,
    objectives: &ObjectivesData,
    config: &Config,
    templates: &Templates,
) {
    let slide = start_slide(pres, config, templates.title.as_ref());

    let title = Paragraph::single(
        "Roadmap Presentation",
        run_font(
            &config.title_font_name,
            config.title_font_pt,
            true,
            &config.brand_primary_color,
        ),
    )
    .aligned(Align::Center);
    slide.add_text_box(
        TextFrame {
            paragraphs: vec![title],
            ..TextFrame::default()
        },
        emu(config.side_margin_in),
        emu(config.title_top_margin_in),
        emu(config.content_width_in()),
        emu(2.0),
    );

    if let Some(ref north_star) = objectives.north_star {
        let subtitle = Paragraph::single(
            north_star.clone(),
            run_font(
                &config.body_font_name,
                config.subtitle_font_pt,
                false,
                &config.brand_secondary_color,
            ),
        )
        .aligned(Align::Center);
        slide.add_text_box(
            TextFrame {
                paragraphs: vec![subtitle],
                word_wrap: true,
                ..TextFrame::default()
            },
            emu(config.side_margin_in),
            emu(config.title_top_margin_in + 2.5),
            emu(config.content_width_in()),
            emu(config.slide_height_in - config.title_top_margin_in - 2.5 - config.bottom_margin_in),
        );
    }
}

fn create_objectives_slides(
    pres: &mut Presentation,
    objectives: &ObjectivesData,
    config: &Config,
    estimator: &Estimator,
    templates: &Templates,
) {
    // The north star box height is content-dependent, so measure it first;
    // it reserves space on every page even though it only renders on the
    // first one, keeping the per-page item capacity constant.
    let north_star_height = objectives.north_star.as_deref().map(|text| {
        let box_width = config.content_width_in() - 2.0 * config.text_box_margin_in;
        estimator.estimate(
            text,
            box_width,
            config.body_font_pt,
            Some(config.north_star_min_height_in),
            Some(config.north_star_max_height_in),
        )
    });
    let north_star_space = north_star_height.map(|h| 1.2 + h + 0.3).unwrap_or(0.0);

    let available_height = config.slide_height_in
        - SLIDE_TITLE_TOP_IN
        - SLIDE_TITLE_HEIGHT_IN
        - north_star_space
        - KEY_ELEMENTS_TITLE_HEIGHT_IN
        - KEY_ELEMENTS_TITLE_SPACING_IN
        - config.bottom_margin_in;
    let plan = PaginationPlan::new(
        objectives.key_elements.len(),
        available_height,
        config.key_element_height_in,
    );

    for (page, range) in plan.pages() {
        let slide = start_slide(pres, config, templates.content.as_ref());
        add_slide_title(
            slide,
            page_title("Objectives", page, plan.page_count()),
            config,
        );

        let mut y = config.content_top_margin_in;

        if page == 0 {
            if let (Some(north_star), Some(height)) =
                (objectives.north_star.as_deref(), north_star_height)
            {
                let header = TextFrame::single(
                    "North Star",
                    run_font(
                        &config.body_font_name,
                        SECTION_HEADER_PT,
                        true,
                        &config.brand_secondary_color,
                    ),
                );
                slide.add_text_box(
                    header,
                    emu(config.side_margin_in),
                    emu(y),
                    emu(config.content_width_in()),
                    emu(1.0),
                );
                y += 1.2;

                let body = run_font(
                    &config.body_font_name,
                    config.body_font_pt,
                    false,
                    &config.brand_text_color,
                );
                if config.use_shapes {
                    let frame = TextFrame {
                        paragraphs: vec![Paragraph::single(north_star, body)],
                        word_wrap: true,
                        insets: Some(Insets {
                            left: emu(config.text_box_margin_in),
                            right: emu(config.text_box_margin_in),
                            top: emu(0.1),
                            bottom: emu(0.1),
                        }),
                        anchor_center: false,
                    };
                    slide.add_geom_box(
                        "roundRect",
                        emu(config.side_margin_in),
                        emu(y),
                        emu(config.content_width_in()),
                        emu(height),
                        Some(normalize_color(&config.content_box_color).to_string()),
                        Some(Outline {
                            color: normalize_color(&config.brand_secondary_color).to_string(),
                            width_pt: 2.0,
                        }),
                        Some(frame),
                    );
                } else {
                    slide.add_text_box(
                        TextFrame::single(north_star, body).wrapped(),
                        emu(config.side_margin_in),
                        emu(y),
                        emu(config.content_width_in()),
                        emu(height),
                    );
                }
                y += height + 0.3;
            }
        }

        if !objectives.key_elements.is_empty() {
            let header = TextFrame::single(
                "Key Elements",
                run_font(
                    &config.body_font_name,
                    SECTION_HEADER_PT,
                    true,
                    &config.brand_secondary_color,
                ),
            );
            slide.add_text_box(
                header,
                emu(config.side_margin_in),
                emu(y),
                emu(config.content_width_in()),
                emu(KEY_ELEMENTS_TITLE_HEIGHT_IN),
            );
            y += KEY_ELEMENTS_TITLE_SPACING_IN;

            let elements_height = config.slide_height_in - y - config.bottom_margin_in;
            let mut frame = TextFrame {
                word_wrap: true,
                ..TextFrame::default()
            };
            for index in range {
                frame.paragraphs.push(
                    Paragraph::single(
                        format!("\u{2022} {}", objectives.key_elements[index]),
                        run_font(
                            &config.body_font_name,
                            config.body_font_pt,
                            false,
                            &config.brand_text_color,
                        ),
                    )
                    .space_after(8.0),
                );
            }
            slide.add_text_box(
                frame,
                emu(config.side_margin_in + 0.3),
                emu(y),
                emu(config.content_width_in() - 0.3),
                emu(elements_height),
            );
        }
    }
}

fn create_overview_slide(
    pres: &mut Presentation,
    groups: &[TimelineGroup],
    config: &Config,
    templates: &Templates,
) {
    let slide = start_slide(pres, config, templates.content.as_ref());
    add_slide_title(slide, "Roadmap Overview".to_string(), config);

    let width = config.overview_shape_width_in;
    let height = config.overview_shape_height_in;
    let right_edge = config.slide_width_in - config.side_margin_in;

    let mut x = config.side_margin_in;
    let mut y = config.content_top_margin_in;
    let mut first = true;

    for group in groups {
        for phase in &group.phases {
            let label = match &phase.phase {
                Some(phase) => format!("{}/{}", group.timeline, phase),
                None => group.timeline.clone(),
            };

            // Wrap to the next row before the shape would cross the margin
            if x + width > right_edge && x > config.side_margin_in {
                x = config.side_margin_in;
                y += height + OVERVIEW_ROW_GAP_IN;
            }

            // The flow starts with a pentagon, every later step is a chevron
            let preset = if first { "homePlate" } else { "chevron" };
            first = false;

            let frame = TextFrame {
                paragraphs: vec![
                    Paragraph::single(
                        label,
                        run_font(
                            &config.body_font_name,
                            OVERVIEW_LABEL_PT,
                            true,
                            &config.overview_text_color,
                        ),
                    )
                    .aligned(Align::Center),
                ],
                word_wrap: true,
                anchor_center: true,
                insets: None,
            };
            slide.add_geom_box(
                preset,
                emu(x),
                emu(y),
                emu(width),
                emu(height),
                Some(normalize_color(&config.overview_shape_color).to_string()),
                None,
                Some(frame),
            );
            x += width + OVERVIEW_COLUMN_GAP_IN;
        }
    }
}

fn create_roadmap_slides(
    pres: &mut Presentation,
    groups: &[TimelineGroup],
    config: &Config,
    templates: &Templates,
) {
    let max_content_height =
        config.slide_height_in - config.content_top_margin_in - config.bottom_margin_in;

    for group in groups {
        let num_phases = group.phases.len();
        let column_width = if num_phases > 1 {
            config.content_width_in() / num_phases as f64
        } else {
            config.content_width_in()
        };
        let box_width = column_width - 0.2;

        // All phase columns of a timeline share one slide sequence; the
        // fullest column decides its length.
        let available_height = max_content_height - PHASE_HEADER_HEIGHT_IN;
        let plan = PaginationPlan::new(
            group.max_phase_len(),
            available_height,
            config.workpackage_height_in,
        );

        for (page, _) in plan.pages() {
            let slide = start_slide(pres, config, templates.content.as_ref());
            add_slide_title(
                slide,
                page_title(
                    &format!("Roadmap: {}", group.timeline),
                    page,
                    plan.page_count(),
                ),
                config,
            );

            let y = config.content_top_margin_in;

            for (phase_index, phase) in group.phases.iter().enumerate() {
                let range =
                    PaginationPlan::with_capacity(phase.workpackages.len(), plan.items_per_page())
                        .page_range(page);
                let x = config.side_margin_in + phase_index as f64 * column_width + 0.1;

                let mut y_phase = y;
                if let Some(ref phase_name) = phase.phase {
                    let header = TextFrame::single(
                        phase_name.clone(),
                        run_font(
                            &config.body_font_name,
                            PHASE_HEADER_PT,
                            true,
                            &config.brand_secondary_color,
                        ),
                    )
                    .wrapped();
                    slide.add_text_box(header, emu(x), emu(y), emu(box_width), emu(0.6));
                    y_phase += PHASE_HEADER_HEIGHT_IN;
                }

                if range.is_empty() {
                    continue;
                }

                let content_height = (max_content_height
                    - (y_phase - config.content_top_margin_in))
                    .min(
                        (range.len() as f64 * config.workpackage_height_in + 0.3)
                            .max(MIN_ITEM_HEIGHT_IN),
                    );

                let mut frame = TextFrame {
                    word_wrap: true,
                    ..TextFrame::default()
                };
                if config.use_shapes {
                    frame.insets = Some(Insets {
                        left: emu(0.15),
                        right: emu(0.15),
                        top: emu(0.15),
                        bottom: emu(0.15),
                    });
                }
                for index in range {
                    frame.paragraphs.push(
                        Paragraph::single(
                            format!("\u{2022} {}", phase.workpackages[index]),
                            run_font(
                                &config.body_font_name,
                                WORKPACKAGE_PT,
                                false,
                                &config.brand_text_color,
                            ),
                        )
                        .space_after(6.0),
                    );
                }

                if config.use_shapes {
                    slide.add_geom_box(
                        "roundRect",
                        emu(x),
                        emu(y_phase),
                        emu(box_width),
                        emu(content_height),
                        Some(normalize_color(&config.content_box_color).to_string()),
                        Some(Outline {
                            color: normalize_color(&config.brand_accent_color).to_string(),
                            width_pt: 1.5,
                        }),
                        Some(frame),
                    );
                } else {
                    slide.add_text_box(
                        frame,
                        emu(x),
                        emu(y_phase),
                        emu(box_width),
                        emu(content_height),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::RoadmapEntry;

    fn slide_xml(pres: &Presentation, index: usize) -> String {
        pres.slides[index].to_xml(&[], &[]).unwrap()
    }

    fn entry(timeline: &str, phase: &str, workpackage: &str) -> RoadmapEntry {
        RoadmapEntry {
            timeline: timeline.to_string(),
            phase: Some(phase.to_string()),
            workpackage: workpackage.to_string(),
        }
    }

    #[test]
    fn test_title_slide_contents() {
        let config = Config::default();
        let objectives = ObjectivesData {
            north_star: Some("Be the best".to_string()),
            key_elements: vec![],
        };
        let mut pres = Presentation::new();
        create_title_slide(&mut pres, &objectives, &config, &Templates::default());

        assert_eq!(pres.slide_count(), 1);
        let xml = slide_xml(&pres, 0);
        assert!(xml.contains("Roadmap Presentation"));
        assert!(xml.contains("Be the best"));
        assert!(xml.contains(r#"<a:srgbClr val="003366"/>"#));
    }

    #[test]
    fn test_objectives_single_page() {
        let config = Config::default();
        let objectives = ObjectivesData {
            north_star: Some("Be the best".to_string()),
            key_elements: vec!["Speed".into(), "Quality".into(), "Trust".into()],
        };
        let mut pres = Presentation::new();
        create_objectives_slides(
            &mut pres,
            &objectives,
            &config,
            &Estimator::default(),
            &Templates::default(),
        );

        assert_eq!(pres.slide_count(), 1);
        let xml = slide_xml(&pres, 0);
        assert!(xml.contains("<a:t>Objectives</a:t>"));
        assert!(xml.contains("North Star"));
        assert!(xml.contains("Key Elements"));
        assert!(xml.contains("\u{2022} Speed"));
        assert!(xml.contains("\u{2022} Trust"));
        // Single page, no page suffix
        assert!(!xml.contains("Page 1 of"));
    }

    #[test]
    fn test_objectives_pagination() {
        let config = Config {
            key_element_height_in: 0.4,
            ..Config::default()
        };
        let elements: Vec<String> = (1..=50).map(|i| format!("KE-{i:02}")).collect();
        let objectives = ObjectivesData {
            north_star: None,
            key_elements: elements,
        };
        let mut pres = Presentation::new();
        create_objectives_slides(
            &mut pres,
            &objectives,
            &config,
            &Estimator::default(),
            &Templates::default(),
        );

        // 7.5 - 0.5 - 0.8 - 0.6 - 0.8 - 0.5 = 4.3" available; 10 items/page
        assert_eq!(pres.slide_count(), 5);
        let first = slide_xml(&pres, 0);
        assert!(first.contains("Objectives (Page 1 of 5)"));
        assert!(first.contains("KE-01"));
        assert!(first.contains("KE-10"));
        assert!(!first.contains("KE-11"));
        let last = slide_xml(&pres, 4);
        assert!(last.contains("KE-41"));
        assert!(last.contains("KE-50"));
        assert!(!last.contains("KE-40"));
        // North star absent, so no section header
        assert!(!last.contains("North Star"));
    }

    #[test]
    fn test_objectives_empty_still_one_slide() {
        let config = Config::default();
        let mut pres = Presentation::new();
        create_objectives_slides(
            &mut pres,
            &ObjectivesData::default(),
            &config,
            &Estimator::default(),
            &Templates::default(),
        );
        assert_eq!(pres.slide_count(), 1);
        let xml = slide_xml(&pres, 0);
        assert!(xml.contains("<a:t>Objectives</a:t>"));
        assert!(!xml.contains("Key Elements"));
    }

    #[test]
    fn test_overview_slide_shapes() {
        let config = Config::default();
        let entries = vec![
            entry("Q1", "Design", "Build A"),
            entry("Q1", "Design", "Build B"),
            entry("Q2", "Launch", "Ship"),
        ];
        let groups = group_roadmap(&entries);
        let mut pres = Presentation::new();
        create_overview_slide(&mut pres, &groups, &config, &Templates::default());

        assert_eq!(pres.slide_count(), 1);
        let xml = slide_xml(&pres, 0);
        assert!(xml.contains("Roadmap Overview"));
        assert!(xml.contains("Q1/Design"));
        assert!(xml.contains("Q2/Launch"));
        // First block is a pentagon, later blocks are chevrons
        assert!(xml.contains(r#"prst="homePlate""#));
        assert!(xml.contains(r#"prst="chevron""#));
        let pentagon = xml.find(r#"prst="homePlate""#).unwrap();
        let chevron = xml.find(r#"prst="chevron""#).unwrap();
        assert!(pentagon < chevron);
    }

    #[test]
    fn test_roadmap_slides_columns_and_order() {
        let config = Config::default();
        let entries = vec![
            entry("Q1", "Design", "Build A"),
            entry("Q1", "Design", "Build B"),
            entry("Q2", "Launch", "Ship"),
        ];
        let groups = group_roadmap(&entries);
        let mut pres = Presentation::new();
        create_roadmap_slides(&mut pres, &groups, &config, &Templates::default());

        // One slide per timeline
        assert_eq!(pres.slide_count(), 2);
        let q1 = slide_xml(&pres, 0);
        assert!(q1.contains("Roadmap: Q1"));
        assert!(q1.contains("Design"));
        let a = q1.find("\u{2022} Build A").unwrap();
        let b = q1.find("\u{2022} Build B").unwrap();
        assert!(a < b);
        let q2 = slide_xml(&pres, 1);
        assert!(q2.contains("Roadmap: Q2"));
        assert!(q2.contains("\u{2022} Ship"));
    }

    #[test]
    fn test_roadmap_pagination_across_phases() {
        // 12 items in one phase, 2 in the other; 7.5 - 1.5 - 0.5 - 0.7 =
        // 4.8" available -> 9 items per page -> 2 slides for the timeline.
        let config = Config::default();
        let mut entries: Vec<RoadmapEntry> = (1..=12)
            .map(|i| entry("Q1", "Build", &format!("WP-{i:02}")))
            .collect();
        entries.push(entry("Q1", "Test", "Verify"));
        entries.push(entry("Q1", "Test", "Sign off"));
        let groups = group_roadmap(&entries);

        let mut pres = Presentation::new();
        create_roadmap_slides(&mut pres, &groups, &config, &Templates::default());

        assert_eq!(pres.slide_count(), 2);
        let first = slide_xml(&pres, 0);
        assert!(first.contains("Roadmap: Q1 (Page 1 of 2)"));
        assert!(first.contains("WP-09"));
        assert!(!first.contains("WP-10"));
        assert!(first.contains("\u{2022} Verify"));

        let second = slide_xml(&pres, 1);
        assert!(second.contains("(Page 2 of 2)"));
        assert!(second.contains("WP-10"));
        assert!(second.contains("WP-12"));
        // The exhausted phase still shows its header but no items
        assert!(second.contains("<a:t>Test</a:t>"));
        assert!(!second.contains("\u{2022} Verify"));
    }

    #[test]
    fn test_page_title() {
        assert_eq!(page_title("Objectives", 0, 1), "Objectives");
        assert_eq!(page_title("Objectives", 1, 3), "Objectives (Page 2 of 3)");
    }
}
