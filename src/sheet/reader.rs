//! Excel workbook reading via calamine.
//!
//! Both sheets are optional: a workbook with neither still produces a valid
//! (if sparse) deck, so the public readers log a warning and return empty
//! data instead of failing. Header columns are matched by name against the
//! first row, with positional fallbacks when no header matches.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use log::warn;

use super::{ObjectivesData, RoadmapEntry};
use crate::error::Result;

const OBJECTIVES_SHEET: &str = "Objectives";
const ROADMAP_SHEET: &str = "Roadmap";

/// Read the "Objectives" sheet, returning empty data if the sheet is
/// missing or unreadable.
pub fn read_objectives(path: &Path) -> ObjectivesData {
    match try_read_objectives(path) {
        Ok(data) => data,
        Err(err) => {
            warn!("could not read '{OBJECTIVES_SHEET}' sheet: {err}");
            ObjectivesData::default()
        }
    }
}

/// Read the "Roadmap" sheet, returning no entries if the sheet is missing
/// or unreadable.
pub fn read_roadmap(path: &Path) -> Vec<RoadmapEntry> {
    match try_read_roadmap(path) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("could not read '{ROADMAP_SHEET}' sheet: {err}");
            Vec::new()
        }
    }
}

fn try_read_objectives(path: &Path) -> Result<ObjectivesData> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(OBJECTIVES_SHEET)?;

    let headers = header_row(&range);
    let (north_star_col, key_elements_col) = objective_columns(&headers);

    let mut data = ObjectivesData::default();
    for row in range.rows().skip(1) {
        if data.north_star.is_none() {
            let text = cell_text(row.get(north_star_col).unwrap_or(&Data::Empty));
            if !text.is_empty() {
                data.north_star = Some(text);
            }
        }
        let element = cell_text(row.get(key_elements_col).unwrap_or(&Data::Empty));
        if !element.is_empty() {
            data.key_elements.push(element);
        }
    }
    Ok(data)
}

fn try_read_roadmap(path: &Path) -> Result<Vec<RoadmapEntry>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(ROADMAP_SHEET)?;

    let headers = header_row(&range);
    let columns = roadmap_columns(&headers);

    let mut entries = Vec::new();
    for row in range.rows().skip(1) {
        let timeline = cell_text(row.get(columns.timeline).unwrap_or(&Data::Empty));
        // Timeline is the row's key; rows without one carry no slide position.
        if timeline.is_empty() {
            continue;
        }
        let phase = columns
            .phase
            .map(|col| cell_text(row.get(col).unwrap_or(&Data::Empty)))
            .filter(|p| !p.is_empty());
        let workpackage = cell_text(row.get(columns.workpackage).unwrap_or(&Data::Empty));
        entries.push(RoadmapEntry {
            timeline,
            phase,
            workpackage,
        });
    }
    Ok(entries)
}

fn header_row(range: &Range<Data>) -> Vec<String> {
    range
        .rows()
        .next()
        .map(|row| row.iter().map(|c| cell_text(c).to_lowercase()).collect())
        .unwrap_or_default()
}

/// Column indices for the "Objectives" sheet: (north star, key elements).
fn objective_columns(headers: &[String]) -> (usize, usize) {
    let north_star = headers
        .iter()
        .position(|h| h.contains("north") && h.contains("star"))
        .unwrap_or(0);
    let key_elements = headers
        .iter()
        .position(|h| h.contains("key") && h.contains("element"))
        .unwrap_or(1);
    (north_star, key_elements)
}

struct RoadmapColumns {
    timeline: usize,
    phase: Option<usize>,
    workpackage: usize,
}

/// Column indices for the "Roadmap" sheet.
///
/// Each column is matched by its own predicate against the full header set,
/// preferring exact header names, so a compound header like "Phase Timeline"
/// cannot shadow a dedicated "Phase" or "Timeline" column elsewhere in the
/// row.
fn roadmap_columns(headers: &[String]) -> RoadmapColumns {
    let workpackage = find_column(headers, "workpackage")
        .or_else(|| find_column(headers, "work package"))
        .unwrap_or(2);
    let timeline = find_column(headers, "timeline").unwrap_or(0);
    let phase = find_column(headers, "phase").or_else(|| {
        // No named phase column; fall back to the middle column only when
        // the sheet is wide enough to have one.
        if headers.len() >= 3 { Some(1) } else { None }
    });
    RoadmapColumns {
        timeline,
        phase,
        workpackage,
    }
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.contains(name)))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => {
            // Integers without a trailing ".0"
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_lowercase()).collect()
    }

    #[test]
    fn test_cell_text_float_formatting() {
        assert_eq!(cell_text(&Data::Float(2026.0)), "2026");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::String("  Q1  ".to_string())), "Q1");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_objective_columns_by_header() {
        let h = headers(&["Key Elements", "North Star"]);
        assert_eq!(objective_columns(&h), (1, 0));
    }

    #[test]
    fn test_objective_columns_positional_fallback() {
        let h = headers(&["A", "B"]);
        assert_eq!(objective_columns(&h), (0, 1));
        assert_eq!(objective_columns(&[]), (0, 1));
    }

    #[test]
    fn test_roadmap_columns_by_header() {
        let h = headers(&["Work Package", "Timeline", "Phase"]);
        let cols = roadmap_columns(&h);
        assert_eq!(cols.timeline, 1);
        assert_eq!(cols.phase, Some(2));
        assert_eq!(cols.workpackage, 0);
    }

    #[test]
    fn test_roadmap_columns_no_phase_header_narrow_sheet() {
        let h = headers(&["Timeline", "Workpackage"]);
        let cols = roadmap_columns(&h);
        assert_eq!(cols.timeline, 0);
        assert_eq!(cols.phase, None);
        assert_eq!(cols.workpackage, 1);
    }

    #[test]
    fn test_roadmap_columns_compound_header_does_not_shadow() {
        let h = headers(&["Phase Timeline", "Phase", "Workpackage", "Timeline"]);
        let cols = roadmap_columns(&h);
        assert_eq!(cols.phase, Some(1));
        assert_eq!(cols.workpackage, 2);
        assert_eq!(cols.timeline, 3);
    }
}
