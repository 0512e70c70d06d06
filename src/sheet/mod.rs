//! Workbook data model.
//!
//! Typed views over the two input sheets ("Objectives" and "Roadmap") plus
//! the grouping step that turns flat roadmap rows into per-timeline,
//! per-phase buckets for the slide builders.

pub mod reader;

pub use reader::{read_objectives, read_roadmap};

/// Contents of the "Objectives" sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectivesData {
    /// The north star statement, if the sheet carries one.
    pub north_star: Option<String>,
    /// Key element bullet texts, in sheet order.
    pub key_elements: Vec<String>,
}

impl ObjectivesData {
    pub fn is_empty(&self) -> bool {
        self.north_star.is_none() && self.key_elements.is_empty()
    }
}

/// One data row of the "Roadmap" sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapEntry {
    pub timeline: String,
    /// Phase label; `None` when the sheet has no phase column or the cell
    /// is blank.
    pub phase: Option<String>,
    pub workpackage: String,
}

/// Work packages for one phase within a timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseGroup {
    pub phase: Option<String>,
    pub workpackages: Vec<String>,
}

/// All phases of one timeline, in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineGroup {
    pub timeline: String,
    pub phases: Vec<PhaseGroup>,
}

impl TimelineGroup {
    /// The largest work package count across this timeline's phases.
    pub fn max_phase_len(&self) -> usize {
        self.phases
            .iter()
            .map(|p| p.workpackages.len())
            .max()
            .unwrap_or(0)
    }
}

/// Group flat roadmap rows by timeline, then by phase within each timeline.
///
/// Both levels keep first-appearance order from the sheet. Rows with an
/// empty work package still register their timeline and phase, so a phase
/// column can exist on the slide even when nothing is scheduled in it yet.
pub fn group_roadmap(entries: &[RoadmapEntry]) -> Vec<TimelineGroup> {
    let mut groups: Vec<TimelineGroup> = Vec::new();

    for entry in entries {
        let group = match groups.iter_mut().find(|g| g.timeline == entry.timeline) {
            Some(group) => group,
            None => {
                groups.push(TimelineGroup {
                    timeline: entry.timeline.clone(),
                    phases: Vec::new(),
                });
                groups.last_mut().unwrap()
            }
        };

        let phase = match group.phases.iter_mut().find(|p| p.phase == entry.phase) {
            Some(phase) => phase,
            None => {
                group.phases.push(PhaseGroup {
                    phase: entry.phase.clone(),
                    workpackages: Vec::new(),
                });
                group.phases.last_mut().unwrap()
            }
        };

        if !entry.workpackage.is_empty() {
            phase.workpackages.push(entry.workpackage.clone());
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timeline: &str, phase: Option<&str>, workpackage: &str) -> RoadmapEntry {
        RoadmapEntry {
            timeline: timeline.to_string(),
            phase: phase.map(str::to_string),
            workpackage: workpackage.to_string(),
        }
    }

    #[test]
    fn test_group_preserves_first_appearance_order() {
        let entries = vec![
            entry("Q2", Some("Launch"), "Ship"),
            entry("Q1", Some("Design"), "Sketch"),
            entry("Q2", Some("Build"), "Code"),
            entry("Q1", Some("Design"), "Review"),
        ];
        let groups = group_roadmap(&entries);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].timeline, "Q2");
        assert_eq!(groups[1].timeline, "Q1");
        assert_eq!(groups[0].phases[0].phase.as_deref(), Some("Launch"));
        assert_eq!(groups[0].phases[1].phase.as_deref(), Some("Build"));
        assert_eq!(
            groups[1].phases[0].workpackages,
            vec!["Sketch".to_string(), "Review".to_string()]
        );
    }

    #[test]
    fn test_group_missing_phase_bucket() {
        let entries = vec![
            entry("Q1", None, "Plan"),
            entry("Q1", Some("Build"), "Code"),
            entry("Q1", None, "Staff"),
        ];
        let groups = group_roadmap(&entries);
        assert_eq!(groups[0].phases.len(), 2);
        assert_eq!(groups[0].phases[0].phase, None);
        assert_eq!(
            groups[0].phases[0].workpackages,
            vec!["Plan".to_string(), "Staff".to_string()]
        );
    }

    #[test]
    fn test_group_empty_workpackage_keeps_phase() {
        let entries = vec![entry("Q1", Some("Design"), "")];
        let groups = group_roadmap(&entries);
        assert_eq!(groups[0].phases.len(), 1);
        assert!(groups[0].phases[0].workpackages.is_empty());
    }

    #[test]
    fn test_max_phase_len() {
        let entries = vec![
            entry("Q1", Some("A"), "one"),
            entry("Q1", Some("B"), "two"),
            entry("Q1", Some("B"), "three"),
        ];
        let groups = group_roadmap(&entries);
        assert_eq!(groups[0].max_phase_len(), 2);
    }
}
