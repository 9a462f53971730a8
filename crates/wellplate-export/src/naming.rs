//! Sample-name and comment rules for template rows.

use regex::Regex;
use tracing::debug;
use wellplate_core::{Control, Relation, Sample};

use crate::ExportError;

/// Sample Name and Comment columns for a control well.
#[must_use]
pub fn control_fields(kind: Control) -> (&'static str, &'static str) {
    match kind {
        Control::AllelicLadder => ("Ladder", "AL"),
        Control::PositiveControl => ("PC", "Pos"),
        Control::NegativeControl => ("NC", "Neg"),
        Control::Blank => ("Blank", "HiDi"),
    }
}

/// Lab number, suffixed with `_<surname>` unless the surname is already part
/// of it.
#[must_use]
pub fn sample_name(sample: &Sample) -> String {
    match non_empty(sample.surname.as_deref()) {
        Some(surname) if !sample.lab_number.contains(surname) => {
            format!("{}_{surname}", sample.lab_number)
        }
        _ => sample.lab_number.clone(),
    }
}

/// First name, then surname, then the leading token of the full name.
#[must_use]
pub fn display_name(sample: &Sample) -> Option<&str> {
    non_empty(sample.first_name.as_deref())
        .or_else(|| non_empty(sample.surname.as_deref()))
        .or_else(|| {
            sample
                .name
                .as_deref()
                .and_then(|n| n.split_whitespace().next())
        })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Extracts the alleged father's accession embedded in a child's lab number,
/// as in `25_426(25_427)F`.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    stray_open: Regex,
    reference: Regex,
}

impl ReferenceParser {
    pub fn new(prefix: &str) -> Result<Self, ExportError> {
        let invalid = |source| ExportError::InvalidReferencePrefix {
            prefix: prefix.to_string(),
            source,
        };
        // `25_426(1(25_427)` occurs in imported data; collapse it to `(`.
        let stray_open = Regex::new(r"\(\d+\(").map_err(invalid)?;
        let reference = Regex::new(&format!(
            r"\(({}\d+)\)[A-Za-z]?",
            regex::escape(prefix)
        ))
        .map_err(invalid)?;
        Ok(Self {
            stray_open,
            reference,
        })
    }

    #[must_use]
    pub fn parse(&self, lab_number: &str) -> Option<String> {
        let cleaned = self.stray_open.replace_all(lab_number, "(");
        self.reference
            .captures(&cleaned)
            .map(|caps| caps[1].to_string())
    }

    /// The structured father link if present, else the parsed reference.
    #[must_use]
    pub fn father_of(&self, sample: &Sample) -> Option<String> {
        match non_empty(sample.father_lab_number.as_deref()) {
            Some(explicit) => Some(explicit.to_string()),
            None => self.parse(&sample.lab_number),
        }
    }
}

/// Finds the father among `candidates` (row-major): exact lab number first,
/// then the first lab number that starts with the reference.
pub fn find_father<'a, I>(reference: &str, candidates: I) -> Option<&'a Sample>
where
    I: IntoIterator<Item = &'a Sample> + Clone,
{
    candidates
        .clone()
        .into_iter()
        .find(|s| s.lab_number == reference)
        .or_else(|| {
            candidates
                .into_iter()
                .find(|s| s.lab_number.starts_with(reference))
        })
}

/// Comment column for a sample. Children show their father's name when the
/// father is on the same plate.
#[must_use]
pub fn sample_comment(sample: &Sample, plate_samples: &[&Sample], parser: &ReferenceParser) -> String {
    if sample.relation == Relation::Child {
        if let Some(reference) = parser.father_of(sample) {
            let father_name = find_father(&reference, plate_samples.iter().copied())
                .and_then(|father| {
                    non_empty(father.first_name.as_deref())
                        .or_else(|| non_empty(father.surname.as_deref()))
                });
            if let Some(name) = father_name {
                return name.to_string();
            }
            debug!(
                child = %sample.lab_number,
                father = %reference,
                "father not on plate; using child's own name"
            );
        }
    }
    display_name(sample).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ReferenceParser {
        ReferenceParser::new("25_").unwrap()
    }

    #[test]
    fn parses_reference_with_trailing_letter() {
        assert_eq!(parser().parse("25_426(25_427)F").as_deref(), Some("25_427"));
        assert_eq!(parser().parse("25_426(25_427)").as_deref(), Some("25_427"));
        assert_eq!(parser().parse("25_426"), None);
    }

    #[test]
    fn tolerates_stray_open_paren_run() {
        assert_eq!(
            parser().parse("25_426(3(25_427)M").as_deref(),
            Some("25_427")
        );
    }

    #[test]
    fn reference_prefix_is_configurable() {
        let p = ReferenceParser::new("26_").unwrap();
        assert_eq!(p.parse("26_1(26_2)").as_deref(), Some("26_2"));
        assert_eq!(p.parse("25_1(25_2)"), None);
    }

    #[test]
    fn structured_father_link_wins() {
        let mut child = Sample::new("25_426(25_427)F");
        child.father_lab_number = Some("25_999".into());
        assert_eq!(parser().father_of(&child).as_deref(), Some("25_999"));
    }

    #[test]
    fn surname_suffix_only_when_missing() {
        let mut s = Sample::new("25_427");
        s.surname = Some("Smith".into());
        assert_eq!(sample_name(&s), "25_427_Smith");
        s.lab_number = "25_427_Smith".into();
        assert_eq!(sample_name(&s), "25_427_Smith");
        s.surname = Some("  ".into());
        assert_eq!(sample_name(&s), "25_427_Smith");
    }

    #[test]
    fn display_name_fallbacks() {
        let mut s = Sample::new("x");
        assert_eq!(display_name(&s), None);
        s.name = Some("Maria Lopez".into());
        assert_eq!(display_name(&s), Some("Maria"));
        s.surname = Some("Lopez".into());
        assert_eq!(display_name(&s), Some("Lopez"));
        s.first_name = Some("Ana".into());
        assert_eq!(display_name(&s), Some("Ana"));
    }

    #[test]
    fn exact_match_beats_prefix_match() {
        let long = Sample::new("25_4270");
        let exact = Sample::new("25_427");
        let all = [&long, &exact];
        let found = find_father("25_427", all.iter().copied()).unwrap();
        assert_eq!(found.lab_number, "25_427");
    }
}
