use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wellplate_batch::BatchNumber;
use wellplate_core::{
    Control, Occupant, PlateKind, Sample, WellId, ELECTROPHORESIS_BATCH_PREFIX,
};
use wellplate_export::InstrumentConfig;
use wellplate_layout::{flatten_groups, group_by_case, PlacementIntent, PlateSession};

use crate::Error;

/// A hand placement listed in the session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManualPlacement {
    Control { well: WellId, control: Control },
    Sample { well: WellId, lab_number: String },
}

/// Places every sample of `case_number` as a family group starting at `well`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub case_number: String,
    pub well: WellId,
}

fn default_true() -> bool {
    true
}

/// One plate-layout run as described by a session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub kind: PlateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<BatchNumber>,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_batch: Option<String>,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub pre_approved: Vec<String>,
    #[serde(default)]
    pub placements: Vec<ManualPlacement>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default = "default_true")]
    pub auto_fill: bool,
    #[serde(default)]
    pub instrument: InstrumentConfig,
}

/// Loads and validates a session file; `.json` is read as JSON, `.yaml` and
/// `.yml` as YAML.
pub fn load_session(path: &Path) -> Result<SessionConfig, Error> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let config = match ext.as_deref() {
        Some("json") => SessionConfig::from_json_str(&raw)?,
        Some("yaml" | "yml") => SessionConfig::from_yaml_str(&raw)?,
        _ => {
            return Err(Error::UnsupportedExtension {
                path: path.to_path_buf(),
            })
        }
    };
    debug!(path = %path.display(), samples = config.samples.len(), "loaded session");
    Ok(config)
}

impl SessionConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.operator.trim().is_empty() {
            return Err(Error::InvalidField {
                field: "operator".into(),
                message: "must not be empty".into(),
            });
        }
        if let Some(number) = self.batch_number {
            if number.kind() != self.kind {
                return Err(Error::InvalidField {
                    field: "batch_number".into(),
                    message: format!("{number} is not a {} batch number", self.kind),
                });
            }
        }
        if self.auto_fill && self.places_samples_by_hand() {
            return Err(Error::InvalidField {
                field: "auto_fill".into(),
                message: "auto-fill re-lays every sample; set auto_fill: false to use sample placements or groups".into(),
            });
        }

        if let Some(source) = self.recorded_source() {
            if !source.starts_with(ELECTROPHORESIS_BATCH_PREFIX) {
                return Err(Error::InvalidField {
                    field: "source_batch".into(),
                    message: format!("{source} is not an electrophoresis batch"),
                });
            }
        }
        self.check_text()?;

        let mut seen = HashSet::new();
        for sample in &self.samples {
            if !seen.insert(sample.lab_number.as_str()) {
                return Err(Error::DuplicateSample {
                    lab_number: sample.lab_number.clone(),
                });
            }
        }
        for lab in &self.pre_approved {
            if !seen.contains(lab.as_str()) {
                return Err(Error::UnknownSample {
                    at: "pre_approved".into(),
                    lab_number: lab.clone(),
                });
            }
        }

        if self.source_batch.is_some() && self.kind == PlateKind::Pcr {
            warn!("source_batch is only recorded for rerun plates; ignoring it");
        }
        if !self.auto_fill && !self.controls.is_empty() {
            warn!("controls are only laid out by auto-fill; place them by hand instead");
        }
        Ok(())
    }

    /// Tabs and line breaks would shift the columns of the import template.
    fn check_text(&self) -> Result<(), Error> {
        let mut fields = vec![("operator", self.operator.as_str())];
        for sample in &self.samples {
            fields.push(("lab_number", sample.lab_number.as_str()));
            for (field, value) in [
                ("name", &sample.name),
                ("first_name", &sample.first_name),
                ("surname", &sample.surname),
            ] {
                if let Some(value) = value {
                    fields.push((field, value.as_str()));
                }
            }
        }
        match fields
            .into_iter()
            .find(|(_, value)| value.contains(['\t', '\n', '\r']))
        {
            Some((field, value)) => Err(Error::InvalidField {
                field: field.into(),
                message: format!("{value:?} contains a tab or line break"),
            }),
            None => Ok(()),
        }
    }

    fn places_samples_by_hand(&self) -> bool {
        !self.groups.is_empty()
            || self
                .placements
                .iter()
                .any(|p| matches!(p, ManualPlacement::Sample { .. }))
    }

    /// The session date, or today when the file leaves it out.
    #[must_use]
    pub fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Source batch to record on the finalized batch.
    #[must_use]
    pub fn recorded_source(&self) -> Option<&str> {
        match self.kind {
            PlateKind::Rerun => self.source_batch.as_deref(),
            PlateKind::Pcr => None,
        }
    }

    /// An empty editing session with the pre-approved samples unlocked.
    #[must_use]
    pub fn open_session(&self) -> PlateSession {
        let mut session = PlateSession::new(self.kind);
        let approved: HashSet<&str> = self.pre_approved.iter().map(String::as_str).collect();
        session.approve_sources(
            self.samples
                .iter()
                .filter(|s| approved.contains(s.lab_number.as_str())),
        );
        session
    }

    /// The edits the session file asks for, in application order: hand
    /// placements, family groups, then auto-fill.
    pub fn intents(&self) -> Result<Vec<PlacementIntent>, Error> {
        let cases = group_by_case(&self.samples);
        let by_lab: HashMap<&str, &Sample> = self
            .samples
            .iter()
            .map(|s| (s.lab_number.as_str(), s))
            .collect();
        let mut used: HashSet<&str> = HashSet::new();
        let mut intents = Vec::new();

        for placement in &self.placements {
            let intent = match placement {
                ManualPlacement::Control { well, control } => PlacementIntent::Place {
                    well: *well,
                    item: Occupant::control(*control),
                },
                ManualPlacement::Sample { well, lab_number } => {
                    let Some(sample) = by_lab.get(lab_number.as_str()) else {
                        return Err(Error::UnknownSample {
                            at: well.to_string(),
                            lab_number: lab_number.clone(),
                        });
                    };
                    if !used.insert(sample.lab_number.as_str()) {
                        return Err(Error::PlacedTwice {
                            lab_number: lab_number.clone(),
                        });
                    }
                    PlacementIntent::Place {
                        well: *well,
                        item: Occupant::Sample((*sample).clone()),
                    }
                }
            };
            intents.push(intent);
        }

        for spec in &self.groups {
            let Some(group) = cases
                .iter()
                .find(|g| g.case_number.as_deref() == Some(spec.case_number.as_str()))
            else {
                return Err(Error::UnknownCase {
                    case_number: spec.case_number.clone(),
                });
            };
            for member in &group.members {
                if !used.insert(member.lab_number.as_str()) {
                    return Err(Error::PlacedTwice {
                        lab_number: member.lab_number.clone(),
                    });
                }
            }
            intents.push(PlacementIntent::PlaceGroup {
                well: spec.well,
                members: group.members.clone(),
            });
        }

        if self.auto_fill {
            let placed_controls: HashSet<Control> = self
                .placements
                .iter()
                .filter_map(|p| match p {
                    ManualPlacement::Control { control, .. } => Some(*control),
                    ManualPlacement::Sample { .. } => None,
                })
                .collect();
            let controls = self
                .controls
                .iter()
                .copied()
                .filter(|c| !placed_controls.contains(c))
                .collect();
            intents.push(PlacementIntent::AutoFill {
                samples: flatten_groups(&cases),
                controls,
            });
        }
        Ok(intents)
    }
}
