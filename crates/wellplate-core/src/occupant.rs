use std::fmt;

use serde::{Deserialize, Serialize};

/// Batch-number prefix of completed electrophoresis batches.
pub const ELECTROPHORESIS_BATCH_PREFIX: &str = "ELEC_";

/// Kind of plate being edited. Only eligibility and batch numbering differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateKind {
    Pcr,
    Rerun,
}

impl fmt::Display for PlateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlateKind::Pcr => f.write_str("pcr"),
            PlateKind::Rerun => f.write_str("rerun"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Child,
    #[serde(alias = "father")]
    AllegedFather,
    Mother,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Relation {
    /// Position inside a case group: child, alleged father, mother, then the rest.
    #[must_use]
    pub fn group_rank(self) -> u8 {
        match self {
            Relation::Child => 0,
            Relation::AllegedFather => 1,
            Relation::Mother => 2,
            Relation::Unspecified => 3,
        }
    }
}

/// Where a sample currently sits in the lab workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStatus {
    #[default]
    SampleCollected,
    PcrReady,
    PcrBatched,
    PcrCompleted,
    ElectroReady,
    ElectroBatched,
    ElectroCompleted,
    AnalysisCompleted,
    ReportReady,
    Other(String),
}

impl WorkflowStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStatus::SampleCollected => "sample_collected",
            WorkflowStatus::PcrReady => "pcr_ready",
            WorkflowStatus::PcrBatched => "pcr_batched",
            WorkflowStatus::PcrCompleted => "pcr_completed",
            WorkflowStatus::ElectroReady => "electro_ready",
            WorkflowStatus::ElectroBatched => "electro_batched",
            WorkflowStatus::ElectroCompleted => "electro_completed",
            WorkflowStatus::AnalysisCompleted => "analysis_completed",
            WorkflowStatus::ReportReady => "report_ready",
            WorkflowStatus::Other(s) => s,
        }
    }
}

impl From<String> for WorkflowStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "sample_collected" => WorkflowStatus::SampleCollected,
            "pcr_ready" => WorkflowStatus::PcrReady,
            "pcr_batched" => WorkflowStatus::PcrBatched,
            "pcr_completed" => WorkflowStatus::PcrCompleted,
            "electro_ready" => WorkflowStatus::ElectroReady,
            "electro_batched" => WorkflowStatus::ElectroBatched,
            "electro_completed" => WorkflowStatus::ElectroCompleted,
            "analysis_completed" => WorkflowStatus::AnalysisCompleted,
            "report_ready" => WorkflowStatus::ReportReady,
            _ => WorkflowStatus::Other(value),
        }
    }
}

impl From<WorkflowStatus> for String {
    fn from(value: WorkflowStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Globally unique accession, e.g. "25_426(25_427)F".
    pub lab_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    #[serde(default)]
    pub relation: Relation,
    #[serde(default)]
    pub workflow_status: WorkflowStatus,
    /// Batch that carried the sample through electrophoresis ("ELEC_..."), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    /// Explicit link to the alleged father's accession. Preferred over
    /// parsing the reference out of `lab_number`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_lab_number: Option<String>,
}

impl Sample {
    #[must_use]
    pub fn new(lab_number: impl Into<String>) -> Self {
        Self {
            lab_number: lab_number.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_case(mut self, case_number: impl Into<String>, relation: Relation) -> Self {
        self.case_number = Some(case_number.into());
        self.relation = relation;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: WorkflowStatus) -> Self {
        self.workflow_status = status;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    NegativeControl,
    PositiveControl,
    AllelicLadder,
    /// Formamide-only well; placed by hand, never by auto-fill.
    Blank,
}

impl Control {
    /// Order in which auto-fill lays controls into the control column.
    pub const AUTO_FILL_ORDER: [Control; 3] = [
        Control::NegativeControl,
        Control::PositiveControl,
        Control::AllelicLadder,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Control::NegativeControl => "NC",
            Control::PositiveControl => "PC",
            Control::AllelicLadder => "Ladder",
            Control::Blank => "Blank",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Control::NegativeControl => "Negative Control",
            Control::PositiveControl => "Positive Control",
            Control::AllelicLadder => "Allelic Ladder",
            Control::Blank => "Blank",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Occupant {
    Sample(Sample),
    Control { kind: Control },
}

impl Occupant {
    #[must_use]
    pub fn control(kind: Control) -> Self {
        Occupant::Control { kind }
    }

    #[must_use]
    pub fn as_sample(&self) -> Option<&Sample> {
        match self {
            Occupant::Sample(s) => Some(s),
            Occupant::Control { .. } => None,
        }
    }

    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Occupant::Control { .. })
    }

    /// Human-readable well type ("Sample", "Negative Control", ..).
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Occupant::Sample(_) => "Sample",
            Occupant::Control { kind } => kind.description(),
        }
    }

    /// Sample type as the instrument knows it. Blanks run as plain samples.
    #[must_use]
    pub fn sample_type(&self) -> &'static str {
        match self {
            Occupant::Sample(_) | Occupant::Control {
                kind: Control::Blank,
            } => "Sample",
            Occupant::Control { kind } => kind.description(),
        }
    }

    /// Short label shown on the plate map.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Occupant::Sample(s) => &s.lab_number,
            Occupant::Control { kind } => kind.label(),
        }
    }
}

impl From<Sample> for Occupant {
    fn from(value: Sample) -> Self {
        Occupant::Sample(value)
    }
}

impl From<Control> for Occupant {
    fn from(value: Control) -> Self {
        Occupant::control(value)
    }
}
