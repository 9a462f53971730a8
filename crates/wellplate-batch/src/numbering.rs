use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use wellplate_core::PlateKind;

fn pcr_pattern() -> &'static Regex {
    static PCR: OnceLock<Regex> = OnceLock::new();
    PCR.get_or_init(|| Regex::new(r"^LDS_(\d+)$").expect("valid PCR batch pattern"))
}

fn rerun_pattern() -> &'static Regex {
    static RERUN: OnceLock<Regex> = OnceLock::new();
    RERUN.get_or_init(|| Regex::new(r"^LDS_(\d+)_RR$").expect("valid rerun batch pattern"))
}

/// A typed batch number: `LDS_<n>` for PCR plates, `LDS_<n>_RR` for reruns.
///
/// The two kinds are separate sequences; `LDS_3_RR` never counts towards the
/// PCR sequence and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchNumber {
    kind: PlateKind,
    sequence: u32,
}

impl BatchNumber {
    #[must_use]
    pub fn new(kind: PlateKind, sequence: u32) -> Self {
        Self { kind, sequence }
    }

    #[must_use]
    pub fn kind(self) -> PlateKind {
        self.kind
    }

    #[must_use]
    pub fn sequence(self) -> u32 {
        self.sequence
    }

    /// Parses a batch number of either kind. Anything else (including
    /// electrophoresis batches) yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::parse_kind(PlateKind::Pcr, raw).or_else(|| Self::parse_kind(PlateKind::Rerun, raw))
    }

    #[must_use]
    pub fn parse_kind(kind: PlateKind, raw: &str) -> Option<Self> {
        let pattern = match kind {
            PlateKind::Pcr => pcr_pattern(),
            PlateKind::Rerun => rerun_pattern(),
        };
        let caps = pattern.captures(raw.trim())?;
        let sequence = caps[1].parse().ok()?;
        Some(Self { kind, sequence })
    }

    /// One past the highest number of `kind` among `existing`, starting at 1.
    #[must_use]
    pub fn next_after<'a, I>(kind: PlateKind, existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max = existing
            .into_iter()
            .filter_map(|raw| Self::parse_kind(kind, raw))
            .map(|n| n.sequence)
            .max()
            .unwrap_or(0);
        Self::new(kind, max.saturating_add(1))
    }

    #[must_use]
    pub fn successor(self) -> Self {
        Self::new(self.kind, self.sequence.saturating_add(1))
    }
}

impl fmt::Display for BatchNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PlateKind::Pcr => write!(f, "LDS_{}", self.sequence),
            PlateKind::Rerun => write!(f, "LDS_{}_RR", self.sequence),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a PCR (LDS_<n>) or rerun (LDS_<n>_RR) batch number")]
pub struct InvalidBatchNumber(pub String);

impl TryFrom<String> for BatchNumber {
    type Error = InvalidBatchNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(InvalidBatchNumber(value))
    }
}

impl From<BatchNumber> for String {
    fn from(value: BatchNumber) -> Self {
        value.to_string()
    }
}
