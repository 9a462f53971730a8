use std::collections::HashSet;

use wellplate_core::{Occupant, PlateKind, Sample, WorkflowStatus, ELECTROPHORESIS_BATCH_PREFIX};

use crate::LayoutError;

/// Decides which samples may go onto a plate of a given kind.
///
/// PCR plates take any sample. Rerun plates only take samples that already
/// went through electrophoresis once: status `electro_batched`, a lab batch
/// number starting with `ELEC_`, or membership in the pre-approved set the
/// operator loaded from a chosen electrophoresis batch.
#[derive(Debug, Clone)]
pub struct Eligibility {
    kind: PlateKind,
    pre_approved: HashSet<String>,
}

impl Eligibility {
    #[must_use]
    pub fn new(kind: PlateKind) -> Self {
        Self {
            kind,
            pre_approved: HashSet::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PlateKind {
        self.kind
    }

    /// Adds lab numbers to the pre-approved set.
    pub fn approve<I, S>(&mut self, lab_numbers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pre_approved
            .extend(lab_numbers.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn is_pre_approved(&self, lab_number: &str) -> bool {
        self.pre_approved.contains(lab_number)
    }

    #[must_use]
    pub fn is_eligible(&self, sample: &Sample) -> bool {
        match self.kind() {
            PlateKind::Pcr => true,
            PlateKind::Rerun => {
                sample.workflow_status == WorkflowStatus::ElectroBatched
                    || sample
                        .lab_batch_number
                        .as_deref()
                        .is_some_and(|b| b.starts_with(ELECTROPHORESIS_BATCH_PREFIX))
                    || self.is_pre_approved(&sample.lab_number)
            }
        }
    }

    pub fn check_sample(&self, sample: &Sample) -> Result<(), LayoutError> {
        if self.is_eligible(sample) {
            return Ok(());
        }
        Err(LayoutError::Ineligible {
            lab_number: sample.lab_number.clone(),
            kind: self.kind(),
            status: sample.workflow_status.to_string(),
            lab_batch: sample
                .lab_batch_number
                .clone()
                .unwrap_or_else(|| "none".to_string()),
        })
    }

    /// Controls always pass.
    pub fn check(&self, occupant: &Occupant) -> Result<(), LayoutError> {
        match occupant {
            Occupant::Sample(s) => self.check_sample(s),
            Occupant::Control { .. } => Ok(()),
        }
    }

    /// Checks every sample before anything is placed.
    pub fn check_all<'a, I>(&self, samples: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        samples.into_iter().try_for_each(|s| self.check_sample(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellplate_core::Control;

    fn collected() -> Sample {
        Sample::new("25_10").with_status(WorkflowStatus::SampleCollected)
    }

    #[test]
    fn pcr_plate_accepts_anything() {
        let rules = Eligibility::new(PlateKind::Pcr);
        assert!(rules.check_sample(&collected()).is_ok());
    }

    #[test]
    fn rerun_plate_rejects_unprocessed_sample() {
        let rules = Eligibility::new(PlateKind::Rerun);
        let err = rules.check_sample(&collected()).unwrap_err();
        assert!(matches!(err, LayoutError::Ineligible { ref lab_number, .. } if lab_number == "25_10"));
    }

    #[test]
    fn rerun_plate_accepts_any_of_the_three_routes() {
        let mut rules = Eligibility::new(PlateKind::Rerun);

        let by_status = collected().with_status(WorkflowStatus::ElectroBatched);
        assert!(rules.is_eligible(&by_status));

        let mut by_batch = collected();
        by_batch.lab_batch_number = Some("ELEC_4".into());
        assert!(rules.is_eligible(&by_batch));

        let mut wrong_batch = collected();
        wrong_batch.lab_batch_number = Some("LDS_4".into());
        assert!(!rules.is_eligible(&wrong_batch));

        rules.approve(["25_10"]);
        assert!(rules.is_eligible(&collected()));
    }

    #[test]
    fn controls_are_always_eligible() {
        let rules = Eligibility::new(PlateKind::Rerun);
        assert!(rules.check(&Occupant::control(Control::Blank)).is_ok());
    }
}
