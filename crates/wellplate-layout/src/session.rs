use serde::{Deserialize, Serialize};
use tracing::debug;
use wellplate_core::{Control, Occupant, Plate, PlateKind, Sample, WellId};

use crate::placement::{auto_fill, place_group, place_single, AutoFillReport, GroupPlacement};
use crate::{Eligibility, LayoutError};

/// A discrete edit coming from the plate editor (drag and drop, buttons).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum PlacementIntent {
    Place { well: WellId, item: Occupant },
    PlaceGroup { well: WellId, members: Vec<Sample> },
    Clear { well: WellId },
    ClearAll,
    AutoFill {
        samples: Vec<Sample>,
        #[serde(default)]
        controls: Vec<Control>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Placed(WellId),
    Group(GroupPlacement),
    Cleared(Option<Occupant>),
    ClearedAll,
    Filled(AutoFillReport),
}

/// One operator's editing session over a single plate.
///
/// The session is the only way to mutate its plate, and every mutation goes
/// through the eligibility rules for the session's plate kind.
#[derive(Debug, Clone)]
pub struct PlateSession {
    plate: Plate,
    rules: Eligibility,
}

impl PlateSession {
    #[must_use]
    pub fn new(kind: PlateKind) -> Self {
        Self {
            plate: Plate::new(),
            rules: Eligibility::new(kind),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PlateKind {
        self.rules.kind()
    }

    #[must_use]
    pub fn plate(&self) -> &Plate {
        &self.plate
    }

    #[must_use]
    pub fn into_plate(self) -> Plate {
        self.plate
    }

    #[must_use]
    pub fn eligibility(&self) -> &Eligibility {
        &self.rules
    }

    /// Marks samples loaded from a chosen electrophoresis batch as eligible.
    pub fn approve_sources<'a, I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        self.rules
            .approve(samples.into_iter().map(|s| s.lab_number.clone()));
    }

    pub fn place(&mut self, well: WellId, item: impl Into<Occupant>) -> Result<(), LayoutError> {
        place_single(&mut self.plate, &self.rules, well, item.into())
    }

    pub fn place_group(
        &mut self,
        well: WellId,
        members: &[Sample],
    ) -> Result<GroupPlacement, LayoutError> {
        place_group(&mut self.plate, &self.rules, well, members)
    }

    pub fn auto_fill(
        &mut self,
        samples: &[Sample],
        controls: &[Control],
    ) -> Result<AutoFillReport, LayoutError> {
        auto_fill(&mut self.plate, &self.rules, samples, controls)
    }

    pub fn clear(&mut self, well: WellId) -> Option<Occupant> {
        self.plate.clear(well)
    }

    pub fn clear_all(&mut self) {
        self.plate.clear_all();
    }

    pub fn apply(&mut self, intent: PlacementIntent) -> Result<IntentOutcome, LayoutError> {
        debug!(?intent, "applying placement intent");
        match intent {
            PlacementIntent::Place { well, item } => {
                self.place(well, item)?;
                Ok(IntentOutcome::Placed(well))
            }
            PlacementIntent::PlaceGroup { well, members } => {
                self.place_group(well, &members).map(IntentOutcome::Group)
            }
            PlacementIntent::Clear { well } => Ok(IntentOutcome::Cleared(self.clear(well))),
            PlacementIntent::ClearAll => {
                self.clear_all();
                Ok(IntentOutcome::ClearedAll)
            }
            PlacementIntent::AutoFill { samples, controls } => {
                self.auto_fill(&samples, &controls).map(IntentOutcome::Filled)
            }
        }
    }
}
