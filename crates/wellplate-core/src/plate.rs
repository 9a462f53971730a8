use crate::well::{WellId, WELL_COUNT};
use crate::{GridError, Occupant, Sample};

/// The 8x12 grid being edited for one batch.
///
/// A plate always has exactly 96 wells and each well holds at most one
/// occupant. It carries no state beyond occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plate {
    wells: Vec<Option<Occupant>>,
}

impl Default for Plate {
    fn default() -> Self {
        Self::new()
    }
}

impl Plate {
    /// An empty plate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wells: vec![None; WELL_COUNT],
        }
    }

    #[must_use]
    pub fn occupant_at(&self, well: WellId) -> Option<&Occupant> {
        self.wells[well.index()].as_ref()
    }

    #[must_use]
    pub fn is_empty_at(&self, well: WellId) -> bool {
        self.wells[well.index()].is_none()
    }

    pub fn place(&mut self, well: WellId, occupant: Occupant) -> Result<(), GridError> {
        let slot = &mut self.wells[well.index()];
        if let Some(existing) = slot {
            return Err(GridError::WellOccupied {
                well,
                occupant: existing.label().to_string(),
            });
        }
        *slot = Some(occupant);
        Ok(())
    }

    /// Empties a well, returning what was there.
    pub fn clear(&mut self, well: WellId) -> Option<Occupant> {
        self.wells[well.index()].take()
    }

    pub fn clear_all(&mut self) {
        self.wells.iter_mut().for_each(|w| *w = None);
    }

    /// Empties every well that does not hold a control.
    pub fn clear_samples(&mut self) {
        for slot in &mut self.wells {
            if matches!(slot, Some(Occupant::Sample(_))) {
                *slot = None;
            }
        }
    }

    /// Occupied wells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (WellId, &Occupant)> {
        WellId::row_major().filter_map(move |id| self.occupant_at(id).map(|occ| (id, occ)))
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.wells.iter().filter(|w| w.is_some()).count()
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        WELL_COUNT - self.occupied_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// Samples on the plate, row-major.
    pub fn samples(&self) -> impl Iterator<Item = (WellId, &Sample)> {
        self.occupied()
            .filter_map(|(id, occ)| occ.as_sample().map(|s| (id, s)))
    }

    /// Well holding the sample with this accession, if it is on the plate.
    #[must_use]
    pub fn find_sample(&self, lab_number: &str) -> Option<WellId> {
        self.samples()
            .find(|(_, s)| s.lab_number == lab_number)
            .map(|(id, _)| id)
    }

    /// Highest column that holds a sample, or 0 when none does.
    #[must_use]
    pub fn last_sample_column(&self) -> usize {
        self.samples().map(|(id, _)| id.column()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Control;

    fn well(s: &str) -> WellId {
        s.parse().unwrap()
    }

    #[test]
    fn place_then_read_back() {
        let mut plate = Plate::new();
        plate.place(well("A01"), Sample::new("25_1").into()).unwrap();
        assert_eq!(plate.occupant_at(well("A01")).unwrap().label(), "25_1");
        assert_eq!(plate.occupied_count(), 1);
    }

    #[test]
    fn placing_into_occupied_well_changes_nothing() {
        let mut plate = Plate::new();
        plate.place(well("A01"), Sample::new("25_1").into()).unwrap();
        let before = plate.clone();
        let err = plate
            .place(well("A01"), Occupant::control(Control::NegativeControl))
            .unwrap_err();
        assert!(matches!(err, GridError::WellOccupied { .. }));
        assert_eq!(plate, before);
    }

    #[test]
    fn clear_samples_keeps_controls() {
        let mut plate = Plate::new();
        plate.place(well("A01"), Sample::new("25_1").into()).unwrap();
        plate
            .place(well("D01"), Occupant::control(Control::NegativeControl))
            .unwrap();
        plate.clear_samples();
        assert!(plate.is_empty_at(well("A01")));
        assert!(plate.occupant_at(well("D01")).unwrap().is_control());
    }

    #[test]
    fn clear_all_resets_every_well() {
        let mut plate = Plate::new();
        plate.place(well("H12"), Sample::new("25_9").into()).unwrap();
        plate.clear_all();
        assert!(plate.is_empty());
        assert_eq!(plate.empty_count(), 96);
    }
}
