use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};
use wellplate_core::{Control, Occupant, Plate, Sample, WellId, COLUMNS, ROWS};

use crate::{Eligibility, LayoutError};

/// Places one item (sample or control) into `well`.
pub fn place_single(
    plate: &mut Plate,
    rules: &Eligibility,
    well: WellId,
    occupant: Occupant,
) -> Result<(), LayoutError> {
    rules.check(&occupant)?;
    if let Occupant::Sample(sample) = &occupant {
        ensure_not_on_plate(plate, sample)?;
    }
    plate.place(well, occupant)?;
    debug!(%well, "placed single occupant");
    Ok(())
}

/// Wells chosen for a family group, in member order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPlacement {
    pub wells: Vec<WellId>,
    /// True when the group went straight down the target column.
    pub contiguous: bool,
}

impl GroupPlacement {
    /// Informational only: the group did not fit in one column.
    #[must_use]
    pub fn spans_columns(&self) -> bool {
        self.wells
            .first()
            .is_some_and(|first| self.wells.iter().any(|w| w.column() != first.column()))
    }
}

/// Finds `n` empty wells for a group anchored at `start` without touching
/// the plate.
///
/// The simple path takes `n` consecutive wells down the start column. When
/// that does not fit, the search collects empty wells below the start, then
/// whole columns to the right (top-down), then columns to the left (nearest
/// first, top-down) and finally the start column above the start. Wells to
/// the left are kept ahead of the rest so the order stays column-major.
pub fn find_group_wells(
    plate: &Plate,
    start: WellId,
    n: usize,
) -> Result<GroupPlacement, LayoutError> {
    let (r0, c0) = (start.row(), start.column());

    if r0 + n <= ROWS {
        let straight: Vec<WellId> = WellId::column_wells(c0).skip(r0).take(n).collect();
        if straight.iter().all(|w| plate.is_empty_at(*w)) {
            return Ok(GroupPlacement {
                wells: straight,
                contiguous: true,
            });
        }
    }

    let empty_in =
        move |column: usize| WellId::column_wells(column).filter(move |w| plate.is_empty_at(*w));

    let mut after: Vec<WellId> = empty_in(c0).filter(|w| w.row() >= r0).take(n).collect();
    for column in c0 + 1..=COLUMNS {
        if after.len() >= n {
            break;
        }
        let missing = n - after.len();
        after.extend(empty_in(column).take(missing));
    }

    let mut before: Vec<WellId> = Vec::new();
    for column in (1..c0).rev() {
        let missing = n - after.len() - before.len();
        if missing == 0 {
            break;
        }
        before.extend(empty_in(column).take(missing));
    }
    let missing = n - after.len() - before.len();
    if missing > 0 {
        before.extend(empty_in(c0).filter(|w| w.row() < r0).take(missing));
    }
    before.sort_by_key(|w| (w.column(), w.row()));

    let available = before.len() + after.len();
    if available < n {
        return Err(LayoutError::InsufficientSpace {
            start,
            required: n,
            available,
        });
    }

    before.extend(after);
    Ok(GroupPlacement {
        wells: before,
        contiguous: false,
    })
}

/// Places an ordered family group starting at `start`. Either every member
/// is placed or the plate is left untouched.
pub fn place_group(
    plate: &mut Plate,
    rules: &Eligibility,
    start: WellId,
    members: &[Sample],
) -> Result<GroupPlacement, LayoutError> {
    if members.is_empty() {
        return Err(LayoutError::EmptyGroup);
    }
    rules.check_all(members)?;
    ensure_unique(members)?;
    for sample in members {
        ensure_not_on_plate(plate, sample)?;
    }

    let placement = find_group_wells(plate, start, members.len())?;
    for (well, sample) in placement.wells.iter().zip(members) {
        plate.place(*well, Occupant::Sample(sample.clone()))?;
    }

    if placement.spans_columns() {
        warn!(
            %start,
            members = members.len(),
            first = %placement.wells[0],
            "family group spans more than one column"
        );
    } else {
        debug!(%start, members = members.len(), "family group placed");
    }
    Ok(placement)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoFillReport {
    pub placed: Vec<(WellId, String)>,
    /// Samples that did not fit; a partial fill is not an error.
    pub unplaced: Vec<Sample>,
    pub controls: Vec<(WellId, Control)>,
    pub unplaced_controls: Vec<Control>,
}

impl AutoFillReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty() && self.unplaced_controls.is_empty()
    }
}

/// Re-lays every sample on the plate column by column.
///
/// Existing controls stay where they are and are skipped over. Requested
/// controls then go into the first column after the last sample column,
/// from row A, in the order negative, positive, ladder.
pub fn auto_fill(
    plate: &mut Plate,
    rules: &Eligibility,
    samples: &[Sample],
    controls: &[Control],
) -> Result<AutoFillReport, LayoutError> {
    rules.check_all(samples)?;
    ensure_unique(samples)?;

    plate.clear_samples();
    let mut report = AutoFillReport::default();

    let free: Vec<WellId> = WellId::column_major()
        .filter(|w| plate.is_empty_at(*w))
        .collect();
    let mut pending = samples.iter();
    for well in free {
        let Some(sample) = pending.next() else {
            break;
        };
        plate.place(well, Occupant::Sample(sample.clone()))?;
        report.placed.push((well, sample.lab_number.clone()));
    }
    report.unplaced = pending.cloned().collect();

    let last_column = report
        .placed
        .iter()
        .map(|(w, _)| w.column())
        .max()
        .unwrap_or(0);

    let mut requested: Vec<Control> = Control::AUTO_FILL_ORDER
        .into_iter()
        .filter(|c| controls.contains(c))
        .collect();
    report
        .unplaced_controls
        .extend(controls.iter().filter(|c| **c == Control::Blank).take(1));

    let control_wells: Vec<WellId> = WellId::column_major()
        .filter(|w| w.column() > last_column && plate.is_empty_at(*w))
        .take(requested.len())
        .collect();
    let overflow = requested.split_off(control_wells.len().min(requested.len()));
    for (well, kind) in control_wells.into_iter().zip(requested) {
        plate.place(well, Occupant::control(kind))?;
        report.controls.push((well, kind));
    }
    report.unplaced_controls.extend(overflow);

    if report.is_complete() {
        info!(
            samples = report.placed.len(),
            controls = report.controls.len(),
            "auto-fill complete"
        );
    } else {
        warn!(
            placed = report.placed.len(),
            unplaced = report.unplaced.len(),
            unplaced_controls = report.unplaced_controls.len(),
            "plate full, auto-fill left items unplaced"
        );
    }
    Ok(report)
}

fn ensure_not_on_plate(plate: &Plate, sample: &Sample) -> Result<(), LayoutError> {
    match plate.find_sample(&sample.lab_number) {
        Some(well) => Err(LayoutError::SampleAlreadyPlaced {
            lab_number: sample.lab_number.clone(),
            well,
        }),
        None => Ok(()),
    }
}

fn ensure_unique(samples: &[Sample]) -> Result<(), LayoutError> {
    let mut seen = HashSet::new();
    for sample in samples {
        if !seen.insert(sample.lab_number.as_str()) {
            return Err(LayoutError::DuplicateSample {
                lab_number: sample.lab_number.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellplate_core::PlateKind;

    fn well(s: &str) -> WellId {
        s.parse().unwrap()
    }

    #[test]
    fn straight_path_used_when_column_has_room() {
        let plate = Plate::new();
        let found = find_group_wells(&plate, well("B03"), 3).unwrap();
        assert!(found.contiguous);
        assert_eq!(found.wells, [well("B03"), well("C03"), well("D03")]);
    }

    #[test]
    fn blocked_straight_path_skips_occupied_wells_in_column() {
        let mut plate = Plate::new();
        plate
            .place(well("B01"), Occupant::control(Control::PositiveControl))
            .unwrap();
        let found = find_group_wells(&plate, well("A01"), 3).unwrap();
        assert!(!found.contiguous);
        assert!(!found.spans_columns());
        assert_eq!(found.wells, [well("A01"), well("C01"), well("D01")]);
    }

    #[test]
    fn left_columns_are_prepended_in_column_order() {
        let mut plate = Plate::new();
        // fill columns 11 and 12 except H11, H12; leave column 10 empty
        let rules = Eligibility::new(PlateKind::Pcr);
        for (i, w) in WellId::column_major()
            .filter(|w| w.column() >= 11 && w.row() < 7)
            .enumerate()
        {
            place_single(&mut plate, &rules, w, Sample::new(format!("f{i}")).into()).unwrap();
        }
        let found = find_group_wells(&plate, well("H11"), 4).unwrap();
        assert_eq!(
            found.wells,
            [well("A10"), well("B10"), well("H11"), well("H12")]
        );
    }

    #[test]
    fn blank_is_never_auto_placed() {
        let mut plate = Plate::new();
        let rules = Eligibility::new(PlateKind::Pcr);
        let report = auto_fill(
            &mut plate,
            &rules,
            &[Sample::new("s1")],
            &[Control::Blank, Control::AllelicLadder],
        )
        .unwrap();
        assert_eq!(report.controls, [(well("A02"), Control::AllelicLadder)]);
        assert_eq!(report.unplaced_controls, [Control::Blank]);
    }
}
