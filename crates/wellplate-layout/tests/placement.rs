use wellplate_core::{Control, Occupant, PlateKind, Relation, Sample, WellId, WorkflowStatus};
use wellplate_layout::{group_by_case, LayoutError, PlateSession};

fn well(s: &str) -> WellId {
    s.parse().unwrap()
}

fn wells(ids: &[&str]) -> Vec<WellId> {
    ids.iter().map(|s| well(s)).collect()
}

fn numbered(prefix: &str, n: usize) -> Vec<Sample> {
    (1..=n).map(|i| Sample::new(format!("{prefix}{i}"))).collect()
}

fn label_at(session: &PlateSession, id: &str) -> Option<String> {
    session
        .plate()
        .occupant_at(well(id))
        .map(|o| o.label().to_string())
}

#[test]
fn trio_fills_first_column_in_relation_order() {
    let samples = vec![
        Sample::new("25_12").with_case("K7", Relation::Mother),
        Sample::new("25_11").with_case("K7", Relation::AllegedFather),
        Sample::new("25_10(25_11)").with_case("K7", Relation::Child),
    ];
    let group = group_by_case(&samples).remove(0);

    let mut session = PlateSession::new(PlateKind::Pcr);
    let placed = session.place_group(well("A01"), &group.members).unwrap();

    assert!(placed.contiguous);
    assert_eq!(placed.wells, wells(&["A01", "B01", "C01"]));
    assert_eq!(label_at(&session, "A01").as_deref(), Some("25_10(25_11)"));
    assert_eq!(label_at(&session, "B01").as_deref(), Some("25_11"));
    assert_eq!(label_at(&session, "C01").as_deref(), Some("25_12"));
}

#[test]
fn large_group_spills_into_next_column_from_row_a() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    let members = numbered("m", 10);
    let placed = session.place_group(well("F01"), &members).unwrap();

    assert!(!placed.contiguous);
    assert!(placed.spans_columns());
    assert_eq!(
        placed.wells,
        wells(&["F01", "G01", "H01", "A02", "B02", "C02", "D02", "E02", "F02", "G02"])
    );
    assert_eq!(label_at(&session, "A02").as_deref(), Some("m4"));
    assert_eq!(label_at(&session, "G02").as_deref(), Some("m10"));
    assert!(session.plate().is_empty_at(well("H02")));
    assert!(session.plate().is_empty_at(well("A01")));
}

#[test]
fn group_that_cannot_fit_changes_nothing() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    session.auto_fill(&numbered("s", 94), &[]).unwrap();
    assert_eq!(session.plate().empty_count(), 2);
    let before = session.plate().clone();

    let err = session
        .place_group(well("A01"), &numbered("g", 3))
        .unwrap_err();

    assert_eq!(
        err,
        LayoutError::InsufficientSpace {
            start: well("A01"),
            required: 3,
            available: 2,
        }
    );
    assert_eq!(session.plate(), &before);
}

#[test]
fn placing_into_occupied_well_is_rejected() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    session.place(well("A01"), Sample::new("25_1")).unwrap();
    let err = session
        .place(well("A01"), Control::NegativeControl)
        .unwrap_err();
    assert!(matches!(err, LayoutError::Grid(_)));
    assert_eq!(label_at(&session, "A01").as_deref(), Some("25_1"));
}

#[test]
fn same_sample_cannot_be_placed_twice() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    session.place(well("A01"), Sample::new("25_1")).unwrap();
    let err = session.place(well("B01"), Sample::new("25_1")).unwrap_err();
    assert_eq!(
        err,
        LayoutError::SampleAlreadyPlaced {
            lab_number: "25_1".into(),
            well: well("A01"),
        }
    );
}

#[test]
fn auto_fill_walks_column_major() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    let report = session.auto_fill(&numbered("S", 5), &[]).unwrap();

    assert!(report.is_complete());
    for (i, id) in ["A01", "B01", "C01", "D01", "E01"].iter().enumerate() {
        assert_eq!(label_at(&session, id), Some(format!("S{}", i + 1)));
    }
    assert_eq!(session.plate().occupied_count(), 5);
}

#[test]
fn auto_fill_preserves_existing_controls() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    session.place(well("D01"), Control::NegativeControl).unwrap();
    session.place(well("B01"), Sample::new("old")).unwrap();

    session.auto_fill(&numbered("S", 5), &[]).unwrap();

    assert_eq!(
        session.plate().occupant_at(well("D01")),
        Some(&Occupant::control(Control::NegativeControl))
    );
    assert_eq!(label_at(&session, "C01").as_deref(), Some("S3"));
    assert_eq!(label_at(&session, "E01").as_deref(), Some("S4"));
    assert_eq!(label_at(&session, "F01").as_deref(), Some("S5"));
    assert!(session.plate().find_sample("old").is_none());
}

#[test]
fn controls_go_after_the_last_sample_column() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    let report = session
        .auto_fill(
            &numbered("S", 10),
            &[
                Control::AllelicLadder,
                Control::NegativeControl,
                Control::PositiveControl,
            ],
        )
        .unwrap();

    assert_eq!(
        report.controls,
        vec![
            (well("A03"), Control::NegativeControl),
            (well("B03"), Control::PositiveControl),
            (well("C03"), Control::AllelicLadder),
        ]
    );
}

#[test]
fn overfull_auto_fill_is_partial_not_an_error() {
    let mut session = PlateSession::new(PlateKind::Pcr);
    let report = session
        .auto_fill(&numbered("S", 100), &[Control::NegativeControl])
        .unwrap();

    assert_eq!(report.placed.len(), 96);
    let leftover: Vec<&str> = report.unplaced.iter().map(|s| s.lab_number.as_str()).collect();
    assert_eq!(leftover, ["S97", "S98", "S99", "S100"]);
    assert_eq!(report.unplaced_controls, [Control::NegativeControl]);
    assert!(!report.is_complete());
}

#[test]
fn rerun_plate_gates_samples_and_pcr_does_not() {
    let collected = Sample::new("25_5").with_status(WorkflowStatus::SampleCollected);

    let mut pcr = PlateSession::new(PlateKind::Pcr);
    pcr.place(well("A01"), collected.clone()).unwrap();

    let mut rerun = PlateSession::new(PlateKind::Rerun);
    let err = rerun.place(well("A01"), collected.clone()).unwrap_err();
    assert!(matches!(err, LayoutError::Ineligible { .. }));
    assert!(rerun.plate().is_empty());
}

#[test]
fn one_ineligible_member_aborts_the_whole_fill() {
    let mut session = PlateSession::new(PlateKind::Rerun);
    session.place(well("H12"), Control::AllelicLadder).unwrap();
    let mut samples: Vec<Sample> = numbered("E", 3)
        .into_iter()
        .map(|s| s.with_status(WorkflowStatus::ElectroBatched))
        .collect();
    samples.push(Sample::new("fresh"));
    let before = session.plate().clone();

    let err = session.auto_fill(&samples, &[]).unwrap_err();
    assert!(matches!(err, LayoutError::Ineligible { ref lab_number, .. } if lab_number == "fresh"));
    assert_eq!(session.plate(), &before);

    let err = session.place_group(well("A01"), &samples).unwrap_err();
    assert!(matches!(err, LayoutError::Ineligible { .. }));
    assert_eq!(session.plate(), &before);
}
