use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};
use wellplate_batch::{
    Batch, BatchError, BatchLifecycle, BatchMeta, BatchNumber, StatusUpdate,
};
use wellplate_config::{load_session, SessionConfig};
use wellplate_core::{Control, Plate, PlateKind, Sample, WellId, COLUMNS, ROWS};
use wellplate_export::{render_batch, render_plate, template_filename, InstrumentConfig};
use wellplate_layout::{IntentOutcome, PlateSession};

use crate::error::CliError;
use crate::store::JsonFileStore;

/// A laid-out plate plus whatever did not fit.
struct Layout {
    session: PlateSession,
    unplaced: Vec<String>,
    unplaced_controls: Vec<Control>,
}

#[derive(Serialize)]
struct WellSummary<'a> {
    label: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct LayoutSummary<'a> {
    kind: PlateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    batch_number: Option<String>,
    operator: &'a str,
    date: String,
    wells: IndexMap<String, WellSummary<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unplaced: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unplaced_controls: Vec<&'static str>,
}

fn load(path: &Path) -> Result<SessionConfig, CliError> {
    load_session(path).map_err(|e| CliError::input(format!("{}: {e}", path.display())))
}

/// Lays out the session. `sources` are samples loaded from the rerun source
/// batch; they count as pre-approved.
fn build_layout(config: &SessionConfig, sources: &[Sample]) -> Result<Layout, CliError> {
    let mut session = config.open_session();
    session.approve_sources(sources);
    let intents = config
        .intents()
        .map_err(|e| CliError::input(e.to_string()))?;

    let mut unplaced = Vec::new();
    let mut unplaced_controls = Vec::new();
    for intent in intents {
        let outcome = session
            .apply(intent)
            .map_err(|e| CliError::processing(e.to_string()))?;
        if let IntentOutcome::Filled(report) = outcome {
            unplaced.extend(report.unplaced.into_iter().map(|s| s.lab_number));
            unplaced_controls.extend(report.unplaced_controls);
        }
    }
    if !config.auto_fill {
        unplaced.extend(
            config
                .samples
                .iter()
                .filter(|s| session.plate().find_sample(&s.lab_number).is_none())
                .map(|s| s.lab_number.clone()),
        );
    }
    for lab in &unplaced {
        warn!(lab_number = %lab, "sample left off the plate");
    }

    Ok(Layout {
        session,
        unplaced,
        unplaced_controls,
    })
}

fn ensure_dir(dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        CliError::processing(format!("Could not create {}: {e}", dir.display()))
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| CliError::processing(format!("Could not write {}: {e}", path.display())))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn write_template(
    output: &Path,
    plate: &Plate,
    batch_number: &str,
    operator: &str,
    instrument: &InstrumentConfig,
) -> Result<PathBuf, CliError> {
    let doc = render_plate(plate, batch_number, operator, instrument)
        .map_err(|e| CliError::processing(e.to_string()))?;
    let path = output.join(template_filename(batch_number));
    write_file(&path, &doc)?;
    Ok(path)
}

fn write_summary(
    output: &Path,
    config: &SessionConfig,
    layout: &Layout,
    batch_number: Option<String>,
) -> Result<(), CliError> {
    let summary = LayoutSummary {
        kind: config.kind,
        batch_number,
        operator: &config.operator,
        date: config.date_or_today().to_string(),
        wells: layout
            .session
            .plate()
            .occupied()
            .map(|(id, occ)| {
                (
                    id.to_string(),
                    WellSummary {
                        label: occ.label(),
                        kind: occ.kind_name(),
                    },
                )
            })
            .collect(),
        unplaced: layout.unplaced.iter().map(String::as_str).collect(),
        unplaced_controls: layout.unplaced_controls.iter().map(|c| c.label()).collect(),
    };
    let yaml =
        serde_yaml::to_string(&summary).map_err(|e| CliError::processing(e.to_string()))?;
    write_file(&output.join("layout.yaml"), &yaml)
}

/// Text plate map, one line per row, for `--debug`.
fn plate_map(plate: &Plate) -> String {
    let mut out = String::from("    ");
    for column in 1..=COLUMNS {
        out.push_str(&format!("{column:>8}"));
    }
    out.push('\n');
    for row in 0..ROWS {
        let wells: Vec<WellId> = (1..=COLUMNS)
            .filter_map(|column| WellId::new(row, column).ok())
            .collect();
        let Some(first) = wells.first() else {
            continue;
        };
        out.push_str(&format!("  {} ", first.row_letter()));
        for well in wells {
            let label = plate.occupant_at(well).map_or(".", |o| o.label());
            let short: String = label.chars().take(7).collect();
            out.push_str(&format!("{short:>8}"));
        }
        out.push('\n');
    }
    out
}

fn report_layout(layout: &Layout, debug: bool) {
    let plate = layout.session.plate();
    let controls = plate.occupied_count() - plate.samples().count();
    println!(
        "Laid out {} samples and {controls} controls on a {} plate.",
        plate.samples().count(),
        layout.session.kind()
    );
    if !layout.unplaced.is_empty() {
        println!("Unplaced samples: {}", layout.unplaced.join(", "));
    }
    if !layout.unplaced_controls.is_empty() {
        let names: Vec<&str> = layout.unplaced_controls.iter().map(|c| c.label()).collect();
        println!("Unplaced controls: {}", names.join(", "));
    }
    if debug {
        print!("{}", plate_map(plate));
    }
}

pub fn run_layout(session: &Path, output: &Path, debug: bool) -> Result<(), CliError> {
    let config = load(session)?;
    let layout = build_layout(&config, &[])?;
    report_layout(&layout, debug);

    ensure_dir(output)?;
    let batch_number = config.batch_number.map(|n| n.to_string());
    write_summary(output, &config, &layout, batch_number.clone())?;
    if let Some(number) = batch_number {
        write_template(
            output,
            layout.session.plate(),
            &number,
            &config.operator,
            &config.instrument,
        )?;
    }
    Ok(())
}

/// Samples of the electrophoresis batch a rerun session names as its source.
async fn source_samples(
    lifecycle: &BatchLifecycle<JsonFileStore>,
    config: &SessionConfig,
) -> Result<Vec<Sample>, CliError> {
    let Some(number) = config.recorded_source() else {
        return Ok(Vec::new());
    };
    let sources = lifecycle
        .eligible_sources(config.kind)
        .await
        .map_err(|e| CliError::processing(e.to_string()))?;
    let Some(source) = sources.iter().find(|s| s.batch_number == number) else {
        return Err(CliError::input(format!(
            "source batch {number} is not an electrophoresis batch in the store"
        )));
    };
    let samples = lifecycle.load_source(&source.id).await.map_err(|e| match e {
        BatchError::SourceNotFound { .. } | BatchError::InvalidSource { .. } => {
            CliError::input(e.to_string())
        }
        other => CliError::processing(other.to_string()),
    })?;
    debug!(source = number, samples = samples.len(), "approved rerun source samples");
    Ok(samples)
}

pub async fn run_finalize(
    session: &Path,
    store_dir: &Path,
    output: &Path,
    debug: bool,
) -> Result<(), CliError> {
    let config = load(session)?;
    let store = JsonFileStore::open(store_dir).map_err(|e| CliError::input(e.to_string()))?;
    let lifecycle = BatchLifecycle::new(store);

    let sources = source_samples(&lifecycle, &config).await?;
    let layout = build_layout(&config, &sources)?;
    report_layout(&layout, debug);
    let batch_number: BatchNumber = match config.batch_number {
        Some(number) => number,
        None => lifecycle
            .next_batch_number(config.kind)
            .await
            .map_err(|e| CliError::processing(e.to_string()))?,
    };
    debug!(%batch_number, "finalizing");

    let meta = BatchMeta {
        kind: config.kind,
        batch_number,
        operator: config.operator.clone(),
        date: config.date_or_today(),
        source_batch: config.recorded_source().map(str::to_string),
    };
    let done = lifecycle
        .finalize(layout.session.plate(), &meta)
        .await
        .map_err(|e| CliError::processing(e.to_string()))?;
    println!(
        "Finalized {} (batch id {}) with {} samples.",
        done.batch_number, done.batch_id, done.sample_count
    );
    match &done.status_update {
        StatusUpdate::Applied => println!("Workflow status updated."),
        StatusUpdate::NotRequired => {}
        StatusUpdate::Failed(message) => {
            eprintln!("warning: batch saved but workflow status was not updated: {message}");
        }
    }

    ensure_dir(output)?;
    write_summary(output, &config, &layout, Some(done.batch_number.clone()))?;
    write_template(
        output,
        layout.session.plate(),
        &done.batch_number,
        &config.operator,
        &config.instrument,
    )?;
    info!(batch_number = %done.batch_number, "finalize complete");
    Ok(())
}

pub fn run_export(batch_path: &Path, operator: &str, output: &Path) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(batch_path).map_err(|e| {
        CliError::input(format!("Could not read batch {}: {e}", batch_path.display()))
    })?;
    let batch: Batch = serde_json::from_str(&raw).map_err(|e| {
        CliError::input(format!("{} is not a batch record: {e}", batch_path.display()))
    })?;
    let doc = render_batch(&batch, operator, &InstrumentConfig::default())
        .map_err(|e| CliError::processing(e.to_string()))?;

    ensure_dir(output)?;
    write_file(&output.join(template_filename(&batch.batch_number)), &doc)
}

pub async fn run_sources(store_dir: &Path) -> Result<(), CliError> {
    let store = JsonFileStore::open(store_dir).map_err(|e| CliError::input(e.to_string()))?;
    let lifecycle = BatchLifecycle::new(store);
    let sources = lifecycle
        .eligible_sources(PlateKind::Rerun)
        .await
        .map_err(|e| CliError::input(e.to_string()))?;
    if sources.is_empty() {
        println!("No electrophoresis batches available for rerun.");
        return Ok(());
    }
    println!("ID\tBatch\tDate\tSamples");
    for source in sources {
        println!(
            "{}\t{}\t{}\t{}",
            source.id, source.batch_number, source.date, source.sample_count
        );
    }
    Ok(())
}
