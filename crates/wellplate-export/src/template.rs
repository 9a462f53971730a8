use tracing::info;
use wellplate_batch::Batch;
use wellplate_core::{Occupant, Plate, WellId};

use crate::config::InstrumentConfig;
use crate::naming::{control_fields, sample_comment, sample_name, ReferenceParser};
use crate::ExportError;

const CONTAINER_HEADER: &str = "Container Name\tPlate ID\tDescription\tContainerType\tAppType\tOwner\tOperator\tPlateSealing\tSchedulingPref";
const APP_SERVER_HEADER: &str = "AppServer\tAppInstance";
const APP_INSTANCE: &str = "GeneMapper\tGeneMapper_Generic_Instance";
const COLUMN_HEADER: &str = "Well\tSample Name\tComment\tPriority\tSize Standard\tSnp Set\tUser-Defined 3\tUser-Defined 2\tUser-Defined 1\tPanel\tStudy\tSample Type\tAnalysis Method\tResults Group 1\tInstrument Protocol 1";

/// Free text must not carry the document's own delimiters.
fn checked<'a>(field: &str, value: &'a str) -> Result<&'a str, ExportError> {
    if value.contains(['\t', '\n', '\r']) {
        return Err(ExportError::DelimiterInField {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[must_use]
pub fn template_filename(batch_number: &str) -> String {
    format!("{batch_number}.txt")
}

/// Renders the import document for an arbitrary set of occupied wells.
///
/// Rows are written in row-major order (A01, A02, .., H12) whatever order the
/// wells arrive in.
pub fn render_wells<'a, I>(
    wells: I,
    batch_number: &str,
    operator: &str,
    instrument: &InstrumentConfig,
) -> Result<String, ExportError>
where
    I: IntoIterator<Item = (WellId, &'a Occupant)>,
{
    let mut wells: Vec<(WellId, &Occupant)> = wells.into_iter().collect();
    if wells.is_empty() {
        return Err(ExportError::EmptyPlate {
            batch_number: batch_number.to_string(),
        });
    }
    wells.sort_by_key(|(id, _)| *id);
    checked("batch number", batch_number)?;
    checked("operator", operator)?;
    for (field, value) in [
        ("size standard", &instrument.size_standard),
        ("panel", &instrument.panel),
        ("analysis method", &instrument.analysis_method),
        ("results group", &instrument.results_group),
        ("instrument protocol", &instrument.instrument_protocol),
    ] {
        checked(field, value)?;
    }

    let parser = ReferenceParser::new(&instrument.reference_prefix)?;
    let plate_samples: Vec<_> = wells.iter().filter_map(|(_, o)| o.as_sample()).collect();

    let mut out = String::new();
    for line in [
        CONTAINER_HEADER.to_string(),
        format!(
            "{batch_number}\t{batch_number}\t\t96-Well\tRegular\t{operator}\t{operator}\tSepta\t1234"
        ),
        APP_SERVER_HEADER.to_string(),
        APP_INSTANCE.to_string(),
        COLUMN_HEADER.to_string(),
    ] {
        out.push_str(&line);
        out.push('\n');
    }

    for (id, occupant) in &wells {
        let (name, comment) = match occupant {
            Occupant::Sample(sample) => (
                sample_name(sample),
                sample_comment(sample, &plate_samples, &parser),
            ),
            Occupant::Control { kind } => {
                let (name, comment) = control_fields(*kind);
                (name.to_string(), comment.to_string())
            }
        };
        let name = checked(&format!("sample name at {id}"), &name)?;
        let comment = checked(&format!("comment at {id}"), &comment)?;
        // Well, name, comment, priority, size standard, 3x user-defined + snp
        // set (empty), panel, study (empty), type, method, group, protocol.
        out.push_str(&format!(
            "{id}\t{name}\t{comment}\t{}\t{}\t\t\t\t\t{}\t\t{}\t{}\t{}\t{}\n",
            instrument.priority,
            instrument.size_standard,
            instrument.panel,
            occupant.sample_type(),
            instrument.analysis_method,
            instrument.results_group,
            instrument.instrument_protocol,
        ));
    }

    info!(batch_number, rows = wells.len(), "rendered import template");
    Ok(out)
}

pub fn render_plate(
    plate: &Plate,
    batch_number: &str,
    operator: &str,
    instrument: &InstrumentConfig,
) -> Result<String, ExportError> {
    render_wells(plate.occupied(), batch_number, operator, instrument)
}

/// Renders a persisted batch. `operator` is the person exporting, which
/// need not be the one who finalized it.
pub fn render_batch(
    batch: &Batch,
    operator: &str,
    instrument: &InstrumentConfig,
) -> Result<String, ExportError> {
    render_wells(
        batch.wells.iter().map(|(id, entry)| (*id, &entry.occupant)),
        &batch.batch_number,
        operator,
        instrument,
    )
}
