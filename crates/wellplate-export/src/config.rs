use serde::{Deserialize, Serialize};

/// Per-row instrument and analysis constants written into every data line.
///
/// The defaults are the values the analyzer is set up for; a session file may
/// override any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentConfig {
    pub priority: u32,
    pub size_standard: String,
    pub panel: String,
    pub analysis_method: String,
    pub results_group: String,
    pub instrument_protocol: String,
    /// Accession prefix of embedded father references, e.g. the `25_` in
    /// `25_426(25_427)F`.
    pub reference_prefix: String,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            priority: 100,
            size_standard: "CE_G5_HID_GS500".to_string(),
            panel: "PowerPlex_Fusion_6C_Panels_v1".to_string(),
            analysis_method: "HID_Advanced".to_string(),
            results_group: "LDS_Results".to_string(),
            instrument_protocol: "HID36_POP4".to_string(),
            reference_prefix: "25_".to_string(),
        }
    }
}
