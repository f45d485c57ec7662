use crate::hooks::ProofSink;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

pub const PROOF_FILE_NAME: &str = "proof.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved,
    NothingToExport,
}

/// Pretty-print a proof with four-space indentation.
pub fn format_proof(proof: &Value) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    proof.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Hand the proof to the sink as `proof.json`.
pub async fn export_proof(
    proof: Option<&Value>,
    sink: &dyn ProofSink,
) -> anyhow::Result<ExportOutcome> {
    let Some(proof) = proof else {
        info!("no proof to export");
        return Ok(ExportOutcome::NothingToExport);
    };

    let document = format_proof(proof)?;
    sink.save(PROOF_FILE_NAME, &document).await?;
    Ok(ExportOutcome::Saved)
}
