use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::pipeline::CondensedTranscript;
use crate::CondenserError;

/// File name for a run at the given chunk size
pub fn output_file_name(chunk_size: usize, format: &OutputFormat) -> String {
    format!(
        "final_transcript_chunk_size_{}.{}",
        chunk_size,
        format.extension()
    )
}

/// Render the result in the requested format
pub fn render(result: &CondensedTranscript, format: &OutputFormat) -> Result<String, CondenserError> {
    match format {
        OutputFormat::Text => Ok(result.condensed.clone()),
        OutputFormat::Json => serde_json::to_string_pretty(result).map_err(|e| {
            CondenserError::FileWrite {
                path: PathBuf::from(output_file_name(result.chunk_size, format)),
                message: format!("could not serialize result: {}", e),
            }
        }),
    }
}

/// Write the result into `dir`, returning the path written.
///
/// The file is written once, after the run completes.
pub fn write_output(
    result: &CondensedTranscript,
    dir: &Path,
    format: &OutputFormat,
) -> Result<PathBuf, CondenserError> {
    let path = dir.join(output_file_name(result.chunk_size, format));
    let content = render(result, format)?;

    fs_err::write(&path, &content).map_err(|e| CondenserError::FileWrite {
        path: path.clone(),
        message: e.to_string(),
    })?;

    tracing::info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(path)
}
