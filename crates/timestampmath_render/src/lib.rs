pub mod error;
pub mod ipc;

use std::path::Path;

use timestampmath::{Params, Warning};
use tracing::{info, instrument, warn};

pub use error::{RenderError, Result};

/// Run one invocation: read `input`, apply the params in `params`, write
/// the resulting table to `output`. Returns the warnings for the host.
#[instrument(name = "timestampmath_render::render_file", level = "debug")]
pub fn render_file(input: &Path, params: &Path, output: &Path) -> Result<Vec<Warning>> {
    let table = ipc::read_table(input)?;
    let params = read_params(params)?;

    let result = timestampmath::render(table, &params)?;
    for warning in &result.warnings {
        warn!(message_id = warning.message_id, "{warning}");
    }

    ipc::write_table(output, &result.table)?;
    info!(
        operation = ?params.operation,
        rows = result.table.num_rows(),
        columns = result.table.num_columns(),
        "wrote {}",
        output.display()
    );
    Ok(result.warnings)
}

pub fn read_params(path: &Path) -> Result<Params> {
    let text = std::fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
    let value = serde_json::from_str(&text).map_err(|e| RenderError::json(path, e))?;
    Ok(Params::from_json(value)?)
}
