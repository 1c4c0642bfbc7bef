use std::path::Path;

use rcasef::wav::render_file;

use super::PanelArgs;

pub fn run(input: &Path, output: &Path, panel: &PanelArgs) -> rcasef::Result<()> {
    let config = panel.resolve()?;
    let params = config.to_params();
    tracing::debug!(?params, "front panel");

    render_file(input, output, &params, config.block_size)
}
