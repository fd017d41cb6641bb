use tracing::debug;

use crate::cmd::PanelArgs;
use crate::exit::{panel_error, CliResult, SUCCESS};
use crate::output::{print_status, print_zones, OutputFormat};

pub fn run_status(args: &PanelArgs, format: OutputFormat) -> CliResult<i32> {
    let mut panel = args.open()?;
    let status = panel
        .get_status()
        .map_err(|err| panel_error("status failed", err))?;
    debug!(%status, "status read");
    print_status(status, format);
    Ok(SUCCESS)
}

pub fn run_zones(args: &PanelArgs, format: OutputFormat) -> CliResult<i32> {
    let mut panel = args.open()?;
    let zones = panel
        .get_zones()
        .map_err(|err| panel_error("zone query failed", err))?;
    debug!(zones = zones.len(), "zones read");
    print_zones(&zones, format);
    Ok(SUCCESS)
}
