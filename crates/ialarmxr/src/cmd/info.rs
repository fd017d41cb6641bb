use crate::cmd::PanelArgs;
use crate::exit::{panel_error, CliResult, SUCCESS};
use crate::output::{print_mac, print_version, OutputFormat};

pub fn run_mac(args: &PanelArgs, format: OutputFormat) -> CliResult<i32> {
    let mac = args
        .open()?
        .get_mac()
        .map_err(|err| panel_error("mac query failed", err))?;
    print_mac(mac, format);
    Ok(SUCCESS)
}

pub fn run_version(args: &PanelArgs, format: OutputFormat) -> CliResult<i32> {
    let version = args
        .open()?
        .get_version()
        .map_err(|err| panel_error("version query failed", err))?;
    print_version(&version, format);
    Ok(SUCCESS)
}
