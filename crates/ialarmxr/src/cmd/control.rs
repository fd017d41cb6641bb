use ialarmxr::{AlarmPanel, Result};

use crate::cmd::PanelArgs;
use crate::exit::{panel_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

/// Commands that change panel state and answer with a bare acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ArmAway,
    ArmStay,
    Disarm,
    Cancel,
    Pair,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::ArmAway,
        Control::ArmStay,
        Control::Disarm,
        Control::Cancel,
        Control::Pair,
    ];

    /// Subcommand name, echoed in the acknowledgement.
    pub fn action(self) -> &'static str {
        match self {
            Control::ArmAway => "arm-away",
            Control::ArmStay => "arm-stay",
            Control::Disarm => "disarm",
            Control::Cancel => "cancel",
            Control::Pair => "pair",
        }
    }

    fn apply(self, panel: &mut AlarmPanel) -> Result<()> {
        match self {
            Control::ArmAway => panel.arm_away(),
            Control::ArmStay => panel.arm_stay(),
            Control::Disarm => panel.disarm(),
            Control::Cancel => panel.cancel_alarm(),
            Control::Pair => panel.pair(),
        }
    }
}

pub fn run(control: Control, args: &PanelArgs, format: OutputFormat) -> CliResult<i32> {
    let mut panel = args.open()?;
    let action = control.action();
    control
        .apply(&mut panel)
        .map_err(|err| panel_error(&format!("{action} failed"), err))?;
    print_ack(action, format);
    Ok(SUCCESS)
}
