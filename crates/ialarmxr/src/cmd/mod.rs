use std::time::Duration;

use clap::{Args, Subcommand};
use ialarmxr::session::{DEFAULT_HOST, DEFAULT_PORT};
use ialarmxr::{AlarmPanel, Credentials, SessionConfig};

use crate::cmd::control::Control;
use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod control;
pub mod info;
pub mod status;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the arming state (triggered when armed with a zone in alarm).
    Status,
    /// List zone sensor flags.
    Zones,
    /// Arm all zones.
    ArmAway,
    /// Arm perimeter zones only.
    ArmStay,
    /// Disarm the panel.
    Disarm,
    /// Silence a triggered alarm.
    Cancel,
    /// Show the panel MAC address.
    Mac,
    /// Show panel firmware version.
    Version,
    /// Register this client for push notifications.
    Pair,
}

/// Where the panel is and how to log in.
#[derive(Args, Debug, Clone)]
pub struct PanelArgs {
    /// Panel or relay host.
    #[arg(long, global = true, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Panel or relay TCP port.
    #[arg(long, global = true, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Panel identifier.
    #[arg(long, global = true, env = "IALARMXR_UID")]
    pub uid: Option<String>,

    /// Panel password.
    #[arg(long, global = true, env = "IALARMXR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connect and read timeout (e.g. 10s, 500ms).
    #[arg(long, global = true, default_value = "10s")]
    pub timeout: String,
}

impl PanelArgs {
    pub fn open(&self) -> CliResult<AlarmPanel> {
        let uid = self
            .uid
            .clone()
            .ok_or_else(|| CliError::new(USAGE, "--uid (or IALARMXR_UID) is required"))?;
        let password = self.password.clone().ok_or_else(|| {
            CliError::new(USAGE, "--password (or IALARMXR_PASSWORD) is required")
        })?;
        let config = SessionConfig::default()
            .with_host(self.host.clone())
            .with_port(self.port)
            .with_timeout(parse_timeout(&self.timeout)?);
        Ok(AlarmPanel::new(Credentials::new(uid, password), config))
    }
}

pub fn run(command: Command, panel: &PanelArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Status => status::run_status(panel, format),
        Command::Zones => status::run_zones(panel, format),
        Command::ArmAway => control::run(Control::ArmAway, panel, format),
        Command::ArmStay => control::run(Control::ArmStay, panel, format),
        Command::Disarm => control::run(Control::Disarm, panel, format),
        Command::Cancel => control::run(Control::Cancel, panel, format),
        Command::Pair => control::run(Control::Pair, panel, format),
        Command::Mac => info::run_mac(panel, format),
        Command::Version => info::run_version(panel, format),
    }
}

pub fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(uid: Option<&str>, password: Option<&str>) -> PanelArgs {
        PanelArgs {
            host: "127.0.0.1".into(),
            port: 18034,
            uid: uid.map(str::to_string),
            password: password.map(str::to_string),
            timeout: "2s".into(),
        }
    }

    #[test]
    fn parse_timeout_units() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_timeout("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_timeout_invalid() {
        for input in ["0s", "bad", "", "-1s"] {
            assert_eq!(parse_timeout(input).unwrap_err().code, USAGE, "{input}");
        }
    }

    #[test]
    fn credentials_are_required() {
        assert_eq!(args(None, Some("pw")).open().unwrap_err().code, USAGE);
        assert_eq!(args(Some("id"), None).open().unwrap_err().code, USAGE);
        let panel = args(Some("id"), Some("pw")).open().unwrap();
        let config = panel.session().config();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.read_timeout, Duration::from_secs(2));
    }

    #[test]
    fn bad_timeout_is_usage_error() {
        let mut bad = args(Some("id"), Some("pw"));
        bad.timeout = "soon".into();
        assert_eq!(bad.open().unwrap_err().code, USAGE);
    }
}
