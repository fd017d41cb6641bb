mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, PanelArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ialarmxr", version, about = "iAlarm-XR panel client")]
struct Cli {
    #[command(flatten)]
    panel: PanelArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, &cli.panel, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_with_connection_flags() {
        let cli = Cli::try_parse_from([
            "ialarmxr",
            "--host",
            "192.168.1.50",
            "--port",
            "18035",
            "--uid",
            "panel-01",
            "--password",
            "secret",
            "status",
        ])
        .expect("status args should parse");

        assert_eq!(cli.command, Command::Status);
        assert_eq!(cli.panel.host, "192.168.1.50");
        assert_eq!(cli.panel.port, 18035);
        assert_eq!(cli.panel.uid.as_deref(), Some("panel-01"));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "ialarmxr",
            "arm-stay",
            "--uid",
            "panel-01",
            "--timeout",
            "500ms",
            "--format",
            "json",
        ])
        .expect("trailing global flags should parse");
        assert_eq!(cli.command, Command::ArmStay);
        assert_eq!(cli.panel.timeout, "500ms");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn defaults_point_at_vendor_relay() {
        let cli = Cli::try_parse_from(["ialarmxr", "zones"]).expect("zones should parse");
        assert_eq!(cli.panel.host, "47.91.74.102");
        assert_eq!(cli.panel.port, 18034);
        assert_eq!(cli.panel.timeout, "10s");
    }

    #[test]
    fn subcommand_names_are_kebab_case() {
        for (name, command) in [
            ("arm-away", Command::ArmAway),
            ("disarm", Command::Disarm),
            ("cancel", Command::Cancel),
            ("mac", Command::Mac),
            ("version", Command::Version),
            ("pair", Command::Pair),
        ] {
            let cli = Cli::try_parse_from(["ialarmxr", name]).expect(name);
            assert_eq!(cli.command, command);
        }
    }

    #[test]
    fn rejects_unknown_subcommand() {
        let err = Cli::try_parse_from(["ialarmxr", "arm"]).expect_err("unknown subcommand");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }
}
