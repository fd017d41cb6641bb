use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ialarmxr::{AlarmStatus, MacAddress, PanelVersion, ZoneStatus};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct StatusOutput {
    status: AlarmStatus,
    code: i32,
}

#[derive(Serialize)]
pub struct ZoneOutput {
    pub zone: usize,
    pub raw: u32,
    pub flags: Vec<&'static str>,
}

impl ZoneOutput {
    /// Zones are numbered from 1, as on the panel keypad.
    pub fn list(zones: &[ZoneStatus]) -> Vec<ZoneOutput> {
        zones
            .iter()
            .enumerate()
            .map(|(index, zone)| ZoneOutput {
                zone: index + 1,
                raw: zone.bits(),
                flags: zone.labels(),
            })
            .collect()
    }
}

#[derive(Serialize)]
struct AckOutput<'a> {
    action: &'a str,
    ok: bool,
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_status(status: AlarmStatus, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&StatusOutput {
            status,
            code: status.code(),
        }),
        OutputFormat::Table => {
            let mut out = table(vec!["STATUS", "CODE"]);
            out.add_row(vec![status.to_string(), status.code().to_string()]);
            println!("{out}");
        }
        OutputFormat::Pretty => println!("Alarm status: {status} ({})", status.code()),
        OutputFormat::Raw => println!("{}", status.code()),
    }
}

pub fn print_zones(zones: &[ZoneStatus], format: OutputFormat) {
    let rows = ZoneOutput::list(zones);
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut out = table(vec!["ZONE", "RAW", "FLAGS"]);
            for row in &rows {
                out.add_row(vec![
                    row.zone.to_string(),
                    row.raw.to_string(),
                    flags_text(&row.flags),
                ]);
            }
            println!("{out}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!("zone {:>3}: {}", row.zone, flags_text(&row.flags));
            }
        }
        OutputFormat::Raw => {
            for row in &rows {
                println!("{}", row.raw);
            }
        }
    }
}

fn flags_text(flags: &[&str]) -> String {
    if flags.is_empty() {
        "not_used".to_string()
    } else {
        flags.join(",")
    }
}

pub fn print_mac(mac: MacAddress, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "mac": mac })),
        OutputFormat::Table => {
            let mut out = table(vec!["MAC"]);
            out.add_row(vec![mac.to_string()]);
            println!("{out}");
        }
        OutputFormat::Pretty => println!("MAC address: {mac}"),
        OutputFormat::Raw => println!("{mac}"),
    }
}

pub fn print_version(version: &PanelVersion, format: OutputFormat) {
    let unknown = |value: &Option<String>| value.clone().unwrap_or_else(|| "unknown".to_string());
    match format {
        OutputFormat::Json => print_json(version),
        OutputFormat::Table => {
            let mut out = table(vec!["DEVICE TYPE", "DEVICE", "VERSION", "CODE TYPE"]);
            out.add_row(vec![
                unknown(&version.dev_type),
                unknown(&version.device),
                unknown(&version.version),
                unknown(&version.code_type),
            ]);
            println!("{out}");
        }
        OutputFormat::Pretty => {
            println!("Panel Version:");
            println!("  Device type: {}", unknown(&version.dev_type));
            println!("  Device:      {}", unknown(&version.device));
            println!("  Version:     {}", unknown(&version.version));
            println!("  Code type:   {}", unknown(&version.code_type));
        }
        OutputFormat::Raw => println!("{}", unknown(&version.version)),
    }
}

pub fn print_ack(action: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&AckOutput { action, ok: true }),
        OutputFormat::Table | OutputFormat::Pretty => println!("{action}: ok"),
        OutputFormat::Raw => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_rows_are_numbered_from_one() {
        let rows = ZoneOutput::list(&[
            ZoneStatus::empty(),
            ZoneStatus::IN_USE | ZoneStatus::ALARM,
        ]);
        assert_eq!(rows[0].zone, 1);
        assert_eq!(flags_text(&rows[0].flags), "not_used");
        assert_eq!(rows[1].raw, 3);
        assert_eq!(flags_text(&rows[1].flags), "in_use,alarm");
    }
}
