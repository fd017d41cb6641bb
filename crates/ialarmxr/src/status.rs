use std::fmt;

use bitflags::bitflags;
use ialarmxr_message::Scalar;
use serde::Serialize;

/// Panel arming state as reported by `DevStatus`.
///
/// `Triggered` is never sent by the panel; [`crate::AlarmPanel::get_status`]
/// reports it when the panel is armed and a zone is in alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmStatus {
    ArmedAway = 0,
    Disarmed = 1,
    ArmedStay = 2,
    Cancel = 3,
    Triggered = 4,
}

impl AlarmStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AlarmStatus::ArmedAway),
            1 => Some(AlarmStatus::Disarmed),
            2 => Some(AlarmStatus::ArmedStay),
            3 => Some(AlarmStatus::Cancel),
            4 => Some(AlarmStatus::Triggered),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_armed(self) -> bool {
        matches!(self, AlarmStatus::ArmedAway | AlarmStatus::ArmedStay)
    }

    /// Fold zone alarm bits into the reported state.
    pub fn with_zones(self, zones: &[ZoneStatus]) -> Self {
        if self.is_armed() && zones.iter().any(|zone| zone.contains(ZoneStatus::ALARM)) {
            AlarmStatus::Triggered
        } else {
            self
        }
    }

    /// The `DevStatus` value that requests this state, if it can be requested.
    pub(crate) fn command(self) -> Option<Scalar> {
        let name = match self {
            AlarmStatus::ArmedAway => "ARM",
            AlarmStatus::Disarmed => "DISARM",
            AlarmStatus::ArmedStay => "STAY",
            AlarmStatus::Cancel => "CLEAR",
            AlarmStatus::Triggered => return None,
        };
        Some(Scalar::type_enum(name, self.code() as u32))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlarmStatus::ArmedAway => "armed_away",
            AlarmStatus::Disarmed => "disarmed",
            AlarmStatus::ArmedStay => "armed_stay",
            AlarmStatus::Cancel => "cancel",
            AlarmStatus::Triggered => "triggered",
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Per-zone sensor flags. An empty set means the zone is not used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ZoneStatus: u32 {
        const IN_USE = 1;
        const ALARM = 2;
        const BYPASS = 4;
        const FAULT = 8;
        const LOW_BATTERY = 16;
        const LOSS = 32;
    }
}

impl ZoneStatus {
    /// Keeps unknown bits so nothing the panel reports is lost.
    pub fn from_raw(raw: u32) -> Self {
        ZoneStatus::from_bits_retain(raw)
    }

    /// Lowercase names of the known flags set, in bit order.
    pub fn labels(self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "IN_USE" => "in_use",
                "ALARM" => "alarm",
                "BYPASS" => "bypass",
                "FAULT" => "fault",
                "LOW_BATTERY" => "low_battery",
                "LOSS" => "loss",
                _ => "unknown",
            })
            .collect()
    }
}
