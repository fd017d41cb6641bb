use ialarmxr_message::{Field, MacAddress, Node, Scalar};
use ialarmxr_session::{Credentials, Session, SessionConfig};
use serde::Serialize;
use tracing::info;

use crate::error::{PanelError, Result};
use crate::status::{AlarmStatus, ZoneStatus};

const GET_NET: &str = "/Root/Host/GetNet";
const GET_ALARM_STATUS: &str = "/Root/Host/GetAlarmStatus";
const SET_ALARM_STATUS: &str = "/Root/Host/SetAlarmStatus";
const GET_ZONES: &str = "/Root/Host/GetByWay";
const GET_VERSION: &str = "/Root/Host/GetVersion";
const PUSH: &str = "/Root/Pair/Push";

/// Firmware identification reported by the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelVersion {
    pub dev_type: Option<String>,
    pub device: Option<String>,
    pub version: Option<String>,
    pub code_type: Option<String>,
}

/// An iAlarm-XR panel.
///
/// Every operation runs on a fresh, freshly paired connection that is
/// closed before the call returns, whether it succeeded or not.
#[derive(Debug)]
pub struct AlarmPanel {
    session: Session,
}

impl AlarmPanel {
    pub fn new(credentials: Credentials, config: SessionConfig) -> Self {
        Self {
            session: Session::new(credentials, config),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Hardware address from the panel's network settings.
    pub fn get_mac(&mut self) -> Result<MacAddress> {
        let request = Node::new()
            .with_null("Mac")
            .with_null("Name")
            .with_null("Ip")
            .with_null("Gate")
            .with_null("Subnet")
            .with_null("Dns1")
            .with_null("Dns2")
            .with_null("Err");
        let reply = self.session.scoped(|s| s.request(GET_NET, &request))?;
        let mac = reply_node(GET_NET, reply.as_ref())?
            .get("Mac")
            .and_then(Field::as_scalar)
            .ok_or_else(|| PanelError::MissingField(format!("{GET_NET}/Mac")))?;

        match mac {
            Scalar::Mac(mac) => Ok(*mac),
            other => match other.as_str() {
                Some("") | None => Err(PanelError::unexpected("Mac", other)),
                Some(text) => text
                    .parse()
                    .map_err(|_| PanelError::unexpected("Mac", text)),
            },
        }
    }

    /// Arming state, reported as [`AlarmStatus::Triggered`] when the panel is
    /// armed and any zone is in alarm.
    pub fn get_status(&mut self) -> Result<AlarmStatus> {
        self.session.scoped(|s| {
            let request = Node::new().with_null("DevStatus").with_null("Err");
            let reply = s.request(GET_ALARM_STATUS, &request)?;
            let code = reply_node(GET_ALARM_STATUS, reply.as_ref())?
                .get("DevStatus")
                .and_then(Field::as_i32)
                .ok_or_else(|| {
                    PanelError::MissingField(format!("{GET_ALARM_STATUS}/DevStatus"))
                })?;
            let status = AlarmStatus::from_code(code)
                .ok_or_else(|| PanelError::unexpected("DevStatus", code))?;

            let zones = fetch_zones(s)?;
            Ok(status.with_zones(&zones))
        })
    }

    /// Sensor flags of every zone, in panel order.
    pub fn get_zones(&mut self) -> Result<Vec<ZoneStatus>> {
        self.session.scoped(fetch_zones)
    }

    pub fn get_version(&mut self) -> Result<PanelVersion> {
        let request = Node::new()
            .with_null("DevType")
            .with_null("Dev")
            .with_null("Ver")
            .with_null("CodeType")
            .with_null("Err");
        let reply = self.session.scoped(|s| s.request(GET_VERSION, &request))?;
        let node = reply_node(GET_VERSION, reply.as_ref())?;
        Ok(PanelVersion {
            dev_type: text(node, "DevType"),
            device: text(node, "Dev"),
            version: text(node, "Ver"),
            code_type: text(node, "CodeType"),
        })
    }

    pub fn arm_away(&mut self) -> Result<()> {
        self.set_status(AlarmStatus::ArmedAway)
    }

    pub fn arm_stay(&mut self) -> Result<()> {
        self.set_status(AlarmStatus::ArmedStay)
    }

    pub fn disarm(&mut self) -> Result<()> {
        self.set_status(AlarmStatus::Disarmed)
    }

    /// Silence a triggered alarm.
    pub fn cancel_alarm(&mut self) -> Result<()> {
        self.set_status(AlarmStatus::Cancel)
    }

    /// Register this client for push notifications.
    pub fn pair(&mut self) -> Result<()> {
        let request = Node::new()
            .with("Id", Scalar::string(self.session.uid()))
            .with_null("Err");
        self.session.scoped(|s| s.request(PUSH, &request))?;
        info!("push notifications registered");
        Ok(())
    }

    fn set_status(&mut self, target: AlarmStatus) -> Result<()> {
        let value = target
            .command()
            .ok_or_else(|| PanelError::unexpected("DevStatus", target))?;
        let request = Node::new().with("DevStatus", value).with_null("Err");
        self.session
            .scoped(|s| s.request(SET_ALARM_STATUS, &request))?;
        info!(status = %target, "alarm status set");
        Ok(())
    }
}

fn fetch_zones(session: &mut Session) -> Result<Vec<ZoneStatus>> {
    let request = Node::new()
        .with_null("Total")
        .with("Offset", Scalar::int(0))
        .with_null("Ln")
        .with_null("Err");
    session
        .request_list(GET_ZONES, &request)?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let raw = item
                .as_i32()
                .ok_or_else(|| PanelError::unexpected(&format!("L{index}"), describe(item)))?;
            u32::try_from(raw)
                .map(ZoneStatus::from_raw)
                .map_err(|_| PanelError::unexpected(&format!("L{index}"), raw))
        })
        .collect()
}

fn reply_node<'a>(root: &str, reply: Option<&'a Field>) -> Result<&'a Node> {
    reply
        .and_then(Field::as_node)
        .ok_or_else(|| PanelError::MissingField(root.to_string()))
}

/// Human-readable text of a leaf: string content, or the enum name.
fn text(node: &Node, name: &str) -> Option<String> {
    let scalar = node.get(name)?.as_scalar()?;
    match scalar {
        Scalar::Type { name, .. } => Some(name.clone()),
        other => Some(
            other
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        ),
    }
}

fn describe(field: &Field) -> String {
    match field {
        Field::Scalar(Some(scalar)) => scalar.to_string(),
        Field::Scalar(None) => "<empty>".to_string(),
        Field::Node(_) => "<element>".to_string(),
        Field::List(items) => format!("<{} repeated elements>", items.len()),
    }
}
