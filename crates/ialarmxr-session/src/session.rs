use ialarmxr_frame::{FrameConfig, FrameReader, FrameWriter, MAX_SEQUENCE};
use ialarmxr_message::{build_document, parse_document_bytes, Field, Node, Scalar};
use ialarmxr_transport::PanelStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Credentials, SessionConfig};
use crate::error::{Result, SessionError};
use crate::handshake::{error_code, Leg};
use crate::pagination::{collect_pages, Page};

struct Link {
    reader: FrameReader<PanelStream>,
    writer: FrameWriter<PanelStream>,
}

/// A paired conversation with one panel.
///
/// The connection is opened lazily by the first request and paired before
/// the request is sent. Sequence numbers restart at 1 on every connection.
/// Calls are strictly request/response; a `Session` is not meant to be
/// shared across threads.
pub struct Session {
    config: SessionConfig,
    credentials: Credentials,
    token: Uuid,
    seq: u16,
    link: Option<Link>,
}

impl Session {
    pub fn new(credentials: Credentials, config: SessionConfig) -> Self {
        Self {
            config,
            credentials,
            token: Uuid::new_v4(),
            seq: 0,
            link: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Panel identifier the session pairs as.
    pub fn uid(&self) -> &str {
        &self.credentials.uid
    }

    /// Client token presented in the pairing leg. Replaced after a pairing failure.
    pub fn token(&self) -> &Uuid {
        &self.token
    }

    /// Sequence number of the last frame sent on the current connection.
    pub fn sequence(&self) -> u16 {
        self.seq
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Connect and pair unless a paired connection is already open.
    pub fn ensure_ready(&mut self) -> Result<()> {
        if self.link.is_some() {
            return Ok(());
        }
        let result = self.open();
        if let Err(err) = &result {
            self.abort(err);
        }
        result
    }

    /// Send `fields` under `root` and return the response node at `root`.
    ///
    /// A non-zero `Err` under `root` fails with [`SessionError::Rejected`].
    /// `Ok(None)` means the panel answered without the requested element.
    pub fn request(&mut self, root: &str, fields: &Node) -> Result<Option<Field>> {
        self.ensure_ready()?;
        let result = self.exchange(root, fields).and_then(|response| {
            if let Some(code) = error_code(&response, root).filter(|code| *code != 0) {
                return Err(SessionError::Rejected {
                    path: root.to_string(),
                    code,
                });
            }
            Ok(response.select(root).cloned())
        });
        if let Err(err) = &result {
            self.abort(err);
        }
        result
    }

    /// Fetch every item of a paginated list command.
    ///
    /// `fields` must carry an `Offset` slot; it is rewritten for each page.
    pub fn request_list(&mut self, root: &str, fields: &Node) -> Result<Vec<Field>> {
        let max_pages = self.config.max_pages;
        let result = collect_pages(max_pages, |offset| {
            let offset = i32::try_from(offset).map_err(|_| {
                SessionError::ProtocolInvariant(format!("list offset {offset} out of range"))
            })?;
            let mut page_request = fields.clone();
            page_request.insert("Offset", Scalar::int(offset));
            let response = self.request(root, &page_request)?;
            Page::from_response(root, response.as_ref())
        });
        match &result {
            Ok(items) => debug!(root, items = items.len(), "list collected"),
            Err(_) => self.close(),
        }
        result
    }

    /// Run `op` and close the connection afterwards, whatever the outcome.
    pub fn scoped<T, E>(
        &mut self,
        op: impl FnOnce(&mut Self) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let result = op(self);
        self.close();
        result
    }

    /// Close the connection, if any. The next request reconnects and pairs.
    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            link.writer.get_ref().shutdown();
            debug!(peer = %link.writer.get_ref().peer_addr(), "connection closed");
        }
    }

    fn open(&mut self) -> Result<()> {
        let config = &self.config;
        let stream = ialarmxr_transport::connect(&config.host, config.port, config.connect_timeout)
            .map_err(|err| SessionError::from_connect(err, config.connect_timeout))?;

        let frame_config = FrameConfig {
            read_timeout: Some(config.read_timeout),
            write_timeout: Some(config.read_timeout),
        };
        let timeout = config.read_timeout;
        let reader = FrameReader::from_stream(stream.try_clone()?, &frame_config)
            .map_err(|err| SessionError::from_frame(err, timeout))?;
        let writer = FrameWriter::from_stream(stream, &frame_config)
            .map_err(|err| SessionError::from_frame(err, timeout))?;

        self.seq = 0;
        self.link = Some(Link { reader, writer });
        self.pair()
    }

    fn pair(&mut self) -> Result<()> {
        for leg in Leg::ALL {
            let fields = leg.request(&self.credentials, &self.token);
            let response = self.exchange(leg.path(), &fields)?;
            leg.check(&response)?;
            debug!(%leg, seq = self.seq, "pairing leg accepted");
        }
        info!(uid = %self.credentials.uid, "paired with panel");
        Ok(())
    }

    fn exchange(&mut self, root: &str, fields: &Node) -> Result<Node> {
        let xml = build_document(root, fields)?;
        let seq = self.next_seq()?;
        let timeout = self.config.read_timeout;
        let verify = self.config.verify_sequence;
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| SessionError::Disconnected("no open connection".to_string()))?;

        // Bytes left over from an earlier reply must not prefix this one.
        link.reader.clear();
        link.writer
            .send(seq, xml.as_bytes())
            .map_err(|err| SessionError::from_frame(err, timeout))?;
        let frame = if verify {
            link.reader.read_frame_expecting(seq)
        } else {
            link.reader.read_frame()
        }
        .map_err(|err| SessionError::from_frame(err, timeout))?;

        debug!(
            root,
            seq,
            reply_seq = frame.seq,
            sent = xml.len(),
            received = frame.payload.len(),
            "exchange complete"
        );
        Ok(parse_document_bytes(&frame.payload)?)
    }

    fn next_seq(&mut self) -> Result<u16> {
        if self.seq >= MAX_SEQUENCE {
            return Err(SessionError::ProtocolInvariant(format!(
                "sequence space exhausted after {MAX_SEQUENCE} frames"
            )));
        }
        self.seq += 1;
        Ok(self.seq)
    }

    /// Drop the connection after a failure; a refused pairing also retires the token.
    fn abort(&mut self, err: &SessionError) {
        if self.link.is_some() {
            warn!(error = %err, "closing panel connection after error");
        }
        self.close();
        if matches!(err, SessionError::Pairing { .. }) {
            self.token = Uuid::new_v4();
            debug!("client token regenerated");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("seq", &self.seq)
            .field("connected", &self.link.is_some())
            .finish()
    }
}
