//! Scripted in-process panel for exercising sessions over loopback TCP.
//!
//! [`FakePanel`] accepts a fixed number of connections on `127.0.0.1` and
//! answers every request frame through a handler closure. Failures inside
//! the panel thread panic, which surfaces in [`FakePanel::join`].

use std::io::Write;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use ialarmxr_frame::{FrameReader, FrameWriter};
use ialarmxr_message::{build_document, parse_document_bytes, ErrorCode, Field, Node, Scalar};

/// One request the panel received.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub connection: usize,
    pub seq: u16,
    pub root: String,
    pub fields: Node,
}

/// What the panel does with a request.
pub enum Reply {
    /// Answer under the request root, echoing the request sequence.
    Fields(Node),
    /// Answer under the request root with a chosen sequence number.
    FieldsWithSeq(Node, u16),
    /// Write these bytes unframed.
    Raw(Vec<u8>),
    /// Read on without answering.
    Ignore,
    /// Close the connection.
    Hangup,
}

/// Successful reply: `fields` plus `Err` = `ERR|00`.
pub fn ok(fields: Node) -> Reply {
    Reply::Fields(fields.with("Err", Scalar::Error(ErrorCode::OK)))
}

/// Failed reply carrying only an error code.
///
/// # Panics
///
/// If `code` does not fit the two-digit wire form.
pub fn fail(code: u8) -> Reply {
    let code = ErrorCode::new(code).expect("two-digit error code");
    Reply::Fields(Node::new().with("Err", Scalar::Error(code)))
}

/// Successful answers to the four pairing legs, `None` for anything else.
pub fn pairing(root: &str) -> Option<Reply> {
    match root {
        "/Root/Pair/Client" => Some(ok(Node::new()
            .with("DevVersion", Scalar::string("1.0"))
            .with("DevType", Scalar::string("XR")))),
        "/Root/Pair/P2p" => Some(ok(Node::new().with("Addr", Scalar::string("0.0.0.0")))),
        "/Root/Host/IpcList" => Some(ok(Node::new()
            .with("Total", Scalar::int(0))
            .with("Offset", Scalar::int(0))
            .with("Ln", Scalar::int(0)))),
        "/Root/Host/GetVersion" => Some(ok(Node::new()
            .with("DevType", Scalar::string("XR"))
            .with("Ver", Scalar::string("2.1.0")))),
        _ => None,
    }
}

/// A panel listening on an ephemeral loopback port.
pub struct FakePanel {
    pub port: u16,
    log: Arc<Mutex<Vec<Exchange>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakePanel {
    /// Accept `connections` connections in turn, answering each request with
    /// `handler(connection, root, fields)`.
    pub fn start<H>(connections: usize, handler: H) -> Self
    where
        H: Fn(usize, &str, &Node) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake panel");
        let port = listener.local_addr().expect("local addr").port();
        let log = Arc::new(Mutex::new(Vec::new()));
        let panel_log = Arc::clone(&log);

        let handle = thread::spawn(move || {
            for connection in 0..connections {
                let Ok((socket, _)) = listener.accept() else {
                    return;
                };
                let mut reader = FrameReader::new(socket.try_clone().expect("clone socket"));
                let mut writer = FrameWriter::new(socket);
                while let Ok(frame) = reader.read_frame() {
                    let doc = parse_document_bytes(&frame.payload).expect("request parses");
                    let (root, fields) = request_root(&doc);
                    panel_log.lock().expect("panel log").push(Exchange {
                        connection,
                        seq: frame.seq,
                        root: root.clone(),
                        fields: fields.clone(),
                    });
                    match handler(connection, &root, &fields) {
                        Reply::Fields(reply) => {
                            let xml = build_document(&root, &reply).expect("reply builds");
                            writer.send(frame.seq, xml.as_bytes()).expect("reply sent");
                        }
                        Reply::FieldsWithSeq(reply, seq) => {
                            let xml = build_document(&root, &reply).expect("reply builds");
                            writer.send(seq, xml.as_bytes()).expect("reply sent");
                        }
                        Reply::Raw(bytes) => {
                            writer.get_mut().write_all(&bytes).expect("raw bytes sent");
                        }
                        Reply::Ignore => {}
                        Reply::Hangup => break,
                    }
                }
            }
        });

        Self {
            port,
            log,
            handle: Some(handle),
        }
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.log.lock().expect("panel log").clone()
    }

    pub fn roots(&self) -> Vec<String> {
        self.exchanges().into_iter().map(|e| e.root).collect()
    }

    /// Wait for the panel thread to finish its scripted connections.
    pub fn join(mut self) -> Vec<Exchange> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("fake panel thread panicked");
        }
        self.exchanges()
    }
}

/// `/Root/<group>/<command>` and the command's fields.
fn request_root(doc: &Node) -> (String, Node) {
    let mut names = Vec::new();
    let mut field = doc.iter().next().map(|(name, field)| {
        names.push(name.to_string());
        field.clone()
    });
    while let Some(Field::Node(node)) = &field {
        if names.len() == 3 {
            return (format!("/{}", names.join("/")), node.clone());
        }
        let next = node.iter().next().map(|(name, field)| {
            names.push(name.to_string());
            field.clone()
        });
        field = next;
    }
    (format!("/{}", names.join("/")), Node::new())
}
