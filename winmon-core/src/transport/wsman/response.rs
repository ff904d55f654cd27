//! Parsing of WS-Management responses
//!
//! Elements are matched on their local name so the parser does not depend
//! on the prefixes a particular server picks.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use crate::transport::TransportError;

/// SOAP fault returned by the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    /// Fault subcode value, e.g. `w:TimedOut`
    pub subcode: Option<String>,
    /// Human-readable reason
    pub reason: Option<String>,
    /// Detailed message from the `WSManFault` block
    pub message: Option<String>,
}

impl Fault {
    /// Receive polls time out routinely while a command is still running
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.subcode
            .as_deref()
            .is_some_and(|code| code.ends_with("TimedOut"))
    }

    /// Best available description of the fault
    #[must_use]
    pub fn text(&self) -> String {
        self.message
            .as_deref()
            .or(self.reason.as_deref())
            .map_or_else(|| "unknown WS-Management fault".to_string(), str::to_string)
    }
}

/// Fields of interest from any shell response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WsManResponse {
    /// Shell id from a Create response
    pub shell_id: Option<String>,
    /// Command id from a Command response
    pub command_id: Option<String>,
    /// Decoded stdout chunks, concatenated
    pub stdout: Vec<u8>,
    /// Decoded stderr chunks, concatenated
    pub stderr: Vec<u8>,
    /// The command reported `CommandState/Done`
    pub done: bool,
    /// Exit code reported with the final command state
    pub exit_code: Option<i32>,
    /// SOAP fault, if the body carried one
    pub fault: Option<Fault>,
}

impl WsManResponse {
    /// Converts a faulted response into an error
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Fault`] with the fault text.
    pub fn into_result(self) -> Result<Self, TransportError> {
        match self.fault {
            Some(fault) => Err(TransportError::Fault(fault.text())),
            None => Ok(self),
        }
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Appends the replacement text of a `&name;` reference
pub(super) fn push_entity(buf: &mut String, name: &[u8]) {
    let name = String::from_utf8_lossy(name);
    if let Some(text) = resolve_predefined_entity(&name) {
        buf.push_str(text);
    } else if let Some(code) = name.strip_prefix('#') {
        let value = code
            .strip_prefix('x')
            .map_or_else(|| code.parse().ok(), |hex| u32::from_str_radix(hex, 16).ok());
        if let Some(c) = value.and_then(char::from_u32) {
            buf.push(c);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
    Other,
}

/// Parses a response body
///
/// # Errors
///
/// Returns [`TransportError::Fault`] when the body is not well-formed XML or
/// a stream chunk is not valid base64.
pub fn parse_response(xml: &str) -> Result<WsManResponse, TransportError> {
    // Text is trimmed per element, not per event
    let mut reader = Reader::from_str(xml);

    let mut response = WsManResponse::default();
    let mut fault: Option<Fault> = None;
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut stream = Stream::Other;
    let mut selector_is_shell = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match tag.as_str() {
                    "Fault" => fault = Some(Fault::default()),
                    "Stream" => {
                        stream = match attribute(&e, b"Name").as_deref() {
                            Some("stdout") => Stream::Stdout,
                            Some("stderr") => Stream::Stderr,
                            _ => Stream::Other,
                        };
                    }
                    "Selector" => {
                        selector_is_shell = attribute(&e, b"Name").as_deref() == Some("ShellId");
                    }
                    "CommandState" => {
                        if attribute(&e, b"State").is_some_and(|s| s.ends_with("/Done")) {
                            response.done = true;
                        }
                    }
                    _ => {}
                }
                path.push(tag);
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"CommandState"
                    && attribute(&e, b"State").is_some_and(|s| s.ends_with("/Done"))
                {
                    response.done = true;
                }
            }
            Ok(Event::Text(e)) => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) => push_entity(&mut text, &e),
            Ok(Event::End(_)) => {
                let Some(tag) = path.pop() else {
                    continue;
                };
                let parent = path.last().map(String::as_str);
                let value = text.trim();
                match (tag.as_str(), parent) {
                    ("ShellId", _) if !value.is_empty() => {
                        response.shell_id = Some(value.to_string());
                    }
                    ("Selector", _) if selector_is_shell && response.shell_id.is_none() => {
                        response.shell_id = Some(value.to_string());
                    }
                    ("CommandId", _) if !value.is_empty() => {
                        response.command_id = Some(value.to_string());
                    }
                    ("Stream", _) => {
                        if !value.is_empty() {
                            let chunk = STANDARD.decode(value).map_err(|e| {
                                TransportError::Fault(format!("invalid output stream chunk: {e}"))
                            })?;
                            match stream {
                                Stream::Stdout => response.stdout.extend_from_slice(&chunk),
                                Stream::Stderr => response.stderr.extend_from_slice(&chunk),
                                Stream::Other => {}
                            }
                        }
                        stream = Stream::Other;
                    }
                    ("ExitCode", _) => response.exit_code = value.parse().ok(),
                    ("Value", Some("Subcode")) => {
                        if let Some(f) = fault.as_mut() {
                            f.subcode = Some(value.to_string());
                        }
                    }
                    ("Text", Some("Reason")) => {
                        if let Some(f) = fault.as_mut() {
                            f.reason = Some(value.to_string());
                        }
                    }
                    ("Message", _) if !value.is_empty() => {
                        if let Some(f) = fault.as_mut() {
                            f.message = Some(value.to_string());
                        }
                    }
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TransportError::Fault(format!(
                    "malformed WS-Management response: {e}"
                )));
            }
            _ => {}
        }
    }

    response.fault = fault;
    Ok(response)
}
