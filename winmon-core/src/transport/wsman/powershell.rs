//! PowerShell invocation helpers
//!
//! Scripts travel as `powershell -encodedcommand <base64>`, where the payload
//! is the script in UTF-16LE. Errors come back on stderr serialized as CLIXML
//! and are flattened to plain text here.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::response::push_entity;

const CLIXML_MARKER: &str = "#< CLIXML";
const CLIXML_NEWLINE: &str = "_x000D__x000A_";

/// Encodes a script for `-encodedcommand`
#[must_use]
pub fn encode_command(script: &str) -> String {
    let utf16: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(utf16)
}

/// Program and arguments that run `script`
#[must_use]
pub fn command_line(script: &str) -> (&'static str, [String; 2]) {
    (
        "powershell",
        ["-encodedcommand".to_string(), encode_command(script)],
    )
}

/// Flattens a CLIXML error stream into its error lines
///
/// Input that is not CLIXML, or CLIXML without error records, is returned
/// unchanged.
#[must_use]
pub fn clean_error_stream(stderr: &str) -> String {
    let Some(body) = stderr.strip_prefix(CLIXML_MARKER) else {
        return stderr.to_string();
    };

    let mut reader = Reader::from_str(body.trim_start());
    let mut lines = String::new();
    let mut in_error = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"S" => {
                in_error = e
                    .attributes()
                    .flatten()
                    .any(|attr| attr.key.as_ref() == b"S" && attr.value.as_ref() == b"Error");
            }
            Ok(Event::Text(e)) if in_error => {
                lines.push_str(&String::from_utf8_lossy(&e).replace(CLIXML_NEWLINE, "\n"));
            }
            Ok(Event::GeneralRef(e)) if in_error => push_entity(&mut lines, &e),
            Ok(Event::End(e)) if e.local_name().as_ref() == b"S" => in_error = false,
            Ok(Event::Eof) => break,
            Err(_) => return stderr.to_string(),
            _ => {}
        }
    }

    let cleaned = lines.trim();
    if cleaned.is_empty() {
        stderr.to_string()
    } else {
        cleaned.to_string()
    }
}
