use serde_json::Value;
use std::io::{self, Read};

/// Read a piped JSON request from stdin.
///
/// Returns `None` when stdin is a terminal or nothing was piped, so the
/// caller can fall back to command-line flags.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// Whitespace-only input counts as no input.
fn parse_piped(raw: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let body = raw.trim();
    if body.is_empty() {
        return Ok(None);
    }

    log::debug!("read {} bytes of JSON from stdin", body.len());
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| format!("Failed to parse stdin as JSON: {e}").into())
}
