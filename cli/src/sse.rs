//! Minimal SSE framing for the event tail.
//!
//! Events are separated by a blank line. Only `data:` fields are kept;
//! comment lines (the server's keep-alives) and other fields are skipped.
//! Bytes are buffered raw and only complete events are decoded, so a
//! character split across network chunks survives.

/// Append `chunk` to `buffer` and return the data of every completed event.
/// An incomplete trailing event stays in `buffer`.
pub fn drain_events(buffer: &mut Vec<u8>, chunk: &[u8]) -> Vec<String> {
    buffer.extend_from_slice(chunk);

    let mut events = Vec::new();
    while let Some((end, separator)) = event_boundary(buffer) {
        let block: Vec<u8> = buffer.drain(..end + separator).collect();
        let text = String::from_utf8_lossy(&block[..end]);
        let data: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|value| value.strip_prefix(' ').unwrap_or(value))
            .collect();
        if !data.is_empty() {
            events.push(data.join("\n"));
        }
    }
    events
}

/// Offset and length of the first blank-line separator.
fn event_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    (0..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else {
            None
        }
    })
}

#[cfg(test)]
#[path = "sse_test.rs"]
mod tests;
