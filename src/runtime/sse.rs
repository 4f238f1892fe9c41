/// Server-sent events parser
///
/// Incremental parser for a raw SSE byte stream. Chunks may split anywhere (even inside a
/// UTF-8 sequence), so bytes are buffered until a blank line closes the event.

use bytes::{Buf, BytesMut};

/// A parsed SSE event
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
}

impl SseEvent {
    /// Whether a browser `EventSource` would deliver this through `onmessage`
    pub fn is_message(&self) -> bool {
        matches!(self.event_type.as_deref(), None | Some("message"))
    }
}

#[derive(Debug, Default)]
pub struct SseParser {
    buffer: BytesMut,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the parser and extract complete events
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some((end, boundary)) = find_boundary(&self.buffer) {
            let block = self.buffer.split_to(end);
            self.buffer.advance(boundary);

            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                events.push(event);
            }
        }

        events
    }
}

/// Position and length of the first blank line ("\n\n" or "\r\n\r\n")
fn find_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (p, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event_type = None;
    let mut data_lines = Vec::new();

    for line in block.lines() {
        // comments (keep-alives) start with a colon
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event_type = Some(value.to_string()),
            "data" => data_lines.push(value.to_string()),
            _ => {}
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseEvent {
        event_type,
        data: data_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_parser_basic() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: {\"step_uid\":\"a\"}\n\n");
        assert_eq!(events.len(), 1);
        assert!(events[0].is_message());
        assert_eq!(events[0].data, "{\"step_uid\":\"a\"}");
    }

    #[test]
    fn test_sse_parser_chunked() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"event: update\ndata: {\"x\":").is_empty());
        let events = parser.feed(b"1}\n\ndata: 2\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type.as_deref(), Some("update"));
        assert!(!events[0].is_message());
        assert_eq!(events[1].data, "2");
    }

    #[test]
    fn test_sse_parser_split_utf8() {
        let mut parser = SseParser::new();
        let bytes = "data: ✓\n\n".as_bytes();
        assert!(parser.feed(&bytes[..7]).is_empty());
        let events = parser.feed(&bytes[7..]);
        assert_eq!(events[0].data, "✓");
    }

    #[test]
    fn test_sse_parser_skips_comments_and_crlf() {
        let mut parser = SseParser::new();
        let events = parser.feed(b": keep-alive\n\ndata:a\r\ndata: b\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "a\nb");
    }
}
