//! Line framing for streamed HTTP bodies
//!
//! Both streaming formats are line oriented (NDJSON for Ollama, SSE for
//! OpenAI). Network chunks may end anywhere, including inside a multi-byte
//! character, so bytes are buffered until a full line is available.

#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Next complete line without its terminator, trimmed
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let end = self.bytes.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    /// Whatever is left after the body ended, if it is not blank
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.bytes);
        let line = String::from_utf8_lossy(&rest).trim().to_string();
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_only_complete_lines() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"{\"a\":1}\n{\"b\"");
        assert_eq!(buffer.next_line().as_deref(), Some("{\"a\":1}"));
        assert_eq!(buffer.next_line(), None);

        buffer.push(b":2}\r\n");
        assert_eq!(buffer.next_line().as_deref(), Some("{\"b\":2}"));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let text = "café\n".as_bytes();
        let (head, tail) = text.split_at(4); // splits the two-byte 'é'

        let mut buffer = LineBuffer::new();
        buffer.push(head);
        assert_eq!(buffer.next_line(), None);
        buffer.push(tail);
        assert_eq!(buffer.next_line().as_deref(), Some("café"));
    }

    #[test]
    fn finish_returns_unterminated_tail() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"data: [DONE]");
        assert_eq!(buffer.next_line(), None);
        assert_eq!(buffer.finish().as_deref(), Some("data: [DONE]"));
    }
}
