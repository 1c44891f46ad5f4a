//! Frontmatter codec for note files
//!
//! A note is a metadata block delimited by `---` marker lines, followed by a
//! free-form body:
//!
//! ```text
//! ---
//! title: Example
//! tags: [a, b]
//! ---
//! Body text, which may itself contain --- sequences.
//! ```
//!
//! Two scans exist and must not be conflated. [`Note::parse`] reads a stored
//! note and falls back to "everything is body". [`extract_model_metadata`]
//! reads a model response and falls back to "everything is metadata".

/// The marker line that opens and closes a metadata block
pub const MARKER: &str = "---";

/// Result of decoding a note
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Text between the markers, trimmed
    pub metadata: String,
    /// Everything after the closing marker line, verbatim
    pub body: String,
    /// Whether a complete marker pair was found
    pub matched: bool,
}

/// Decode `text` into metadata and body.
///
/// The opening marker must start the text on its own line. The closing marker
/// is the next `---` line. Without a complete pair the whole text is returned as
/// the body with empty metadata.
pub fn decode(text: &str) -> Decoded {
    if !opens_with_marker(text) {
        return unmatched(text);
    }

    match find_closing_line(text, MARKER.len()) {
        Some((metadata_end, body_start)) => Decoded {
            metadata: text[MARKER.len()..metadata_end].trim().to_string(),
            body: text[body_start..].to_string(),
            matched: true,
        },
        None => unmatched(text),
    }
}

/// Encode metadata and body into the on-disk note format.
///
/// Round-trips through [`decode`] as long as `metadata` is trimmed and holds no
/// standalone `---` line.
pub fn encode(metadata: &str, body: &str) -> String {
    format!("{MARKER}\n{metadata}\n{MARKER}\n{body}")
}

/// Pull the metadata block out of a model response.
///
/// Models often wrap the block in prose or code fences, so the opening marker
/// may appear anywhere. When no marker pair is present the whole response is
/// taken to be bare metadata, minus any stray marker lines.
///
/// The result never holds a standalone `---` line, so encoding it with a body
/// always decodes back to that same body.
pub fn extract_model_metadata(response: &str) -> String {
    if let Some(open) = response.find(MARKER) {
        let from = open + MARKER.len();
        if let Some(rel) = response[from..].find("\n---") {
            return without_marker_lines(&response[from..from + rel]);
        }
    }
    without_marker_lines(response)
}

/// Drop every line that is a marker once trimmed, then trim the rest
fn without_marker_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| line.trim() != MARKER)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// A stored note split into its two regions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    /// Metadata block without markers
    pub metadata: String,
    /// Note body
    pub body: String,
}

impl Note {
    /// Create a note from its parts
    pub fn new(metadata: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            metadata: metadata.into(),
            body: body.into(),
        }
    }

    /// Split stored note text. A note without a metadata block is all body.
    pub fn parse(text: &str) -> Self {
        let decoded = decode(text);
        if decoded.matched {
            Self::new(decoded.metadata, decoded.body)
        } else {
            Self::new(String::new(), text)
        }
    }

    /// Replace the metadata block, keeping the body untouched
    pub fn with_metadata(self, metadata: impl Into<String>) -> Self {
        Self {
            metadata: metadata.into(),
            body: self.body,
        }
    }

    /// Serialize to the on-disk format
    pub fn to_text(&self) -> String {
        encode(&self.metadata, &self.body)
    }
}

fn unmatched(text: &str) -> Decoded {
    Decoded {
        metadata: String::new(),
        body: text.to_string(),
        matched: false,
    }
}

fn opens_with_marker(text: &str) -> bool {
    match text.strip_prefix(MARKER) {
        Some(rest) => rest.starts_with('\n') || rest.starts_with("\r\n"),
        None => false,
    }
}

/// Find the next standalone `---` line at or after `from`.
///
/// Returns the byte offset where the metadata ends (the newline before the
/// marker) and where the body starts (after the marker's line ending).
fn find_closing_line(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut search = from;
    while let Some(rel) = text[search..].find("\n---") {
        let at = search + rel;
        let after = at + 1 + MARKER.len();
        let rest = &text[after..];

        if rest.is_empty() {
            return Some((at, after));
        }
        if rest.starts_with("\r\n") {
            return Some((at, after + 2));
        }
        if rest.starts_with('\n') {
            return Some((at, after + 1));
        }
        // `----` or `--- trailing` is not a marker line
        search = at + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_basic_note() {
        let decoded = decode("---\ntitle: A\n---\nHello world");
        assert!(decoded.matched);
        assert_eq!(decoded.metadata, "title: A");
        assert_eq!(decoded.body, "Hello world");
    }

    #[test]
    fn decode_without_marker_is_all_body() {
        let text = "Just some prose.\nNo metadata here.";
        let decoded = decode(text);
        assert!(!decoded.matched);
        assert_eq!(decoded.metadata, "");
        assert_eq!(decoded.body, text);
    }

    #[test]
    fn decode_requires_marker_at_start() {
        let text = "Intro line\n---\ntitle: A\n---\nbody";
        let decoded = decode(text);
        assert!(!decoded.matched);
        assert_eq!(decoded.body, text);
    }

    #[test]
    fn decode_unclosed_block_is_all_body() {
        let text = "---\ntitle: A\nno closing marker";
        let decoded = decode(text);
        assert!(!decoded.matched);
        assert_eq!(decoded.metadata, "");
        assert_eq!(decoded.body, text);
    }

    #[test]
    fn decode_keeps_markers_inside_body() {
        let text = "---\ntitle: A\n---\nFirst part\n---\nSecond part\n";
        let decoded = decode(text);
        assert_eq!(decoded.metadata, "title: A");
        assert_eq!(decoded.body, "First part\n---\nSecond part\n");
    }

    #[test]
    fn decode_skips_longer_dash_runs() {
        let text = "---\ntitle: A\n----\nstill: metadata\n---\nbody";
        let decoded = decode(text);
        assert_eq!(decoded.metadata, "title: A\n----\nstill: metadata");
        assert_eq!(decoded.body, "body");
    }

    #[test]
    fn decode_empty_metadata() {
        let decoded = decode("---\n---\nbody");
        assert!(decoded.matched);
        assert_eq!(decoded.metadata, "");
        assert_eq!(decoded.body, "body");
    }

    #[test]
    fn decode_closing_marker_at_end_of_text() {
        let decoded = decode("---\ntitle: A\n---");
        assert!(decoded.matched);
        assert_eq!(decoded.body, "");
    }

    #[test]
    fn decode_crlf_line_endings() {
        let decoded = decode("---\r\ntitle: A\r\n---\r\nbody\r\n");
        assert!(decoded.matched);
        assert_eq!(decoded.metadata, "title: A");
        assert_eq!(decoded.body, "body\r\n");
    }

    #[test]
    fn encode_layout() {
        assert_eq!(encode("title: A", "Body"), "---\ntitle: A\n---\nBody");
    }

    #[test]
    fn encode_then_decode_recovers_parts() {
        let text = encode("title: A\ntags: [x]", "Hello world");
        let decoded = decode(&text);
        assert!(decoded.matched);
        assert_eq!(decoded.metadata, "title: A\ntags: [x]");
        assert_eq!(decoded.body, "Hello world");
    }

    #[test]
    fn model_metadata_inside_prose() {
        let response = "Here is the metadata:\n---\ntitle: Rust\ntags: [lang]\n---\nHope it helps!";
        assert_eq!(extract_model_metadata(response), "title: Rust\ntags: [lang]");
    }

    #[test]
    fn model_metadata_inside_code_fence() {
        let response = "```yaml\n---\ntitle: Fenced\n---\n```";
        assert_eq!(extract_model_metadata(response), "title: Fenced");
    }

    #[test]
    fn model_metadata_falls_back_to_whole_response() {
        let response = "  title: Bare\ntags: [a]\n\n";
        assert_eq!(extract_model_metadata(response), "title: Bare\ntags: [a]");
    }

    #[test]
    fn model_metadata_unclosed_marker_is_dropped() {
        assert_eq!(
            extract_model_metadata("---\ntitle: Unclosed\ntags: [a]"),
            "title: Unclosed\ntags: [a]"
        );
        assert_eq!(
            extract_model_metadata("title: Bare\ntags: [a]\n---"),
            "title: Bare\ntags: [a]"
        );
        assert_eq!(extract_model_metadata("a: 1\r\n---\r\nb: 2"), "a: 1\r\nb: 2");
    }

    #[test]
    fn model_metadata_drops_padded_marker_lines() {
        assert_eq!(extract_model_metadata("title: A\n  ---  "), "title: A");
    }

    #[test]
    fn note_parse_falls_back_to_body() {
        let note = Note::parse("no metadata at all");
        assert_eq!(note.metadata, "");
        assert_eq!(note.body, "no metadata at all");
    }

    #[test]
    fn note_with_metadata_preserves_body() {
        let note = Note::parse("---\ntitle: old\n---\nHello world");
        let rewritten = note.with_metadata("title: new");
        assert_eq!(rewritten.to_text(), "---\ntitle: new\n---\nHello world");
    }

    fn metadata_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,8}: [a-zA-Z0-9 ]{0,12}(\n[a-z]{1,8}: [a-zA-Z0-9 ]{0,12}){0,3}"
            .prop_map(|s| s.trim().to_string())
    }

    proptest! {
        #[test]
        fn round_trip_without_marker_lines(
            metadata in metadata_strategy(),
            body in "(?s).{0,200}",
        ) {
            let decoded = decode(&encode(&metadata, &body));
            prop_assert!(decoded.matched);
            prop_assert_eq!(decoded.metadata, metadata);
            prop_assert_eq!(decoded.body, body);
        }

        #[test]
        fn any_model_reply_keeps_the_body(
            lines in proptest::collection::vec(
                prop_oneof![
                    Just("---"), Just("----"), Just(" --- "), Just(""),
                    Just("title: A"), Just("tags: [x, y]"), Just("Sure, here it is:"),
                ],
                0..8,
            ),
            body in "(?s).{0,120}",
        ) {
            let reply = lines.join("\n");
            let metadata = extract_model_metadata(&reply);
            let decoded = decode(&encode(&metadata, &body));
            prop_assert!(decoded.matched);
            prop_assert_eq!(decoded.metadata, metadata);
            prop_assert_eq!(decoded.body, body);
        }

        #[test]
        fn text_without_markers_is_untouched(text in "[^-]{0,200}") {
            let decoded = decode(&text);
            prop_assert!(!decoded.matched);
            prop_assert_eq!(decoded.body, text);
        }
    }
}
