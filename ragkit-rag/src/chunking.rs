//! Splitting markdown documents into header-delimited chunks.
//!
//! [`MarkdownHeaderSplitter`] starts a new chunk at every `#`, `##` or `###`
//! header line. Header lines stay in the chunk text, and the enclosing header
//! titles are recorded as `h1`, `h2` and `h3` metadata.

use std::collections::BTreeMap;

/// A piece of a source document, ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk text, including its header line.
    pub content: String,
    /// Header titles enclosing this chunk, keyed by `h1`, `h2`, `h3`.
    pub metadata: BTreeMap<String, String>,
}

/// Splits markdown on level 1 to 3 headers.
///
/// Deeper headers (`####` and beyond) are treated as body text, as are lines
/// inside fenced code blocks. Text before the first header becomes its own
/// chunk with no header metadata. Whitespace-only chunks are dropped.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit_rag::MarkdownHeaderSplitter;
///
/// let chunks = MarkdownHeaderSplitter::new().split("# Manual\n## Contact\nPhone: 555-0100");
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].metadata["h2"], "Contact");
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownHeaderSplitter {
    max_level: usize,
}

impl Default for MarkdownHeaderSplitter {
    fn default() -> Self {
        Self { max_level: 3 }
    }
}

impl MarkdownHeaderSplitter {
    /// Create a splitter for `#`, `##` and `###` headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `text` into chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut headers: [Option<String>; 3] = Default::default();
        let mut metadata = BTreeMap::new();
        let mut body = String::new();
        let mut in_fence = false;

        for line in text.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
            }

            if let Some((level, title)) = self.header(trimmed).filter(|_| !in_fence) {
                push_chunk(&mut chunks, &body, &metadata);
                body.clear();

                headers[level - 1] = Some(title.to_string());
                for deeper in headers.iter_mut().skip(level) {
                    *deeper = None;
                }
                metadata = header_metadata(&headers);
            }

            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(line);
        }
        push_chunk(&mut chunks, &body, &metadata);

        chunks
    }

    fn header<'a>(&self, line: &'a str) -> Option<(usize, &'a str)> {
        let level = line.chars().take_while(|c| *c == '#').count();
        if level == 0 || level > self.max_level {
            return None;
        }
        let rest = &line[level..];
        if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
            return None;
        }
        Some((level, rest.trim()))
    }
}

fn header_metadata(headers: &[Option<String>; 3]) -> BTreeMap<String, String> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.as_ref().map(|title| (format!("h{}", i + 1), title.clone())))
        .collect()
}

fn push_chunk(chunks: &mut Vec<Chunk>, body: &str, metadata: &BTreeMap<String, String>) {
    let content = body.trim();
    if !content.is_empty() {
        chunks.push(Chunk { content: content.to_string(), metadata: metadata.clone() });
    }
}
