/// A group of consecutive words shown together during `[start_s, end_s)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionChunk {
    pub text: String,
    pub start_s: f64,
    pub end_s: f64,
}

/// Split `text` into word groups of at most `words_per_chunk` and subdivide `window`.
///
/// Each chunk's share of the window is proportional to its word count; boundaries come from the
/// cumulative count so adjacent chunks share an exact boundary and the last one ends at
/// `window.1`. A short trailing chunk therefore gets a shorter window rather than an even
/// `1/k` share. Empty text or a non-positive window yields no chunks.
pub fn chunk(text: &str, window: (f64, f64), words_per_chunk: usize) -> Vec<CaptionChunk> {
    let (start_s, end_s) = window;
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || !(end_s > start_s) {
        return Vec::new();
    }

    let per_chunk = words_per_chunk.max(1);
    let total = words.len() as f64;
    let span = end_s - start_s;

    let mut out = Vec::with_capacity(words.len().div_ceil(per_chunk));
    let mut consumed = 0usize;
    let mut cursor = start_s;
    for group in words.chunks(per_chunk) {
        consumed += group.len();
        let boundary = if consumed == words.len() {
            end_s
        } else {
            start_s + span * consumed as f64 / total
        };
        out.push(CaptionChunk {
            text: group.join(" "),
            start_s: cursor,
            end_s: boundary,
        });
        cursor = boundary;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/captions/chunker.rs"]
mod tests;
