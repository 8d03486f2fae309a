//! Content chunking and batching
//!
//! The remote service imposes two independent limits on appended content: a
//! maximum length per text block and a maximum number of blocks per write
//! call. Both functions here are pure and total; callers are responsible for
//! never issuing a remote append when the output is empty.

/// Split `text` into consecutive segments of at most `max_chunk_chars`
/// characters, in original order.
///
/// Concatenating the result in order reproduces `text` exactly; the last
/// segment may be shorter. Splits happen on character boundaries, never
/// inside a UTF-8 scalar. Empty input yields no chunks. `max_chunk_chars`
/// must be positive.
pub fn chunk(text: &str, max_chunk_chars: usize) -> Vec<String> {
    debug_assert!(max_chunk_chars > 0, "chunk limit must be positive");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max_chunk_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Group `items` into batches of at most `max_batch_size` elements,
/// preserving order across batch boundaries.
///
/// Produces ceil(n / max_batch_size) batches covering exactly the input.
/// Empty input yields no batches. `max_batch_size` must be positive.
pub fn batch<T>(items: Vec<T>, max_batch_size: usize) -> Vec<Vec<T>> {
    debug_assert!(max_batch_size > 0, "batch limit must be positive");

    let mut batches = Vec::new();
    let mut current = Vec::new();
    for item in items {
        current.push(item);
        if current.len() == max_batch_size {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
