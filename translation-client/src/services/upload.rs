//! Upload body plumbing with per-chunk progress reporting.

use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;

/// Callback invoked with the running upload percentage (0..=100) as chunks
/// are handed to the transport.
pub type ProgressSink = Arc<dyn Fn(u8) + Send + Sync>;

/// Percentage of `sent` out of `total`, rounded. An unknown or zero total is
/// treated as a single byte, matching the backend contract's fallback.
pub fn percent(sent: u64, total: u64) -> u8 {
    let total = total.max(1);
    let pct = (100.0 * sent as f64 / total as f64).round();
    pct.min(100.0) as u8
}

/// Turn an in-memory file into a chunked byte stream that reports progress
/// through `sink` as each chunk is yielded.
pub fn progress_stream(
    data: Vec<u8>,
    chunk_size: usize,
    sink: ProgressSink,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send {
    let total = data.len() as u64;
    let chunks: Vec<Vec<u8>> = data
        .chunks(chunk_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect();

    let mut sent = 0u64;
    stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        sink(percent(sent, total));
        Ok(chunk)
    })
}
