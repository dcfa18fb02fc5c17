//! Adapters from an async byte source to a stream of parsed lines.

use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use super::parser::ProgressParser;
use super::types::{ParsedLine, ProgressSnapshot};

const READ_CHUNK: usize = 4096;

struct LineSource<R> {
    reader: R,
    parser: ProgressParser,
    pending: VecDeque<ParsedLine>,
    buf: Vec<u8>,
    eof: bool,
}

/// Lazily reads `reader` and yields every classified line.
///
/// The stream ends once the reader is closed (or fails) and the last
/// partial line has been flushed. Polling is cancel-safe: a dropped `next()`
/// future does not lose buffered output.
pub fn parsed_lines<R>(reader: R, parser: ProgressParser) -> impl Stream<Item = ParsedLine>
where
    R: AsyncRead + Unpin,
{
    let source = LineSource {
        reader,
        parser,
        pending: VecDeque::new(),
        buf: vec![0; READ_CHUNK],
        eof: false,
    };

    stream::unfold(source, |mut source| async move {
        loop {
            if let Some(line) = source.pending.pop_front() {
                return Some((line, source));
            }
            if source.eof {
                return None;
            }

            match source.reader.read(&mut source.buf).await {
                Ok(0) => {
                    source.eof = true;
                    let rest = source.parser.finish();
                    source.pending.extend(rest);
                }
                Ok(n) => {
                    let lines = source.parser.push(&source.buf[..n]);
                    source.pending.extend(lines);
                }
                Err(e) => {
                    debug!("Engine output read failed: {}", e);
                    source.eof = true;
                    let rest = source.parser.finish();
                    source.pending.extend(rest);
                }
            }
        }
    })
}

/// Like [`parsed_lines`], keeping only progress snapshots.
pub fn snapshot_stream<R>(reader: R, parser: ProgressParser) -> impl Stream<Item = ProgressSnapshot>
where
    R: AsyncRead + Unpin,
{
    parsed_lines(reader, parser).filter_map(|line| async move {
        match line {
            ParsedLine::Status(snapshot) => Some(snapshot),
            ParsedLine::Diagnostic(_) => None,
        }
    })
}
