// ABOUTME: Line-delimited JSON record transport over any async reader/writer.
// ABOUTME: Backs the binary's stdin/stdout and TCP bus modes.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::bus::{RecordSink, RecordSource};
use crate::error::BusError;
use crate::record::Record;

/// Reads one JSON record per line. Blank lines are skipped.
///
/// Lines are decoded as raw bytes, so a line that is not valid UTF-8 is a
/// decode error for that line only.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: AsyncBufRead + Unpin> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> RecordSource for JsonLinesSource<R> {
    async fn next_record(&mut self) -> Result<Option<Record>, BusError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return serde_json::from_slice(&self.buf)
                .map(Some)
                .map_err(|source| BusError::Decode {
                    line: self.line_no,
                    source,
                });
        }
    }
}

/// Writes one JSON record per line, flushing after each so consumers see it immediately.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RecordSink for JsonLinesSink<W> {
    async fn send(&mut self, record: Record) -> Result<(), BusError> {
        let mut line = serde_json::to_vec(&record).map_err(BusError::Encode)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), BusError> {
        self.writer.flush().await?;
        Ok(())
    }
}
