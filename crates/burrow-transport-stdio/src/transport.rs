//! Line-delimited JSON transport over stdin/stdout.
//!
//! Each JSON-RPC message is a single line terminated by `\n`.

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{trace, warn};

use crate::error::TransportError;

/// Default cap on a single input line, excluding the terminator.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Reading half: yields one frame per input line.
pub struct FrameReader<R> {
    reader: BufReader<R>,
    max_frame_len: usize,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Wraps `reader` in a buffered line reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Replaces the line length cap.
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Reads the next frame, without its line terminator.
    ///
    /// Returns `None` at end of stream. A final line that is not
    /// newline-terminated is an interrupted write by a departing peer and
    /// also counts as end of stream. Blank lines come back as empty frames.
    /// Lines longer than the cap are skipped without being buffered whole.
    pub async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            let mut frame = Vec::new();
            let limit = u64::try_from(self.max_frame_len)
                .unwrap_or(u64::MAX)
                .saturating_add(1);
            let bytes_read = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut frame)
                .await
                .map_err(|e| TransportError::Read(e.to_string()))?;

            if bytes_read == 0 {
                return Ok(None);
            }
            if frame.last() != Some(&b'\n') {
                if frame.len() > self.max_frame_len {
                    warn!(limit = self.max_frame_len, "discarding oversized frame");
                    if self.skip_line().await? {
                        continue;
                    }
                    return Ok(None);
                }
                warn!(len = frame.len(), "discarding unterminated trailing input");
                return Ok(None);
            }

            frame.pop();
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
            trace!(len = frame.len(), "read frame");
            return Ok(Some(frame));
        }
    }

    /// Consumes input up to and including the next newline. Returns `false`
    /// if the stream ended first.
    async fn skip_line(&mut self) -> Result<bool, TransportError> {
        loop {
            let buf = self
                .reader
                .fill_buf()
                .await
                .map_err(|e| TransportError::Read(e.to_string()))?;
            if buf.is_empty() {
                return Ok(false);
            }
            let (amount, found) = match buf.iter().position(|b| *b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), false),
            };
            self.reader.consume(amount);
            if found {
                return Ok(true);
            }
        }
    }
}

/// Writing half: one complete line per `send`, flushed immediately.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W> FrameWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes `message` followed by `\n` as a single write, then flushes.
    ///
    /// # Errors
    ///
    /// `TransportError::Write` on I/O failure, or if `message` itself
    /// contains a newline (it would split into two frames).
    pub async fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        if message.contains(&b'\n') {
            return Err(TransportError::Write(
                "message contains a newline".to_string(),
            ));
        }
        trace!(len = message.len(), "writing frame");

        let mut line = Vec::with_capacity(message.len() + 1);
        line.extend_from_slice(message);
        line.push(b'\n');

        self.writer
            .write_all(&line)
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        Ok(())
    }
}

/// Reads JSON-RPC messages from stdin, writes responses to stdout.
///
/// Generic over reader/writer for testability.
pub struct StdioTransport<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new transport with the given reader and writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
        }
    }

    /// Caps the length of a single input line. See [`FrameReader::receive`].
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.reader = self.reader.with_max_frame_len(max_frame_len);
        self
    }

    /// See [`FrameReader::receive`].
    pub async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.reader.receive().await
    }

    /// See [`FrameWriter::send`].
    pub async fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        self.writer.send(message).await
    }

    /// Splits into independently owned halves.
    pub fn into_split(self) -> (FrameReader<R>, FrameWriter<W>) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn transport(input: &[u8]) -> StdioTransport<Cursor<Vec<u8>>, Vec<u8>> {
        StdioTransport::new(Cursor::new(input.to_vec()), Vec::new())
    }

    #[tokio::test]
    async fn read_single_line() {
        let mut t = transport(b"{\"jsonrpc\":\"2.0\"}\n");
        let frame = t.receive().await.expect("read");
        assert_eq!(frame.as_deref(), Some(&b"{\"jsonrpc\":\"2.0\"}"[..]));
    }

    #[tokio::test]
    async fn read_eof_returns_none() {
        let mut t = transport(b"");
        assert_eq!(t.receive().await.expect("read"), None);
    }

    #[tokio::test]
    async fn read_multiple_lines_and_crlf() {
        let mut t = transport(b"line1\nline2\r\n\nline3\n");
        assert_eq!(t.receive().await.expect("r1").as_deref(), Some(&b"line1"[..]));
        assert_eq!(t.receive().await.expect("r2").as_deref(), Some(&b"line2"[..]));
        assert_eq!(t.receive().await.expect("r3").as_deref(), Some(&b""[..]));
        assert_eq!(t.receive().await.expect("r4").as_deref(), Some(&b"line3"[..]));
        assert_eq!(t.receive().await.expect("r5"), None);
    }

    #[tokio::test]
    async fn unterminated_trailing_line_is_end_of_stream() {
        let mut t = transport(b"{\"ok\":1}\n{\"jsonrpc\":\"2.0\",\"id\":");
        assert!(t.receive().await.expect("first").is_some());
        assert_eq!(t.receive().await.expect("partial"), None);
    }

    #[tokio::test]
    async fn invalid_utf8_is_passed_through_to_the_codec() {
        let mut t = transport(b"\xff\xfe\n");
        assert_eq!(t.receive().await.expect("read").as_deref(), Some(&b"\xff\xfe"[..]));
    }

    #[tokio::test]
    async fn oversized_line_is_skipped() {
        let mut t = transport(b"short\n0123456789abcdef\nnext\n").with_max_frame_len(8);
        assert_eq!(t.receive().await.expect("r1").as_deref(), Some(&b"short"[..]));
        assert_eq!(t.receive().await.expect("r2").as_deref(), Some(&b"next"[..]));
        assert_eq!(t.receive().await.expect("r3"), None);
    }

    #[tokio::test]
    async fn line_at_the_cap_is_kept() {
        let mut t = transport(b"12345678\r\n").with_max_frame_len(8);
        // The carriage return counts toward the cap before it is stripped.
        assert_eq!(t.receive().await.expect("r1"), None);

        let mut t = transport(b"12345678\n").with_max_frame_len(8);
        assert_eq!(t.receive().await.expect("r1").as_deref(), Some(&b"12345678"[..]));
    }

    #[tokio::test]
    async fn oversized_unterminated_tail_is_end_of_stream() {
        let mut t = transport(b"0123456789abcdef").with_max_frame_len(4);
        assert_eq!(t.receive().await.expect("r1"), None);
    }

    #[tokio::test]
    async fn write_appends_newline() {
        let mut t = transport(b"");
        t.send(b"{\"ok\":true}").await.expect("write");
        let (_, writer) = t.into_split();
        assert_eq!(writer.writer, b"{\"ok\":true}\n");
    }

    #[tokio::test]
    async fn write_rejects_embedded_newline() {
        let mut t = transport(b"");
        assert!(matches!(
            t.send(b"a\nb").await,
            Err(TransportError::Write(_))
        ));
    }
}
