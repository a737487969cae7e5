// Copyright 2024-2026 Farlight Networks, LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Terminator-delimited framing for NETCONF messages.
//!
//! NETCONF messages are transmitted as XML text followed by an out-of-band
//! terminator sequence (conventionally `]]>]]>`):
//!
//! ```text
//! ┌─────────────────────────────┬──────────────┐
//! │       Payload (XML text)    │  Terminator  │
//! └─────────────────────────────┴──────────────┘
//! ```
//!
//! The payload is yielded with surrounding whitespace trimmed and with no
//! terminator bytes included. Bytes after the terminator are retained for
//! the next frame, so several frames arriving in one read — or a partial
//! next frame — are handled transparently.

use crate::FrameError;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{trace, warn};

/// The conventional NETCONF 1.0 end-of-message sequence.
pub const DEFAULT_TERMINATOR: &str = "]]>]]>";

/// Maximum bytes buffered while waiting for a terminator (1 MiB).
///
/// A peer that never sends the terminator would otherwise grow the receive
/// buffer without bound.
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// Incremental frame scanner over a persistent receive buffer.
///
/// The buffer lives for the whole session: data is appended as it arrives
/// and complete frames are split off as the terminator is found.
#[derive(Debug)]
pub struct FrameBuffer {
    /// Accumulated bytes not yet consumed by a complete frame.
    buffer: BytesMut,
    /// The end-of-message sequence to scan for.
    terminator: Vec<u8>,
}

impl FrameBuffer {
    /// Creates a frame buffer scanning for the given terminator.
    #[must_use]
    pub fn new(terminator: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            terminator: terminator.into(),
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to split one complete frame off the buffer.
    ///
    /// Returns `Ok(Some(payload))` when a terminator is present — the
    /// payload is everything before it, trimmed of surrounding whitespace —
    /// or `Ok(None)` when more data is needed.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::FrameTooLarge`] if the buffer exceeds
    /// [`MAX_FRAME_SIZE`] without containing a terminator.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        match find_subsequence(&self.buffer, &self.terminator) {
            Some(index) => {
                let frame = self.buffer.split_to(index);
                // Drop the terminator itself.
                let _ = self.buffer.split_to(self.terminator.len());
                Ok(Some(trim_whitespace(&frame).to_vec()))
            }
            None => {
                if self.buffer.len() > MAX_FRAME_SIZE {
                    return Err(FrameError::FrameTooLarge {
                        size: self.buffer.len(),
                    });
                }
                Ok(None)
            }
        }
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Reads terminator-delimited frames from an async byte source.
///
/// Wraps a [`FrameBuffer`] and drives it from the underlying reader until
/// a complete frame is available, end of stream is reached, or an error
/// occurs.
pub struct FrameReader<R> {
    source: R,
    frames: FrameBuffer,
    read_buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Creates a frame reader over the given source.
    pub fn new(source: R, terminator: impl Into<Vec<u8>>) -> Self {
        Self {
            source,
            frames: FrameBuffer::new(terminator),
            read_buf: vec![0u8; 4096],
        }
    }

    /// Reads the next complete frame.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly on a frame boundary.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TruncatedFrame`] if the stream ends while a
    /// partial frame is buffered, and propagates I/O errors unchanged.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        loop {
            if let Some(frame) = self.frames.next_frame()? {
                trace!(len = frame.len(), "frame received");
                return Ok(Some(frame));
            }

            let n = self.source.read(&mut self.read_buf).await?;
            if n == 0 {
                let buffered = self.frames.buffered_len();
                if buffered > 0 {
                    warn!(buffered, "stream ended with partial frame");
                    return Err(FrameError::TruncatedFrame { buffered });
                }
                trace!("stream ended cleanly");
                return Ok(None);
            }

            trace!(bytes = n, "read from channel");
            self.frames.extend(&self.read_buf[..n]);
        }
    }
}

/// Encodes one outgoing frame: payload followed by the terminator.
///
/// Writers are symmetric with the reader — every reply carries the same
/// terminator the codec scans for.
#[must_use]
pub fn encode_frame(payload: &[u8], terminator: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + terminator.len());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(terminator);
    frame
}

/// Finds the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Trims leading and trailing ASCII whitespace.
fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERM: &str = DEFAULT_TERMINATOR;

    #[test]
    fn frame_round_trip() {
        let mut frames = FrameBuffer::new(TERM);
        frames.extend(&encode_frame(b"<hello/>", TERM.as_bytes()));

        let frame = frames.next_frame().expect("scan should succeed");
        assert_eq!(frame, Some(b"<hello/>".to_vec()));
        assert!(frames.is_empty());
    }

    #[test]
    fn payload_is_trimmed() {
        let mut frames = FrameBuffer::new(TERM);
        frames.extend(b"\n  <rpc/>\r\n]]>]]>");

        let frame = frames.next_frame().expect("scan should succeed");
        assert_eq!(frame, Some(b"<rpc/>".to_vec()));
    }

    #[test]
    fn incremental_arrival() {
        let mut frames = FrameBuffer::new(TERM);
        let wire = encode_frame(b"<rpc message-id=\"1\"/>", TERM.as_bytes());

        // Feed data byte by byte; no frame until the terminator completes.
        for (i, &byte) in wire.iter().enumerate() {
            frames.extend(&[byte]);
            if i < wire.len() - 1 {
                let result = frames.next_frame().expect("scan should succeed");
                assert!(result.is_none(), "expected None at byte {i}");
            }
        }

        let frame = frames.next_frame().expect("scan should succeed");
        assert_eq!(frame, Some(b"<rpc message-id=\"1\"/>".to_vec()));
    }

    #[test]
    fn multiple_frames_in_one_read() {
        let mut frames = FrameBuffer::new(TERM);
        frames.extend(b"<one/>]]>]]><two/>]]>]]>");

        assert_eq!(
            frames.next_frame().expect("scan"),
            Some(b"<one/>".to_vec())
        );
        assert_eq!(
            frames.next_frame().expect("scan"),
            Some(b"<two/>".to_vec())
        );
        assert!(frames.is_empty());
    }

    #[test]
    fn partial_next_frame_is_retained() {
        let mut frames = FrameBuffer::new(TERM);
        frames.extend(b"<one/>]]>]]><tw");

        assert_eq!(
            frames.next_frame().expect("scan"),
            Some(b"<one/>".to_vec())
        );
        assert_eq!(frames.buffered_len(), 3);

        frames.extend(b"o/>]]>]]>");
        assert_eq!(
            frames.next_frame().expect("scan"),
            Some(b"<two/>".to_vec())
        );
    }

    #[test]
    fn terminator_never_appears_in_payload() {
        let mut frames = FrameBuffer::new(TERM);
        frames.extend(b"<a/>]]>]]>");

        let frame = frames.next_frame().expect("scan").expect("frame");
        assert!(find_subsequence(&frame, TERM.as_bytes()).is_none());
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        let mut frames = FrameBuffer::new(TERM);
        frames.extend(&vec![b'x'; MAX_FRAME_SIZE + 1]);

        let result = frames.next_frame();
        assert!(matches!(result, Err(FrameError::FrameTooLarge { .. })));
    }

    #[tokio::test]
    async fn reader_yields_frames_across_chunked_reads() {
        let (mut client, server) = tokio::io::duplex(16);
        let mut reader = FrameReader::new(server, TERM);

        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            // Two frames, written in awkward chunks across the small pipe.
            let wire = b"  <first/>  ]]>]]><second/>]]>]]>";
            for chunk in wire.chunks(7) {
                client.write_all(chunk).await.expect("write");
            }
            drop(client);
        });

        assert_eq!(
            reader.read_frame().await.expect("read"),
            Some(b"<first/>".to_vec())
        );
        assert_eq!(
            reader.read_frame().await.expect("read"),
            Some(b"<second/>".to_vec())
        );
        assert_eq!(reader.read_frame().await.expect("read"), None);

        writer.await.expect("writer task");
    }

    #[tokio::test]
    async fn reader_detects_truncated_stream() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut reader = FrameReader::new(server, TERM);

        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            client.write_all(b"<unfinished").await.expect("write");
            drop(client);
        });

        let result = reader.read_frame().await;
        assert!(matches!(
            result,
            Err(FrameError::TruncatedFrame { buffered: 11 })
        ));
    }

    #[test]
    fn empty_payload_frame() {
        let mut frames = FrameBuffer::new(TERM);
        frames.extend(b"]]>]]>");
        assert_eq!(frames.next_frame().expect("scan"), Some(Vec::new()));
    }
}
