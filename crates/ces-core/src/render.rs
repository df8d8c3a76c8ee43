//! Request-scoped output buffering around the rewriter.
//!
//! A [`ResponseBuffer`] wraps the real output sink. The host calls
//! [`ResponseBuffer::begin_buffering`] at the page-header boundary; from then on
//! writes are captured. [`ResponseBuffer::flush_and_rewrite`] at the footer
//! boundary rewrites the captured document and emits it. Writes before the
//! header and after the flush go straight to the sink.
//!
//! If the buffer is dropped while still buffering (aborted request), the
//! captured output is discarded and nothing is emitted for it.

use std::io::{self, Write};
use thiserror::Error;

use crate::rewrite::{format_outcomes, OutputRewriter, RewriteOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    NotBuffering,
    Buffering,
    Flushed,
}

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("buffering already started for this response")]
    AlreadyStarted,
    #[error("flush requested but buffering was never started")]
    NotBuffering,
    #[error("response already flushed")]
    AlreadyFlushed,
    #[error("output sink: {0}")]
    Io(#[from] io::Error),
}

pub struct ResponseBuffer<W: Write> {
    sink: W,
    state: BufferState,
    captured: Vec<u8>,
    debug_outcomes: bool,
}

impl<W: Write> ResponseBuffer<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: BufferState::NotBuffering,
            captured: Vec::new(),
            debug_outcomes: false,
        }
    }

    /// Log the rewrite outcome listing at debug level on flush.
    pub fn with_debug_outcomes(mut self, enabled: bool) -> Self {
        self.debug_outcomes = enabled;
        self
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    /// Start capturing output. Only one buffering session per response.
    pub fn begin_buffering(&mut self) -> Result<(), BufferError> {
        match self.state {
            BufferState::NotBuffering => {
                self.state = BufferState::Buffering;
                Ok(())
            }
            BufferState::Buffering => Err(BufferError::AlreadyStarted),
            BufferState::Flushed => Err(BufferError::AlreadyFlushed),
        }
    }

    /// Rewrite everything captured since `begin_buffering` and write it to the sink.
    ///
    /// The capture is rewritten as bytes, so pages in legacy single-byte
    /// encodings are handled the same as UTF-8 ones.
    pub fn flush_and_rewrite(
        &mut self,
        rewriter: &OutputRewriter,
    ) -> Result<Vec<RewriteOutcome>, BufferError> {
        match self.state {
            BufferState::Buffering => {}
            BufferState::NotBuffering => return Err(BufferError::NotBuffering),
            BufferState::Flushed => return Err(BufferError::AlreadyFlushed),
        }
        self.state = BufferState::Flushed;
        let captured = std::mem::take(&mut self.captured);

        let report = rewriter.rewrite_bytes(&captured);
        self.sink.write_all(&report.html)?;
        self.sink.flush()?;
        let outcomes = report.outcomes;

        if self.debug_outcomes {
            tracing::debug!("rewrite outcomes:\n{}", format_outcomes(&outcomes));
        }
        Ok(outcomes)
    }

    /// Give back the sink. Anything still captured is discarded.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> Write for ResponseBuffer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.state {
            BufferState::Buffering => {
                self.captured.extend_from_slice(buf);
                Ok(buf.len())
            }
            BufferState::NotBuffering | BufferState::Flushed => self.sink.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state {
            // Nothing may reach the sink before the rewrite.
            BufferState::Buffering => Ok(()),
            BufferState::NotBuffering | BufferState::Flushed => self.sink.flush(),
        }
    }
}
