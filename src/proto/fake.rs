use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// In-memory serial link: replays canned device bytes and records
/// everything written to it.
pub(crate) struct FakeBuffer {
    response_buf: Vec<u8>,
    written: Arc<Mutex<Vec<u8>>>,
    /// Writes accepted before every further write fails.
    writes_left: Option<usize>,
}

impl FakeBuffer {
    pub(crate) fn new(response_buf: Vec<u8>) -> Self {
        Self {
            response_buf,
            written: Arc::new(Mutex::new(Vec::new())),
            writes_left: None,
        }
    }

    pub(crate) fn failing_writes(self) -> Self {
        self.failing_writes_after(0)
    }

    pub(crate) fn failing_writes_after(mut self, writes: usize) -> Self {
        self.writes_left = Some(writes);
        self
    }

    pub(crate) fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        self.written.clone()
    }
}

/// Split recorded bytes into the sent command mnemonics.
pub(crate) fn sent_commands(written: &Arc<Mutex<Vec<u8>>>) -> Vec<String> {
    let bytes = written.lock().unwrap();
    String::from_utf8_lossy(&bytes)
        .split("\r\n")
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

impl tokio::io::AsyncRead for FakeBuffer {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        if !self.response_buf.is_empty() {
            let c = if buf.remaining() < self.response_buf.len() {
                buf.remaining()
            } else {
                self.response_buf.len()
            };
            buf.put_slice(&self.response_buf[0..c]);
            self.response_buf.drain(0..c);
        }
        std::task::Poll::Ready(Ok(()))
    }
}

impl tokio::io::AsyncWrite for FakeBuffer {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> std::task::Poll<std::result::Result<usize, std::io::Error>> {
        match self.writes_left {
            Some(0) => {
                return std::task::Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "fake write failure",
                )));
            }
            Some(n) => self.writes_left = Some(n - 1),
            None => {}
        }
        self.written.lock().unwrap().extend_from_slice(buf);
        std::task::Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), std::io::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), std::io::Error>> {
        std::task::Poll::Ready(Ok(()))
    }
}
