use std::io;

/// Buffers formatted log output and hands it to `sink` one line at a time.
///
/// `tracing-subscriber` writes an event in several `write` calls; the browser
/// console wants whole lines. Anything left without a trailing newline is
/// emitted on flush or drop.
pub struct LineWriter<F: FnMut(&str)> {
    buf: Vec<u8>,
    sink: F,
}

impl<F: FnMut(&str)> LineWriter<F> {
    pub fn new(sink: F) -> Self {
        Self {
            buf: Vec::new(),
            sink,
        }
    }

    fn emit_complete_lines(&mut self) {
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..pos]);
            (self.sink)(text.trim_end_matches('\r'));
        }
    }
}

impl<F: FnMut(&str)> io::Write for LineWriter<F> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        self.emit_complete_lines();
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_complete_lines();
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            (self.sink)(&*String::from_utf8_lossy(&rest));
        }
        Ok(())
    }
}

impl<F: FnMut(&str)> Drop for LineWriter<F> {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    use super::LineWriter;

    fn console_log(line: &str) {
        web_sys::console::log_1(&JsValue::from_str(line));
    }

    /// `MakeWriter` that forwards formatted events to `console.log`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ConsoleMakeWriter;

    impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
        type Writer = LineWriter<fn(&str)>;

        fn make_writer(&'a self) -> Self::Writer {
            LineWriter::new(console_log as fn(&str))
        }
    }

    /// Installs the global subscriber. Safe to call more than once.
    pub fn init_tracing() {
        // No wall clock on wasm32; the console stamps lines itself.
        let _ = tracing_subscriber::fmt()
            .with_writer(ConsoleMakeWriter)
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{ConsoleMakeWriter, init_tracing};
