//! Guest text output and the host sink it is delivered to.
//!
//! Until a sink is registered, output is line buffered: each completed
//! line goes to the log under the `linmem::guest` target and only the
//! unterminated tail is held. Registering a sink flushes that tail to it;
//! from then on every write is forwarded unchanged.

/// Receiver for text the guest prints.
pub trait OutputSink {
    /// Append `text`. Called with arbitrary fragments, not whole lines.
    fn write(&mut self, text: &str);
}

impl OutputSink for String {
    fn write(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Routes guest output to a sink or, failing that, the log.
#[derive(Default)]
pub struct Output {
    sink: Option<Box<dyn OutputSink>>,
    pending: String,
}

impl Output {
    /// An output with no sink attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `text`.
    pub fn write(&mut self, text: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.write(text);
            return;
        }
        match text.rfind('\n') {
            Some(at) => {
                self.pending.push_str(&text[..at]);
                for line in self.pending.split('\n') {
                    tracing::info!(target: "linmem::guest", "{line}");
                }
                self.pending.clear();
                self.pending.push_str(&text[at + 1..]);
            }
            None => self.pending.push_str(text),
        }
    }

    /// Attach or detach the sink. Attaching flushes any held text.
    pub fn set_sink(&mut self, sink: Option<Box<dyn OutputSink>>) {
        self.sink = sink;
        if let Some(sink) = self.sink.as_mut() {
            if !self.pending.is_empty() {
                sink.write(&self.pending);
                self.pending.clear();
            }
        }
    }

    /// Whether a sink is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Text held back because no sink is attached and no newline has
    /// completed it yet.
    pub fn pending(&self) -> &str {
        &self.pending
    }
}
