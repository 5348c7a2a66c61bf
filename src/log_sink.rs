use std::io::Write;

/// Append-only text sink that receives the loader's milestone messages.
///
/// How emphasized text looks is up to the sink.
pub trait LogSink {
    fn append(&mut self, text: &str);
    fn append_emphasized(&mut self, text: &str);
}

/// Collects messages for stdout; emphasized text is wrapped bold blue.
///
/// Nothing is written until [`ConsoleSink::flush`], so one file's messages come out
/// as a single block even when several files load concurrently.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    buffer: String,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending text, ANSI escapes included.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Hands over the pending text and leaves the sink empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Writes the pending text to stdout in one locked write.
    pub fn flush(&mut self) {
        let text = self.take();
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl LogSink for ConsoleSink {
    fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn append_emphasized(&mut self, text: &str) {
        self.buffer.push_str("\x1b[1;34m");
        self.buffer.push_str(text);
        self.buffer.push_str("\x1b[0m");
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            self.flush();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Strong,
}

/// Keeps every appended fragment in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<(Emphasis, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All fragments concatenated, emphasis dropped.
    pub fn text(&self) -> String {
        self.entries.iter().map(|(_, t)| t.as_str()).collect()
    }

    pub fn emphasized(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(e, _)| *e == Emphasis::Strong)
            .map(|(_, t)| t.as_str())
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, text: &str) {
        self.entries.push((Emphasis::Plain, text.to_string()));
    }

    fn append_emphasized(&mut self, text: &str) {
        self.entries.push((Emphasis::Strong, text.to_string()));
    }
}
