//! Incremental Server-Sent Events decoder.
//!
//! Bytes arrive in arbitrary chunks; the decoder buffers partial lines and
//! emits one [`SseFrame`] per blank-line-terminated event. Follows the
//! `text/event-stream` rules: `LF`, `CR` and `CRLF` line endings, `:` comments,
//! one optional space after the field colon, multi-line `data`, sticky `id`.

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// Event name; `None` means the default `message` type.
    pub event: Option<String>,
    /// Data lines joined with `\n`.
    pub data: String,
    /// Last event id in effect when this event was dispatched.
    pub id: Option<String>,
}

impl SseFrame {
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            data: data.into(),
            id: None,
        }
    }

    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    after_cr: bool,
    started: bool,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
    retry_ms: Option<u64>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new connection that resumes after `last_event_id`.
    pub fn resuming(last_event_id: Option<String>) -> Self {
        Self {
            last_event_id,
            ..Self::default()
        }
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Reconnection delay requested by the server via `retry:`.
    pub fn retry_ms(&self) -> Option<u64> {
        self.retry_ms
    }

    /// Feed a chunk; returns every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        for &byte in chunk {
            match byte {
                b'\n' if self.after_cr => {
                    self.after_cr = false;
                }
                b'\n' => {
                    if let Some(frame) = self.end_line() {
                        frames.push(frame);
                    }
                }
                b'\r' => {
                    self.after_cr = true;
                    if let Some(frame) = self.end_line() {
                        frames.push(frame);
                    }
                }
                other => {
                    self.after_cr = false;
                    self.line.push(other);
                }
            }
        }
        frames
    }

    fn end_line(&mut self) -> Option<SseFrame> {
        let raw = std::mem::take(&mut self.line);
        let mut line = String::from_utf8_lossy(&raw).into_owned();
        if !self.started {
            self.started = true;
            if let Some(stripped) = line.strip_prefix('\u{feff}') {
                line = stripped.to_string();
            }
        }
        self.process_line(&line)
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => {
                self.last_event_id = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry_ms = Some(ms);
                }
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event.filter(|e| !e.is_empty()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}
