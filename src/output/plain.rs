use std::fmt;

use crate::output::traits::*;

/// Plain string buffer; token tags are discarded.
#[derive(Debug, Default, Clone)]
pub struct PlainTextOutput {
    buffer: String,
}

impl PlainTextOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl TextOutput for PlainTextOutput {
    fn write(&mut self, text: &str, _token: TextTokenType) {
        self.buffer.push_str(text);
    }

    fn write_line(&mut self) {
        self.buffer.push('\n');
    }
}

impl fmt::Display for PlainTextOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}
