use serde::Serialize;

use crate::output::traits::*;

/// A run of text sharing one token tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSpan {
    pub token: TextTokenType,
    pub text: String,
}

/// One output line as a list of tagged spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenLine {
    pub spans: Vec<TokenSpan>,
}

impl TokenLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Records every write together with its token tag.
///
/// Adjacent writes with the same tag on one line are merged into a single span.
#[derive(Debug, Clone, Default)]
pub struct TokenTextOutput {
    lines: Vec<TokenLine>,
    current: TokenLine,
}

impl TokenTextOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed lines plus the pending one, if anything was written to it.
    pub fn lines(&self) -> Vec<TokenLine> {
        let mut lines = self.lines.clone();
        if !self.current.spans.is_empty() {
            lines.push(self.current.clone());
        }
        lines
    }

    /// Tags used on the given line, in order of appearance.
    pub fn tokens_on_line(&self, index: usize) -> Vec<TextTokenType> {
        self.lines()
            .get(index)
            .map(|line| line.spans.iter().map(|s| s.token).collect())
            .unwrap_or_default()
    }
}

impl TextOutput for TokenTextOutput {
    fn write(&mut self, text: &str, token: TextTokenType) {
        if text.is_empty() {
            return;
        }
        match self.current.spans.last_mut() {
            Some(last) if last.token == token => last.text.push_str(text),
            _ => self.current.spans.push(TokenSpan {
                token,
                text: text.to_string(),
            }),
        }
    }

    fn write_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
    }
}
