use serde::Serialize;

/// Semantic category attached to a span of output, used downstream for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTokenType {
    Text,
    Comment,
    Keyword,
    Directive,
    TypeName,
    MemberName,
    Opcode,
    Label,
    Literal,
}

/// Destination for rendered text.
///
/// Sinks are owned by the caller. Languages and the disassembler only write
/// into them for the duration of a single call.
pub trait TextOutput {
    /// Append `text` to the current line.
    fn write(&mut self, text: &str, token: TextTokenType);

    /// Terminate the current line.
    fn write_line(&mut self);

    /// Append `text` and terminate the line.
    fn write_line_with(&mut self, text: &str, token: TextTokenType) {
        self.write(text, token);
        self.write_line();
    }
}
