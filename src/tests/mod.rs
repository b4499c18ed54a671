mod il_tests;
mod language_tests;

use crate::*;
use similar::TextDiff;

const SAMPLE_JSON: &str = include_str!("../../tests/fixtures/sample.json");

pub(crate) fn sample_assembly() -> LoadedAssembly {
    AssemblyLoader::from_json(SAMPLE_JSON, "ignored.json").expect("sample fixture should load")
}

pub(crate) fn widget(assembly: &LoadedAssembly) -> &TypeDef {
    assembly
        .module
        .find_type("Sample.Widget")
        .expect("Sample.Widget should exist")
}

pub(crate) fn int32() -> TypeRef {
    TypeRef::new("System", "Int32").with_scope("mscorlib").value_type()
}

/// Panics with a line diff when the two texts differ.
pub(crate) fn assert_text_eq(expected: &str, actual: &str) {
    if expected != actual {
        let diff = TextDiff::from_lines(expected, actual);
        panic!(
            "rendered text differs from expectation:\n{}",
            diff.unified_diff().header("expected", "actual")
        );
    }
}

pub(crate) fn render_with<F>(render: F) -> String
where
    F: FnOnce(&mut dyn TextOutput) -> RenderResult,
{
    let mut output = PlainTextOutput::new();
    render(&mut output).expect("render should succeed");
    output.into_string()
}

/// Sink that cancels `token` once a completed line contains `trigger`.
pub(crate) struct CancellingOutput {
    pub inner: PlainTextOutput,
    token: CancellationToken,
    trigger: &'static str,
    line: String,
}

impl CancellingOutput {
    pub fn new(token: CancellationToken, trigger: &'static str) -> Self {
        Self {
            inner: PlainTextOutput::new(),
            token,
            trigger,
            line: String::new(),
        }
    }
}

impl TextOutput for CancellingOutput {
    fn write(&mut self, text: &str, token: TextTokenType) {
        self.line.push_str(text);
        self.inner.write(text, token);
    }

    fn write_line(&mut self) {
        if self.line.contains(self.trigger) {
            self.token.cancel();
        }
        self.line.clear();
        self.inner.write_line();
    }
}
