//! # ilview
//!
//! Pluggable output languages for a .NET metadata decompiler. A [`Language`]
//! renders types, members, namespaces and whole assemblies as text; swapping
//! the language swaps the output format without touching callers.
//!
//! Two IL languages ship with the crate, flat and structured, together with a
//! comment-only fallback language and the metadata model they render.

pub mod disassembler;
pub mod error;
pub mod language;
pub mod metadata;
pub mod options;
pub mod output;

#[cfg(test)]
mod tests;

pub use disassembler::{IlMode, IlNameSyntax, ReflectionDisassembler};
pub use error::{RenderError, RenderResult};
pub use language::{CommentLanguage, IlLanguage, Language, Languages};
pub use metadata::*;
pub use options::{CancellationToken, DecompilationOptions};
pub use output::{
    PlainTextOutput, TextOutput, TextTokenType, TokenLine, TokenSpan, TokenTextOutput,
};
