use thiserror::Error;

/// Errors raised while rendering metadata through a [`Language`](crate::Language).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A naming helper was handed no entity.
    #[error("argument `{parameter}` must not be null")]
    ArgumentNull { parameter: &'static str },

    /// The caller signalled cancellation and the disassembler observed it.
    #[error("rendering was cancelled")]
    Cancelled,

    /// The metadata handed to the disassembler cannot be laid out.
    #[error("disassembler error: {0}")]
    Engine(String),
}

impl RenderError {
    pub fn argument_null(parameter: &'static str) -> Self {
        RenderError::ArgumentNull { parameter }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenderError::Cancelled)
    }
}

pub type RenderResult<T = ()> = std::result::Result<T, RenderError>;
