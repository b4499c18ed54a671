pub mod language;
pub mod fallback;
pub mod il;
pub mod comments;
pub mod registry;

pub use language::*;
pub use il::*;
pub use comments::*;
pub use registry::*;
