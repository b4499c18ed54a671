pub mod types;
pub mod member;
pub mod loader;
pub mod selector;

pub use types::*;
pub use member::*;
pub use loader::*;
pub use selector::*;
