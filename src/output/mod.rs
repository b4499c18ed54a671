pub mod traits;
pub mod plain;
pub mod tokens;

pub use traits::*;
pub use plain::*;
pub use tokens::*;
