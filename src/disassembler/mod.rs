pub mod names;
pub mod reflection;
mod body;

pub use names::*;
pub use reflection::*;
