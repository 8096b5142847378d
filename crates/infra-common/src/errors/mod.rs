mod context;
mod types;

pub use context::{ErrorContext, ErrorExt};
pub use types::{Error, Result};
