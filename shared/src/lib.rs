mod error;
mod fs;

pub use error::*;
pub use fs::*;
