mod channel;
mod inject;
mod ws;

pub use channel::*;
pub use inject::*;
pub use ws::*;
