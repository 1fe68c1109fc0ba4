mod entry;
mod money;
mod stats;

pub use entry::*;
pub use money::*;
pub use stats::*;
