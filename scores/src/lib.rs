//! Best-times table for won games, kept as fixed-size binary records in a single file.

mod board;
mod error;
mod record;
mod store;

pub use board::*;
pub use error::*;
pub use record::*;
pub use store::*;
