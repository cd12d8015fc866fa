//! Paginated SOQL queries and decoding of the records they return.

pub mod timestamp;

mod decode;
mod pager;

pub use decode::*;
pub use pager::*;
pub use timestamp::Timestamp;
