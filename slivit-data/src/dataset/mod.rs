//! Sample indexing, label resolution, and labeled dataset access.

mod dataset_;
mod label;
mod sample;
mod slice;
mod table;

pub use dataset_::*;
pub use label::*;
pub use sample::*;
pub use slice::*;
pub use table::*;
