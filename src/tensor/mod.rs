//! Storage and layout primitives
//!
//! [`Storage`] is the typed, reference-counted element buffer; [`Layout`]
//! selects the region of it a container sees. Every container in
//! [`crate::array`] is a `(Storage, Layout)` pair.

mod layout;
mod storage;

pub use layout::{Layout, Shape, Strides};
pub use storage::{Buffer, Storage};
