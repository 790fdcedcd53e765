//! Public containers
//!
//! [`Vector`], [`Matrix`] and [`NDArray`] share one core: a storage handle,
//! a layout and a dispatch policy. Every numeric method validates shapes,
//! asks the policy for a kernel set and runs it against the buffer.
//!
//! Mutating methods take `&mut self` and return `&mut Self` (wrapped in
//! `Result` when they can fail) so calls chain. Binary operations with a
//! right-hand operand of another dtype convert the operand; the receiver's
//! dtype never changes.

mod dense;
mod matrix;
mod ndarray;
mod range;
mod vector;

pub use matrix::Matrix;
pub use ndarray::NDArray;
pub use range::RangeSpec;
pub use vector::Vector;
