#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

pub mod rigid;
/// Module to calculate SVD of 3x3 and Nx3 matrices
pub mod svd;
