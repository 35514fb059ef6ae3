#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use keymaster_calib as calib;

#[doc(inline)]
pub use keymaster_linalg as linalg;
