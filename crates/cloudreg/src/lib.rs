#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use cloudreg_3d as c3d;

#[doc(inline)]
pub use cloudreg_registration as registration;
