#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use geopcd_io as io;

#[doc(inline)]
pub use geopcd_linalg as linalg;

#[doc(inline)]
pub use geopcd_batch as batch;
