//! Mathematical utilities: Fourier basis, least squares, normal quantiles.

pub mod basis;
pub mod normal;
pub mod ols;

pub use basis::*;
pub use normal::*;
pub use ols::*;
