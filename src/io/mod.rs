//! Input/output helpers.
//!
//! - upload decoding: charset + delimiter discovery (`decode`)
//! - forecast CSV export (`export`)
//! - result JSON read/write (`result`)

pub mod decode;
pub mod export;
pub mod result;

pub use decode::{DecodedTable, decode};
pub use export::*;
pub use result::*;
