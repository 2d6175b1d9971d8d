//! Region table and source selection types.

pub mod region;
pub mod source;

pub use region::{Region, REGIONS};
pub use source::{NeVersion, Resolution};
