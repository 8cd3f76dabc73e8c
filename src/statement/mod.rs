//! Ride-platform statement parsing: normalization, layout detection,
//! row parsing and earnings categories

pub mod category;
pub mod layout;
pub mod normalize;
pub mod parser;

pub use category::*;
pub use layout::*;
pub use normalize::*;
pub use parser::*;
