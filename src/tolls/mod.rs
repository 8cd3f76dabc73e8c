//! Toll CSV import, matching against shifts and toll summaries

pub mod matcher;
pub mod reader;
pub mod summary;

pub use matcher::*;
pub use reader::*;
pub use summary::*;
