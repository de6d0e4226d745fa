// File: ./src/model/mod.rs
pub mod candidate;
pub mod item;
pub mod merge;
pub mod normalize;
pub mod parser;

pub use item::{EventRecord, ExtractedFields, format_date, format_time, parse_date, parse_time};
