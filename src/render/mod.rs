//! Format renderers. Each consumes the Report Model and nothing else;
//! renderers never depend on each other or on raw request data.

pub mod markup;
pub mod print;
pub mod sheet;
pub mod word;
