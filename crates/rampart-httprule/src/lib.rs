//! HTTP rule path templates.
//!
//! Parses templates such as `/v1/{name=projects/*/instances/*}:restart` into
//! segments, and compiles them into a [`Template`] exposing the field paths
//! the template captures.

pub mod error;
pub mod parser;
pub mod template;

pub use error::TemplateError;
pub use parser::{parse, Parsed};
pub use template::{Segment, Template};
