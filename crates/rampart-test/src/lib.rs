//! Test harnesses for the rampart route compiler.
//!
//! Holds the CLI regression suite, which drives the built `rampart` binary
//! against the fixtures in `tests/fixtures`.

#[cfg(test)]
pub mod cli;
