//! Command-line surface: constants, display machinery, argument parsing,
//! and help text.

pub mod args;
pub mod constants;
pub mod help;
