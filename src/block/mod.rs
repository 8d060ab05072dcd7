//! The block compression core: index construction, match finding, optimal
//! parsing, peephole reduction, emission, and the verification decoder.

pub mod compress;
pub mod decompress;
pub mod emit;
pub mod index;
pub mod matchfinder;
pub mod optimal;
pub mod peephole;
pub mod suffix_array;
pub mod types;
