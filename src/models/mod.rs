//! Data models for the family tree DPL.
//!
//! Field names match the JSON the tree front end consumes.

mod import;
mod member;
mod node;

pub use import::*;
pub use member::*;
pub use node::*;
