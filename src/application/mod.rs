//! # Application Layer
//!
//! Use cases and the interfaces of external collaborators.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
