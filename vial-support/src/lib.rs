//! # vial support
//!
//! Helpers shared by the vial crates that have nothing to do with
//! resolution itself, currently the text rendering behind error messages.

pub mod rendering;
