//! OGC application package module
//!
//! Builds the registration document that points an OGC API - Processes
//! server at a published CWL workflow

pub mod document;

pub use document::*;
