//! Utility functions module

pub mod path;
