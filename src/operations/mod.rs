//! Operations module
//!
//! Template filling, workflow writing and application package registration

pub mod deploy;
pub mod fill;
pub mod write;

pub use deploy::*;
pub use fill::*;
pub use write::*;
