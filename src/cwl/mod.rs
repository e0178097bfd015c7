//! CWL document model
//!
//! Typed representation of the packed CWL v1.2 documents this tool reads as
//! templates and writes as process descriptions

pub mod document;
pub mod template;
pub mod types;

pub use document::*;
pub use template::*;
pub use types::*;
