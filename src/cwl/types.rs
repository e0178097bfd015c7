//! CWL parameter types
//!
//! Parameters are declared with the CWL shorthand syntax: a base type,
//! optionally followed by `[]` for arrays and `?` for optional values
//! (for example `File`, `string?`, `Directory[]`).

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Base CWL types recognized in algorithm configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CwlBaseType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    File,
    Directory,
    Any,
}

impl CwlBaseType {
    const ALL: [Self; 9] = [
        Self::Boolean,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::String,
        Self::File,
        Self::Directory,
        Self::Any,
    ];

    /// Keyword used for this type in CWL documents
    #[must_use]
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::File => "File",
            Self::Directory => "Directory",
            Self::Any => "Any",
        }
    }
}

/// A parameter type in CWL shorthand form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CwlType {
    pub base: CwlBaseType,
    pub array: bool,
    pub optional: bool,
}

impl CwlType {
    /// A required, non-array type
    #[must_use]
    #[inline]
    pub const fn new(base: CwlBaseType) -> Self {
        Self {
            base,
            array: false,
            optional: false,
        }
    }

    /// Whether values of this type are filesystem objects (`File` or `Directory`)
    #[must_use]
    #[inline]
    pub const fn is_path_like(&self) -> bool {
        matches!(self.base, CwlBaseType::File | CwlBaseType::Directory)
    }
}

impl fmt::Display for CwlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())?;
        if self.array {
            f.write_str("[]")?;
        }
        if self.optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl FromStr for CwlType {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (rest, optional) = match trimmed.strip_suffix('?') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        let (name, array) = match rest.strip_suffix("[]") {
            Some(name) => (name, true),
            None => (rest, false),
        };

        let base = CwlBaseType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = CwlBaseType::ALL.iter().map(|t| t.as_str()).collect();
                format!(
                    "Unrecognized CWL type '{s}'. Expected one of {} (optionally suffixed with '[]' and/or '?')",
                    known.join(", ")
                )
            })?;

        Ok(Self {
            base,
            array,
            optional,
        })
    }
}

impl TryFrom<String> for CwlType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CwlType> for String {
    fn from(value: CwlType) -> Self {
        value.to_string()
    }
}
