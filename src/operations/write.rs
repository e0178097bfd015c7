//! Workflow file writer

use crate::cwl::document::CwlDocument;
use crate::error::{AppPackError, Result};
use crate::system::System;
use crate::utils::path::validate_file_name;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory generated workflows are written to
pub const DEFAULT_OUTPUT_DIR: &str = "cwl_workflows";

/// First line of every written workflow so it can be executed directly
const CWL_SHEBANG: &str = "#!/usr/bin/env cwl-runner\n\n";

/// Writes filled CWL documents under an output directory
#[non_exhaustive]
pub struct WorkflowWriter<'src> {
    system: &'src dyn System,
    output_dir: PathBuf,
}

impl<'src> WorkflowWriter<'src> {
    /// Create a writer targeting `output_dir`
    #[must_use]
    #[inline]
    pub fn new<P: Into<PathBuf>>(system: &'src dyn System, output_dir: P) -> Self {
        Self {
            system,
            output_dir: output_dir.into(),
        }
    }

    /// Render the document exactly as [`WorkflowWriter::write`] stores it
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized
    #[inline]
    pub fn render(document: &CwlDocument) -> Result<String> {
        let body = document.to_yaml_string()?;
        Ok(format!("{CWL_SHEBANG}{body}"))
    }

    /// Serialize `document` to `<output_dir>/<file_name>`
    ///
    /// The content is staged in a hidden sibling file and renamed into place,
    /// so a failed write never leaves a truncated workflow behind.
    ///
    /// # Errors
    ///
    /// Returns a write error if:
    /// - The file name is not a plain file name
    /// - The output directory cannot be created
    /// - The file cannot be written or moved into place
    #[inline]
    pub fn write(&self, document: &CwlDocument, file_name: &str) -> Result<PathBuf> {
        validate_file_name(file_name)?;

        let content = Self::render(document)
            .map_err(|e| AppPackError::write(self.output_dir.join(file_name), e.to_string()))?;

        if !self.system.is_dir(&self.output_dir) {
            debug!("Creating output directory {}", self.output_dir.display());
            self.system
                .create_dir_all(&self.output_dir)
                .map_err(|e| {
                    AppPackError::write(
                        &self.output_dir,
                        format!("failed to create output directory: {e}"),
                    )
                })?;
        }

        let target = self.output_dir.join(file_name);
        let staging = self.output_dir.join(format!(".{file_name}.tmp"));

        if let Err(e) = self.system.write(&staging, content.as_bytes()) {
            self.discard(&staging);
            return Err(AppPackError::write(&target, e.to_string()));
        }

        if let Err(e) = self.system.rename(&staging, &target) {
            self.discard(&staging);
            return Err(AppPackError::write(&target, e.to_string()));
        }

        info!("CWL workflow saved to {}", target.display());
        Ok(target)
    }

    fn discard(&self, staging: &Path) {
        if self.system.exists(staging)
            && let Err(e) = self.system.remove_file(staging)
        {
            warn!(
                "Failed to remove staging file {}: {}",
                staging.display(),
                e
            );
        }
    }
}
