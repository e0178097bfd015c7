//! Build context for a generation run
//!
//! Everything the CI environment knows about the run (repository, ref,
//! commit, built image, date) is passed in explicitly through this struct,
//! keeping template filling a pure function of its inputs.

use chrono::NaiveDate;

/// Software version stamped when the caller does not provide one
pub const DEFAULT_SOFTWARE_VERSION: &str = "1.0.0";

/// Explicit provenance and naming parameters for one build
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct BuildContext {
    /// Repository name, or `owner/name`
    pub repository_name: String,

    /// Branch, tag or other git ref the build runs for
    pub reference: String,

    /// Browsable URL of the source repository
    pub repository_url: Option<String>,

    /// Commit the workflow is generated from
    pub commit_hash: Option<String>,

    /// Container image built by CI; overrides the configured image
    pub docker_image: Option<String>,

    /// Value for `s:softwareVersion`
    pub software_version: String,

    /// Value for `s:dateCreated`
    pub date: NaiveDate,
}

impl BuildContext {
    /// Create a context with the required naming parameters
    #[must_use]
    #[inline]
    pub fn new<R: Into<String>, F: Into<String>>(
        repository_name: R,
        reference: F,
        date: NaiveDate,
    ) -> Self {
        Self {
            repository_name: repository_name.into(),
            reference: reference.into(),
            repository_url: None,
            commit_hash: None,
            docker_image: None,
            software_version: DEFAULT_SOFTWARE_VERSION.to_owned(),
            date,
        }
    }

    #[must_use]
    #[inline]
    pub fn with_repository_url<S: Into<String>>(mut self, url: S) -> Self {
        self.repository_url = Some(url.into());
        self
    }

    #[must_use]
    #[inline]
    pub fn with_commit_hash<S: Into<String>>(mut self, commit_hash: S) -> Self {
        self.commit_hash = Some(commit_hash.into());
        self
    }

    #[must_use]
    #[inline]
    pub fn with_docker_image<S: Into<String>>(mut self, image: S) -> Self {
        self.docker_image = Some(image.into());
        self
    }

    #[must_use]
    #[inline]
    pub fn with_software_version<S: Into<String>>(mut self, version: S) -> Self {
        self.software_version = version.into();
        self
    }
}
