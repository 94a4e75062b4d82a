//! Spec loading for apidiff-task
//!
//! Resolves a [`SpecRef`] to its raw text: local files are read from disk and
//! URLs are fetched through an injected [`HttpClient`]. The left and right
//! specs are independent and are loaded concurrently.
//!
//! ## Usage
//! ```rust,ignore
//! use apidiff_task_loader::{HttpClientOptions, ReqwestClient, SpecLoader};
//! use std::sync::Arc;
//!
//! let http = Arc::new(ReqwestClient::new(&HttpClientOptions::default())?);
//! let loader = SpecLoader::new(http);
//! let (left, right) = loader.load_pair(&left_ref, &right_ref).await?;
//! ```

pub mod detect;
mod http;

pub use detect::{detect_version, DocumentFormat, SpecVersion};
pub use http::{HttpClient, HttpClientOptions, HttpError, ReqwestClient};

use apidiff_task_common::{SpecContent, SpecRef};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading a spec
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read spec file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch spec from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: HttpError,
    },
}

/// Loads spec content from files or URLs
#[derive(Clone)]
pub struct SpecLoader {
    http: Arc<dyn HttpClient>,
}

impl SpecLoader {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Load a single spec
    pub async fn load(&self, spec: &SpecRef) -> Result<SpecContent, LoadError> {
        let content = match spec {
            SpecRef::File(path) => {
                debug!(path = %path.display(), "reading spec file");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| LoadError::Read {
                        path: path.clone(),
                        source,
                    })?
            }
            SpecRef::Url(url) => {
                debug!(url = %url, "fetching spec");
                self.http
                    .get_text(url)
                    .await
                    .map_err(|source| LoadError::Fetch {
                        url: url.clone(),
                        source,
                    })?
            }
        };

        info!(spec = %spec, bytes = content.len(), "loaded spec");
        Ok(SpecContent::new(spec.clone(), content))
    }

    /// Load both sides of the comparison concurrently
    pub async fn load_pair(
        &self,
        left: &SpecRef,
        right: &SpecRef,
    ) -> Result<(SpecContent, SpecContent), LoadError> {
        tokio::try_join!(self.load(left), self.load(right))
    }
}
