//! Package index name lookups
//!
//! Used to learn the canonical casing of a project name (`django` -> `Django`).

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, registry};

/// Default package index for JSON API lookups
pub const PYPI_BASE_URL: &str = "https://pypi.org";

/// Resolves a package name to its canonical casing
pub trait CanonicalNameLookup {
    fn canonical_name(&self, name: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    name: String,
}

/// Looks names up through the index's JSON API (`<base>/pypi/<name>/json`)
#[derive(Debug, Clone)]
pub struct PypiLookup {
    base_url: String,
    timeout: Duration,
}

impl PypiLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    fn project_url(&self, name: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url.trim_end_matches('/'), name)
    }
}

impl Default for PypiLookup {
    fn default() -> Self {
        Self::new(PYPI_BASE_URL, Duration::from_secs(10))
    }
}

impl CanonicalNameLookup for PypiLookup {
    fn canonical_name(&self, name: &str) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| registry::lookup_failed(name, e.to_string()))?;
        let response: ProjectResponse = client
            .get(self.project_url(name))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|response| response.json::<ProjectResponse>())
            .map_err(|e| registry::lookup_failed(name, e.to_string()))?;
        Ok(response.info.name)
    }
}
