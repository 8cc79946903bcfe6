//! Package sources and ordered source fallback

use serde::{Deserialize, Serialize};

use crate::error::{PinenvError, Result};
use crate::runner::ProcessOutput;

/// Default package index
pub const PYPI_URL: &str = "https://pypi.org/simple";

/// A package index declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

fn default_verify_ssl() -> bool {
    true
}

impl Source {
    pub fn pypi() -> Self {
        Self {
            name: "pypi".to_string(),
            url: PYPI_URL.to_string(),
            verify_ssl: true,
        }
    }

    /// Host of the index URL, for `--trusted-host`
    pub fn host(&self) -> Option<String> {
        reqwest::Url::parse(&self.url)
            .ok()?
            .host_str()
            .map(String::from)
    }
}

/// Run `attempt` against each source in declared order
///
/// Returns the first result with a zero exit code. When every source fails the result
/// of the last source is returned, so callers always see the final diagnostic output
/// and must check the exit code themselves. Errors raised by an attempt (spawn
/// failures, timeouts, interrupts) stop the iteration immediately.
pub fn for_each_source<F>(sources: &[Source], mut attempt: F) -> Result<ProcessOutput>
where
    F: FnMut(&Source) -> Result<ProcessOutput>,
{
    let mut last = None;
    for source in sources {
        let output = attempt(source)?;
        if output.success() {
            return Ok(output);
        }
        tracing::debug!(source = %source.name, exit_code = output.exit_code, "source failed");
        last = Some(output);
    }
    last.ok_or(PinenvError::NoSources)
}
