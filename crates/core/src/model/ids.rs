use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Stable storage key for a problem: the page's origin followed by its path.
///
/// Query strings and fragments are dropped, so `?envType=...` or `#...` on
/// the same path yields the same identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(String);

impl ProblemId {
    /// Derives the identifier from a page location.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let origin = url.origin().ascii_serialization();
        Self(format!("{origin}{}", url.path()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProblemId({})", self.0)
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for parsing a `ProblemId` from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProblemIdError {
    raw: String,
}

impl fmt::Display for ParseProblemIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a problem URL: {}", self.raw)
    }
}

impl std::error::Error for ParseProblemIdError {}

impl FromStr for ProblemId {
    type Err = ParseProblemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s.trim())
            .map(|url| Self::from_url(&url))
            .map_err(|_| ParseProblemIdError { raw: s.to_string() })
    }
}
