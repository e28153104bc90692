//! Candidate pool supplier.
//!
//! # Responsibilities
//! - Represent a single selectable endpoint
//! - Abstract the registry that supplies the raw pool and version metadata
//!
//! # Design Decisions
//! - The pool is fetched once per `select()` call; rounds reuse the snapshot
//! - Version history comes from the registry so compatibility can accept
//!   candidates still running an older, registered patch line

use crate::error::SelectorError;
use async_trait::async_trait;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// One service endpoint eligible for selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(Url);

impl Candidate {
    /// Parse an endpoint string into a candidate.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self)
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Where the health check for this candidate lives.
    pub fn health_check_url(&self, path: &str) -> Url {
        let mut url = self.0.clone();
        url.set_path(path);
        url
    }
}

impl From<Url> for Candidate {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Supplies the raw candidate pool and per-pool version metadata.
///
/// Implementations typically sit in front of a registry or contract; a
/// [`StaticCandidateSource`] is provided for fixed deployments and tests.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Ordered snapshot of the current pool. Called once per selection,
    /// not once per round.
    async fn candidates(&self) -> Result<Vec<Candidate>, SelectorError>;

    /// Version currently expected of a compliant service.
    async fn current_version(&self) -> Result<Version, SelectorError>;

    /// Versions the registry still considers valid. Defaults to just the
    /// current version.
    async fn known_versions(&self) -> Result<Vec<Version>, SelectorError> {
        Ok(vec![self.current_version().await?])
    }
}

/// Fixed in-memory candidate pool.
#[derive(Debug, Clone)]
pub struct StaticCandidateSource {
    candidates: Vec<Candidate>,
    current_version: Version,
    known_versions: Vec<Version>,
}

impl StaticCandidateSource {
    pub fn new(candidates: Vec<Candidate>, current_version: Version) -> Self {
        Self {
            candidates,
            known_versions: vec![current_version.clone()],
            current_version,
        }
    }

    /// Replace the registry version history used for compatibility checks.
    pub fn with_known_versions(mut self, known_versions: Vec<Version>) -> Self {
        self.known_versions = known_versions;
        self
    }
}

#[async_trait]
impl CandidateSource for StaticCandidateSource {
    async fn candidates(&self) -> Result<Vec<Candidate>, SelectorError> {
        Ok(self.candidates.clone())
    }

    async fn current_version(&self) -> Result<Version, SelectorError> {
        Ok(self.current_version.clone())
    }

    async fn known_versions(&self) -> Result<Vec<Version>, SelectorError> {
        Ok(self.known_versions.clone())
    }
}
