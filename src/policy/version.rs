//! Version compatibility rules.

use semver::Version;

/// Pairwise compatibility: exact major and minor match, candidate patch at
/// or above the reference patch.
pub fn is_compatible(candidate: &Version, reference: &Version) -> bool {
    candidate.major == reference.major
        && candidate.minor == reference.minor
        && candidate.patch >= reference.patch
}

/// True when the candidate is compatible with any version the registry
/// still lists for its major/minor line.
pub fn matches_any(candidate: &Version, known: &[Version]) -> bool {
    known.iter().any(|v| is_compatible(candidate, v))
}
