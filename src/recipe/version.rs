//! Version gating for migrations using semver constraints.
//!
//! A migration declares a range like ">=10.0.0, <11.0.0" and only runs when
//! the installed library version satisfies it.

use semver::{Version, VersionReq};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VersionError {
    #[error("invalid version '{value}': {message}")]
    InvalidVersion { value: String, message: String },

    #[error("invalid version requirement '{value}': {message}")]
    InvalidRequirement { value: String, message: String },
}

/// Check if a version matches a requirement string.
///
/// # Examples
///
/// ```
/// use uplift::recipe::version::matches_requirement;
///
/// assert!(matches_requirement("10.8.0", Some(">=10.0.0")).unwrap());
/// assert!(matches_requirement("10.8.0", Some(">=10.0.0, <11.0.0")).unwrap());
/// assert!(!matches_requirement("9.4.0", Some(">=10.0.0")).unwrap());
///
/// // None requirement means "apply to all versions"
/// assert!(matches_requirement("1.0.0", None).unwrap());
/// ```
pub fn matches_requirement(version: &str, requirement: Option<&str>) -> Result<bool, VersionError> {
    // No requirement means "apply to all versions"
    let Some(req_str) = requirement else {
        return Ok(true);
    };

    let req_str = req_str.trim();
    if req_str.is_empty() {
        return Ok(true);
    }

    let version = Version::parse(version).map_err(|e| VersionError::InvalidVersion {
        value: version.to_string(),
        message: e.to_string(),
    })?;

    let req = VersionReq::parse(req_str).map_err(|e| VersionError::InvalidRequirement {
        value: req_str.to_string(),
        message: e.to_string(),
    })?;

    Ok(req.matches(&version))
}

/// The concrete version inside a manifest range declaration.
///
/// npm manifests declare ranges (`^10.8.0`, `~10.8.0`, `>=10.8.0`); the
/// gate compares against the lower bound those ranges pin.
pub fn declared_to_version(declared: &str) -> &str {
    declared
        .split_whitespace()
        .next()
        .unwrap_or(declared)
        .trim_start_matches(['^', '~', '=', 'v', '>', '<'])
}
