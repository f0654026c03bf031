use semver::Version;
use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by image loading and timeline operations
///
/// The diff core itself never fails: ambiguous fingerprints, composition
/// gaps and hitting the pass limit are all documented partial results, not
/// errors.
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),

    /// A stored artifact or mapping file did not parse
    MalformedArtifact(serde_json::Error),

    /// The directory is missing the timeline layout (`sources/`, `diffs/`)
    NotATimeline(PathBuf),

    /// The timeline config names an artifact format with no known loader
    InvalidFormat(String),

    /// Not a well-formed strict semantic version
    InvalidVersion {
        version: String,
        error: semver::Error,
    },

    /// No artifact is stored for this version
    UnknownVersion(Version),

    /// A version cannot be mapped to itself
    SameVersion(Version),

    /// The version already has a stored artifact (and `force` was not set)
    VersionExists(Version),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "{}", err),
            Error::MalformedArtifact(err) => write!(f, "malformed artifact: {}", err),
            Error::NotATimeline(path) => {
                write!(f, "'{}' is not a timeline", path.display())
            }
            Error::InvalidFormat(format) => {
                write!(f, "invalid format '{}' in timeline config", format)
            }
            Error::InvalidVersion { version, error } => {
                write!(f, "'{}' is not a valid version: {}", version, error)
            }
            Error::UnknownVersion(version) => write!(f, "version {} doesn't exist", version),
            Error::SameVersion(version) => {
                write!(f, "can't map version {} to itself", version)
            }
            Error::VersionExists(version) => {
                write!(f, "version {} already exists (use force to override)", version)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            Error::MalformedArtifact(err) => Some(err),
            Error::InvalidVersion { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::MalformedArtifact(err)
    }
}
