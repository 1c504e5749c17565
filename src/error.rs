use std::fmt;
use std::path::PathBuf;

/// Errors that propagate to `main` and abort rendering. Per the error
/// taxonomy: parse/I-O failures propagate; degenerate geometry, traversal
/// inconsistencies, and numerical edge cases never reach this type — they
/// are absorbed locally as a "miss" or a fallback search strategy.
#[derive(Debug)]
pub enum PhotonError {
    /// A texture, normal map, or `.rtdata` file could not be read or written.
    Io { path: PathBuf, source: std::io::Error },
    /// A malformed `.rtdata` file (bad header, wrong line count, unparseable
    /// float) or scene-preset configuration.
    Parse { path: PathBuf, message: String },
    /// A named material, texture, or normal map was referenced before being
    /// declared — treated as a parse error per the error taxonomy.
    MissingCrossReference { kind: &'static str, name: String },
}

impl fmt::Display for PhotonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotonError::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            PhotonError::Parse { path, message } => {
                write!(f, "parse error in {}: {message}", path.display())
            }
            PhotonError::MissingCrossReference { kind, name } => {
                write!(f, "{kind} '{name}' referenced before declaration")
            }
        }
    }
}

impl std::error::Error for PhotonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PhotonError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PhotonError>;
