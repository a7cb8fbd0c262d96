use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Search failures are deliberately absent: a grid search that cannot reach
/// its goal resolves to a fallback elbow route instead of an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a router name does not match any registered strategy.
    #[error("unknown router: {name}{}", format_suggestions(.suggestions))]
    UnknownRouter {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a router option is out of range or inconsistent.
    #[error("invalid router option {field}: {message}")]
    InvalidOptions {
        field: &'static str,
        message: String,
    },

    /// Raised when a scene link references a shape that is not defined.
    #[error("unknown shape id: {id}")]
    UnknownShape { id: String },

    /// Raised when a scene does not contain the requested link.
    #[error("unknown link id: {id}")]
    UnknownLink { id: String },

    /// Raised when a scene file could not be read.
    #[error("failed to read scene from {path}: {source}")]
    SceneRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wrapper for scene JSON decoding errors.
    #[error(transparent)]
    SceneParse(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_option(field: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidOptions {
            field,
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_router_lists_single_suggestion() {
        let err = Error::UnknownRouter {
            name: "manhatan".to_string(),
            suggestions: vec!["manhattan".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown router: manhatan. Did you mean 'manhattan'?"
        );
    }

    #[test]
    fn unknown_router_without_suggestions_is_bare() {
        let err = Error::UnknownRouter {
            name: "zzz".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(err.to_string(), "unknown router: zzz");
    }
}
