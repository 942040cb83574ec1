use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampusError {
    /// Network failure, non-2xx status or a body that is not a JSON envelope.
    #[error("Transport error{}: {detail}", status_suffix(.status))]
    Transport { status: Option<u16>, detail: String },

    /// The server answered `success: false`. The message is shown verbatim.
    #[error("{0}")]
    Application(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// An action was refused before anything was mutated.
    #[error("{0}")]
    Refused(String),

    /// A newer request of the same purpose started before this one finished.
    #[error("Request superseded: {0}")]
    Superseded(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl CampusError {
    pub fn transport(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Transport {
            status,
            detail: detail.into(),
        }
    }

    /// Text suitable for a notification. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => {
                "Could not reach the server. Please try again.".to_string()
            }
            Self::Application(msg) | Self::Refused(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for CampusError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        Self::Transport {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for CampusError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = invalid_fields(&errors);
        Self::Validation(format!("missing or invalid fields: {}", fields.join(", ")))
    }
}

/// Field names with errors, sorted. Struct-level checks report under
/// `__all__` with the offending field as their code.
pub(crate) fn invalid_fields(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        if field == "__all__" {
            fields.extend(field_errors.iter().map(|e| e.code.to_string()));
        } else {
            fields.push(field.to_string());
        }
    }
    fields.sort();
    fields.dedup();
    fields
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, CampusError>;
