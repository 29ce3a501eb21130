use log::error;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },

    #[error("Missing config with key \"{key}\"")]
    MissingConfig { key: String },

    #[error("Invalid config value for \"{key}\": {reason}")]
    InvalidConfig { key: String, reason: String },
}

impl AppError {
    /// Logs an unexpected error and returns a short reference ID that can be
    /// shown to the user and correlated with the log entry.
    pub fn log_with_ref(err: &(dyn std::error::Error + 'static)) -> String {
        let ref_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        error!("[ref {ref_id}] {err:?}");
        ref_id
    }
}
