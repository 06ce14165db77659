use thiserror::Error;

pub type EmailResult<T> = Result<T, EmailError>;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    Config(#[from] core_config::ConfigError),

    #[error("Missing credentials for {provider}: {}", fields.join(", "))]
    MissingCredentials {
        provider: crate::EmailProviderKind,
        fields: Vec<&'static str>,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Delivery record not found: {0}")]
    DeliveryNotFound(uuid::Uuid),
}

impl From<mongodb::error::Error> for EmailError {
    fn from(err: mongodb::error::Error) -> Self {
        EmailError::Database(err.to_string())
    }
}

impl From<handlebars::RenderError> for EmailError {
    fn from(err: handlebars::RenderError) -> Self {
        EmailError::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for EmailError {
    fn from(err: handlebars::TemplateError) -> Self {
        EmailError::Template(err.to_string())
    }
}
