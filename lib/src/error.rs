use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct PushDispatcherError {
    pub status_code: u16,
    pub cause: String,
    pub message: Option<String>,
}

impl PushDispatcherError {
    pub fn new(
        cause: &str,
        message: &str,
    ) -> Self {
        Self {
            status_code: 500,
            cause: cause.to_string(),
            message: Some(message.to_string()),
        }
    }

    /// Rejected input, raised before any send is attempted.
    pub fn validation(
        cause: &str,
        message: &str,
    ) -> Self {
        Self {
            status_code: 400,
            cause: cause.to_string(),
            message: Some(message.to_string()),
        }
    }

    pub fn is_validation(&self) -> bool {
        self.status_code == 400
    }
}

impl std::error::Error for PushDispatcherError {}

impl fmt::Display for PushDispatcherError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}
