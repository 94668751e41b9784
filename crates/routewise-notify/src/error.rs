//! Notification errors

use thiserror::Error;

/// Errors that can occur while sending email
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Email has no usable recipient
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Provider could not be reached
    #[error("email provider unreachable: {0}")]
    Transport(String),

    /// Provider refused the message
    #[error("email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}
