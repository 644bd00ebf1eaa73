//! Port for signing and verifying session tokens.

use crate::domain::{Claims, IssuedToken, TokenError, TokenSubject};

use super::define_port_error;

define_port_error! {
    /// Errors raised while signing a token.
    pub enum TokenIssueError {
        /// The signing backend rejected the claims.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Stateless token codec. Implementations read time from an injected clock.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `subject` that expires after the configured TTL.
    fn issue(&self, subject: &TokenSubject) -> Result<IssuedToken, TokenIssueError>;

    /// Check structure, signature and expiry and return the claims.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}
