//! Token validation failures mapped to HTTP errors.

use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};

use crate::handler::{Error, ErrorKind};

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => ErrorKind::Unauthorized
                .with_message("Your session has expired")
                .with_context("token expired"),
            JwtErrorKind::ImmatureSignature => ErrorKind::Unauthorized
                .with_context("token is not valid yet"),
            JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_context("token signature could not be verified"),
            JwtErrorKind::InvalidAudience => ErrorKind::Unauthorized
                .with_context("token was issued for a different audience"),
            JwtErrorKind::InvalidIssuer => ErrorKind::Unauthorized
                .with_context("token was issued by an untrusted issuer"),
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                ErrorKind::MalformedAuthToken.with_context("token uses an unsupported algorithm")
            }
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_context(format!("token is missing required claim: {claim}")),
            JwtErrorKind::Json(_) => {
                ErrorKind::MalformedAuthToken.with_context("token claims have an unexpected shape")
            }
            JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) | JwtErrorKind::Utf8(_) => {
                ErrorKind::MalformedAuthToken.with_context("token is not a well-formed JWT")
            }
            _ => ErrorKind::Unauthorized.with_context(error.to_string()),
        };

        error.with_resource("authentication")
    }
}
