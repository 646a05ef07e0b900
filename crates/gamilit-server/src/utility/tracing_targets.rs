//! Tracing target constants for structured logging.
//!
//! Filter on these with a subscriber directive such as
//! `gamilit_server::authorization=debug`.

/// Bearer token decoding and identity attachment.
pub const AUTHENTICATION: &str = "gamilit_server::authentication";

/// Guard chain evaluation and access decisions.
pub const AUTHORIZATION: &str = "gamilit_server::authorization";

/// Database failures surfaced as HTTP errors.
pub const POSTGRES: &str = "gamilit_server::postgres";

/// Service start-up and configuration.
pub const SERVICE: &str = "gamilit_server::service";
