//! Error taxonomy for the fetch/auth boundary.
//!
//! Chart-level conditions (empty series, zero totals, degenerate domains) are not
//! errors: the builders in [`crate::charts`] answer them with [`crate::charts::Chart::NoData`]
//! and the scales in [`crate::scale`] fall back to midpoints/baselines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The fetch failed or returned no user.
    #[error("profile data unavailable: {0}")]
    DataUnavailable(String),

    /// The sign-in endpoint rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no token found; log in first")]
    MissingToken,

    #[error("token expired; log in again")]
    ExpiredToken,

    #[error("request failed with HTTP {status}")]
    Http { status: u16 },

    /// The GraphQL engine answered with an `errors` array.
    #[error("graphql error: {0}")]
    GraphQl(String),
}
