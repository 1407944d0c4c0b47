//! Release and pull-request providers.
//!
//! Core logic talks to the traits in [`traits`]; [`github`] is the
//! octocrab-backed implementation used by the binary.

/// GitHub API client implementation.
pub mod github;

/// Request and response types shared by provider implementations.
pub mod request;

/// Provider traits consumed by the release fetcher and publish coordinator.
pub mod traits;
