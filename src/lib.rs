//! Music Provider - a normalizing layer over Subsonic-compatible music servers.
//!
//! Server responses are translated into the provider-agnostic entities in
//! [`model`], and the operations a music client needs are exposed through the
//! traits in [`provider`]. [`subsonic`] implements them for Subsonic and
//! OpenSubsonic servers.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod subsonic;
#[cfg(test)]
pub mod test_utils;
