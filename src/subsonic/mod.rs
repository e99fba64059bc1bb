//! Subsonic / OpenSubsonic media provider.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **DTOs** (`dto.rs`) - Exact API response shapes
//! - **Adapter** (`adapter.rs`) - Converts DTOs to domain models
//! - **API trait** (`api.rs`) - The endpoints the provider needs, mockable in tests
//! - **Client** (`client.rs`) - HTTP implementation of the API trait
//! - **Provider** (`provider.rs`) - Caching, batching and the provider contract
//!
//! # Usage
//!
//! ```ignore
//! use music_provider::subsonic;
//!
//! let provider = subsonic::connect(&config.server, &config.provider, "password").await?;
//! for artist in provider.get_artists().await? {
//!     println!("{}", artist.name);
//! }
//! ```

pub mod adapter;
pub mod api;
pub mod batch;
pub mod cache;
pub mod client;
pub mod dto;
pub mod iterator;
pub mod provider;

pub use api::SubsonicApi;
pub use client::SubsonicClient;
pub use provider::SubsonicProvider;

use crate::config::{ProviderConfig, ServerConfig};
use crate::error::Result;

/// Log in to a server and build a provider for it.
///
/// Fails if the server is unreachable or rejects the credentials; check
/// [`Error::is_auth_error`](crate::error::Error::is_auth_error) to tell the
/// two apart.
pub async fn connect(
    server: &ServerConfig,
    settings: &ProviderConfig,
    password: &str,
) -> Result<SubsonicProvider<SubsonicClient>> {
    let client = SubsonicClient::new(server, password)?;
    client.ping().await?;
    tracing::info!(url = %server.url, user = %server.username, "Connected to Subsonic server");
    Ok(SubsonicProvider::with_config(client, settings))
}
