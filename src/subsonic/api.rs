//! The Subsonic API surface the provider depends on.
//!
//! [`SubsonicProvider`](super::SubsonicProvider) only ever talks to a
//! [`SubsonicApi`], so tests can substitute [`mocks::MockSubsonic`] for the
//! real [`SubsonicClient`](super::SubsonicClient).
//!
//! Methods mirror the REST endpoints one-to-one and return DTOs. Endpoints
//! whose payload a server may leave out return `Option`.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::dto::{self, AlbumListType, CreatePlaylistTarget, PlaylistMetadata, SearchPaging, StarParameters};
use crate::error::Result;
use crate::provider::ByteStream;

/// Subsonic REST endpoints, one method each.
#[async_trait]
pub trait SubsonicApi: Send + Sync {
    /// `ping`: succeeds when the server is up and the credentials work.
    async fn ping(&self) -> Result<()>;

    async fn get_open_subsonic_extensions(&self) -> Result<Vec<dto::OpenSubsonicExtension>>;

    async fn get_song(&self, id: &str) -> Result<Option<dto::Child>>;

    async fn get_album(&self, id: &str) -> Result<Option<dto::AlbumWithSongsID3>>;

    async fn get_album_info(&self, id: &str) -> Result<Option<dto::AlbumInfo>>;

    async fn get_artist(&self, id: &str) -> Result<Option<dto::ArtistWithAlbumsID3>>;

    async fn get_artist_info2(&self, id: &str) -> Result<Option<dto::ArtistInfo2>>;

    async fn get_artists(&self) -> Result<dto::ArtistsID3>;

    async fn get_playlist(&self, id: &str) -> Result<Option<dto::PlaylistWithSongs>>;

    async fn get_playlists(&self) -> Result<Vec<dto::Playlist>>;

    async fn get_genres(&self) -> Result<Vec<dto::Genre>>;

    async fn get_starred2(&self) -> Result<dto::Starred2>;

    async fn get_random_songs(&self, genre: Option<&str>, size: u32) -> Result<Vec<dto::Child>>;

    async fn get_similar_songs2(&self, artist_id: &str, count: u32) -> Result<Vec<dto::Child>>;

    /// `getTopSongs` is keyed by artist *name*. `None` uses the server default count.
    async fn get_top_songs(&self, artist_name: &str, count: Option<u32>) -> Result<Vec<dto::Child>>;

    async fn get_album_list2(
        &self,
        list: AlbumListType,
        size: u32,
        offset: u32,
    ) -> Result<Vec<dto::AlbumID3>>;

    async fn search3(&self, query: &str, paging: SearchPaging) -> Result<dto::SearchResult3>;

    /// `None` asks for the original image size.
    async fn get_cover_art(&self, id: &str, size: Option<u32>) -> Result<Bytes>;

    /// Authenticated `stream` URL with extra query parameters. No request is made.
    fn stream_url(&self, id: &str, params: &[(&'static str, String)]) -> Result<String>;

    async fn download(&self, id: &str) -> Result<ByteStream>;

    async fn star(&self, params: &StarParameters) -> Result<()>;

    async fn unstar(&self, params: &StarParameters) -> Result<()>;

    async fn set_rating(&self, id: &str, rating: u8) -> Result<()>;

    async fn scrobble(&self, id: &str, time: DateTime<Utc>, submission: bool) -> Result<()>;

    async fn create_playlist(&self, target: &CreatePlaylistTarget, song_ids: &[String]) -> Result<()>;

    async fn update_playlist(&self, id: &str, metadata: &PlaylistMetadata) -> Result<()>;

    /// `updatePlaylist` with `songIdToAdd` / `songIndexToRemove`.
    async fn update_playlist_tracks(&self, id: &str, add: &[String], remove: &[usize]) -> Result<()>;

    async fn delete_playlist(&self, id: &str) -> Result<()>;

    async fn start_scan(&self) -> Result<dto::ScanStatus>;
}
