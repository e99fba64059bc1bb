//! The provider contract consumed by the application.
//!
//! A provider normalizes one kind of music server into the domain model in
//! [`crate::model`]. Optional capabilities live in separate traits
//! ([`SupportsRating`], [`SupportsStreamOffset`]) so the application can ask
//! for them only where they exist.
//!
//! # Example
//!
//! ```ignore
//! use music_provider::provider::MediaProvider;
//!
//! async fn print_genres(provider: &impl MediaProvider) -> music_provider::error::Result<()> {
//!     for genre in provider.get_genres().await? {
//!         println!("{} ({} albums)", genre.name, genre.album_count);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::model::{
    Album, AlbumFilter, AlbumInfo, AlbumWithTracks, Artist, ArtistInfo, ArtistWithAlbums,
    Favorites, Genre, Playlist, PlaylistWithTracks, RatingFavoriteParameters, SearchResult, Track,
};

/// Called with every cover-art ID the provider learns about, so the
/// application can warm its image cache.
pub type PrefetchCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Streamed file contents.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Lazily fetched sequence of albums.
#[async_trait]
pub trait AlbumIterator: Send {
    /// Next matching album, or `None` once the server has no more.
    async fn next(&mut self) -> Result<Option<Album>>;
}

/// Lazily fetched sequence of tracks.
#[async_trait]
pub trait TrackIterator: Send {
    /// Next track, or `None` once the server has no more.
    async fn next(&mut self) -> Result<Option<Track>>;
}

/// Orders in which the whole album library can be browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlbumSortOrder {
    RecentlyAdded,
    RecentlyPlayed,
    FrequentlyPlayed,
    Random,
    TitleAZ,
    ArtistAZ,
    YearAscending,
    YearDescending,
}

impl AlbumSortOrder {
    pub const ALL: [AlbumSortOrder; 8] = [
        AlbumSortOrder::RecentlyAdded,
        AlbumSortOrder::RecentlyPlayed,
        AlbumSortOrder::FrequentlyPlayed,
        AlbumSortOrder::Random,
        AlbumSortOrder::TitleAZ,
        AlbumSortOrder::ArtistAZ,
        AlbumSortOrder::YearAscending,
        AlbumSortOrder::YearDescending,
    ];

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumSortOrder::RecentlyAdded => "Recently Added",
            AlbumSortOrder::RecentlyPlayed => "Recently Played",
            AlbumSortOrder::FrequentlyPlayed => "Frequently Played",
            AlbumSortOrder::Random => "Random",
            AlbumSortOrder::TitleAZ => "Title (A-Z)",
            AlbumSortOrder::ArtistAZ => "Artist (A-Z)",
            AlbumSortOrder::YearAscending => "Year (ascending)",
            AlbumSortOrder::YearDescending => "Year (descending)",
        }
    }
}

impl fmt::Display for AlbumSortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlbumSortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AlbumSortOrder::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sort order: {s}"))
    }
}

/// Core provider operations.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Register the cover-art prefetch hook. Replaces any previous one.
    fn set_prefetch_cover_callback(&self, cb: PrefetchCallback);

    async fn get_track(&self, track_id: &str) -> Result<Track>;

    async fn get_album(&self, album_id: &str) -> Result<AlbumWithTracks>;

    async fn get_album_info(&self, album_id: &str) -> Result<AlbumInfo>;

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistWithAlbums>;

    async fn get_artist_info(&self, artist_id: &str) -> Result<ArtistInfo>;

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistWithTracks>;

    /// Raw cover image bytes. `size` of 0 asks for the original.
    async fn get_cover_art(&self, cover_art_id: &str, size: u32) -> Result<Bytes>;

    fn album_sort_orders(&self) -> &'static [AlbumSortOrder];

    fn iterate_albums(
        &self,
        sort_order: AlbumSortOrder,
        filter: AlbumFilter,
    ) -> Box<dyn AlbumIterator + '_>;

    /// Iterate tracks matching `search_query`; an empty query walks the library.
    fn iterate_tracks(&self, search_query: &str) -> Box<dyn TrackIterator + '_>;

    fn search_albums(&self, search_query: &str, filter: AlbumFilter)
    -> Box<dyn AlbumIterator + '_>;

    async fn search_all(&self, search_query: &str, max_results: usize)
    -> Result<Vec<SearchResult>>;

    /// Random tracks, optionally restricted to one genre.
    async fn get_random_tracks(&self, genre: Option<&str>, count: u32) -> Result<Vec<Track>>;

    async fn get_similar_tracks(&self, artist_id: &str, count: u32) -> Result<Vec<Track>>;

    async fn get_artists(&self) -> Result<Vec<Artist>>;

    async fn get_genres(&self) -> Result<Vec<Genre>>;

    async fn get_favorites(&self) -> Result<Favorites>;

    fn get_stream_url(&self, track_id: &str, force_raw: bool) -> Result<String>;

    /// Most popular tracks of an artist. A `count` of 0 uses the server default.
    async fn get_top_tracks(&self, artist: &Artist, count: u32) -> Result<Vec<Track>>;

    async fn set_favorite(&self, params: &RatingFavoriteParameters, favorite: bool) -> Result<()>;

    async fn get_playlists(&self) -> Result<Vec<Playlist>>;

    async fn create_playlist(&self, name: &str, track_ids: &[String]) -> Result<()>;

    fn can_make_public_playlist(&self) -> bool;

    async fn edit_playlist(&self, id: &str, name: &str, description: &str, public: bool)
    -> Result<()>;

    async fn add_playlist_tracks(&self, id: &str, track_ids: &[String]) -> Result<()>;

    async fn remove_playlist_tracks(&self, id: &str, track_indices: &[usize]) -> Result<()>;

    async fn replace_playlist_tracks(&self, id: &str, track_ids: &[String]) -> Result<()>;

    async fn delete_playlist(&self, id: &str) -> Result<()>;

    /// True if the `submission` argument of [`Self::track_ended_playback`]
    /// is respected. If false, [`Self::track_began_playback`] already
    /// counts as a play.
    fn client_decides_scrobble(&self) -> bool;

    async fn track_began_playback(&self, track_id: &str) -> Result<()>;

    async fn track_ended_playback(
        &self,
        track_id: &str,
        position_secs: u32,
        submission: bool,
    ) -> Result<()>;

    async fn download_track(&self, track_id: &str) -> Result<ByteStream>;

    async fn rescan_library(&self) -> Result<()>;
}

/// Servers that can start a stream part-way into a track.
#[async_trait]
pub trait SupportsStreamOffset: Send + Sync {
    /// Advisory check; any failure is reported as "unsupported".
    async fn can_stream_with_offset(&self) -> bool;

    fn get_stream_url_with_offset(&self, track_id: &str, offset_secs: u32) -> Result<String>;
}

/// Servers that store per-user ratings.
#[async_trait]
pub trait SupportsRating: Send + Sync {
    /// Set `rating` (0 clears) on every track in `params`.
    async fn set_rating(&self, params: &RatingFavoriteParameters, rating: u8) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_round_trips_through_display_name() {
        for order in AlbumSortOrder::ALL {
            let parsed: AlbumSortOrder = order.to_string().parse().unwrap();
            assert_eq!(parsed, order);
        }
    }

    #[test]
    fn test_sort_order_parse_is_case_insensitive() {
        assert_eq!(
            "title (a-z)".parse::<AlbumSortOrder>(),
            Ok(AlbumSortOrder::TitleAZ)
        );
        assert!("popularity".parse::<AlbumSortOrder>().is_err());
    }
}
