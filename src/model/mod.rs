//! Provider-agnostic domain model.
//!
//! These types are OUR types - they don't change when a server's wire format
//! changes. Provider adapters build them fresh from every response and
//! nothing mutates them afterwards.
//!
//! Artist credits are stored as [`ArtistRef`] pairs, so the ID list and the
//! name list of a track or album can never drift out of alignment.

pub mod filter;
pub mod release_type;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use filter::AlbumFilter;
pub use release_type::ReleaseTypes;

/// An (artist ID, artist name) credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Server artist ID (may be empty if the server only sent a name)
    pub id: String,
    /// Display name
    pub name: String,
}

impl ArtistRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A single track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub cover_art_id: String,
    /// Containing directory/album on the server
    pub parent_id: String,
    pub name: String,
    pub duration: Duration,
    pub track_number: u32,
    pub disc_number: u32,
    pub genre: String,
    /// One or more artist credits, in server order
    pub artists: Vec<ArtistRef>,
    pub album: String,
    pub album_id: String,
    pub year: i32,
    /// User rating 1-5, `None` when unrated
    pub rating: Option<u8>,
    pub favorite: bool,
    pub play_count: u64,
    pub file_path: String,
    /// File size in bytes
    pub size: u64,
    /// Bit rate in kbps
    pub bit_rate: u32,
    pub comment: String,
}

/// An album.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub cover_art_id: String,
    pub name: String,
    pub duration: Duration,
    /// One or more artist credits, in server order
    pub artists: Vec<ArtistRef>,
    pub year: i32,
    pub track_count: u32,
    /// One or more genre names
    pub genres: Vec<String>,
    pub favorite: bool,
    /// Never empty, see [`ReleaseTypes::classify`]
    pub release_types: ReleaseTypes,
}

/// An album together with its track list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumWithTracks {
    pub album: Album,
    pub tracks: Vec<Track>,
}

/// Extra album information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub notes: String,
    pub last_fm_url: String,
    pub musicbrainz_id: String,
}

/// An artist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub cover_art_id: String,
    pub name: String,
    pub favorite: bool,
    pub album_count: u32,
}

/// An artist together with their albums.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistWithAlbums {
    pub artist: Artist,
    pub albums: Vec<Album>,
}

/// Biography and related artists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub biography: String,
    pub last_fm_url: String,
    pub image_url: String,
    pub similar_artists: Vec<Artist>,
}

/// A playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub cover_art_id: String,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub public: bool,
    pub track_count: u32,
    pub duration: Duration,
}

/// A playlist together with its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistWithTracks {
    pub playlist: Playlist,
    pub tracks: Vec<Track>,
}

/// A genre and how much of the library it covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    pub album_count: u32,
    pub track_count: u32,
}

/// Everything the user has starred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorites {
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub tracks: Vec<Track>,
}

/// Kind of entity a [`SearchResult`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Artist,
    Album,
    Track,
}

/// One hit from a library-wide search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub cover_art_id: String,
    pub name: String,
    pub kind: ContentType,
    /// Artist display name for albums and tracks
    pub artist_name: Option<String>,
    /// Album count for artists, track count for albums, 0 for tracks
    pub size: u32,
}

/// Targets of a favorite or rating change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingFavoriteParameters {
    pub album_ids: Vec<String>,
    pub artist_ids: Vec<String>,
    pub track_ids: Vec<String>,
}

impl RatingFavoriteParameters {
    /// Parameters targeting only tracks.
    pub fn tracks(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            track_ids: ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.album_ids.is_empty() && self.artist_ids.is_empty() && self.track_ids.is_empty()
    }
}

impl Track {
    pub fn artist_ids(&self) -> impl Iterator<Item = &str> {
        self.artists.iter().map(|a| a.id.as_str())
    }

    pub fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.artists.iter().map(|a| a.name.as_str())
    }

    /// Artist names joined for display, e.g. "Queen, David Bowie".
    pub fn artist_display(&self) -> String {
        join_names(&self.artists)
    }
}

impl Album {
    pub fn artist_ids(&self) -> impl Iterator<Item = &str> {
        self.artists.iter().map(|a| a.id.as_str())
    }

    pub fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.artists.iter().map(|a| a.name.as_str())
    }

    pub fn artist_display(&self) -> String {
        join_names(&self.artists)
    }
}

fn join_names(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
