//! Subsonic API Data Transfer Objects
//!
//! These types match what the Subsonic / OpenSubsonic JSON API returns
//! (`f=json`). DO NOT use these types outside the subsonic module - convert
//! to domain types in `adapter.rs`.
//!
//! API Reference: https://opensubsonic.netlify.app/docs/
//!
//! Fields marked "OpenSubsonic" are extensions that older servers omit; the
//! adapter falls back to the legacy singular fields when they are empty.
//!
//! Example response:
//! ```json
//! {
//!   "subsonic-response": {
//!     "status": "ok",
//!     "version": "1.16.1",
//!     "openSubsonic": true,
//!     "song": { "id": "tr-1", "title": "Song", "artist": "A & B",
//!               "artists": [{"id": "ar-1", "name": "A"}, {"id": "ar-2", "name": "B"}] }
//!   }
//! }
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Outer wrapper of every JSON response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope {
    #[serde(rename = "subsonic-response")]
    pub response: SubsonicResponse,
}

/// Response body. Exactly one payload field is set per endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubsonicResponse {
    /// "ok" or "failed"
    pub status: String,
    pub version: String,
    /// Server implements the OpenSubsonic extensions
    pub open_subsonic: bool,
    /// Set when status == "failed"
    pub error: Option<ApiError>,

    pub song: Option<Child>,
    pub album: Option<AlbumWithSongsID3>,
    pub album_info: Option<AlbumInfo>,
    pub artist: Option<ArtistWithAlbumsID3>,
    pub artist_info2: Option<ArtistInfo2>,
    pub artists: Option<ArtistsID3>,
    pub starred2: Option<Starred2>,
    pub genres: Option<Genres>,
    pub playlist: Option<PlaylistWithSongs>,
    pub playlists: Option<Playlists>,
    pub random_songs: Option<Songs>,
    pub similar_songs2: Option<Songs>,
    pub top_songs: Option<Songs>,
    pub album_list2: Option<AlbumList2>,
    pub search_result3: Option<SearchResult3>,
    pub scan_status: Option<ScanStatus>,
    pub open_subsonic_extensions: Option<Vec<OpenSubsonicExtension>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

/// Artist credit (OpenSubsonic `artists` / `albumArtists`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtistID3Ref {
    pub id: String,
    pub name: String,
}

/// Genre credit (OpenSubsonic `genres`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ItemGenre {
    pub name: String,
}

/// A song or directory entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub parent: String,
    pub is_dir: bool,
    pub title: String,
    pub album: String,
    pub artist: String,
    pub track: u32,
    pub year: i32,
    pub genre: String,
    pub cover_art: String,
    /// File size in bytes
    pub size: u64,
    pub content_type: String,
    pub suffix: String,
    /// Duration in seconds
    pub duration: u32,
    /// Bit rate in kbps
    pub bit_rate: u32,
    pub path: String,
    pub play_count: u64,
    pub disc_number: u32,
    pub album_id: String,
    pub artist_id: String,
    /// 1-5, absent when unrated
    pub user_rating: Option<u8>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub starred: Option<DateTime<Utc>>,
    pub comment: String,
    /// OpenSubsonic
    pub artists: Vec<ArtistID3Ref>,
    /// OpenSubsonic
    pub genres: Vec<ItemGenre>,
}

/// Album in the ID3 (tag-based) browsing model
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlbumID3 {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub artist_id: String,
    pub cover_art: String,
    pub song_count: u32,
    /// Total duration in seconds
    pub duration: u32,
    pub play_count: u64,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub starred: Option<DateTime<Utc>>,
    pub year: i32,
    pub genre: String,
    /// OpenSubsonic
    pub artists: Vec<ArtistID3Ref>,
    /// OpenSubsonic
    pub genres: Vec<ItemGenre>,
    /// OpenSubsonic, free text such as "Album", "EP", "Spoken Word"
    pub release_types: Vec<String>,
    /// OpenSubsonic
    pub is_compilation: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AlbumWithSongsID3 {
    #[serde(flatten)]
    pub album: AlbumID3,
    pub song: Vec<Child>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlbumInfo {
    pub notes: String,
    pub music_brainz_id: String,
    pub last_fm_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtistID3 {
    pub id: String,
    pub name: String,
    pub cover_art: String,
    pub album_count: u32,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub starred: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtistWithAlbumsID3 {
    #[serde(flatten)]
    pub artist: ArtistID3,
    pub album: Vec<AlbumID3>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtistInfo2 {
    pub biography: String,
    pub music_brainz_id: String,
    pub last_fm_url: String,
    pub small_image_url: String,
    pub medium_image_url: String,
    pub large_image_url: String,
    pub similar_artist: Vec<ArtistID3>,
}

/// `getArtists` result, grouped by index letter
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtistsID3 {
    pub ignored_articles: String,
    pub index: Vec<IndexID3>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexID3 {
    pub name: String,
    pub artist: Vec<ArtistID3>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Starred2 {
    pub artist: Vec<ArtistID3>,
    pub album: Vec<AlbumID3>,
    pub song: Vec<Child>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Genres {
    pub genre: Vec<Genre>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Genre {
    /// Genre name (the JSON form of the XML text node)
    pub value: String,
    pub song_count: u32,
    pub album_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub owner: String,
    pub public: bool,
    pub song_count: u32,
    /// Total duration in seconds
    pub duration: u32,
    pub cover_art: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaylistWithSongs {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub entry: Vec<Child>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Playlists {
    pub playlist: Vec<Playlist>,
}

/// Shared shape of `randomSongs`, `similarSongs2` and `topSongs`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Songs {
    pub song: Vec<Child>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AlbumList2 {
    pub album: Vec<AlbumID3>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchResult3 {
    pub artist: Vec<ArtistID3>,
    pub album: Vec<AlbumID3>,
    pub song: Vec<Child>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanStatus {
    pub scanning: bool,
    pub count: u64,
}

/// Named optional protocol feature advertised by the server
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenSubsonicExtension {
    pub name: String,
    pub versions: Vec<u32>,
}

/// Parse a server timestamp. Older servers omit the zone suffix; those are
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|t| t.and_utc())
        })
}

/// Unparseable timestamps become `None` instead of failing the response.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Extension that allows `timeOffset` on `stream`
pub const TRANSCODE_OFFSET: &str = "transcodeOffset";

/// `getAlbumList2` list type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumListType {
    Random,
    Newest,
    Frequent,
    Recent,
    AlphabeticalByName,
    AlphabeticalByArtist,
    Starred,
    /// Inclusive year range; `from > to` sorts descending
    ByYear { from: i32, to: i32 },
}

impl AlbumListType {
    /// Query parameters for this list type.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let kind = match self {
            AlbumListType::Random => "random",
            AlbumListType::Newest => "newest",
            AlbumListType::Frequent => "frequent",
            AlbumListType::Recent => "recent",
            AlbumListType::AlphabeticalByName => "alphabeticalByName",
            AlbumListType::AlphabeticalByArtist => "alphabeticalByArtist",
            AlbumListType::Starred => "starred",
            AlbumListType::ByYear { from, to } => {
                return vec![
                    ("type", "byYear".to_string()),
                    ("fromYear", from.to_string()),
                    ("toYear", to.to_string()),
                ];
            }
        };
        vec![("type", kind.to_string())]
    }
}

/// Paging for `search3`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchPaging {
    pub artist_count: u32,
    pub artist_offset: u32,
    pub album_count: u32,
    pub album_offset: u32,
    pub song_count: u32,
    pub song_offset: u32,
}

impl SearchPaging {
    /// Only albums, one page.
    pub fn albums(count: u32, offset: u32) -> Self {
        Self {
            album_count: count,
            album_offset: offset,
            ..Default::default()
        }
    }

    /// Only songs, one page.
    pub fn songs(count: u32, offset: u32) -> Self {
        Self {
            song_count: count,
            song_offset: offset,
            ..Default::default()
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("artistCount", self.artist_count.to_string()),
            ("artistOffset", self.artist_offset.to_string()),
            ("albumCount", self.album_count.to_string()),
            ("albumOffset", self.album_offset.to_string()),
            ("songCount", self.song_count.to_string()),
            ("songOffset", self.song_offset.to_string()),
        ]
    }
}

/// Targets for `star` / `unstar`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarParameters {
    pub album_ids: Vec<String>,
    pub artist_ids: Vec<String>,
    pub song_ids: Vec<String>,
}

/// Metadata for `updatePlaylist`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistMetadata {
    pub name: String,
    pub comment: String,
    pub public: bool,
}

/// What `createPlaylist` should act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePlaylistTarget {
    /// Create a new playlist with this name
    New { name: String },
    /// Replace the entries of an existing playlist
    Replace { playlist_id: String },
}
