//! Test utilities and fixtures for music-provider tests.
//!
//! Factories for Subsonic DTOs in both their legacy (single artist/genre)
//! and OpenSubsonic (multi-valued) shapes.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::legacy_song;
//!
//! let child = dto::Child {
//!     title: "Custom Title".to_string(),
//!     ..legacy_song("tr-1")
//! };
//! ```

use crate::subsonic::dto;

/// A song carrying only the legacy `artist`/`artistId` fields.
pub fn legacy_song(id: &str) -> dto::Child {
    dto::Child {
        id: id.to_string(),
        parent: "dir-1".to_string(),
        title: "Under Pressure".to_string(),
        album: "Hot Space".to_string(),
        album_id: "al-1".to_string(),
        artist: "Queen".to_string(),
        artist_id: "ar-queen".to_string(),
        track: 2,
        disc_number: 1,
        year: 1982,
        genre: "Rock".to_string(),
        cover_art: "al-1".to_string(),
        duration: 248,
        bit_rate: 1411,
        size: 43_000_000,
        path: "Queen/Hot Space/02 Under Pressure.flac".to_string(),
        user_rating: Some(4),
        play_count: 12,
        ..Default::default()
    }
}

/// A song with both legacy fields and the OpenSubsonic `artists` list.
pub fn open_subsonic_song(id: &str) -> dto::Child {
    dto::Child {
        artist: "Queen & David Bowie".to_string(),
        artist_id: "ar-legacy".to_string(),
        artists: vec![artist_ref("ar-queen", "Queen"), artist_ref("ar-bowie", "David Bowie")],
        ..legacy_song(id)
    }
}

/// An album carrying only legacy fields.
pub fn legacy_album(id: &str) -> dto::AlbumID3 {
    dto::AlbumID3 {
        id: id.to_string(),
        name: "Hot Space".to_string(),
        artist: "Queen".to_string(),
        artist_id: "ar-queen".to_string(),
        cover_art: id.to_string(),
        song_count: 11,
        duration: 2600,
        year: 1982,
        genre: "Rock".to_string(),
        ..Default::default()
    }
}

/// A starred album with OpenSubsonic artist and genre lists.
pub fn open_subsonic_album(id: &str) -> dto::AlbumID3 {
    dto::AlbumID3 {
        artist: "Various".to_string(),
        artist_id: "ar-legacy".to_string(),
        genre: "Legacy Genre".to_string(),
        artists: vec![artist_ref("ar-queen", "Queen"), artist_ref("ar-bowie", "David Bowie")],
        genres: vec![
            dto::ItemGenre { name: "Rock".to_string() },
            dto::ItemGenre { name: "Glam".to_string() },
        ],
        starred: dto::parse_timestamp("2024-03-01T10:00:00Z"),
        release_types: vec!["Album".to_string()],
        ..legacy_album(id)
    }
}

/// An album with the given year, genre and starred state.
pub fn album_with(id: &str, year: i32, genre: &str, starred: bool) -> dto::AlbumID3 {
    dto::AlbumID3 {
        year,
        genre: genre.to_string(),
        starred: if starred {
            dto::parse_timestamp("2024-03-01T10:00:00Z")
        } else {
            None
        },
        ..legacy_album(id)
    }
}

pub fn genre(name: &str, albums: u32, songs: u32) -> dto::Genre {
    dto::Genre {
        value: name.to_string(),
        album_count: albums,
        song_count: songs,
    }
}

pub fn playlist(id: &str, name: &str) -> dto::Playlist {
    dto::Playlist {
        id: id.to_string(),
        name: name.to_string(),
        owner: "alice".to_string(),
        song_count: 3,
        duration: 600,
        ..Default::default()
    }
}

fn artist_ref(id: &str, name: &str) -> dto::ArtistID3Ref {
    dto::ArtistID3Ref {
        id: id.to_string(),
        name: name.to_string(),
    }
}
