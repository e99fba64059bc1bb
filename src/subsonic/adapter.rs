//! Adapter layer: Convert Subsonic DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! Every function here is pure; an absent record is expressed as `None` by
//! the caller and stays `None` (`Option::map`).
//!
//! Multi-valued OpenSubsonic fields win over the legacy singular ones:
//! a non-empty `artists` list replaces `artist`/`artistId` entirely, and a
//! non-empty `genres` list replaces `genre`.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::dto;
use crate::model::{
    Album, AlbumInfo, AlbumWithTracks, Artist, ArtistInfo, ArtistRef, ArtistWithAlbums,
    ContentType, Favorites, Genre, Playlist, PlaylistWithTracks, ReleaseTypes, SearchResult,
    Track,
};

/// Convert a song entry to a Track
pub fn to_track(child: dto::Child) -> Track {
    let artists = artist_refs(&child.artists, &child.artist_id, &child.artist);
    Track {
        favorite: is_starred(child.starred),
        rating: child.user_rating.filter(|r| *r > 0),
        duration: Duration::from_secs(child.duration.into()),
        artists,
        id: child.id,
        cover_art_id: child.cover_art,
        parent_id: child.parent,
        name: child.title,
        track_number: child.track,
        disc_number: child.disc_number,
        genre: child.genre,
        album: child.album,
        album_id: child.album_id,
        year: child.year,
        play_count: child.play_count,
        file_path: child.path,
        size: child.size,
        bit_rate: child.bit_rate,
        comment: child.comment,
    }
}

/// Convert an ID3 album to an Album
pub fn to_album(album: dto::AlbumID3) -> Album {
    let artists = artist_refs(&album.artists, &album.artist_id, &album.artist);
    let genres = genre_names(&album.genres, &album.genre);
    Album {
        favorite: is_starred(album.starred),
        release_types: ReleaseTypes::classify(&album.release_types, album.is_compilation),
        duration: Duration::from_secs(album.duration.into()),
        artists,
        genres,
        id: album.id,
        cover_art_id: album.cover_art,
        name: album.name,
        year: album.year,
        track_count: album.song_count,
    }
}

pub fn to_album_with_tracks(album: dto::AlbumWithSongsID3) -> AlbumWithTracks {
    AlbumWithTracks {
        album: to_album(album.album),
        tracks: album.song.into_iter().map(to_track).collect(),
    }
}

pub fn to_album_info(info: dto::AlbumInfo) -> AlbumInfo {
    AlbumInfo {
        notes: info.notes,
        last_fm_url: info.last_fm_url,
        musicbrainz_id: info.music_brainz_id,
    }
}

pub fn to_artist(artist: dto::ArtistID3) -> Artist {
    Artist {
        favorite: is_starred(artist.starred),
        id: artist.id,
        cover_art_id: artist.cover_art,
        name: artist.name,
        album_count: artist.album_count,
    }
}

/// Convert an artist and its nested albums
pub fn to_artist_with_albums(artist: dto::ArtistWithAlbumsID3) -> ArtistWithAlbums {
    ArtistWithAlbums {
        artist: to_artist(artist.artist),
        albums: artist.album.into_iter().map(to_album).collect(),
    }
}

pub fn to_artist_info(info: dto::ArtistInfo2) -> ArtistInfo {
    ArtistInfo {
        biography: info.biography,
        last_fm_url: info.last_fm_url,
        image_url: info.large_image_url,
        similar_artists: info.similar_artist.into_iter().map(to_artist).collect(),
    }
}

/// Flatten the letter-indexed artist list
pub fn to_artists(index: dto::ArtistsID3) -> Vec<Artist> {
    index
        .index
        .into_iter()
        .flat_map(|idx| idx.artist)
        .map(to_artist)
        .collect()
}

pub fn to_playlist(playlist: dto::Playlist) -> Playlist {
    Playlist {
        duration: Duration::from_secs(playlist.duration.into()),
        id: playlist.id,
        cover_art_id: playlist.cover_art,
        name: playlist.name,
        description: playlist.comment,
        owner: playlist.owner,
        public: playlist.public,
        track_count: playlist.song_count,
    }
}

pub fn to_playlist_with_tracks(playlist: dto::PlaylistWithSongs) -> PlaylistWithTracks {
    PlaylistWithTracks {
        playlist: to_playlist(playlist.playlist),
        tracks: playlist.entry.into_iter().map(to_track).collect(),
    }
}

pub fn to_genre(genre: dto::Genre) -> Genre {
    Genre {
        name: genre.value,
        album_count: genre.album_count,
        track_count: genre.song_count,
    }
}

pub fn to_favorites(starred: dto::Starred2) -> Favorites {
    Favorites {
        albums: starred.album.into_iter().map(to_album).collect(),
        artists: starred.artist.into_iter().map(to_artist).collect(),
        tracks: starred.song.into_iter().map(to_track).collect(),
    }
}

/// Merge a `search3` result into a flat list: artists, then albums, then tracks
pub fn to_search_results(result: dto::SearchResult3, max_results: usize) -> Vec<SearchResult> {
    let artists = result.artist.into_iter().map(|a| SearchResult {
        size: a.album_count,
        id: a.id,
        cover_art_id: a.cover_art,
        name: a.name,
        kind: ContentType::Artist,
        artist_name: None,
    });
    let albums = result.album.into_iter().map(to_album).map(|a| SearchResult {
        artist_name: Some(a.artist_display()),
        size: a.track_count,
        id: a.id,
        cover_art_id: a.cover_art_id,
        name: a.name,
        kind: ContentType::Album,
    });
    let tracks = result.song.into_iter().map(to_track).map(|t| SearchResult {
        artist_name: Some(t.artist_display()),
        id: t.id,
        cover_art_id: t.cover_art_id,
        name: t.name,
        kind: ContentType::Track,
        size: 0,
    });

    artists.chain(albums).chain(tracks).take(max_results).collect()
}

/// Resolve artist credits: the OpenSubsonic list if present, otherwise a
/// single credit from the legacy fields.
fn artist_refs(extended: &[dto::ArtistID3Ref], legacy_id: &str, legacy_name: &str) -> Vec<ArtistRef> {
    if extended.is_empty() {
        return vec![ArtistRef::new(legacy_id, legacy_name)];
    }
    extended
        .iter()
        .map(|a| ArtistRef::new(a.id.as_str(), a.name.as_str()))
        .collect()
}

/// Same precedence rule for genres.
fn genre_names(extended: &[dto::ItemGenre], legacy: &str) -> Vec<String> {
    if extended.is_empty() {
        return vec![legacy.to_string()];
    }
    extended.iter().map(|g| g.name.clone()).collect()
}

/// Anything other than "unset" or the Unix epoch means favorited.
fn is_starred(starred: Option<DateTime<Utc>>) -> bool {
    starred.is_some_and(|t| t != DateTime::<Utc>::UNIX_EPOCH)
}
