//! Subsonic provider - implements the provider contract on top of a
//! [`SubsonicApi`]
//!
//! Responsibilities beyond translation:
//! 1. Genre and playlist lists are cached for a short TTL
//! 2. Ratings are written in bounded concurrent batches
//! 3. Playback reporting respects the caller's `submission` decision
//! 4. Stream-offset support is detected from advertised extensions

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;

use super::api::SubsonicApi;
use super::batch::for_each_batched;
use super::cache::TtlCache;
use super::dto::{self, CreatePlaylistTarget, PlaylistMetadata, SearchPaging, StarParameters};
use super::iterator::{AlbumPager, TrackPager, list_type_for};
use super::adapter;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::model::{
    AlbumFilter, AlbumInfo, AlbumWithTracks, Artist, ArtistInfo, ArtistWithAlbums, Favorites,
    Genre, Playlist, PlaylistWithTracks, RatingFavoriteParameters, SearchResult, Track,
};
use crate::provider::{
    AlbumIterator, AlbumSortOrder, ByteStream, MediaProvider, PrefetchCallback, SupportsRating,
    SupportsStreamOffset, TrackIterator,
};

/// Highest rating the protocol accepts; 0 clears the rating
const MAX_RATING: u8 = 5;

/// Media provider backed by a Subsonic-compatible server
pub struct SubsonicProvider<A> {
    api: A,
    batch_size: usize,
    page_size: u32,
    genres: TtlCache<Vec<Genre>>,
    playlists: TtlCache<Vec<Playlist>>,
    prefetch_cover: RwLock<Option<PrefetchCallback>>,
}

impl<A: SubsonicApi> SubsonicProvider<A> {
    /// Create a provider with default settings
    pub fn new(api: A) -> Self {
        Self::with_config(api, &ProviderConfig::default())
    }

    pub fn with_config(api: A, config: &ProviderConfig) -> Self {
        Self {
            api,
            batch_size: config.rating_batch_size,
            page_size: config.page_size,
            genres: TtlCache::new(config.cache_ttl()),
            playlists: TtlCache::new(config.cache_ttl()),
            prefetch_cover: RwLock::new(None),
        }
    }

    /// The underlying API client
    pub fn api(&self) -> &A {
        &self.api
    }

    fn prefetch_cover(&self) -> Option<PrefetchCallback> {
        self.prefetch_cover.read().clone()
    }
}

/// A missing payload on a single-entity fetch is an error, not an absence.
fn required<T>(value: Option<T>, what: &'static str) -> Result<T> {
    value.ok_or(Error::EmptyResponse(what))
}

#[async_trait]
impl<A: SubsonicApi> MediaProvider for SubsonicProvider<A> {
    fn set_prefetch_cover_callback(&self, cb: PrefetchCallback) {
        *self.prefetch_cover.write() = Some(cb);
    }

    async fn get_track(&self, track_id: &str) -> Result<Track> {
        let song = self.api.get_song(track_id).await?;
        required(song.map(adapter::to_track), "track")
    }

    async fn get_album(&self, album_id: &str) -> Result<AlbumWithTracks> {
        let album = self.api.get_album(album_id).await?;
        required(album.map(adapter::to_album_with_tracks), "album")
    }

    async fn get_album_info(&self, album_id: &str) -> Result<AlbumInfo> {
        let info = self.api.get_album_info(album_id).await?;
        required(info.map(adapter::to_album_info), "album info")
    }

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistWithAlbums> {
        let artist = self.api.get_artist(artist_id).await?;
        required(artist.map(adapter::to_artist_with_albums), "artist")
    }

    async fn get_artist_info(&self, artist_id: &str) -> Result<ArtistInfo> {
        let info = self.api.get_artist_info2(artist_id).await?;
        required(info.map(adapter::to_artist_info), "artist info")
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistWithTracks> {
        let playlist = self.api.get_playlist(playlist_id).await?;
        required(playlist.map(adapter::to_playlist_with_tracks), "playlist")
    }

    async fn get_cover_art(&self, cover_art_id: &str, size: u32) -> Result<Bytes> {
        let size = (size > 0).then_some(size);
        self.api.get_cover_art(cover_art_id, size).await
    }

    fn album_sort_orders(&self) -> &'static [AlbumSortOrder] {
        &AlbumSortOrder::ALL
    }

    fn iterate_albums(
        &self,
        sort_order: AlbumSortOrder,
        filter: AlbumFilter,
    ) -> Box<dyn AlbumIterator + '_> {
        Box::new(AlbumPager::list(
            &self.api,
            list_type_for(sort_order),
            filter,
            self.page_size,
            self.prefetch_cover(),
        ))
    }

    fn iterate_tracks(&self, search_query: &str) -> Box<dyn TrackIterator + '_> {
        Box::new(TrackPager::new(&self.api, search_query, self.page_size))
    }

    fn search_albums(
        &self,
        search_query: &str,
        filter: AlbumFilter,
    ) -> Box<dyn AlbumIterator + '_> {
        Box::new(AlbumPager::search(
            &self.api,
            search_query,
            filter,
            self.page_size,
            self.prefetch_cover(),
        ))
    }

    async fn search_all(
        &self,
        search_query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let count = u32::try_from(max_results).unwrap_or(u32::MAX);
        let paging = SearchPaging {
            artist_count: count,
            album_count: count,
            song_count: count,
            ..Default::default()
        };
        let result = self.api.search3(search_query, paging).await?;
        Ok(adapter::to_search_results(result, max_results))
    }

    async fn get_random_tracks(&self, genre: Option<&str>, count: u32) -> Result<Vec<Track>> {
        let genre = genre.filter(|g| !g.is_empty());
        let songs = self.api.get_random_songs(genre, count).await?;
        Ok(songs.into_iter().map(adapter::to_track).collect())
    }

    async fn get_similar_tracks(&self, artist_id: &str, count: u32) -> Result<Vec<Track>> {
        let songs = self.api.get_similar_songs2(artist_id, count).await?;
        Ok(songs.into_iter().map(adapter::to_track).collect())
    }

    async fn get_artists(&self) -> Result<Vec<Artist>> {
        Ok(adapter::to_artists(self.api.get_artists().await?))
    }

    async fn get_genres(&self) -> Result<Vec<Genre>> {
        self.genres
            .get_or_fetch(|| async {
                let genres = self.api.get_genres().await?;
                Ok::<Vec<Genre>, Error>(genres.into_iter().map(adapter::to_genre).collect())
            })
            .await
    }

    async fn get_favorites(&self) -> Result<Favorites> {
        Ok(adapter::to_favorites(self.api.get_starred2().await?))
    }

    fn get_stream_url(&self, track_id: &str, force_raw: bool) -> Result<String> {
        let mut params = Vec::new();
        if force_raw {
            params.push(("format", "raw".to_string()));
        }
        self.api.stream_url(track_id, &params)
    }

    async fn get_top_tracks(&self, artist: &Artist, count: u32) -> Result<Vec<Track>> {
        let count = (count > 0).then_some(count);
        let songs = self.api.get_top_songs(&artist.name, count).await?;
        Ok(songs.into_iter().map(adapter::to_track).collect())
    }

    async fn set_favorite(&self, params: &RatingFavoriteParameters, favorite: bool) -> Result<()> {
        let star = StarParameters {
            album_ids: params.album_ids.clone(),
            artist_ids: params.artist_ids.clone(),
            song_ids: params.track_ids.clone(),
        };
        if favorite {
            self.api.star(&star).await
        } else {
            self.api.unstar(&star).await
        }
    }

    async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        self.playlists
            .get_or_fetch(|| async {
                let playlists = self.api.get_playlists().await?;
                Ok::<Vec<Playlist>, Error>(playlists.into_iter().map(adapter::to_playlist).collect())
            })
            .await
    }

    async fn create_playlist(&self, name: &str, track_ids: &[String]) -> Result<()> {
        let target = CreatePlaylistTarget::New {
            name: name.to_string(),
        };
        self.api.create_playlist(&target, track_ids).await
    }

    fn can_make_public_playlist(&self) -> bool {
        true
    }

    async fn edit_playlist(
        &self,
        id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<()> {
        let metadata = PlaylistMetadata {
            name: name.to_string(),
            comment: description.to_string(),
            public,
        };
        self.api.update_playlist(id, &metadata).await
    }

    async fn add_playlist_tracks(&self, id: &str, track_ids: &[String]) -> Result<()> {
        self.api.update_playlist_tracks(id, track_ids, &[]).await
    }

    async fn remove_playlist_tracks(&self, id: &str, track_indices: &[usize]) -> Result<()> {
        self.api.update_playlist_tracks(id, &[], track_indices).await
    }

    async fn replace_playlist_tracks(&self, id: &str, track_ids: &[String]) -> Result<()> {
        let target = CreatePlaylistTarget::Replace {
            playlist_id: id.to_string(),
        };
        self.api.create_playlist(&target, track_ids).await
    }

    async fn delete_playlist(&self, id: &str) -> Result<()> {
        self.api.delete_playlist(id).await
    }

    fn client_decides_scrobble(&self) -> bool {
        true
    }

    async fn track_began_playback(&self, track_id: &str) -> Result<()> {
        self.api.scrobble(track_id, Utc::now(), false).await
    }

    async fn track_ended_playback(
        &self,
        track_id: &str,
        position_secs: u32,
        submission: bool,
    ) -> Result<()> {
        if !submission {
            tracing::debug!(track_id, position_secs, "Playback ended without submission");
            return Ok(());
        }
        self.api.scrobble(track_id, Utc::now(), true).await
    }

    async fn download_track(&self, track_id: &str) -> Result<ByteStream> {
        self.api.download(track_id).await
    }

    async fn rescan_library(&self) -> Result<()> {
        let status = self.api.start_scan().await?;
        tracing::info!(scanning = status.scanning, "Library rescan requested");
        Ok(())
    }
}

#[async_trait]
impl<A: SubsonicApi> SupportsStreamOffset for SubsonicProvider<A> {
    async fn can_stream_with_offset(&self) -> bool {
        match self.api.get_open_subsonic_extensions().await {
            Ok(extensions) => {
                let names: Vec<_> = extensions.iter().map(|e| e.name.as_str()).collect();
                tracing::info!("Server extensions: {:?}", names);
                names.contains(&dto::TRANSCODE_OFFSET)
            }
            Err(e) => {
                tracing::warn!("Could not query server extensions: {}", e);
                false
            }
        }
    }

    fn get_stream_url_with_offset(&self, track_id: &str, offset_secs: u32) -> Result<String> {
        self.api
            .stream_url(track_id, &[("timeOffset", offset_secs.to_string())])
    }
}

#[async_trait]
impl<A: SubsonicApi> SupportsRating for SubsonicProvider<A> {
    async fn set_rating(&self, params: &RatingFavoriteParameters, rating: u8) -> Result<()> {
        if rating > MAX_RATING {
            return Err(Error::invalid_argument(format!(
                "rating must be between 0 and {MAX_RATING}, got {rating}"
            )));
        }
        for_each_batched(&params.track_ids, self.batch_size, |id| async move {
            self.api.set_rating(&id, rating).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;
    use parking_lot::Mutex;

    use super::*;
    use crate::error::TransportError;
    use crate::subsonic::api::mocks::MockSubsonic;
    use crate::test_utils::{genre, legacy_album, legacy_song, open_subsonic_album, playlist};

    fn provider(mock: MockSubsonic) -> SubsonicProvider<MockSubsonic> {
        SubsonicProvider::new(mock)
    }

    fn track_ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tr-{i}")).collect()
    }

    #[tokio::test]
    async fn test_get_track_translates_song() {
        let mut mock = MockSubsonic::new();
        mock.songs.insert("tr-1".to_string(), legacy_song("tr-1"));
        let provider = provider(mock);

        let track = provider.get_track("tr-1").await.unwrap();

        assert_eq!(track.name, "Under Pressure");
        assert_eq!(track.artist_display(), "Queen");
    }

    #[tokio::test]
    async fn test_missing_payload_is_empty_response() {
        let provider = provider(MockSubsonic::new());

        assert_eq!(
            provider.get_artist_info("ar-queen").await,
            Err(Error::EmptyResponse("artist info"))
        );
        assert_eq!(
            provider.get_track("tr-1").await,
            Err(Error::EmptyResponse("track"))
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_passed_through() {
        let error = TransportError::Api {
            code: 70,
            message: "Album not found".to_string(),
        };
        let provider = provider(MockSubsonic::with_error(error.clone()));

        assert_eq!(
            provider.get_album("al-1").await,
            Err(Error::Transport(error))
        );
    }

    #[tokio::test]
    async fn test_get_album_with_tracks() {
        let mut mock = MockSubsonic::new();
        mock.albums.insert(
            "al-1".to_string(),
            dto::AlbumWithSongsID3 {
                album: open_subsonic_album("al-1"),
                song: vec![legacy_song("tr-1"), legacy_song("tr-2")],
            },
        );
        let provider = provider(mock);

        let album = provider.get_album("al-1").await.unwrap();

        assert_eq!(album.album.genres, vec!["Rock".to_string(), "Glam".to_string()]);
        assert_eq!(album.tracks.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_genres_are_cached_for_sixty_seconds() {
        let mock = MockSubsonic {
            genres: vec![genre("Rock", 10, 120), genre("Jazz", 3, 40)],
            ..Default::default()
        };
        let provider = provider(mock);

        let first = provider.get_genres().await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = provider.get_genres().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.api().call_count("getGenres"), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        provider.get_genres().await.unwrap();
        assert_eq!(provider.api().call_count("getGenres"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_playlists_are_cached() {
        let mock = MockSubsonic {
            playlists: vec![dto::PlaylistWithSongs {
                playlist: playlist("pl-1", "Road Trip"),
                entry: vec![],
            }],
            ..Default::default()
        };
        let provider = provider(mock);

        let playlists = provider.get_playlists().await.unwrap();
        provider.get_playlists().await.unwrap();

        assert_eq!(playlists[0].name, "Road Trip");
        assert_eq!(provider.api().call_count("getPlaylists"), 1);
    }

    #[tokio::test]
    async fn test_failed_genre_fetch_propagates() {
        let provider = provider(MockSubsonic::with_error(TransportError::Network(
            "timeout".to_string(),
        )));

        assert!(provider.get_genres().await.is_err());
        assert!(provider.get_genres().await.is_err());
        assert_eq!(provider.api().call_count("getGenres"), 2);
    }

    #[tokio::test]
    async fn test_ended_playback_without_submission_makes_no_call() {
        let provider = provider(MockSubsonic::new());

        provider.track_ended_playback("tr-1", 30, false).await.unwrap();

        assert!(provider.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_playback_reporting_scrobbles() {
        let provider = provider(MockSubsonic::new());

        provider.track_began_playback("tr-1").await.unwrap();
        provider.track_ended_playback("tr-1", 248, true).await.unwrap();

        assert_eq!(
            provider.api().calls(),
            vec![
                "scrobble tr-1 submission=false".to_string(),
                "scrobble tr-1 submission=true".to_string(),
            ]
        );
        assert!(provider.client_decides_scrobble());
    }

    #[tokio::test]
    async fn test_stream_offset_detected_from_extensions() {
        let mock = MockSubsonic {
            extensions: vec![dto::OpenSubsonicExtension {
                name: dto::TRANSCODE_OFFSET.to_string(),
                versions: vec![1],
            }],
            ..Default::default()
        };
        assert!(provider(mock).can_stream_with_offset().await);

        assert!(!provider(MockSubsonic::new()).can_stream_with_offset().await);
    }

    #[tokio::test]
    async fn test_failed_extension_query_reports_unsupported() {
        let mock = MockSubsonic {
            extensions_error: Some(TransportError::Http {
                status: 404,
                reason: "Not Found".to_string(),
            }),
            ..Default::default()
        };

        assert!(!provider(mock).can_stream_with_offset().await);
    }

    #[test]
    fn test_stream_urls() {
        let provider = provider(MockSubsonic::new());

        let plain = provider.get_stream_url("tr-1", false).unwrap();
        let raw = provider.get_stream_url("tr-1", true).unwrap();
        let offset = provider.get_stream_url_with_offset("tr-1", 90).unwrap();

        assert!(!plain.contains("format="));
        assert!(raw.contains("format=raw"));
        assert!(offset.contains("timeOffset=90"));
    }

    #[tokio::test]
    async fn test_set_rating_batches_and_reports_first_error() {
        let mut mock = MockSubsonic::new();
        mock.failing_rating_ids.insert("tr-2".to_string());
        let provider = provider(mock);

        let result = provider
            .set_rating(&RatingFavoriteParameters::tracks(track_ids(12)), 4)
            .await;

        assert_eq!(
            result,
            Err(Error::Transport(TransportError::Api {
                code: 70,
                message: "Song tr-2 not found".to_string(),
            }))
        );
        assert_eq!(provider.api().call_count("setRating"), 12);
        assert_eq!(provider.api().max_in_flight(), 5);
    }

    #[tokio::test]
    async fn test_rating_above_five_is_rejected() {
        let provider = provider(MockSubsonic::new());

        let result = provider
            .set_rating(&RatingFavoriteParameters::tracks(["tr-1"]), 6)
            .await;

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(provider.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_set_favorite_stars_and_unstars() {
        let provider = provider(MockSubsonic::new());
        let params = RatingFavoriteParameters {
            album_ids: vec!["al-1".to_string()],
            ..RatingFavoriteParameters::tracks(["tr-1"])
        };

        provider.set_favorite(&params, true).await.unwrap();
        provider.set_favorite(&params, false).await.unwrap();

        assert_eq!(provider.api().call_count("star"), 1);
        assert_eq!(provider.api().call_count("unstar"), 1);
    }

    #[tokio::test]
    async fn test_playlist_mutations_map_to_endpoints() {
        let provider = provider(MockSubsonic::new());
        let ids = track_ids(2);

        provider.create_playlist("Road Trip", &ids).await.unwrap();
        provider.replace_playlist_tracks("pl-1", &ids).await.unwrap();
        provider.edit_playlist("pl-1", "Road Trip", "Loud", true).await.unwrap();
        provider.add_playlist_tracks("pl-1", &ids).await.unwrap();
        provider.remove_playlist_tracks("pl-1", &[0]).await.unwrap();
        provider.delete_playlist("pl-1").await.unwrap();

        let calls = provider.api().calls();
        assert!(calls[0].contains("New { name: \"Road Trip\" }"));
        assert!(calls[1].contains("Replace { playlist_id: \"pl-1\" }"));
        assert!(calls[2].contains("comment: \"Loud\""));
        assert!(calls[3].contains("add=[\"tr-0\", \"tr-1\"] remove=[]"));
        assert!(calls[4].contains("add=[] remove=[0]"));
        assert_eq!(calls[5], "deletePlaylist pl-1");
        assert!(provider.can_make_public_playlist());
    }

    #[tokio::test]
    async fn test_optional_request_parameters() {
        let mock = MockSubsonic::new();
        let provider = provider(mock);
        let queen = Artist {
            id: "ar-queen".to_string(),
            name: "Queen".to_string(),
            ..Default::default()
        };

        provider.get_cover_art("al-1", 0).await.unwrap();
        provider.get_cover_art("al-1", 300).await.unwrap();
        provider.get_top_tracks(&queen, 0).await.unwrap();
        provider.get_random_tracks(Some(""), 10).await.unwrap();

        let calls = provider.api().calls();
        assert_eq!(calls[0], "getCoverArt al-1 size=None");
        assert_eq!(calls[1], "getCoverArt al-1 size=Some(300)");
        assert_eq!(calls[2], "getTopSongs Queen count=None");
        assert_eq!(calls[3], "getRandomSongs genre=None size=10");
    }

    #[tokio::test]
    async fn test_iterate_albums_notifies_prefetch() {
        let mock = MockSubsonic {
            album_list: vec![legacy_album("al-1"), legacy_album("al-2")],
            ..Default::default()
        };
        let provider = provider(mock);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        provider.set_prefetch_cover_callback(Arc::new(move |id: &str| {
            sink.lock().push(id.to_string())
        }));

        let mut albums = provider.iterate_albums(AlbumSortOrder::TitleAZ, AlbumFilter::default());
        while albums.next().await.unwrap().is_some() {}

        assert_eq!(*seen.lock(), vec!["al-1", "al-2"]);
        assert!(provider.api().calls()[0].starts_with("getAlbumList2 AlphabeticalByName"));
    }

    #[tokio::test]
    async fn test_search_all_merges_and_truncates() {
        let mock = MockSubsonic {
            search_albums: vec![legacy_album("al-1")],
            search_songs: vec![legacy_song("tr-1"), legacy_song("tr-2")],
            ..Default::default()
        };
        let provider = provider(mock);

        let results = provider.search_all("queen", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "al-1");
        assert_eq!(results[1].id, "tr-1");
    }

    #[tokio::test]
    async fn test_download_streams_bytes() {
        let provider = provider(MockSubsonic::new());

        let chunks: Vec<_> = provider
            .download_track("tr-1")
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.is_ok()));
    }

    #[tokio::test]
    async fn test_rescan_starts_scan() {
        let provider = provider(MockSubsonic::new());

        provider.rescan_library().await.unwrap();

        assert_eq!(provider.api().calls(), vec!["startScan".to_string()]);
    }
}
