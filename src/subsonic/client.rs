//! Subsonic HTTP client
//!
//! Handles communication with a Subsonic / OpenSubsonic server over its
//! REST API. See: https://opensubsonic.netlify.app/docs/
//!
//! Every request carries the authentication parameters. By default that is
//! a salted token (`t = md5(password + salt)`, fresh salt per request);
//! servers that need the cleartext password (LDAP backends) get it
//! hex-encoded in `p` when `legacy_auth` is set.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use rand::Rng;
use rand::distr::Alphanumeric;

use super::api::SubsonicApi;
use super::dto::{self, AlbumListType, CreatePlaylistTarget, PlaylistMetadata, SearchPaging, StarParameters};
use crate::config::ServerConfig;
use crate::error::{Error, Result, TransportError};
use crate::provider::ByteStream;

/// Protocol version we speak
const API_VERSION: &str = "1.16.1";

const USER_AGENT: &str = concat!("music-provider/", env!("CARGO_PKG_VERSION"));

const SALT_LEN: usize = 12;

/// Subsonic API client
pub struct SubsonicClient {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    legacy_auth: bool,
    client_name: String,
}

impl SubsonicClient {
    /// Create a client for `server`, authenticating with `password`.
    ///
    /// No request is made; use [`SubsonicApi::ping`] to check the login.
    pub fn new(server: &ServerConfig, password: impl Into<String>) -> Result<Self> {
        let base_url = server.url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::config("server url is not set"));
        }
        if server.username.is_empty() {
            return Err(Error::config("username is not set"));
        }

        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
            username: server.username.clone(),
            password: password.into(),
            legacy_auth: server.legacy_auth,
            client_name: server.client_name.clone(),
        })
    }

    /// Authentication and format parameters sent with every request
    fn auth_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("u", self.username.clone())];
        if self.legacy_auth {
            params.push(("p", format!("enc:{}", hex_encode(&self.password))));
        } else {
            let salt = random_salt();
            params.push(("t", auth_token(&self.password, &salt)));
            params.push(("s", salt));
        }
        params.push(("v", API_VERSION.to_string()));
        params.push(("c", self.client_name.clone()));
        params.push(("f", "json".to_string()));
        params
    }

    /// Full URL for `endpoint`, including authentication
    fn endpoint_url(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&format!("{}/rest/{}", self.base_url, endpoint))
            .map_err(|e| Error::config(format!("invalid server url {:?}: {}", self.base_url, e)))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in self.auth_params() {
                query.append_pair(key, &value);
            }
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send the request and unwrap the response envelope
    async fn get(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<dto::SubsonicResponse> {
        let response = self.send(endpoint, params).await?;
        let body = response.text().await?;
        decode_envelope(endpoint, &body)
    }

    /// Send a request for binary content (images, audio)
    ///
    /// Servers report failures on these endpoints as a JSON envelope
    /// instead of the data.
    async fn get_binary(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<reqwest::Response> {
        let response = self.send(endpoint, params).await?;
        if !is_json(&response) {
            return Ok(response);
        }
        let body = response.text().await?;
        decode_envelope(endpoint, &body)?;
        Err(TransportError::Parse(format!("{endpoint} returned a document instead of binary data")).into())
    }

    async fn send(&self, endpoint: &str, params: &[(&'static str, String)]) -> Result<reqwest::Response> {
        let url = self.endpoint_url(endpoint, params)?;
        tracing::debug!(endpoint, "Subsonic request");

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
            .into());
        }
        Ok(response)
    }
}

/// Parse a `subsonic-response` body and check its status
fn decode_envelope(endpoint: &str, body: &str) -> Result<dto::SubsonicResponse> {
    let envelope: dto::Envelope = serde_json::from_str(body)
        .map_err(|e| TransportError::Parse(format!("{endpoint}: {e}")))?;
    check_status(envelope.response)
}

/// Turn a `status="failed"` envelope into an error
fn check_status(response: dto::SubsonicResponse) -> Result<dto::SubsonicResponse> {
    if response.status == "ok" {
        return Ok(response);
    }
    let error = response.error.unwrap_or_default();
    tracing::debug!(code = error.code, "Subsonic request failed: {}", error.message);
    Err(TransportError::Api {
        code: error.code,
        message: error.message,
    }
    .into())
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

fn auth_token(password: &str, salt: &str) -> String {
    format!("{:x}", md5::compute(format!("{password}{salt}")))
}

fn random_salt() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

fn hex_encode(value: &str) -> String {
    value.bytes().map(|b| format!("{b:02x}")).collect()
}

fn id_params<'a>(
    key: &'static str,
    ids: &'a [String],
) -> impl Iterator<Item = (&'static str, String)> + 'a {
    ids.iter().map(move |id| (key, id.clone()))
}

fn star_params(params: &StarParameters) -> Vec<(&'static str, String)> {
    id_params("id", &params.song_ids)
        .chain(id_params("albumId", &params.album_ids))
        .chain(id_params("artistId", &params.artist_ids))
        .collect()
}

#[async_trait]
impl SubsonicApi for SubsonicClient {
    async fn ping(&self) -> Result<()> {
        self.get("ping", &[]).await.map(|_| ())
    }

    async fn get_open_subsonic_extensions(&self) -> Result<Vec<dto::OpenSubsonicExtension>> {
        let response = self.get("getOpenSubsonicExtensions", &[]).await?;
        Ok(response.open_subsonic_extensions.unwrap_or_default())
    }

    async fn get_song(&self, id: &str) -> Result<Option<dto::Child>> {
        Ok(self.get("getSong", &[("id", id.to_string())]).await?.song)
    }

    async fn get_album(&self, id: &str) -> Result<Option<dto::AlbumWithSongsID3>> {
        Ok(self.get("getAlbum", &[("id", id.to_string())]).await?.album)
    }

    async fn get_album_info(&self, id: &str) -> Result<Option<dto::AlbumInfo>> {
        Ok(self.get("getAlbumInfo2", &[("id", id.to_string())]).await?.album_info)
    }

    async fn get_artist(&self, id: &str) -> Result<Option<dto::ArtistWithAlbumsID3>> {
        Ok(self.get("getArtist", &[("id", id.to_string())]).await?.artist)
    }

    async fn get_artist_info2(&self, id: &str) -> Result<Option<dto::ArtistInfo2>> {
        Ok(self.get("getArtistInfo2", &[("id", id.to_string())]).await?.artist_info2)
    }

    async fn get_artists(&self) -> Result<dto::ArtistsID3> {
        Ok(self.get("getArtists", &[]).await?.artists.unwrap_or_default())
    }

    async fn get_playlist(&self, id: &str) -> Result<Option<dto::PlaylistWithSongs>> {
        Ok(self.get("getPlaylist", &[("id", id.to_string())]).await?.playlist)
    }

    async fn get_playlists(&self) -> Result<Vec<dto::Playlist>> {
        let response = self.get("getPlaylists", &[]).await?;
        Ok(response.playlists.map(|p| p.playlist).unwrap_or_default())
    }

    async fn get_genres(&self) -> Result<Vec<dto::Genre>> {
        let response = self.get("getGenres", &[]).await?;
        Ok(response.genres.map(|g| g.genre).unwrap_or_default())
    }

    async fn get_starred2(&self) -> Result<dto::Starred2> {
        Ok(self.get("getStarred2", &[]).await?.starred2.unwrap_or_default())
    }

    async fn get_random_songs(&self, genre: Option<&str>, size: u32) -> Result<Vec<dto::Child>> {
        let mut params = vec![("size", size.to_string())];
        if let Some(genre) = genre {
            params.push(("genre", genre.to_string()));
        }
        let response = self.get("getRandomSongs", &params).await?;
        Ok(response.random_songs.map(|s| s.song).unwrap_or_default())
    }

    async fn get_similar_songs2(&self, artist_id: &str, count: u32) -> Result<Vec<dto::Child>> {
        let params = [("id", artist_id.to_string()), ("count", count.to_string())];
        let response = self.get("getSimilarSongs2", &params).await?;
        Ok(response.similar_songs2.map(|s| s.song).unwrap_or_default())
    }

    async fn get_top_songs(&self, artist_name: &str, count: Option<u32>) -> Result<Vec<dto::Child>> {
        let mut params = vec![("artist", artist_name.to_string())];
        if let Some(count) = count {
            params.push(("count", count.to_string()));
        }
        let response = self.get("getTopSongs", &params).await?;
        Ok(response.top_songs.map(|s| s.song).unwrap_or_default())
    }

    async fn get_album_list2(
        &self,
        list: AlbumListType,
        size: u32,
        offset: u32,
    ) -> Result<Vec<dto::AlbumID3>> {
        let mut params = list.params();
        params.push(("size", size.to_string()));
        params.push(("offset", offset.to_string()));
        let response = self.get("getAlbumList2", &params).await?;
        Ok(response.album_list2.map(|l| l.album).unwrap_or_default())
    }

    async fn search3(&self, query: &str, paging: SearchPaging) -> Result<dto::SearchResult3> {
        let mut params = vec![("query", query.to_string())];
        params.extend(paging.params());
        Ok(self.get("search3", &params).await?.search_result3.unwrap_or_default())
    }

    async fn get_cover_art(&self, id: &str, size: Option<u32>) -> Result<Bytes> {
        let mut params = vec![("id", id.to_string())];
        if let Some(size) = size {
            params.push(("size", size.to_string()));
        }
        let response = self.get_binary("getCoverArt", &params).await?;
        Ok(response.bytes().await?)
    }

    fn stream_url(&self, id: &str, params: &[(&'static str, String)]) -> Result<String> {
        let mut all = vec![("id", id.to_string())];
        all.extend_from_slice(params);
        Ok(self.endpoint_url("stream", &all)?.to_string())
    }

    async fn download(&self, id: &str) -> Result<ByteStream> {
        let response = self.get_binary("download", &[("id", id.to_string())]).await?;
        Ok(response.bytes_stream().map(|chunk| chunk.map_err(Error::from)).boxed())
    }

    async fn star(&self, params: &StarParameters) -> Result<()> {
        self.get("star", &star_params(params)).await.map(|_| ())
    }

    async fn unstar(&self, params: &StarParameters) -> Result<()> {
        self.get("unstar", &star_params(params)).await.map(|_| ())
    }

    async fn set_rating(&self, id: &str, rating: u8) -> Result<()> {
        let params = [("id", id.to_string()), ("rating", rating.to_string())];
        self.get("setRating", &params).await.map(|_| ())
    }

    async fn scrobble(&self, id: &str, time: DateTime<Utc>, submission: bool) -> Result<()> {
        let params = [
            ("id", id.to_string()),
            ("time", time.timestamp_millis().to_string()),
            ("submission", submission.to_string()),
        ];
        self.get("scrobble", &params).await.map(|_| ())
    }

    async fn create_playlist(&self, target: &CreatePlaylistTarget, song_ids: &[String]) -> Result<()> {
        let mut params = match target {
            CreatePlaylistTarget::New { name } => vec![("name", name.clone())],
            CreatePlaylistTarget::Replace { playlist_id } => vec![("playlistId", playlist_id.clone())],
        };
        params.extend(id_params("songId", song_ids));
        self.get("createPlaylist", &params).await.map(|_| ())
    }

    async fn update_playlist(&self, id: &str, metadata: &PlaylistMetadata) -> Result<()> {
        let params = [
            ("playlistId", id.to_string()),
            ("name", metadata.name.clone()),
            ("comment", metadata.comment.clone()),
            ("public", metadata.public.to_string()),
        ];
        self.get("updatePlaylist", &params).await.map(|_| ())
    }

    async fn update_playlist_tracks(&self, id: &str, add: &[String], remove: &[usize]) -> Result<()> {
        let mut params = vec![("playlistId", id.to_string())];
        params.extend(id_params("songIdToAdd", add));
        params.extend(remove.iter().map(|i| ("songIndexToRemove", i.to_string())));
        self.get("updatePlaylist", &params).await.map(|_| ())
    }

    async fn delete_playlist(&self, id: &str) -> Result<()> {
        self.get("deletePlaylist", &[("id", id.to_string())]).await.map(|_| ())
    }

    async fn start_scan(&self) -> Result<dto::ScanStatus> {
        Ok(self.get("startScan", &[]).await?.scan_status.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(legacy_auth: bool) -> ServerConfig {
        ServerConfig {
            url: "https://music.example.com/".to_string(),
            username: "alice".to_string(),
            legacy_auth,
            ..Default::default()
        }
    }

    fn query(url: &reqwest::Url, key: &str) -> Vec<String> {
        url.query_pairs()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    #[test]
    fn test_client_requires_url_and_username() {
        let no_url = ServerConfig {
            url: "  ".to_string(),
            ..server(false)
        };
        assert!(matches!(SubsonicClient::new(&no_url, "pw"), Err(Error::Config(_))));

        let no_user = ServerConfig {
            username: String::new(),
            ..server(false)
        };
        assert!(matches!(SubsonicClient::new(&no_user, "pw"), Err(Error::Config(_))));
    }

    #[test]
    fn test_token_matches_protocol_example() {
        assert_eq!(auth_token("sesame", "c19b2d"), "26719a1196d2a940705a59634eb18eab");
    }

    #[test]
    fn test_salt_is_fresh_per_request() {
        let a = random_salt();
        let b = random_salt();
        assert_eq!(a.len(), SALT_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_auth_url() {
        let client = SubsonicClient::new(&server(false), "sesame").unwrap();
        let url = client.endpoint_url("ping", &[]).unwrap();

        assert_eq!(url.path(), "/rest/ping");
        assert_eq!(query(&url, "u"), vec!["alice"]);
        assert_eq!(query(&url, "v"), vec![API_VERSION]);
        assert_eq!(query(&url, "f"), vec!["json"]);
        assert_eq!(query(&url, "c"), vec!["music-provider"]);
        assert!(query(&url, "p").is_empty());

        let salt = &query(&url, "s")[0];
        assert_eq!(query(&url, "t"), vec![auth_token("sesame", salt)]);
    }

    #[test]
    fn test_legacy_auth_sends_hex_password() {
        let client = SubsonicClient::new(&server(true), "sesame").unwrap();
        let url = client.endpoint_url("ping", &[]).unwrap();

        assert_eq!(query(&url, "p"), vec!["enc:736573616d65"]);
        assert!(query(&url, "t").is_empty());
    }

    #[test]
    fn test_stream_url_carries_extra_params() {
        let client = SubsonicClient::new(&server(false), "sesame").unwrap();
        let url = client
            .stream_url("tr-1", &[("format", "raw".to_string())])
            .unwrap();
        let url = reqwest::Url::parse(&url).unwrap();

        assert_eq!(url.path(), "/rest/stream");
        assert_eq!(query(&url, "id"), vec!["tr-1"]);
        assert_eq!(query(&url, "format"), vec!["raw"]);
    }

    #[test]
    fn test_star_params_repeat_ids() {
        let params = star_params(&StarParameters {
            song_ids: vec!["tr-1".to_string(), "tr-2".to_string()],
            album_ids: vec!["al-1".to_string()],
            artist_ids: vec![],
        });

        assert_eq!(
            params,
            vec![
                ("id", "tr-1".to_string()),
                ("id", "tr-2".to_string()),
                ("albumId", "al-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_failed_status_becomes_api_error() {
        let response = dto::SubsonicResponse {
            status: "failed".to_string(),
            error: Some(dto::ApiError {
                code: 40,
                message: "Wrong username or password".to_string(),
            }),
            ..Default::default()
        };

        let err = check_status(response).unwrap_err();
        assert!(err.is_auth_error());
        assert_eq!(err.to_string(), "Server error 40: Wrong username or password");
    }

    #[test]
    fn test_decode_envelope_reads_failed_body() {
        let body = r#"{"subsonic-response":{"status":"failed","version":"1.16.1",
            "error":{"code":70,"message":"Album not found"}}}"#;

        let err = decode_envelope("getAlbum", body).unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Api { code: 70, .. })
        ));
    }

    #[test]
    fn test_decode_envelope_names_endpoint_on_garbage() {
        let err = decode_envelope("getGenres", "<html>502 Bad Gateway</html>").unwrap_err();
        match err {
            Error::Transport(TransportError::Parse(msg)) => assert!(msg.starts_with("getGenres: ")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
