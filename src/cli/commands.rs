//! CLI command definitions and handlers.
//!
//! Each subcommand is implemented as a function that takes the parsed arguments
//! and returns an `anyhow::Result<()>`.

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use music_provider::config::{self, Config};
use music_provider::model::{AlbumFilter, RatingFavoriteParameters};
use music_provider::provider::{AlbumSortOrder, MediaProvider, SupportsRating, SupportsStreamOffset};
use music_provider::subsonic::{self, SubsonicClient, SubsonicProvider};

type Provider = SubsonicProvider<SubsonicClient>;

/// Music Provider CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server password (never stored in the config file)
    #[arg(long, global = true, env = "SUBSONIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Override the server URL from the config file
    #[arg(long, global = true, env = "SUBSONIC_URL")]
    pub url: Option<String>,

    /// Override the username from the config file
    #[arg(long, global = true, env = "SUBSONIC_USER")]
    pub username: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Check that the server is reachable and the login works
    Ping,
    /// List all artists
    Artists,
    /// Browse albums
    Albums {
        /// Sort order, e.g. "Recently Added" or "Year (descending)"
        #[arg(short, long, default_value = "Recently Added")]
        sort: AlbumSortOrder,
        /// Maximum number of albums to print
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Earliest release year
        #[arg(long, default_value = "0")]
        min_year: i32,
        /// Latest release year (0 = no limit)
        #[arg(long, default_value = "0")]
        max_year: i32,
        /// Only albums in one of these genres (repeatable)
        #[arg(short, long)]
        genre: Vec<String>,
        /// Only favorited albums
        #[arg(long, conflicts_with = "exclude_favorites")]
        favorites_only: bool,
        /// Skip favorited albums
        #[arg(long)]
        exclude_favorites: bool,
    },
    /// List genres
    Genres,
    /// List playlists
    Playlists,
    /// Show the tracks of a playlist
    Playlist {
        /// Playlist ID
        id: String,
    },
    /// Show starred albums, artists and tracks
    Favorites,
    /// Print random tracks
    Random {
        /// Restrict to one genre
        #[arg(short, long)]
        genre: Option<String>,
        /// Number of tracks
        #[arg(short, long, default_value = "10")]
        count: u32,
    },
    /// Search artists, albums and tracks
    Search {
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Rate tracks (0 clears the rating)
    Rate {
        /// Rating from 0 to 5
        rating: u8,
        /// Track IDs
        #[arg(required = true)]
        track_ids: Vec<String>,
    },
    /// Mark tracks as favorite
    Star {
        #[arg(required = true)]
        track_ids: Vec<String>,
    },
    /// Remove tracks from favorites
    Unstar {
        #[arg(required = true)]
        track_ids: Vec<String>,
    },
    /// Print the streaming URL of a track
    StreamUrl {
        /// Track ID
        id: String,
        /// Ask for the original file instead of a transcode
        #[arg(long)]
        raw: bool,
        /// Start playback this many seconds in
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show which optional features the server supports
    Capabilities,
    /// Ask the server to rescan its library
    Rescan,
    /// Write a config file with the given server settings
    InitConfig {
        /// Server base URL
        #[arg(long)]
        server_url: String,
        /// Username
        #[arg(long)]
        user: String,
        /// Send the password instead of a salted token (LDAP servers)
        #[arg(long)]
        legacy_auth: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::InitConfig {
        server_url,
        user,
        legacy_auth,
    } = &cli.command
    {
        return cmd_init_config(server_url, user, *legacy_auth);
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let provider = connect(cli).await?;

        match &cli.command {
            Commands::Ping => {
                println!("✓ Connected");
                Ok(())
            }
            Commands::Artists => cmd_artists(&provider).await,
            Commands::Albums {
                sort,
                limit,
                min_year,
                max_year,
                genre,
                favorites_only,
                exclude_favorites,
            } => {
                let filter = AlbumFilter {
                    min_year: *min_year,
                    max_year: *max_year,
                    genres: genre.clone(),
                    exclude_favorited: *exclude_favorites,
                    exclude_unfavorited: *favorites_only,
                };
                cmd_albums(&provider, *sort, filter, *limit).await
            }
            Commands::Genres => cmd_genres(&provider).await,
            Commands::Playlists => cmd_playlists(&provider).await,
            Commands::Playlist { id } => cmd_playlist(&provider, id).await,
            Commands::Favorites => cmd_favorites(&provider).await,
            Commands::Random { genre, count } => {
                cmd_random(&provider, genre.as_deref(), *count).await
            }
            Commands::Search { query, limit } => cmd_search(&provider, query, *limit).await,
            Commands::Rate { rating, track_ids } => {
                cmd_rate(&provider, *rating, track_ids).await
            }
            Commands::Star { track_ids } => cmd_star(&provider, track_ids, true).await,
            Commands::Unstar { track_ids } => cmd_star(&provider, track_ids, false).await,
            Commands::StreamUrl { id, raw, offset } => {
                cmd_stream_url(&provider, id, *raw, *offset).await
            }
            Commands::Capabilities => cmd_capabilities(&provider).await,
            Commands::Rescan => {
                provider.rescan_library().await?;
                println!("Library rescan started");
                Ok(())
            }
            Commands::InitConfig { .. } => Ok(()),
        }
    })
}

/// Load the config, apply command-line overrides and log in
async fn connect(cli: &Cli) -> anyhow::Result<Provider> {
    let mut config = config::load();
    if let Some(url) = &cli.url {
        config.server.url = url.clone();
    }
    if let Some(username) = &cli.username {
        config.server.username = username.clone();
    }

    let Some(password) = cli.password.as_deref() else {
        anyhow::bail!("No password given. Use --password or set SUBSONIC_PASSWORD");
    };

    debug!("Connecting to {}", config.server.url);
    match subsonic::connect(&config.server, &config.provider, password).await {
        Ok(provider) => Ok(provider),
        Err(e) if e.is_auth_error() => {
            anyhow::bail!("Login rejected for {}: {}", config.server.username, e)
        }
        Err(e) => Err(anyhow::anyhow!("Could not reach {}: {}", config.server.url, e)),
    }
}

fn cmd_init_config(url: &str, user: &str, legacy_auth: bool) -> anyhow::Result<()> {
    let mut config = Config::default();
    config.server.url = url.to_string();
    config.server.username = user.to_string();
    config.server.legacy_auth = legacy_auth;

    let path = config::save(&config)?;
    println!("Wrote {}", path.display());
    println!("Pass the password with --password or SUBSONIC_PASSWORD");
    Ok(())
}

async fn cmd_artists(provider: &Provider) -> anyhow::Result<()> {
    let artists = provider.get_artists().await?;
    for artist in &artists {
        let star = if artist.favorite { "★" } else { " " };
        println!("{} {} ({} albums)", star, artist.name, artist.album_count);
    }
    println!("\n{} artists", artists.len());
    Ok(())
}

async fn cmd_albums(
    provider: &Provider,
    sort: AlbumSortOrder,
    filter: AlbumFilter,
    limit: usize,
) -> anyhow::Result<()> {
    info!("Listing albums by {}", sort);
    let mut albums = provider.iterate_albums(sort, filter);
    let mut count = 0;
    while count < limit {
        let Some(album) = albums.next().await? else {
            break;
        };
        println!(
            "{:>4}  {} - {}  [{}]",
            album.year,
            album.artist_display(),
            album.name,
            album.release_types.names().join(", ")
        );
        count += 1;
    }
    println!("\n{} albums", count);
    Ok(())
}

async fn cmd_genres(provider: &Provider) -> anyhow::Result<()> {
    let mut genres = provider.get_genres().await?;
    genres.sort_by(|a, b| b.album_count.cmp(&a.album_count));
    for genre in genres {
        println!(
            "{:<30} {:>5} albums {:>6} tracks",
            genre.name, genre.album_count, genre.track_count
        );
    }
    Ok(())
}

async fn cmd_playlists(provider: &Provider) -> anyhow::Result<()> {
    for playlist in provider.get_playlists().await? {
        let visibility = if playlist.public { "public" } else { "private" };
        println!(
            "{}  {} ({} tracks, {}, by {})",
            playlist.id, playlist.name, playlist.track_count, visibility, playlist.owner
        );
    }
    Ok(())
}

async fn cmd_playlist(provider: &Provider, id: &str) -> anyhow::Result<()> {
    let playlist = provider.get_playlist(id).await?;
    println!("{}", playlist.playlist.name);
    if !playlist.playlist.description.is_empty() {
        println!("{}", playlist.playlist.description);
    }
    println!();
    for (i, track) in playlist.tracks.iter().enumerate() {
        println!("{:>3}. {} - {}", i + 1, track.artist_display(), track.name);
    }
    Ok(())
}

async fn cmd_favorites(provider: &Provider) -> anyhow::Result<()> {
    let favorites = provider.get_favorites().await?;

    println!("Artists:");
    for artist in &favorites.artists {
        println!("  {}", artist.name);
    }
    println!("\nAlbums:");
    for album in &favorites.albums {
        println!("  {} - {}", album.artist_display(), album.name);
    }
    println!("\nTracks:");
    for track in &favorites.tracks {
        println!("  {} - {}", track.artist_display(), track.name);
    }
    Ok(())
}

async fn cmd_random(provider: &Provider, genre: Option<&str>, count: u32) -> anyhow::Result<()> {
    for track in provider.get_random_tracks(genre, count).await? {
        println!("{}  {} - {}", track.id, track.artist_display(), track.name);
    }
    Ok(())
}

async fn cmd_search(provider: &Provider, query: &str, limit: usize) -> anyhow::Result<()> {
    let results = provider.search_all(query, limit).await?;
    if results.is_empty() {
        println!("No results for {:?}", query);
        return Ok(());
    }
    for result in results {
        match result.artist_name {
            Some(artist) => println!("{:?}  {}  {} - {}", result.kind, result.id, artist, result.name),
            None => println!("{:?}  {}  {}", result.kind, result.id, result.name),
        }
    }
    Ok(())
}

async fn cmd_rate(provider: &Provider, rating: u8, track_ids: &[String]) -> anyhow::Result<()> {
    let params = RatingFavoriteParameters::tracks(track_ids.iter().cloned());
    provider.set_rating(&params, rating).await?;
    println!("Rated {} tracks", track_ids.len());
    Ok(())
}

async fn cmd_star(provider: &Provider, track_ids: &[String], favorite: bool) -> anyhow::Result<()> {
    let params = RatingFavoriteParameters::tracks(track_ids.iter().cloned());
    provider.set_favorite(&params, favorite).await?;
    let verb = if favorite { "Starred" } else { "Unstarred" };
    println!("{} {} tracks", verb, track_ids.len());
    Ok(())
}

async fn cmd_stream_url(
    provider: &Provider,
    id: &str,
    raw: bool,
    offset: Option<u32>,
) -> anyhow::Result<()> {
    let url = match offset {
        Some(secs) => {
            if !provider.can_stream_with_offset().await {
                anyhow::bail!("Server does not support starting a stream at an offset");
            }
            provider.get_stream_url_with_offset(id, secs)?
        }
        None => provider.get_stream_url(id, raw)?,
    };
    println!("{}", url);
    Ok(())
}

async fn cmd_capabilities(provider: &Provider) -> anyhow::Result<()> {
    let check = |supported: bool| if supported { "✓" } else { "✗" };

    println!("{} Stream with offset", check(provider.can_stream_with_offset().await));
    println!("{} Public playlists", check(provider.can_make_public_playlist()));
    println!("{} Client decides scrobble", check(provider.client_decides_scrobble()));
    println!("\nAlbum sort orders:");
    for order in provider.album_sort_orders() {
        println!("  {}", order);
    }
    Ok(())
}
