use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;

use cli_style::{
    get_styles, print_empty_list, print_error, print_key_value, print_section_header,
    print_success, TableBuilder,
};
use songs_catalog_server::client::{HttpSongsApi, SongsState, SongsStore};
use songs_catalog_server::song_store::{ListParams, NewSong, Song, SongId, SongPatch};

fn parse_song_id(s: &str) -> Result<SongId> {
    s.parse().map_err(|_| anyhow!("Invalid ID: {}", s))
}

#[derive(Parser)]
#[command(styles = get_styles(), version, about = "Command line client for the songs API")]
struct CliArgs {
    /// Base URL of the songs server.
    #[clap(long, env = "SONGS_SERVER", default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct SongFields {
    #[clap(long)]
    title: Option<String>,
    #[clap(long)]
    artist: Option<String>,
    #[clap(long)]
    album: Option<String>,
    #[clap(long)]
    genre: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Lists songs, newest first unless --sort is given.
    List {
        #[command(flatten)]
        filters: SongFields,
        /// Matches any of title, artist, album or genre.
        #[clap(short, long)]
        q: Option<String>,
        #[clap(long)]
        page: Option<u32>,
        #[clap(long)]
        limit: Option<u32>,
        /// e.g. "-createdAt" or "artist,title".
        #[clap(long, allow_hyphen_values = true)]
        sort: Option<String>,
    },

    /// Creates a song.
    Add {
        #[clap(long)]
        title: String,
        #[clap(long)]
        artist: String,
        #[clap(long)]
        album: String,
        #[clap(long)]
        genre: String,
    },

    /// Changes some fields of a song.
    Update {
        #[clap(value_parser = parse_song_id)]
        id: SongId,
        #[command(flatten)]
        fields: SongFields,
    },

    /// Deletes a song.
    Delete {
        #[clap(value_parser = parse_song_id)]
        id: SongId,
    },

    /// Shows catalog totals.
    Stats,
}

fn print_songs(songs: &[Song]) {
    if songs.is_empty() {
        print_empty_list("No songs");
        return;
    }
    let mut table = TableBuilder::new(&["ID", "Title", "Artist", "Album", "Genre"]);
    for song in songs {
        let id = song.id.to_string();
        table.add_row(&[
            id.as_str(),
            song.title.as_str(),
            song.artist.as_str(),
            song.album.as_str(),
            song.genre.as_str(),
        ]);
    }
    table.print();
}

fn print_stats(state: &SongsState) {
    if let Some(stats) = &state.stats {
        print_section_header("Catalog");
        print_key_value("Songs", &stats.total_songs.to_string());
        print_key_value("Artists", &stats.total_artists.to_string());
        print_key_value("Albums", &stats.total_albums.to_string());
        print_key_value("Genres", &stats.total_genres.to_string());
    }
}

fn patch_from(fields: SongFields) -> SongPatch {
    SongPatch {
        title: fields.title,
        artist: fields.artist,
        album: fields.album,
        genre: fields.genre,
    }
}

async fn run(store: &SongsStore, command: Command) -> Option<String> {
    match command {
        Command::List {
            filters,
            q,
            page,
            limit,
            sort,
        } => {
            let params = ListParams {
                page: page.map(|p| p.to_string()),
                limit: limit.map(|l| l.to_string()),
                sort,
                title: filters.title,
                artist: filters.artist,
                album: filters.album,
                genre: filters.genre,
                q,
            };
            store.fetch_songs(&params).await;
            let state = store.snapshot();
            if state.error.is_none() {
                print_songs(&state.items);
            }
        }
        Command::Add {
            title,
            artist,
            album,
            genre,
        } => {
            let song = NewSong {
                title,
                artist,
                album,
                genre,
            };
            if let Some(created) = store.create_song(&song).await {
                print_success(&format!("Created {}", created.id));
                print_songs(&[created]);
                print_stats(&store.snapshot());
            }
        }
        Command::Update { id, fields } => {
            if let Some(updated) = store.update_song(&id, &patch_from(fields)).await {
                print_success(&format!("Updated {}", updated.id));
                print_songs(&[updated]);
            }
        }
        Command::Delete { id } => {
            if store.delete_song(&id).await {
                print_success(&format!("Deleted {}", id));
                print_stats(&store.snapshot());
            }
        }
        Command::Stats => {
            store.fetch_stats().await;
            print_stats(&store.snapshot());
        }
    }
    store.snapshot().error
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::ERROR.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let store = SongsStore::new(Arc::new(HttpSongsApi::new(cli_args.server)));
    match run(&store, cli_args.command).await {
        None => Ok(ExitCode::SUCCESS),
        Some(message) => {
            print_error(&message);
            Ok(ExitCode::FAILURE)
        }
    }
}
