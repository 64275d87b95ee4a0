use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use qobuz_api::QobuzClient;
use qobuz_api::types::{Quality, StreamGrant, Track};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "qobuz-dl", version, about = "Qobuz catalog search & download CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with email/password, or store a pre-issued auth token
    Login {
        /// Qobuz account email
        #[arg(required_unless_present_any = ["token", "check"])]
        email: Option<String>,
        /// Qobuz account password
        #[arg(required_unless_present_any = ["token", "check"])]
        password: Option<String>,
        /// Store a pre-issued auth token instead of logging in
        #[arg(long)]
        token: Option<String>,
        /// Show current login status
        #[arg(long)]
        check: bool,
    },
    /// Clear saved credentials
    Logout,
    /// Search the catalog for albums and tracks
    Search {
        /// Search keyword
        query: String,
    },
    /// Show album details and track list
    Album {
        /// Album ID
        album_id: String,
    },
    /// Download a track, by ID or by search query (best match)
    Download {
        /// Track ID or search keyword
        track: String,
        /// Audio quality
        #[arg(short, long, default_value = "hi-res192")]
        quality: QualityArg,
        /// Output file path (defaults to the configured download folder)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download every track of an album, sequentially
    DownloadAlbum {
        /// Album ID
        album_id: String,
        /// Audio quality
        #[arg(short, long, default_value = "hi-res192")]
        quality: QualityArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum QualityArg {
    Mp3,
    Cd,
    HiRes96,
    HiRes192,
}

impl From<QualityArg> for Quality {
    fn from(q: QualityArg) -> Self {
        match q {
            QualityArg::Mp3 => Self::Mp3,
            QualityArg::Cd => Self::Cd,
            QualityArg::HiRes96 => Self::HiRes96,
            QualityArg::HiRes192 => Self::HiRes192,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Login {
            email,
            password,
            token,
            check,
        } => cmd_login(email, password, token, check),
        Command::Logout => cmd_logout(),
        Command::Search { query } => cmd_search(&query),
        Command::Album { album_id } => cmd_album(&album_id),
        Command::Download {
            track,
            quality,
            output,
        } => cmd_download(&track, quality.into(), output),
        Command::DownloadAlbum { album_id, quality } => {
            cmd_download_album(&album_id, quality.into())
        }
    }
}

/// Build a client from the stored config: a saved token skips login, saved
/// email/password log in (and the fresh token is persisted for next time).
fn make_client(config: &mut Config) -> Result<QobuzClient> {
    if let Some(token) = &config.auth_token {
        return Ok(QobuzClient::from_auth_token(token.clone())?);
    }
    let (Some(email), Some(password)) = (config.email.clone(), config.password.clone()) else {
        bail!("not logged in; run `qobuz-dl login <email> <password>` first");
    };
    let client = QobuzClient::from_credentials(&email, &password)?;
    config.auth_token = client.auth_token().map(str::to_owned);
    config.save()?;
    Ok(client)
}

// ── login / logout ──

fn cmd_login(
    email: Option<String>,
    password: Option<String>,
    token: Option<String>,
    check: bool,
) -> Result<()> {
    if check {
        let config = Config::load()?;
        if config.auth_token.is_some() {
            println!("Logged in (auth token stored).");
        } else if config.email.is_some() && config.password.is_some() {
            println!("Credentials stored; a token will be obtained on first use.");
        } else {
            println!("Not logged in.");
        }
        return Ok(());
    }

    let mut config = Config::load()?;

    if let Some(token) = token {
        config.auth_token = Some(token);
        config.save()?;
        println!("Auth token saved.");
        return Ok(());
    }

    let email = email.context("EMAIL required")?;
    let password = password.context("PASSWORD required")?;

    println!("Fetching app credentials and logging in...");
    let client = QobuzClient::from_credentials(&email, &password)?;

    config.email = Some(email);
    config.password = Some(password);
    config.auth_token = client.auth_token().map(str::to_owned);
    config.save()?;

    let name = client
        .user()
        .map_or("unknown", |u| u.display_name.as_str());
    println!("Logged in as {name}.");
    Ok(())
}

fn cmd_logout() -> Result<()> {
    Config::clear()?;
    println!("Credentials cleared.");
    Ok(())
}

// ── search / album ──

fn cmd_search(query: &str) -> Result<()> {
    let mut config = Config::load()?;
    let client = make_client(&mut config)?;
    let results = client.search(query)?;

    println!("Albums ({} total):", results.albums.total);
    for a in &results.albums.items {
        println!(
            "  [{}] {} - {} ({} tracks)",
            a.id, a.artist.name, a.title, a.tracks_count
        );
    }

    println!("\nTracks ({} total):", results.tracks.total);
    for t in &results.tracks.items {
        println!("  [{}] {} - {}", t.id, t.performer.name, t.title);
    }
    Ok(())
}

fn cmd_album(album_id: &str) -> Result<()> {
    let mut config = Config::load()?;
    let client = make_client(&mut config)?;
    let album = client.album(album_id)?;

    println!("Album:  {} (id={})", album.album.title, album.album.id);
    println!("Artist: {}", album.album.artist.name);
    println!("Tracks: {}", album.album.tracks_count);
    if album.album.hires {
        println!(
            "Format: up to {} bit / {:.1} kHz",
            album.album.maximum_bit_depth, album.album.maximum_sampling_rate
        );
    }
    println!();
    for t in &album.tracks.items {
        println!(
            "  {:02}. {} ({}:{:02})",
            t.track_number,
            t.title,
            t.duration / 60,
            t.duration % 60
        );
    }
    Ok(())
}

// ── download ──

fn cmd_download(track: &str, quality: Quality, output: Option<PathBuf>) -> Result<()> {
    let mut config = Config::load()?;
    let client = make_client(&mut config)?;

    let (track_id, named) = if let Ok(id) = track.parse::<u64>() {
        (id, None)
    } else {
        let results = client.search(track)?;
        let Some(best) = results.tracks.items.first() else {
            bail!("no tracks found for {track:?}");
        };
        println!(
            "Best match: {} - {} (id={})",
            best.performer.name, best.title, best.id
        );
        (best.id, Some(best.clone()))
    };

    println!("Resolving stream URL...");
    let grant = client.wait_stream_url(track_id, quality)?;

    let dest = match output {
        Some(path) => path,
        None => {
            let filename = match &named {
                Some(t) => single_track_filename(t, &grant),
                None => format!("{track_id}.{}", grant.extension()),
            };
            config.download_folder.join(filename)
        }
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    download_with_bar(&client, &grant.url, &dest)?;
    println!(
        "Downloaded {} ({} bit / {:.1} kHz)",
        dest.display(),
        grant.bit_depth,
        grant.sampling_rate
    );
    Ok(())
}

fn cmd_download_album(album_id: &str, quality: Quality) -> Result<()> {
    let mut config = Config::load()?;
    let client = make_client(&mut config)?;
    let album = client.album(album_id)?;

    println!(
        "Downloading {} by {} ({} tracks)",
        album.album.title, album.album.artist.name, album.album.tracks_count
    );

    let album_dir = config.download_folder.join(sanitize(&album.album.title));
    fs::create_dir_all(&album_dir)?;

    for track in &album.tracks.items {
        let grant = client.wait_stream_url(track.id, quality)?;
        let dest = album_dir.join(album_track_filename(track, &grant));

        println!("Downloading {}...", track.title);
        download_with_bar(&client, &grant.url, &dest)?;
        println!(
            "Downloaded {} ({} bit / {:.1} kHz)",
            track.title, grant.bit_depth, grant.sampling_rate
        );
    }

    println!("\nDownloaded {}.", album.album.title);
    Ok(())
}

fn download_with_bar(client: &QobuzClient, url: &str, dest: &Path) -> Result<u64> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})").unwrap(),
    );
    let written = client.download(url, dest, |p| {
        if pb.length() != Some(p.total) {
            pb.set_length(p.total);
        }
        pb.set_position(p.transferred);
    })?;
    pb.finish_and_clear();
    Ok(written)
}

/// Strip path separators from names that end up in file paths.
fn sanitize(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

fn single_track_filename(track: &Track, grant: &StreamGrant) -> String {
    format!(
        "{} - {}.{}",
        sanitize(&track.title),
        sanitize(&track.performer.name),
        grant.extension()
    )
}

fn album_track_filename(track: &Track, grant: &StreamGrant) -> String {
    format!(
        "{:02} - {}.{}",
        track.track_number,
        sanitize(&track.title),
        grant.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flac_grant() -> StreamGrant {
        StreamGrant {
            mime_type: "audio/flac".to_owned(),
            ..StreamGrant::default()
        }
    }

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize("AC/DC"), "AC_DC");
        assert_eq!(sanitize(r"back\slash"), "back_slash");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn filenames_use_metadata_and_mime_extension() {
        let track = Track {
            id: 1,
            title: "Get Lucky".to_owned(),
            track_number: 8,
            performer: qobuz_api::types::Person {
                id: 2,
                name: "Daft Punk".to_owned(),
            },
            ..Track::default()
        };
        assert_eq!(
            single_track_filename(&track, &flac_grant()),
            "Get Lucky - Daft Punk.flac"
        );
        assert_eq!(
            album_track_filename(&track, &flac_grant()),
            "08 - Get Lucky.flac"
        );
    }
}
