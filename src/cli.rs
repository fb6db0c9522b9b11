use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "setlist")]
#[command(about = "Terminal playlist manager and player")]
#[command(version)]
pub struct Cli {
    /// Playlist .toml file, directory of playlist files, or a folder of audio files
    #[arg(default_value = ".", env = "SETLIST_PATH")]
    pub path: PathBuf,

    /// Playlist to open first (defaults to the first one by name)
    #[arg(short, long)]
    pub playlist: Option<String>,
}
