use crate::fetch::DEFAULT_BASE_URL;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_SPRITE_HOST: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master";

/// Terminal Pokédex backed by PokeAPI
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Catalog API root; the list is fetched from `<base-url>/pokemon`
    #[arg(long, env = "POKEDEX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Host serving `sprites/pokemon/<id>.png` thumbnails
    #[arg(long, env = "POKEDEX_SPRITE_HOST", default_value = DEFAULT_SPRITE_HOST)]
    pub sprite_host: String,

    /// How many entries to request (server default when unset)
    #[arg(long, env = "POKEMON_LIMIT")]
    pub limit: Option<usize>,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long, env = "POKEDEX_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Do not download thumbnails or artwork
    #[arg(long)]
    pub no_images: bool,

    /// Print the entry list as `name<TAB>url` and exit
    #[arg(long)]
    pub fetch_only: bool,
}
