use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use campspot::{cli, config, error, utils::ArtistSort};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth(AuthOptions),

    /// Artists behind your saved tracks
    Artists(ArtistsOptions),

    /// Handle the local artist cache
    Cache(CacheOptions),

    /// Session and cache information
    Info,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Complete a pending authorization with the code or the full redirect URL
    #[clap(long, value_name = "CODE_OR_URL")]
    pub code: Option<String>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    about = "Artists behind your saved tracks",
    args_conflicts_with_subcommands = true // disallow mixing list flags with subcommands
)]
pub struct ArtistsOptions {
    /// Filter artists by name
    #[clap(long)]
    pub search: Option<String>,

    /// Sort order of the table
    #[clap(long, value_enum, default_value_t = ArtistSort::Count)]
    pub sort: ArtistSort,

    /// Show at most this many artists
    #[clap(long)]
    pub limit: Option<usize>,

    /// Subcommands under `artists` (e.g., `update`)
    #[command(subcommand)]
    pub command: Option<ArtistsSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ArtistsSubcommand {
    /// Refetch saved tracks, artists and genres
    Update(ArtistsUpdateOpts),

    /// Search an artist on Bandcamp
    Open(ArtistsOpenOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct ArtistsUpdateOpts {
    /// Only look up genres for cached artists that have none yet
    #[clap(long)]
    pub genres_only: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ArtistsOpenOpts {
    /// Artist name
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CacheOptions {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheSubcommand {
    /// Forget cached artists, keep the authorization
    Clear,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => cli::auth(opt.code).await,
        Command::Artists(opt) => match opt.command {
            Some(ArtistsSubcommand::Update(u)) => cli::update_artists(u.genres_only).await,
            Some(ArtistsSubcommand::Open(o)) => cli::open_artist(o.name).await,
            None => cli::list_artists(opt.search, opt.sort, opt.limit).await,
        },
        Command::Cache(opt) => match opt.command {
            CacheSubcommand::Clear => cli::clear_cache().await,
        },
        Command::Info => cli::info().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
