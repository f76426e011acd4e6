use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use plmcli::{
    cli, config, error,
    types::{ItemId, JobId, Provider, SearchFilter},
    utils,
};

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
    /// List playlists of the source account
    Playlists,

    /// Start playlist imports
    Import(ImportOptions),

    /// List all import jobs
    Jobs,

    /// Show a summary of an import job
    Job(JobOptions),

    /// Show job counters, optionally until the job settles
    Status(StatusOptions),

    /// Review uncertain matches
    Review(ReviewOptions),

    /// Search again for tracks without match
    Retry(RetryArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ImportOptions {
    #[command(subcommand)]
    pub command: ImportSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ImportSubcommand {
    /// Queue one import job per source playlist
    Create(CreateImportOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateImportOpts {
    /// Source playlist ids; comma separated or repeated
    #[clap(long, value_delimiter = ',', num_args = 1.., required = true)]
    pub playlists: Vec<String>,

    /// Target provider: spotify, tidal, ytm or qobuz
    #[clap(long, value_parser = utils::parse_provider)]
    pub target: Provider,
}

#[derive(Parser, Debug, Clone)]
pub struct JobOptions {
    /// Import job id
    pub job: JobId,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusOptions {
    /// Import job id
    pub job: JobId,

    /// Keep polling until the backend is done with the job
    #[clap(long)]
    pub watch: bool,

    /// Seconds between polls (defaults to PLMCLI_POLL_INTERVAL_SECS)
    #[clap(long)]
    pub interval: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Review uncertain matches")]
pub struct ReviewOptions {
    /// Import job id
    pub job: JobId,

    /// Subcommands under `review` (e.g., `decide`)
    #[command(subcommand)]
    pub command: Option<ReviewSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReviewSubcommand {
    /// Record decisions in the local draft
    Decide(DecideOpts),

    /// Send the drafted decisions
    Submit,

    /// Build the target playlist from confirmed matches
    Finalize,
}

#[derive(Parser, Debug, Clone)]
pub struct DecideOpts {
    /// Item ids to confirm; comma separated or repeated
    #[clap(long, value_delimiter = ',', num_args = 1..)]
    pub confirm: Vec<ItemId>,

    /// Item ids to reject; comma separated or repeated
    #[clap(long, value_delimiter = ',', num_args = 1..)]
    pub reject: Vec<ItemId>,
}

#[derive(Parser, Debug, Clone)]
pub struct RetryArgs {
    /// Import job id
    pub job: JobId,

    /// Missed track to search for
    #[clap(long, conflicts_with = "all")]
    pub item: Option<ItemId>,

    /// Search every missed track
    #[clap(long)]
    pub all: bool,

    /// Replace the generated search query
    #[clap(long, requires = "item")]
    pub query: Option<String>,

    /// Search scope: songs, videos or uploads
    #[clap(long, value_parser = utils::parse_search_filter)]
    pub filter: Option<SearchFilter>,

    /// Number of suggestions to request
    #[clap(long)]
    pub top_k: Option<u32>,

    /// Suggestion id to add to the target playlist
    #[clap(long, requires = "item")]
    pub pick: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Playlists => cli::playlists().await,
        Command::Import(opt) => match opt.command {
            ImportSubcommand::Create(c) => cli::create_import(c.playlists, c.target).await,
        },
        Command::Jobs => cli::jobs().await,
        Command::Job(opt) => cli::job(opt.job).await,
        Command::Status(opt) => cli::status(opt.job, opt.watch, opt.interval).await,
        Command::Review(opt) => match opt.command {
            Some(ReviewSubcommand::Decide(d)) => cli::decide(opt.job, d.confirm, d.reject).await,
            Some(ReviewSubcommand::Submit) => cli::submit(opt.job).await,
            Some(ReviewSubcommand::Finalize) => cli::finalize(opt.job).await,
            None => cli::list_review(opt.job).await,
        },
        Command::Retry(opt) => {
            cli::retry(
                opt.job,
                cli::RetryOptions {
                    item: opt.item,
                    all: opt.all,
                    query: opt.query,
                    filter: opt.filter,
                    top_k: opt.top_k,
                    pick: opt.pick,
                },
            )
            .await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
