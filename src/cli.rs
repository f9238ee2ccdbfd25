use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "moviedeck",
    version,
    about = "Browse, add and delete movies on a remote movie list"
)]
pub struct Cli {
    /// Remote backend the movie list is read from.
    #[arg(long, value_enum, env = "MOVIEDECK_SOURCE", default_value_t = SourceKind::Films, global = true)]
    pub source: SourceKind,

    /// Endpoint override. Required for the `store` source (database base URL).
    #[arg(long, env = "MOVIEDECK_URL", global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Read-only public film catalog.
    Films,
    /// Personal real-time database with create/delete support.
    Store,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the movie list and print it.
    List {
        #[arg(long)]
        json: bool,
        /// Give up after the first failed attempt instead of retrying.
        #[arg(long)]
        no_retry: bool,
    },
    /// Create a movie on the remote store.
    Add(AddArgs),
    /// Delete a movie by id.
    Delete { id: String },
    Tui,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub opening_text: String,
    #[arg(long, default_value = "")]
    pub release_date: String,
}
