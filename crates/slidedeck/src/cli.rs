use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slidedeck")]
#[command(author, version, about)]
#[command(long_about = "Present markdown slide decks from the terminal.\n\n\
    Every terminal presenting the same deck shares its position through a\n\
    store file, so one can present while others follow.\n\n\
    Examples:\n  \
    slidedeck talk.md                  Present, then type `start`\n  \
    slidedeck talk.md --follow         Follow whoever is presenting\n  \
    slidedeck talk.md --slide 4        Open on slide 4\n  \
    slidedeck status --id talk         Show the saved slide")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown file to present
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub present: PresentArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Args, Clone, Debug, Default)]
pub struct PresentArgs {
    /// Deck id (defaults to the front matter id, then the file name)
    #[arg(long)]
    pub id: Option<String>,

    /// Open on this slide, as a shared link would (1-indexed)
    #[arg(long)]
    pub slide: Option<u32>,

    /// Store file shared with other viewers
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Initial view
    #[arg(long)]
    pub view: Option<String>,

    /// Start in follow mode
    #[arg(long)]
    pub follow: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Present a markdown deck in the terminal
    Present {
        /// Markdown file to present
        file: PathBuf,

        #[command(flatten)]
        args: PresentArgs,
    },

    /// Show the saved slide of a deck
    Status {
        /// Deck id
        #[arg(long)]
        id: String,

        /// Store file (defaults to the configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Forget the saved slide of a deck
    Clear {
        /// Deck id
        #[arg(long)]
        id: String,

        /// Store file (defaults to the configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.view, defaults.escape, keys.panel)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Present { file, args }) => present(file, args),
            Some(Commands::Status { id, store }) => crate::commands::store::status(&id, store),
            Some(Commands::Clear { id, store }) => crate::commands::store::clear(&id, store),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("slidedeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    present(file, self.present)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

fn present(file: PathBuf, args: PresentArgs) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    crate::app::run(&file, args)
}
