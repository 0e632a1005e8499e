use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jot_core::{Category, Priority, SortKey, StatusFilter};
use jot_model::Provider;
use tracing_subscriber::EnvFilter;

mod auth;
mod commands;
mod config;
mod render;
mod state;
mod store;

use commands::{EditArgs, ListArgs};

#[derive(Parser, Debug)]
#[command(name = "jot", version, about = "Capture tasks from plain text")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse text into a task and print it without saving
    Parse {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Use the rule-based parser only
        #[arg(long)]
        offline: bool,

        #[arg(long)]
        json: bool,
    },

    /// Parse text and save the task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Use the rule-based parser only
        #[arg(long)]
        offline: bool,
    },

    /// List saved tasks
    List {
        /// pending, done or all
        #[arg(long, default_value = "pending")]
        status: StatusFilter,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        category: Option<Category>,

        /// Only tasks carrying this tag (with or without #)
        #[arg(long)]
        tag: Option<String>,

        /// Only pending tasks past their due date
        #[arg(long)]
        overdue: bool,

        /// Only tasks due before this date, in plain words
        #[arg(long)]
        due_before: Option<String>,

        /// due, priority, created or title
        #[arg(long, default_value = "due")]
        sort: SortKey,

        #[arg(long)]
        reverse: bool,

        #[arg(long)]
        json: bool,
    },

    /// Show one task
    Show { id: u64 },

    /// Mark a task done
    Done { id: u64 },

    /// Mark a done task pending again
    Reopen { id: u64 },

    /// Delete a task
    Rm { id: u64 },

    /// Change fields of a saved task
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        category: Option<Category>,

        /// New due date in plain words, e.g. "friday 3pm" or "25th June"
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        #[arg(long)]
        clear_due: bool,

        /// Replace all tags, comma-separated
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Manage ~/.jot/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage API keys in ~/.jot/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an API key (prompts on stdin when --key is omitted)
    SetKey {
        /// openai or anthropic
        #[arg(long)]
        provider: Provider,

        #[arg(long)]
        key: Option<String>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("load config")?;
    init_logging(&cfg.log.level);

    match cli.command {
        Command::Parse {
            text,
            offline,
            json,
        } => commands::parse(&cfg, &text, offline, json)?,

        Command::Add { text, offline } => commands::add(&cfg, &text, offline)?,

        Command::List {
            status,
            priority,
            category,
            tag,
            overdue,
            due_before,
            sort,
            reverse,
            json,
        } => commands::list(
            &cfg,
            ListArgs {
                status,
                priority,
                category,
                tag,
                overdue,
                due_before,
                sort,
                reverse,
                json,
            },
        )?,

        Command::Show { id } => commands::show(&cfg, id)?,
        Command::Done { id } => commands::done(id)?,
        Command::Reopen { id } => commands::reopen(id)?,
        Command::Rm { id } => commands::remove(id)?,

        Command::Edit {
            id,
            title,
            description,
            clear_description,
            priority,
            category,
            due,
            clear_due,
            tags,
        } => commands::edit(
            &cfg,
            id,
            EditArgs {
                title,
                description,
                clear_description,
                priority,
                category,
                due,
                clear_due,
                tags,
            },
        )?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::SetKey { provider, key } => auth::set_key(provider, key)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_parse_into_enums() {
        let cli = Cli::try_parse_from([
            "jot",
            "list",
            "--status",
            "all",
            "--priority",
            "URGENT",
            "--sort",
            "priority",
            "--reverse",
        ])
        .unwrap();
        match cli.command {
            Command::List {
                status,
                priority,
                sort,
                reverse,
                ..
            } => {
                assert_eq!(status, StatusFilter::All);
                assert_eq!(priority, Some(Priority::Urgent));
                assert_eq!(sort, SortKey::Priority);
                assert!(reverse);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_rejects_conflicting_flags() {
        let conflicting = ["jot", "edit", "1", "--due", "friday", "--clear-due"];
        assert!(Cli::try_parse_from(conflicting).is_err());

        let cli = Cli::try_parse_from(["jot", "edit", "1", "--tags", "a,b"]).unwrap();
        match cli.command {
            Command::Edit { tags, .. } => {
                assert_eq!(tags, Some(vec!["a".to_string(), "b".to_string()]))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn text_words_are_collected() {
        let cli =
            Cli::try_parse_from(["jot", "parse", "--offline", "call", "mom", "tomorrow"]).unwrap();
        match cli.command {
            Command::Parse { text, offline, .. } => {
                assert!(offline);
                assert_eq!(text, ["call", "mom", "tomorrow"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
