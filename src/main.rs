use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use sprig::areas::repository::Repository;
use sprig::artifacts::core::{history_writer, page_all};
use sprig::errors::{RepositoryError, classify};
use std::io::Write;

const MISSING_COMMAND: &str = "Please enter a command.";
const UNKNOWN_COMMAND: &str = "No command with that name exists.";
const INCORRECT_OPERANDS: &str = "Incorrect operands.";
const MISSING_COMMIT_MESSAGE: &str = "Please enter a commit message.";

#[derive(Parser)]
#[command(
    name = "sprig",
    version = "0.1.0",
    about = "A miniature version-control system",
    long_about = "sprig keeps snapshots of a directory as commits, with branches, \
    a staging area and three-way merges.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

COMMANDS:
{subcommands}

OPTIONS:
    {options}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Create a repository in the current directory"
    )]
    Init,
    #[command(
        name = "add",
        about = "Stage a file (or every file below a directory) for the next commit"
    )]
    Add {
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "commit",
        about = "Record the staged changes",
        long_about = "Creates a commit on top of HEAD holding the head snapshot \
        with the staged additions and removals applied."
    )]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: Option<String>,
    },
    #[command(
        name = "rm",
        about = "Unstage a file, or stage its removal and delete it"
    )]
    Rm {
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "log", about = "Show the history of HEAD")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the ids of commits with the given message")]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show branches, staged and removed files, and working tree changes"
    )]
    Status,
    #[command(
        name = "checkout",
        about = "Restore a file, switch branches or detach HEAD",
        long_about = "checkout -- <file>: restore a file from HEAD\n\
        checkout <commit> -- <file>: restore a file from a commit\n\
        checkout <branch>: switch to a branch\n\
        checkout <commit>: detach HEAD at a commit"
    )]
    Checkout {
        #[arg(help = "A branch name or a commit id")]
        target: Option<String>,
        #[arg(last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(name = "branch", about = "Create a branch at HEAD")]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch")]
    RmBranch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Check out a commit and move the current branch to it"
    )]
    Reset {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current one")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
}

fn main() -> Result<()> {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return report_usage_error(error),
    };

    if let Err(error) = run(cli.command) {
        report_error(&error);
    }

    Ok(())
}

fn run(command: Commands) -> Result<()> {
    let pwd = std::env::current_dir()?;

    if let Commands::Init = command {
        return Repository::new(&pwd, Box::new(std::io::stdout()))?.init();
    }

    let (writer, pager): (Box<dyn Write>, _) = match command {
        Commands::Log | Commands::GlobalLog => history_writer(),
        _ => (Box::new(std::io::stdout()), None),
    };

    {
        let repository = Repository::open(&pwd, writer)?;
        dispatch(&repository, command)?;
        repository.writer().flush()?;
    }

    match pager {
        Some(pager) => page_all(pager),
        None => Ok(()),
    }
}

fn dispatch(repository: &Repository, command: Commands) -> Result<()> {
    match command {
        Commands::Init => repository.init(),
        Commands::Add { file } => repository.add(&file),
        Commands::Commit { message } => match message {
            Some(message) => repository.commit(&message),
            None => Err(RepositoryError::invalid_state(MISSING_COMMIT_MESSAGE)),
        },
        Commands::Rm { file } => repository.rm(&file),
        Commands::Log => repository.log(),
        Commands::GlobalLog => repository.global_log(),
        Commands::Find { message } => repository.find(&message),
        Commands::Status => repository.status(),
        Commands::Checkout { target, file } => match (target, file) {
            (None, Some(file)) => repository.checkout_file(None, &file),
            (Some(commit), Some(file)) => repository.checkout_file(Some(&commit), &file),
            (Some(target), None) => repository.checkout(&target),
            (None, None) => Err(RepositoryError::invalid_state(INCORRECT_OPERANDS)),
        },
        Commands::Branch { name } => repository.branch(&name),
        Commands::RmBranch { name } => repository.rm_branch(&name),
        Commands::Reset { commit } => repository.reset(&commit),
        Commands::Merge { branch } => repository.merge(&branch),
    }
}

fn report_usage_error(error: clap::Error) -> Result<()> {
    let message = match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            MISSING_COMMAND
        }
        ErrorKind::InvalidSubcommand => UNKNOWN_COMMAND,
        _ => INCORRECT_OPERANDS,
    };

    eprintln!("{message}");
    Ok(())
}

fn report_error(error: &anyhow::Error) {
    match classify(error) {
        Some(repository_error) => eprintln!("{repository_error}"),
        None => eprintln!("{error}"),
    }
}
