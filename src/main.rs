use anyhow::Result;
use clap::{Parser, Subcommand};
use grit::areas::repository::Repository;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "grit=warn";

#[derive(Parser)]
#[command(
    name = "grit",
    version,
    about = "A small git implementation",
    long_about = "A content-addressable object store with git's on-disk format, \
    plumbing commands to inspect and build objects, and cloning over smart HTTP.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
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
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        Blobs and commits are printed verbatim, trees one entry per line."
    )]
    CatFile {
        #[arg(short = 'p', long = "pretty-print", help = "The object to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(long, help = "Only print entry names")]
        name_only: bool,
        #[arg(index = 1, help = "A tree, or a commit whose tree to list")]
        tree_ish: String,
    },
    #[command(
        name = "write-tree",
        about = "Write the working directory as tree objects"
    )]
    WriteTree,
    #[command(name = "commit-tree", about = "Create a commit object for a tree")]
    CommitTree {
        #[arg(index = 1)]
        tree: String,
        #[arg(short, long = "parent", help = "A parent commit (repeatable)")]
        parents: Vec<String>,
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "clone",
        about = "Clone a repository over smart HTTP",
        long_about = "This command fetches the default branch of a remote repository \
        into a new directory and checks it out."
    )]
    Clone {
        #[arg(index = 1)]
        url: String,
        #[arg(index = 2)]
        directory: PathBuf,
    },
}

fn open_current() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd, Box::new(std::io::stdout()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => path,
                None => std::env::current_dir()?,
            };
            let mut repository = Repository::new(&path, Box::new(std::io::stdout()))?;

            repository.init().await?
        }
        Commands::CatFile { sha } => open_current()?.cat_file(&sha)?,
        Commands::HashObject { write, file } => open_current()?.hash_object(&file, write)?,
        Commands::LsTree {
            name_only,
            tree_ish,
        } => open_current()?.ls_tree(&tree_ish, name_only)?,
        Commands::WriteTree => open_current()?.write_tree()?,
        Commands::CommitTree {
            tree,
            parents,
            message,
        } => open_current()?.commit_tree(&tree, &parents, &message)?,
        Commands::Clone { url, directory } => {
            let mut repository = Repository::new(&directory, Box::new(std::io::stdout()))?;

            repository.clone_from(&url).await?
        }
    }

    Ok(())
}
