//! RAX Storage - Entry Point
//!
//! Command line front end for one configured storage mount.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use rax_storage::config::{AdapterKind, StorageConfig};
use rax_storage::error::{Operation, StorageError};
use rax_storage::path::normalize_path;
use rax_storage::storage::{
    LocalAdapter, MemoryAdapter, StorageAdapter, StorageOperator, WriteOptions,
};
use rax_storage::visibility::{AclVisibility, Visibility};

#[derive(Parser, Debug)]
#[command(name = "rax-storage")]
#[command(about = "Portable file storage operations against a configured mount")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the canonical path and backend location for a path
    Resolve { path: String },
    /// Write a file from the given text
    Write {
        path: String,
        contents: String,
        #[arg(long)]
        visibility: Option<Visibility>,
    },
    /// Print a file's contents
    Read { path: String },
    /// List a directory
    List {
        #[arg(default_value = "")]
        path: String,
        #[arg(long)]
        deep: bool,
    },
    /// Move a file
    Move { source: String, destination: String },
    /// Copy a file
    Copy { source: String, destination: String },
    /// Delete a file
    Delete { path: String },
    /// Delete a directory and its contents
    DeleteDir { path: String },
    /// Create a directory
    Mkdir {
        path: String,
        #[arg(long)]
        visibility: Option<Visibility>,
    },
    /// Change the visibility of a file or directory
    SetVisibility { path: String, visibility: Visibility },
    /// Print the visibility of a file or directory
    Visibility { path: String },
    /// Print metadata for a file or directory
    Stat { path: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let args = Args::parse();

    let config = match StorageConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match config.adapter {
        AdapterKind::Local => match open_local(&config).await {
            Ok(operator) => run(&operator, args.command).await,
            Err(e) => Err(e),
        },
        AdapterKind::Memory => {
            info!("Using an empty in-memory mount; nothing will persist");
            let operator =
                StorageOperator::new(MemoryAdapter::new(&config.root), AclVisibility::default())
                    .with_defaults(defaults(&config));
            run(&operator, args.command).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // Failed operations exit with 1, bad or missing paths with 2.
        Err(e) => match e.operation() {
            Some(_) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
            None => {
                eprintln!("error: {e}");
                ExitCode::from(2)
            }
        },
    }
}

fn defaults(config: &StorageConfig) -> WriteOptions {
    WriteOptions {
        visibility: config.default_visibility,
        directory_visibility: Some(config.directory_visibility),
        retain_visibility: None,
    }
}

async fn open_local(config: &StorageConfig) -> Result<StorageOperator<LocalAdapter>, StorageError> {
    let policy = config.visibility_policy()?;
    let adapter = LocalAdapter::new(config.root_path(), policy.default_for_directories()).await?;
    Ok(StorageOperator::new(adapter, policy).with_defaults(defaults(config)))
}

async fn run<A: StorageAdapter>(
    operator: &StorageOperator<A>,
    command: Command,
) -> Result<(), StorageError> {
    match command {
        Command::Resolve { path } => {
            let canonical = normalize_path(&path)?;
            let prefixer = operator.adapter().prefixer();
            println!("canonical: {canonical:?}");
            println!("file:      {}", prefixer.prefix_path(&canonical));
            println!("directory: {}", prefixer.prefix_directory_path(&canonical));
        }
        Command::Write {
            path,
            contents,
            visibility,
        } => {
            let options = WriteOptions {
                visibility,
                ..WriteOptions::default()
            };
            operator.write(&path, contents.as_bytes(), options).await?;
        }
        Command::Read { path } => {
            let contents = operator.read(&path).await?;
            let mut stdout = std::io::stdout();
            stdout
                .write_all(&contents)
                .and_then(|_| stdout.flush())
                .map_err(|e| StorageError::io(Operation::ReadFile, path, e))?;
        }
        Command::List { path, deep } => {
            for entry in operator.list_contents(&path, deep).await? {
                let kind = if entry.is_dir() { "d" } else { "-" };
                let visibility = entry.visibility.map_or("-", |v| v.as_str());
                let size = entry.size.map_or_else(|| "-".to_string(), |s| s.to_string());
                println!("{kind} {visibility:<8} {size:>10} {}", entry.path);
            }
        }
        Command::Move {
            source,
            destination,
        } => {
            operator
                .move_file(&source, &destination, WriteOptions::default())
                .await?
        }
        Command::Copy {
            source,
            destination,
        } => {
            operator
                .copy_file(&source, &destination, WriteOptions::default())
                .await?
        }
        Command::Delete { path } => operator.delete(&path).await?,
        Command::DeleteDir { path } => operator.delete_directory(&path).await?,
        Command::Mkdir { path, visibility } => {
            let options = WriteOptions {
                directory_visibility: visibility,
                ..WriteOptions::default()
            };
            operator.create_directory(&path, options).await?;
        }
        Command::SetVisibility { path, visibility } => {
            operator.set_visibility(&path, visibility).await?
        }
        Command::Visibility { path } => println!("{}", operator.visibility(&path).await?),
        Command::Stat { path } => {
            let attributes = operator.metadata(&path).await?;
            println!("path:          {}", attributes.path);
            println!("kind:          {:?}", attributes.kind);
            if let Some(size) = attributes.size {
                println!("size:          {size}");
            }
            if let Some(modified) = attributes.last_modified {
                println!("last_modified: {modified}");
            }
            if let Some(visibility) = attributes.visibility {
                println!("visibility:    {visibility}");
            }
        }
    }

    Ok(())
}
