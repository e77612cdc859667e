use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lls",
    about = "Low-level storage engine: object and datastream payloads on disk",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage configuration (TOML)
    #[arg(short, long, global = true, default_value = "lls.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a new payload
    Add(WriteArgs),
    /// Write a stored payload to stdout or a file
    Get(GetArgs),
    /// Overwrite an existing payload
    Replace(WriteArgs),
    /// Delete a payload
    Remove(KeyArgs),
    /// List stored keys
    List(NamespaceArgs),
    /// Regenerate the path registry from the files on disk
    Rebuild(NamespaceArgs),
    /// Compare the path registry with the files on disk
    Audit(NamespaceArgs),
}

#[derive(Args)]
pub struct NamespaceArgs {
    /// Use the datastream store instead of the object store
    #[arg(long)]
    pub datastream: bool,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
    #[command(flatten)]
    pub namespace: NamespaceArgs,
}

#[derive(Args)]
pub struct WriteArgs {
    pub key: String,
    /// Read content from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub namespace: NamespaceArgs,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
    /// Write content to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub namespace: NamespaceArgs,
}
