use clap::{Parser, Subcommand};
use entity::EntityKind;
use std::path::PathBuf;

pub mod config;
pub mod console;
pub mod controller;
pub mod entity;
pub mod error;
pub mod list;
pub mod metrics;
pub mod portal;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Print request metrics in Prometheus text format when done
    #[arg(long)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print one page of records
    List {
        kind: EntityKind,

        /// Page number
        #[arg(long)]
        page: Option<u64>,

        /// Records per page
        #[arg(long)]
        page_size: Option<u64>,

        /// Only records containing this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print a single record
    Show { kind: EntityKind, id: String },

    /// Print an empty record with a freshly generated id
    New { kind: EntityKind },

    /// Create or replace a record from a JSON file
    Put { kind: EntityKind, file: PathBuf },

    /// Delete a record after confirmation
    Delete {
        kind: EntityKind,
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
