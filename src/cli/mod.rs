//! Command-line front end for the search core.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::SortBy;

/// TVApi - TV show search with caching and history
#[derive(Parser)]
#[command(name = "tvapi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog for shows
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,

        /// relevance, name, rating or premiered
        #[arg(long, default_value_t = SortBy::Relevance)]
        sort: SortBy,

        /// Only shows tagged with this genre
        #[arg(long)]
        genre: Option<String>,

        /// Only shows rated at least this
        #[arg(long)]
        min_rating: Option<f32>,

        /// Print a summary of the results
        #[arg(long)]
        stats: bool,
    },

    /// Show details for one show
    #[command(alias = "i")]
    Show {
        /// Show ID
        id: String,
    },

    /// List episodes of a show
    Episodes {
        /// Show ID
        id: String,

        /// Only this season
        #[arg(long)]
        season: Option<u32>,
    },

    /// Print recent searches
    #[command(alias = "h")]
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Suggest past searches matching a partial query
    Suggest {
        #[arg(default_value = "")]
        partial: String,
    },

    /// Type queries line by line with live, debounced results
    Interactive,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
