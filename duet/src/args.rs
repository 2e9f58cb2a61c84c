use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use duet_core::{FilterState, db::Direction, duet_state::Collection};

use crate::config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file with the `[server]` section
    #[arg(long, default_value = Config::FILENAME)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a collection the way its public page shows it
    List {
        collection: Collection,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show the values each dropdown filter of a collection offers
    Options { collection: Collection },
    /// Write the filtered records of a collection to a CSV file
    Export {
        collection: Collection,
        /// Output path; defaults to `<collection>_export_<today>.csv`
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Manage records; requires admin credentials in the config
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Show the fields a new record of the collection would have
    Fields { collection: Collection },
    /// List every record with its id
    Rows { collection: Collection },
    /// Create a record
    Add {
        collection: Collection,
        /// Field assignments, `key=value`
        #[arg(long = "set", value_parser = parse_pair)]
        set: Vec<(String, String)>,
    },
    /// Update a record
    Edit {
        collection: Collection,
        id: String,
        /// Field assignments, `key=value`
        #[arg(long = "set", value_parser = parse_pair)]
        set: Vec<(String, String)>,
    },
    /// Delete a record
    Delete {
        collection: Collection,
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Default)]
pub struct FilterArgs {
    /// Case-insensitive search over title and name
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only records involving this artist
    #[arg(long)]
    pub artist: Option<String>,

    /// Exact-match filter, `field=value`
    #[arg(long = "filter", value_parser = parse_pair)]
    pub filters: Vec<(String, String)>,

    /// First date shown (inclusive)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date shown (inclusive)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Newest first
    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,

    /// Oldest first
    #[arg(long)]
    pub asc: bool,

    /// Treat this as today when deciding what is upcoming
    #[arg(long)]
    pub today: Option<NaiveDate>,
}
impl FilterArgs {
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn to_state(&self) -> FilterState {
        let mut state = FilterState {
            search: self.search.clone().unwrap_or_default(),
            start: self.from,
            end: self.to,
            direction: match (self.asc, self.desc) {
                (true, _) => Some(Direction::Ascending),
                (_, true) => Some(Direction::Descending),
                _ => None,
            },
            ..Default::default()
        };
        if let Some(artist) = &self.artist {
            state.select("artist", artist.as_str());
        }
        for (field, value) in &self.filters {
            state.select(field, value.as_str());
        }
        state
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `key=value`, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
