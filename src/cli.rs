//! Command-line argument definitions

use crate::api::{Filter, FilterField, ListQuery, OrderBy, SortDirection, SortSpec};
use crate::error::ValidationError;
use crate::present::DEFAULT_LIMIT;
use crate::select::SelectMode;
use clap::Parser;
use std::path::PathBuf;

/// Official OpenBlu command-line client: list, filter and connect to
/// OpenBlu VPN servers
#[derive(Parser, Debug)]
#[command(name = "openblu")]
#[command(version, about)]
pub struct Cli {
    /// The API key for the Intellivoid API
    #[arg(long)]
    pub key: Option<String>,

    /// Connect to the most recently updated server
    #[arg(short = 'b', long)]
    pub connect_best: bool,

    /// Connect to a server in this country (name or two-letter code)
    #[arg(short, long, value_name = "NAME")]
    pub country: Option<String>,

    /// Fetch the available VPN servers and show them
    #[arg(short, long)]
    pub fetch_servers: bool,

    /// Show information about a server, given its unique ID
    #[arg(short, long, value_name = "ID")]
    pub info: Option<String>,

    /// Field used by --filter
    #[arg(long, value_enum)]
    pub filter_by: Option<FilterField>,

    /// Value the --filter-by field must match (e.g. Italy, or IT for country_short)
    #[arg(long, value_name = "VALUE")]
    pub filter: Option<String>,

    /// Order the results by this field
    #[arg(short, long, value_enum)]
    pub order_by: Option<OrderBy>,

    /// Sort the ordered results in ascending or descending order
    #[arg(short, long, value_enum)]
    pub sort_by: Option<SortDirection>,

    /// Make the output verbose
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum number of servers to show
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Prompt for an access key and save it to openblu.key
    #[arg(long)]
    pub set_access_key: bool,

    /// Path to a config file (default: ./openblu.toml, then ~/.openblu/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write a default openblu.toml to the working directory
    #[arg(long)]
    pub init_config: bool,
}

/// What a single invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    FetchServers { query: ListQuery, limit: usize },
    Info { id: String },
    /// List with `query`, pick one server by `mode`, connect to it
    Connect { query: ListQuery, mode: SelectMode },
    SetAccessKey,
    InitConfig,
}

impl Cli {
    /// Validate flag combinations and work out the single requested action
    pub fn intent(&self) -> Result<Intent, ValidationError> {
        let mut requested = Vec::new();
        if self.fetch_servers {
            requested.push("--fetch-servers");
        }
        if self.set_access_key {
            requested.push("--set-access-key");
        }
        if self.info.is_some() {
            requested.push("--info");
        }
        if self.country.is_some() || self.connect_best {
            requested.push("--country/--connect-best");
        }
        if self.init_config {
            requested.push("--init-config");
        }

        match requested.len() {
            0 => return Err(ValidationError::NoIntent),
            1 => {}
            _ => return Err(ValidationError::ConflictingIntents(requested)),
        }

        let filter = Filter::from_parts(self.filter_by, self.filter.as_deref())?;
        let sort = SortSpec::from_parts(self.order_by, self.sort_by)?;

        if self.fetch_servers {
            return Ok(Intent::FetchServers {
                query: ListQuery { filter, sort },
                limit: self.limit,
            });
        }
        if self.connect_best || self.country.is_some() {
            let filter = match (self.country.as_deref(), filter) {
                (Some(_), Some(_)) => return Err(ValidationError::ConflictingFilters),
                (Some(country), None) => Some(Filter::for_country(country)?),
                (None, filter) => filter,
            };
            let mode = if self.connect_best {
                SelectMode::Best
            } else {
                SelectMode::First
            };
            return Ok(Intent::Connect {
                query: ListQuery { filter, sort },
                mode,
            });
        }

        // Everything below takes no list options
        if filter.is_some() || sort.is_some() {
            return Err(ValidationError::ListOptionsNotAllowed(requested[0]));
        }
        if let Some(id) = &self.info {
            return Ok(Intent::Info {
                id: id.trim().to_string(),
            });
        }
        if self.set_access_key {
            return Ok(Intent::SetAccessKey);
        }
        Ok(Intent::InitConfig)
    }
}
