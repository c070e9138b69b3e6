//! Command-line arguments.

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

/// Drive a declarative data grid against a REST backend.
#[derive(Parser, Debug)]
#[command(name = "gridkit", version, about, long_about = None)]
pub struct Cli {
    /// Table configuration (JSON field matrix and endpoint)
    #[arg(short = 't', long = "table", env = "GRIDKIT_TABLE")]
    pub table: PathBuf,

    /// Backend base URL (e.g. http://localhost:8000)
    #[arg(short = 'u', long = "url", env = "GRIDKIT_URL")]
    pub url: Option<String>,

    /// CSRF token sent with every mutating request
    #[arg(long = "csrf-token", env = "GRIDKIT_CSRF_TOKEN", hide_env_values = true)]
    pub csrf_token: Option<String>,

    /// Keep presets in a local database instead of the backend
    #[arg(long = "offline")]
    pub offline: bool,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS", default_value_t = 30)]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the compiled field matrix
    Compile,
    /// Fetch and print one page of rows
    Fetch(FetchArgs),
    /// Save one field of one row
    Edit(EditArgs),
    /// Manage saved filter and column presets
    Presets {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct PageArgs {
    /// Zero-based page index
    #[arg(short = 'p', long = "page", default_value_t = 0)]
    pub page: usize,

    /// Rows per page (defaults to the table's page size)
    #[arg(short = 'n', long = "page-size")]
    pub page_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Global search term
    #[arg(short = 's', long = "search")]
    pub search: Option<String>,

    /// Sort column; prefix with '-' for descending
    #[arg(long = "sort", allow_hyphen_values = true)]
    pub sort: Option<String>,

    /// Column filter as KEY=VALUE (text, or 'true'/'false' for booleans)
    #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Print raw rows as JSON instead of rendered cells
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Row id
    pub id: String,

    /// Field key
    pub field: String,

    /// New value as typed in the cell editor; omit to clear
    pub value: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PresetAction {
    /// List saved presets
    List {
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Save the current (default) view under a name
    Save {
        #[arg(value_enum)]
        kind: KindArg,
        name: String,
    },
    /// Apply a preset and print the resulting page
    Apply {
        #[arg(value_enum)]
        kind: KindArg,
        name: String,
    },
    /// Delete a preset
    Delete {
        #[arg(value_enum)]
        kind: KindArg,
        name: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Filters,
    Columns,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "gridkit", "-t", "pits.json", "fetch", "-p", "2", "--sort", "-depth", "-f", "name=pit",
        ])
        .unwrap();

        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.page.page, 2);
        assert_eq!(args.sort.as_deref(), Some("-depth"));
        assert_eq!(args.filters, vec!["name=pit".to_string()]);
    }

    #[test]
    fn test_parse_edit_without_value() {
        let cli = Cli::try_parse_from(["gridkit", "-t", "pits.json", "edit", "4", "name"]).unwrap();

        let Command::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(args.id, "4");
        assert_eq!(args.value, None);
    }
}
