use crate::export::{ExportFormat, ExportTarget};
use crate::faces::MatchPolicy;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for rattendance
/// Face-matched attendance recording with SQLite
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "Face-matched attendance: photo check-in/check-out, late flags and admin tools over SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Session token returned by `login`
    #[arg(global = true, long = "token", env = "RATT_SESSION", hide_env_values = true)]
    pub token: Option<String>,

    /// Increase diagnostic output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Specify the editor to use (vim, nano, or custom path)")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log (admin only)
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Open a session and print its token
    Login {
        /// Account email
        email: String,

        #[arg(long, env = "RATT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Print only the token (for scripting)
        #[arg(long)]
        raw: bool,
    },

    /// Close the current session
    Logout,

    /// Show who the current session belongs to
    Whoami,

    /// Mark attendance from a photo
    Attend {
        /// checkin | checkout
        action: String,

        /// Live photo file
        #[arg(long, value_name = "FILE")]
        photo: PathBuf,

        /// Declared content type (guessed from the file extension if omitted)
        #[arg(long = "content-type")]
        content_type: Option<String>,

        /// Scanner policy override
        #[arg(long, value_enum)]
        policy: Option<MatchPolicy>,
    },

    /// Manage registered employees (admin only)
    Identity {
        #[command(subcommand)]
        action: IdentityCmd,
    },

    /// Manage login accounts (admin only)
    Account {
        #[command(subcommand)]
        action: AccountCmd,
    },

    /// List or delete attendance records (admin only)
    Records {
        #[command(subcommand)]
        action: RecordsCmd,
    },

    /// Export attendance or employees (admin only)
    Export {
        /// What to export
        #[arg(long, value_enum, default_value = "attendance")]
        what: ExportTarget,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file path (absolute path required)
        #[arg(long, value_name = "FILE")]
        file: String,

        /// Date range for attendance.
        ///
        /// YYYY, YYYY-MM, YYYY-MM-DD, ranges in the same format
        /// (e.g. 2025-06:2025-08) or `all`.
        #[arg(long, value_name = "RANGE")]
        range: Option<String>,

        /// Overwrite output file without confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum IdentityCmd {
    /// Register an employee with a reference photo
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_name = "FILE")]
        photo: Option<PathBuf>,
    },
    /// Update name, email or photo
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_name = "FILE")]
        photo: Option<PathBuf>,
    },
    /// Remove one or more employees (attendance history is kept)
    Remove {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
    /// List registered employees
    List,
}

#[derive(Subcommand)]
pub enum AccountCmd {
    /// Create an account
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// admin | employee | user
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Update an account
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Delete an account
    Remove { id: i64 },
    /// List accounts
    List,
    /// Grant the Admin role
    Promote { id: i64 },
    /// Reset the role to User
    Demote { id: i64 },
}

#[derive(Subcommand)]
pub enum RecordsCmd {
    /// List records, newest date first
    List {
        #[arg(long, short, help = "Filter by year/month/day or a custom range")]
        period: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Delete records by filter
    Delete {
        #[arg(long, conflicts_with_all = ["date", "name", "ids"])]
        all: bool,

        #[arg(long, value_name = "YYYY-MM-DD", conflicts_with_all = ["name", "ids"])]
        date: Option<String>,

        #[arg(long, conflicts_with = "ids")]
        name: Option<String>,

        #[arg(long, value_delimiter = ',', num_args = 1..)]
        ids: Vec<i64>,
    },
}
