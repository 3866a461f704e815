use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use notam_core::ReviewState;
use notam_engine::filter::{PriorityFilter, StatusFilter};
use notam_engine::GroupingMode;

#[derive(Parser)]
#[command(name = "notam")]
#[command(about = "NOTAM briefing review", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enrich, filter and group a briefing for a flight
    Review(ReviewArgs),

    /// Print the identity key of every notice in a briefing
    Keys {
        /// Briefing JSON file
        briefing: PathBuf,

        /// Print short digests instead of full keys
        #[arg(long)]
        digest: bool,
    },

    /// Compare two imports of the same briefing
    Diff {
        /// Earlier briefing JSON file
        previous: PathBuf,

        /// Later briefing JSON file
        current: PathBuf,
    },

    /// Update the review state of one notice
    Mark(MarkArgs),

    /// Show config path and effective configuration
    Config,
}

#[derive(Args)]
pub struct ReviewArgs {
    /// Briefing JSON file
    pub briefing: PathBuf,

    /// Flight plan JSON file
    #[arg(long)]
    pub flight: Option<PathBuf>,

    /// Review state file (created if missing)
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Previous import of the same briefing, for new-notice detection
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// Free-text search over message, location and Q-code
    #[arg(long)]
    pub query: Option<String>,

    /// Grouping mode (default from config: route-order)
    #[arg(long, value_enum)]
    pub group: Option<GroupArg>,

    /// Only keep notices within this distance of the route (nm)
    #[arg(long)]
    pub corridor: Option<f64>,

    /// Priority bucket to show
    #[arg(long, value_enum, default_value = "all")]
    pub priority: PriorityArg,

    /// Review status bucket to show
    #[arg(long, value_enum, default_value = "all")]
    pub status: StatusArg,

    /// Show heliport and FATO notices
    #[arg(long)]
    pub show_helicopter: bool,

    /// Keep obstacles regardless of distance from departure/destination
    #[arg(long)]
    pub all_obstacles: bool,

    /// Include globally and user-ignored notices
    #[arg(long)]
    pub show_ignored: bool,

    /// Hide notices already marked read
    #[arg(long)]
    pub hide_read: bool,

    /// Keep notices outside the flight time window
    #[arg(long)]
    pub any_time: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct MarkArgs {
    /// Briefing JSON file
    pub briefing: PathBuf,

    /// Notice ID or key digest
    pub notice: String,

    /// New state: unread, read, important, ignored, follow-up
    #[arg(long)]
    pub status: Option<ReviewState>,

    /// Attach a note (empty removes it)
    #[arg(long)]
    pub note: Option<String>,

    /// Ignore the notice in every future briefing
    #[arg(long)]
    pub ignore: bool,

    /// Reason recorded with --ignore
    #[arg(long, requires = "ignore")]
    pub reason: Option<String>,

    /// Review state file
    #[arg(long)]
    pub state: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GroupArg {
    None,
    Airport,
    Category,
    RouteOrder,
}

impl From<GroupArg> for GroupingMode {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::None => GroupingMode::None,
            GroupArg::Airport => GroupingMode::Airport,
            GroupArg::Category => GroupingMode::Category,
            GroupArg::RouteOrder => GroupingMode::RouteOrder,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    All,
    High,
    Normal,
    Low,
}

impl From<PriorityArg> for PriorityFilter {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::All => PriorityFilter::All,
            PriorityArg::High => PriorityFilter::High,
            PriorityArg::Normal => PriorityFilter::Normal,
            PriorityArg::Low => PriorityFilter::Low,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    All,
    Unread,
    Important,
    FollowUp,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Unread => StatusFilter::Unread,
            StatusArg::Important => StatusFilter::Important,
            StatusArg::FollowUp => StatusFilter::FollowUp,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
