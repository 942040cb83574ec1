use campusapp::listing::Choice;
use campusapp::model::{
    AdminStatus, CampaignStatus, FileType, GalleryCategory, GuidanceCategory, Priority, Role,
    SessionKind, VideoType,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "campus",
    bin_name = "campus",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Manage a school website's content from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Base URL of the school site (overrides config and CAMPUS_API_URL)
    #[arg(long, global = true, value_name = "URL", help_heading = "Options")]
    pub api_url: Option<String>,

    /// Directory holding the session, admin list and campus.toml
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and remember the session
    #[command(display_order = 1)]
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Forget the current session
    #[command(display_order = 2)]
    Logout,

    /// Show the signed-in admin
    #[command(display_order = 3)]
    Whoami,

    /// Site administrators
    #[command(subcommand, display_order = 10)]
    Admins(AdminCommands),

    /// Email campaigns
    #[command(subcommand, alias = "emails", display_order = 11)]
    Campaigns(CampaignCommands),

    /// Media gallery
    #[command(subcommand, display_order = 12)]
    Gallery(GalleryCommands),

    /// Guidance and counselling sessions
    #[command(subcommand, display_order = 13)]
    Guidance(GuidanceCommands),

    /// The school profile
    #[command(subcommand, display_order = 14)]
    School(SchoolCommands),

    /// Public homepage data
    #[command(display_order = 20)]
    Home,
}

#[derive(Args, Debug, Clone, Default)]
pub struct Paging {
    /// Case-insensitive search term
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// List admins
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        paging: Paging,

        /// Filter by role (or "all")
        #[arg(long, default_value = "all")]
        role: Choice<Role>,

        /// Filter by status (or "all")
        #[arg(long, default_value = "all")]
        status: Choice<AdminStatus>,
    },

    /// Register a new admin
    #[command(alias = "create")]
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "admin")]
        role: Role,

        #[arg(long, default_value = "active")]
        status: AdminStatus,
    },

    /// Change an admin's details
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        #[arg(long)]
        status: Option<AdminStatus>,
    },

    /// Delete an admin (never yourself)
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CampaignCommands {
    /// List campaigns
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        paging: Paging,

        /// Filter by status (or "all")
        #[arg(long, default_value = "all")]
        status: Choice<CampaignStatus>,
    },

    /// Create a draft campaign
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        content: String,

        /// "all", "students", "staff" or comma-separated addresses
        #[arg(long)]
        to: String,
    },

    /// Change a draft campaign
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// Publish a draft campaign
    Send { id: String },

    /// Delete a campaign
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommands {
    /// List gallery items
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        paging: Paging,

        /// Filter by category (or "all")
        #[arg(long, default_value = "all")]
        category: Choice<GalleryCategory>,

        /// Filter by media type: image, video (or "all")
        #[arg(long = "type", default_value = "all")]
        file_type: Choice<FileType>,
    },

    /// Upload a new gallery item
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        category: GalleryCategory,

        /// Images or videos to upload
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Change a gallery item and its files in one request
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<GalleryCategory>,

        /// File to upload (repeatable)
        #[arg(long = "add", value_name = "FILE")]
        add: Vec<PathBuf>,

        /// Existing file URL to remove (repeatable)
        #[arg(long = "remove", value_name = "URL")]
        remove: Vec<String>,
    },

    /// Delete a gallery item
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum GuidanceCommands {
    /// List guidance sessions
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        paging: Paging,

        /// Filter by category (or "all")
        #[arg(long, default_value = "all")]
        category: Choice<GuidanceCategory>,

        /// Filter by priority (or "all")
        #[arg(long, default_value = "all")]
        priority: Choice<Priority>,

        /// Filter by session type (or "all")
        #[arg(long = "type", default_value = "all")]
        kind: Choice<SessionKind>,
    },

    /// Record a guidance session
    Create {
        #[command(flatten)]
        fields: GuidanceFields,
    },

    /// Change a guidance session
    Edit {
        id: String,

        #[command(flatten)]
        fields: GuidanceFields,
    },

    /// Delete a guidance session
    #[command(alias = "rm")]
    Remove { id: String },
}

/// Every field is optional here; create validates what is required.
#[derive(Args, Debug, Clone, Default)]
pub struct GuidanceFields {
    #[arg(long)]
    pub counselor: Option<String>,

    #[arg(long)]
    pub category: Option<GuidanceCategory>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// HH:MM
    #[arg(long)]
    pub time: Option<String>,

    #[arg(long = "type")]
    pub kind: Option<SessionKind>,

    #[arg(long)]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum SchoolCommands {
    /// Show the school profile
    Show,

    /// Create or update the school profile
    Save {
        #[command(flatten)]
        fields: SchoolFields,
    },

    /// Delete the school profile
    #[command(alias = "rm")]
    Remove,
}

/// Unset fields keep their saved values.
#[derive(Args, Debug, Clone, Default)]
pub struct SchoolFields {
    #[arg(long, help_heading = "Basic")]
    pub name: Option<String>,
    #[arg(long, help_heading = "Basic")]
    pub description: Option<String>,
    #[arg(long, help_heading = "Basic")]
    pub motto: Option<String>,
    #[arg(long, help_heading = "Basic")]
    pub vision: Option<String>,
    #[arg(long, help_heading = "Basic")]
    pub mission: Option<String>,

    #[arg(long, help_heading = "Academic")]
    pub student_count: Option<u32>,
    #[arg(long, help_heading = "Academic")]
    pub staff_count: Option<u32>,
    #[arg(long, help_heading = "Academic")]
    pub open_date: Option<String>,
    #[arg(long, help_heading = "Academic")]
    pub close_date: Option<String>,
    /// Comma-separated
    #[arg(long, value_delimiter = ',', help_heading = "Academic")]
    pub subjects: Option<Vec<String>>,
    /// Comma-separated
    #[arg(long, value_delimiter = ',', help_heading = "Academic")]
    pub departments: Option<Vec<String>>,
    #[arg(long, help_heading = "Academic")]
    pub video_tour: Option<String>,
    #[arg(long, help_heading = "Academic")]
    pub video_type: Option<VideoType>,

    #[arg(long, help_heading = "Admission")]
    pub admission_open_date: Option<String>,
    #[arg(long, help_heading = "Admission")]
    pub admission_close_date: Option<String>,
    #[arg(long, help_heading = "Admission")]
    pub admission_requirements: Option<String>,
    #[arg(long, help_heading = "Admission")]
    pub admission_fee: Option<String>,
    #[arg(long, help_heading = "Admission")]
    pub admission_capacity: Option<u32>,
    #[arg(long, help_heading = "Admission")]
    pub admission_contact_email: Option<String>,
    #[arg(long, help_heading = "Admission")]
    pub admission_contact_phone: Option<String>,
}
