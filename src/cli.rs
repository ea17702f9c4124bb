use clap::{Parser, Subcommand};
use std::path::PathBuf;

use birthday_book::models::{Gender, Relationship};

#[derive(Parser)]
#[command(name = "birthday-book")]
#[command(about = "Keep track of birthdays, wishes and photos from the terminal")]
#[command(version)]
pub struct Cli {
    /// Service base URL (overrides BIRTHDAY_BOOK_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides BIRTHDAY_BOOK_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and print the token to export
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create a new account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Show the signed-in user
    Me,

    /// List birthday records
    List {
        /// Case-insensitive text matched against every column
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Rows per page
        #[arg(short, long)]
        rows: Option<usize>,

        /// Show the wish column instead of the details
        #[arg(long)]
        wishes: bool,
    },

    /// Add a birthday record
    Add {
        #[arg(short, long)]
        name: String,

        /// Male or Female
        #[arg(short, long)]
        gender: String,

        /// family, friend, colleague or partner
        #[arg(short, long)]
        relationship: String,

        #[arg(short, long)]
        contact: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(short, long)]
        dob: String,

        #[arg(short, long)]
        email: String,
    },

    /// Change fields of a birthday record
    Update {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        gender: Option<String>,

        #[arg(short, long)]
        relationship: Option<String>,

        #[arg(short, long)]
        contact: Option<String>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(short, long)]
        dob: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },

    /// Delete a birthday record
    Delete { id: String },

    /// Set the birthday wish of a record
    Wish { id: String, text: String },

    /// Upload or download photos
    Photo {
        #[command(subcommand)]
        action: PhotoCommands,
    },

    /// List all users (admin only)
    Users,

    /// Totals for users and birthday records (admin only)
    Stats,

    /// Launch the terminal UI
    Tui,
}

#[derive(Subcommand)]
pub enum PhotoCommands {
    /// Attach an image file to a record
    Upload { id: String, path: PathBuf },

    /// Save every photo of a record (or one, with --index) to a directory
    Get {
        id: String,

        #[arg(short, long)]
        index: Option<usize>,

        /// Output directory (defaults to BIRTHDAY_BOOK_PHOTO_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    pub fn parse_gender(gender: &str) -> Result<Gender, anyhow::Error> {
        Gender::parse(gender).ok_or_else(|| {
            anyhow::anyhow!("Unsupported gender: {}. Supported: Male, Female", gender)
        })
    }

    pub fn parse_relationship(relationship: &str) -> Result<Relationship, anyhow::Error> {
        Relationship::parse(relationship).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported relationship: {}. Supported: family, friend, colleague, partner",
                relationship
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::parse_from(["birthday-book", "list", "--search", "ali"]);
        match cli.command {
            Commands::List {
                search,
                page,
                rows,
                wishes,
            } => {
                assert_eq!(search.as_deref(), Some("ali"));
                assert_eq!(page, 1);
                assert_eq!(rows, None);
                assert!(!wishes);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_choice_parsing() {
        assert_eq!(Commands::parse_gender("female").unwrap(), Gender::Female);
        assert!(Commands::parse_gender("x").is_err());
        assert_eq!(
            Commands::parse_relationship("Colleague").unwrap(),
            Relationship::Colleague
        );
    }
}
