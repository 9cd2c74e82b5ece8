use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "depkeeper",
    about = "Fingerprint dependency files and apply package-manager updates with rollback",
    version,
    author
)]
pub struct Cli {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List dependency files with their fingerprints
    List {
        /// Files to load instead of scanning the project
        #[arg(value_name = "FILE")]
        files: Vec<String>,

        /// Skip files and directories whose name matches this glob (repeatable)
        #[arg(long, value_name = "GLOB")]
        ignore: Vec<String>,

        /// Print the file set as JSON (path, sha, base64 content)
        #[arg(long)]
        json: bool,
    },

    /// Check files against expected fingerprints
    Verify {
        /// Expected fingerprints as FILE=SHA
        #[arg(value_name = "FILE=SHA", required = true)]
        expected: Vec<String>,
    },

    /// Apply a set of version updates with the ecosystem's package manager
    Update {
        /// Package ecosystem (e.g. Rubygem, Npm)
        #[arg(short = 't', long = "type", value_name = "ECOSYSTEM")]
        ecosystem: String,

        /// Restore the original files after a successful update (trial run)
        #[arg(long)]
        restore: bool,

        /// Print the original and updated file sets as JSON
        #[arg(long)]
        json: bool,

        /// Updates as package:old_version:target_version
        #[arg(value_name = "UPDATE", required = true)]
        updates: Vec<String>,
    },

    /// Apply a unified diff to a dependency file
    Patch {
        /// Dependency file to patch
        #[arg(value_name = "FILE")]
        file: String,

        /// Patch file to read ("-" or omitted reads standard input)
        #[arg(value_name = "PATCH")]
        patch: Option<PathBuf>,
    },
}
