use std::fmt::{Display, Formatter};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use crate::bootstrap::bootstrap_cmd;
use crate::inbox::inbox_cmd;
use crate::new_log::new_log_cmd;
use crate::seed::seed_cmd;
use crate::tech_usage::tech_usage_cmd;

mod bootstrap;
mod decompress;
mod inbox;
mod new_log;
mod seed;
mod tech_usage;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Bootstrap a new site: templates, assets, sample content and folio.toml
    Bootstrap(BootstrapArgs),
    /// Create a new DataLog
    NewLog(NewLogArgs),
    /// Write sample DataLogs and systems into the configured content directories
    Seed(SeedArgs),
    /// Report which technologies are used by systems and DataLogs
    TechUsage(ConfigArgs),
    /// Print the messages received through the contact form
    Inbox(ConfigArgs),
}

#[derive(Parser, Debug)]
struct BootstrapArgs {
    /// Directory where the new site will be generated
    #[arg(short, long)]
    out_dir: String,
}

#[derive(Parser, Debug)]
struct NewLogArgs {
    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    name: Option<String>,

    /// Title of the DataLog
    #[arg(short, long)]
    title: Option<String>,

    /// Category slug
    #[arg(short, long)]
    category: Option<String>,

    /// Tags, space separated
    #[arg(long, num_args = 1..)]
    tags: Vec<String>,

    /// Where the new DataLog goes
    #[arg(short, long, default_value_t = LogOutput::Stdout)]
    output: LogOutput,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogOutput {
    /// Writes the new DataLog to the stdout
    Stdout,
    /// Writes the new DataLog to `<slug>.md` (entries without images)
    File,
    /// Writes the new DataLog to `<slug>/index.md` (entries with images)
    Dir,
}

impl Display for LogOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogOutput::Stdout => "stdout",
            LogOutput::File => "file",
            LogOutput::Dir => "dir",
        };
        write!(f, "{}", name)
    }
}

#[derive(Parser, Debug)]
struct SeedArgs {
    /// Config path
    #[arg(short, long)]
    config_path: String,

    /// Number of DataLogs to create
    #[arg(long, default_value_t = 5)]
    logs: u32,

    /// Number of systems to create
    #[arg(long, default_value_t = 3)]
    systems: u32,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Config path
    #[arg(short, long)]
    config_path: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args {
        Args::Bootstrap(args) => bootstrap_cmd(args),
        Args::NewLog(args) => new_log_cmd(args),
        Args::Seed(args) => seed_cmd(args),
        Args::TechUsage(args) => tech_usage_cmd(args),
        Args::Inbox(args) => inbox_cmd(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
