use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gavel",
    version,
    about = "Batch grading of Q&A submissions with configurable AI judges"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Init(InitArgs),
    Import(ImportArgs),
    Workspace(WorkspaceArgs),
    Judge(JudgeArgs),
    Assign(AssignArgs),
    Run(RunArgs),
    Version,
}

#[derive(clap::Args, Clone)]
pub struct InitArgs {
    /// Where to write the sample submission document
    #[arg(long, default_value = "submission.yaml")]
    pub file: PathBuf,
}

#[derive(clap::Args, Clone)]
pub struct ImportArgs {
    #[arg(long, default_value = ".gavel/gavel.db")]
    pub db: PathBuf,

    /// Submission document (YAML) to import
    #[arg(long)]
    pub file: PathBuf,

    /// Opaque caller identity; owns the created workspace
    #[arg(long, env = "GAVEL_USER")]
    pub user: String,

    /// Import into an existing workspace instead of creating a temporary one
    #[arg(long)]
    pub workspace: Option<i64>,
}

#[derive(Parser, Clone)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub cmd: WorkspaceSub,

    #[arg(long, default_value = ".gavel/gavel.db")]
    pub db: PathBuf,

    /// Opaque caller identity; all operations are scoped to it
    #[arg(long, env = "GAVEL_USER")]
    pub user: String,
}

#[derive(Subcommand, Clone)]
pub enum WorkspaceSub {
    /// Name a temporary workspace and keep it
    Save {
        #[arg(long)]
        workspace: i64,
        #[arg(long)]
        name: String,
    },
    /// Delete a workspace and everything imported into it
    Delete {
        #[arg(long)]
        workspace: i64,
    },
    List,
}

#[derive(Parser, Clone)]
pub struct JudgeArgs {
    #[command(subcommand)]
    pub cmd: JudgeSub,

    #[arg(long, default_value = ".gavel/gavel.db")]
    pub db: PathBuf,

    #[arg(long, env = "GAVEL_USER")]
    pub user: String,
}

#[derive(Subcommand, Clone)]
pub enum JudgeSub {
    /// Create a judge (name + rubric + model)
    Add {
        #[arg(long)]
        name: String,

        /// Grading criteria used as the judge's system prompt
        #[arg(long)]
        rubric: Option<String>,

        /// Read the rubric from a file instead
        #[arg(long, conflicts_with = "rubric")]
        rubric_file: Option<PathBuf>,

        /// Model identifier, e.g. gpt-4o-mini
        #[arg(long)]
        model: String,
    },
    Remove {
        #[arg(long)]
        judge: i64,
    },
    List,
}

#[derive(Parser, Clone)]
pub struct AssignArgs {
    #[command(subcommand)]
    pub cmd: AssignSub,

    #[arg(long, default_value = ".gavel/gavel.db")]
    pub db: PathBuf,
}

#[derive(Subcommand, Clone)]
pub enum AssignSub {
    /// Declare that a judge must evaluate a question
    Add {
        #[arg(long)]
        judge: i64,
        #[arg(long)]
        question: i64,
    },
    Remove {
        #[arg(long)]
        judge: i64,
        #[arg(long)]
        question: i64,
    },
    /// List assignments across a workspace's questions
    List {
        #[arg(long)]
        workspace: i64,
    },
}

#[derive(clap::Args, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = ".gavel/gavel.db")]
    pub db: PathBuf,

    /// Workspace whose assignments are evaluated
    #[arg(long)]
    pub workspace: i64,

    /// Opaque caller identity; only judges owned by it are run
    #[arg(long, env = "GAVEL_USER")]
    pub user: String,

    /// Output format: text|json
    #[arg(long, default_value = "text")]
    pub format: String,
}
