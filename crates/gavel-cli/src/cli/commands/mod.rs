use super::args::*;
use gavel_core::storage::Store;
use std::path::Path;

pub mod import;
pub mod run;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const RUN_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Import(args) => import::cmd_import(args),
        Command::Workspace(args) => cmd_workspace(args),
        Command::Judge(args) => cmd_judge(args),
        Command::Assign(args) => cmd_assign(args),
        Command::Run(args) => run::cmd_run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.file.exists() {
        eprintln!("note: {} already exists (skipped)", args.file.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = args.file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.file, crate::templates::SAMPLE_SUBMISSION)?;
    eprintln!("created {}", args.file.display());
    Ok(exit_codes::OK)
}

fn cmd_workspace(args: WorkspaceArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.db)?;
    match args.cmd {
        WorkspaceSub::Save { workspace, name } => {
            if store.save_workspace(workspace, &args.user, &name)? {
                eprintln!("saved workspace {} as '{}'", workspace, name);
                Ok(exit_codes::OK)
            } else {
                eprintln!(
                    "config error: workspace {} not found or not owned by caller",
                    workspace
                );
                Ok(exit_codes::CONFIG_ERROR)
            }
        }
        WorkspaceSub::Delete { workspace } => {
            if store.delete_workspace(workspace, &args.user)? {
                eprintln!("deleted workspace {}", workspace);
                Ok(exit_codes::OK)
            } else {
                eprintln!(
                    "config error: workspace {} not found or not owned by caller",
                    workspace
                );
                Ok(exit_codes::CONFIG_ERROR)
            }
        }
        WorkspaceSub::List => {
            for ws in store.list_workspaces(&args.user)? {
                println!(
                    "{}\t{}\t{}",
                    ws.id,
                    ws.name,
                    if ws.temporary { "temporary" } else { "saved" }
                );
            }
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_judge(args: JudgeArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.db)?;
    match args.cmd {
        JudgeSub::Add {
            name,
            rubric,
            rubric_file,
            model,
        } => {
            let system_prompt = match (rubric, rubric_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                (None, None) => {
                    eprintln!("config error: one of --rubric or --rubric-file is required");
                    return Ok(exit_codes::CONFIG_ERROR);
                }
            };
            let id = store.create_judge(&args.user, &name, &system_prompt, &model)?;
            println!("{}", id);
            Ok(exit_codes::OK)
        }
        JudgeSub::Remove { judge } => {
            if store.delete_judge(judge, &args.user)? {
                eprintln!("removed judge {}", judge);
                Ok(exit_codes::OK)
            } else {
                eprintln!(
                    "config error: judge {} not found or not owned by caller",
                    judge
                );
                Ok(exit_codes::CONFIG_ERROR)
            }
        }
        JudgeSub::List => {
            for judge in store.judges_for_owner(&args.user)? {
                println!("{}\t{}\t{}", judge.id, judge.name, judge.model);
            }
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_assign(args: AssignArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.db)?;
    match args.cmd {
        AssignSub::Add { judge, question } => {
            store.assign(judge, question)?;
            eprintln!("assigned judge {} to question {}", judge, question);
            Ok(exit_codes::OK)
        }
        AssignSub::Remove { judge, question } => {
            if store.unassign(judge, question)? {
                eprintln!("unassigned judge {} from question {}", judge, question);
            } else {
                eprintln!("note: no such assignment (skipped)");
            }
            Ok(exit_codes::OK)
        }
        AssignSub::List { workspace } => {
            let submissions = store.submissions_for_workspace(workspace)?;
            let submission_ids: Vec<i64> = submissions.iter().map(|s| s.id).collect();
            let questions = store.questions_for_submissions(&submission_ids)?;
            let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
            for a in store.assignments_for_questions(&question_ids)? {
                println!("{}\t{}", a.judge_id, a.question_id);
            }
            Ok(exit_codes::OK)
        }
    }
}

pub(crate) fn open_store(db: &Path) -> anyhow::Result<Store> {
    if let Some(parent) = db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = Store::open(db)?;
    store.init_schema()?;
    Ok(store)
}
