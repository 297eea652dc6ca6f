use super::exit_codes;
use crate::cli::args::ImportArgs;
use gavel_core::model::QuestionType;
use serde::Deserialize;

/// On-disk submission document. One import becomes one submission inside a
/// workspace; a fresh import without --workspace creates a temporary one.
#[derive(Debug, Deserialize)]
pub struct ImportDoc {
    #[serde(default)]
    pub label: Option<String>,
    pub questions: Vec<ImportQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct ImportQuestion {
    pub text: String,
    #[serde(rename = "type", default)]
    pub qtype: Option<String>,
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
}

pub fn parse_doc(raw: &str) -> anyhow::Result<ImportDoc> {
    let doc: ImportDoc = serde_yaml::from_str(raw)?;
    if doc.questions.is_empty() {
        anyhow::bail!("submission document has no questions");
    }
    for (idx, q) in doc.questions.iter().enumerate() {
        if let Some(raw_type) = q.qtype.as_deref() {
            // "none" is the explicit untyped marker; anything else must be in
            // the closed set.
            if raw_type != "none" && QuestionType::parse(raw_type).is_none() {
                anyhow::bail!(
                    "question {} has unknown type '{}' (expected multiple_choice, \
                     single_choice_with_reasoning, free_form or none)",
                    idx + 1,
                    raw_type
                );
            }
        }
    }
    Ok(doc)
}

pub fn cmd_import(args: ImportArgs) -> anyhow::Result<i32> {
    let raw = std::fs::read_to_string(&args.file)?;
    let doc = match parse_doc(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let store = super::open_store(&args.db)?;

    let label = doc
        .label
        .clone()
        .or_else(|| {
            args.file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| "imported".to_string());

    let workspace_id = match args.workspace {
        Some(id) => match store.get_workspace(id)? {
            Some(ws) if ws.owner_id == args.user => id,
            Some(_) => {
                eprintln!("config error: workspace {} not owned by caller", id);
                return Ok(exit_codes::CONFIG_ERROR);
            }
            None => {
                eprintln!("config error: workspace {} not found", id);
                return Ok(exit_codes::CONFIG_ERROR);
            }
        },
        None => {
            let id = store.create_workspace(&args.user, &label, true)?;
            eprintln!("created temporary workspace {} ('{}')", id, label);
            id
        }
    };

    let submission_id = store.insert_submission(workspace_id, &label)?;
    for q in &doc.questions {
        let qtype = q.qtype.as_deref().and_then(QuestionType::parse);
        let question_id = store.insert_question(submission_id, &q.text, qtype)?;
        if let Some(answer) = &q.answer {
            store.upsert_answer(question_id, answer)?;
        }
    }

    tracing::info!(
        workspace_id,
        submission_id,
        questions = doc.questions.len(),
        "imported submission"
    );
    println!("workspace={} submission={}", workspace_id, submission_id);
    Ok(exit_codes::OK)
}
