use gavel_core::engine::BatchRunner;
use gavel_core::model::{QuestionType, Verdict};
use gavel_core::providers::llm::fake::{FailingJudgeClient, FakeJudgeClient};
use gavel_core::storage::Store;
use std::sync::Arc;

struct Fixture {
    store: Store,
    workspace: i64,
    submission: i64,
}

fn seed_workspace() -> anyhow::Result<Fixture> {
    let store = Store::memory()?;
    store.init_schema()?;
    let workspace = store.create_workspace("user-1", "midterm", true)?;
    let submission = store.insert_submission(workspace, "batch-1")?;
    Ok(Fixture {
        store,
        workspace,
        submission,
    })
}

fn evaluation_rows(store: &Store) -> Vec<(i64, i64, String, String)> {
    let conn = store.conn.lock().unwrap();
    let mut stmt = conn
        .prepare("SELECT question_id, judge_id, verdict, reasoning FROM evaluations ORDER BY id")
        .expect("prepare");
    let rows = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
        .expect("query");
    rows.collect::<Result<Vec<_>, _>>().expect("collect")
}

#[tokio::test]
async fn multiple_choice_pass_end_to_end() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(
        fx.submission,
        "Which option is correct?",
        Some(QuestionType::MultipleChoice),
    )?;
    fx.store.upsert_answer(q, &serde_json::json!({"choice": "B"}))?;
    let judge = fx
        .store
        .create_judge("user-1", "letters", "The correct answer is B.", "gpt-4o-mini")?;
    fx.store.assign(judge, q)?;

    let client = Arc::new(FakeJudgeClient::returning(
        r#"{"verdict": "pass", "reasoning": "selected B, matching the rubric"}"#,
    ));
    let runner = BatchRunner::new(fx.store.clone(), client.clone());
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    assert!(summary.success);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.inconclusive, 0);
    assert!(summary.results[0].success);
    assert_eq!(summary.results[0].verdict, Verdict::Pass);

    // the judge saw the question text and the serialized answer payload
    let calls = client.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("Which option is correct?"));
    assert!(calls[0].contains("\"choice\": \"B\""));

    let rows = evaluation_rows(&fx.store);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].2, "pass");

    Ok(())
}

#[tokio::test]
async fn hedged_reasoning_lands_inconclusive() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(
        fx.submission,
        "Is the statement true?",
        Some(QuestionType::SingleChoiceWithReasoning),
    )?;
    fx.store.upsert_answer(
        q,
        &serde_json::json!({"choice": "yes", "reasoning": "I'm not sure"}),
    )?;
    let judge = fx
        .store
        .create_judge("user-1", "truth", "The correct choice is yes.", "gpt-4o-mini")?;
    fx.store.assign(judge, q)?;

    // Scripted the way a live judge responds to a correct guess with hedging.
    let client = Arc::new(FakeJudgeClient::returning(
        r#"{"verdict": "inconclusive", "reasoning": "correct choice but the justification hedges"}"#,
    ));
    let runner = BatchRunner::new(fx.store.clone(), client);
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.inconclusive, 1);
    assert!(summary.results[0].success);
    assert_eq!(summary.results[0].verdict, Verdict::Inconclusive);

    Ok(())
}

#[tokio::test]
async fn provider_failure_is_absorbed_and_persisted() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(fx.submission, "Q?", None)?;
    let judge = fx
        .store
        .create_judge("user-1", "j", "rubric", "gpt-4o-mini")?;
    fx.store.assign(judge, q)?;

    let client = Arc::new(FailingJudgeClient::new("connection reset by peer"));
    let runner = BatchRunner::new(fx.store.clone(), client);
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    // batch-level success; the failure is visible only in the result entry
    assert!(summary.success);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.inconclusive, 1);
    let result = &summary.results[0];
    assert!(!result.success);
    assert_eq!(result.verdict, Verdict::Inconclusive);
    assert!(result
        .error
        .as_deref()
        .is_some_and(|e| e.contains("connection reset by peer")));

    let rows = evaluation_rows(&fx.store);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].2, "inconclusive");
    assert!(rows[0].3.starts_with("Error: "));
    assert!(rows[0].3.contains("connection reset by peer"));

    Ok(())
}

#[tokio::test]
async fn garbled_model_output_is_inconclusive_but_successful() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(fx.submission, "Q?", None)?;
    let judge = fx
        .store
        .create_judge("user-1", "j", "rubric", "gpt-4o-mini")?;
    fx.store.assign(judge, q)?;

    let client = Arc::new(FakeJudgeClient::returning("Sure! The answer looks good."));
    let runner = BatchRunner::new(fx.store.clone(), client);
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    assert_eq!(summary.inconclusive, 1);
    assert!(summary.results[0].success);

    let rows = evaluation_rows(&fx.store);
    assert_eq!(rows[0].3, "Failed to parse LLM response as JSON");

    Ok(())
}

#[tokio::test]
async fn workspace_without_assignments_is_empty_success() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    fx.store.insert_question(fx.submission, "Q?", None)?;

    let client = Arc::new(FakeJudgeClient::returning("{}"));
    let runner = BatchRunner::new(fx.store.clone(), client.clone());
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    assert!(summary.success);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.passed, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.inconclusive, 0);
    assert!(summary.results.is_empty());
    assert!(client.calls.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn foreign_judges_yield_empty_success() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(fx.submission, "Q?", None)?;
    let judge = fx
        .store
        .create_judge("someone-else", "j", "rubric", "gpt-4o-mini")?;
    fx.store.assign(judge, q)?;

    let client = Arc::new(FakeJudgeClient::returning("{}"));
    let runner = BatchRunner::new(fx.store.clone(), client.clone());
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    assert_eq!(summary.processed, 0);
    assert!(summary.results.is_empty());
    assert!(client.calls.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn empty_workspace_is_a_hard_failure() -> anyhow::Result<()> {
    let store = Store::memory()?;
    store.init_schema()?;
    let ws = store.create_workspace("user-1", "empty", true)?;

    let runner = BatchRunner::new(store.clone(), Arc::new(FakeJudgeClient::returning("{}")));
    let err = runner.run_workspace(ws, "user-1").await.unwrap_err();
    assert!(err.to_string().contains("no submissions"));

    // submissions without questions fail the same way
    store.insert_submission(ws, "empty-batch")?;
    let err = runner.run_workspace(ws, "user-1").await.unwrap_err();
    assert!(err.to_string().contains("no questions"));

    Ok(())
}

#[tokio::test]
async fn stale_evaluations_are_pruned_before_the_run() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(fx.submission, "Q1?", None)?;
    let j1 = fx
        .store
        .create_judge("user-1", "kept", "rubric", "gpt-4o-mini")?;
    let j2 = fx
        .store
        .create_judge("user-1", "removed", "rubric", "gpt-4o-mini")?;

    // both pairs were evaluated in a previous run
    fx.store.assign(j1, q)?;
    fx.store.assign(j2, q)?;
    fx.store
        .upsert_evaluation(q, j1, fx.submission, Verdict::Pass, "old")?;
    fx.store
        .upsert_evaluation(q, j2, fx.submission, Verdict::Fail, "old")?;

    // the second judge is no longer assigned
    fx.store.unassign(j2, q)?;

    let client = Arc::new(FakeJudgeClient::returning(
        r#"{"verdict": "pass", "reasoning": "fresh"}"#,
    ));
    let runner = BatchRunner::new(fx.store.clone(), client);
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;
    assert_eq!(summary.processed, 1);

    let rows = evaluation_rows(&fx.store);
    assert_eq!(rows.len(), 1, "stale (q, j2) evaluation must be deleted");
    assert_eq!(rows[0].0, q);
    assert_eq!(rows[0].1, j1);
    assert_eq!(rows[0].3, "fresh");

    Ok(())
}

#[tokio::test]
async fn unresolved_judges_are_skipped_not_fatal() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(fx.submission, "Q?", None)?;
    let mine = fx
        .store
        .create_judge("user-1", "mine", "rubric", "gpt-4o-mini")?;
    let foreign = fx
        .store
        .create_judge("someone-else", "foreign", "rubric", "gpt-4o-mini")?;
    fx.store.assign(mine, q)?;
    fx.store.assign(foreign, q)?;

    let client = Arc::new(FakeJudgeClient::returning(
        r#"{"verdict": "pass", "reasoning": "ok"}"#,
    ));
    let runner = BatchRunner::new(fx.store.clone(), client.clone());
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    // the foreign judge's assignment is skipped, the rest still runs
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.results[0].judge_id, mine);
    assert_eq!(client.calls.lock().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn mixed_batch_aggregates_per_verdict() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q1 = fx.store.insert_question(fx.submission, "Q1?", None)?;
    let q2 = fx.store.insert_question(fx.submission, "Q2?", None)?;
    let judge = fx
        .store
        .create_judge("user-1", "j", "rubric", "gpt-4o-mini")?;
    fx.store.assign(judge, q1)?;
    fx.store.assign(judge, q2)?;

    let client = Arc::new(FakeJudgeClient::sequence(vec![
        r#"{"verdict": "pass", "reasoning": "good"}"#.to_string(),
        r#"{"verdict": "fail", "reasoning": "bad"}"#.to_string(),
    ]));
    let runner = BatchRunner::new(fx.store.clone(), client);
    let summary = runner.run_workspace(fx.workspace, "user-1").await?;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(evaluation_rows(&fx.store).len(), 2);

    Ok(())
}

#[tokio::test]
async fn rerun_overwrites_instead_of_duplicating() -> anyhow::Result<()> {
    let fx = seed_workspace()?;
    let q = fx.store.insert_question(fx.submission, "Q?", None)?;
    let judge = fx
        .store
        .create_judge("user-1", "j", "rubric", "gpt-4o-mini")?;
    fx.store.assign(judge, q)?;

    let client = Arc::new(FakeJudgeClient::sequence(vec![
        r#"{"verdict": "fail", "reasoning": "first"}"#.to_string(),
        r#"{"verdict": "pass", "reasoning": "second"}"#.to_string(),
    ]));
    let runner = BatchRunner::new(fx.store.clone(), client);

    runner.run_workspace(fx.workspace, "user-1").await?;
    runner.run_workspace(fx.workspace, "user-1").await?;

    let rows = evaluation_rows(&fx.store);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].2, "pass");
    assert_eq!(rows[0].3, "second");

    Ok(())
}
