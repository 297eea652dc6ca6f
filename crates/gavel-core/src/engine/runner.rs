use crate::model::{
    Assignment, BatchSummary, EvaluationResult, Judge, QuestionRecord, Verdict,
};
use crate::prompt;
use crate::providers::llm::LlmClient;
use crate::storage::Store;
use crate::validate;
use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub struct BatchRunner {
    pub store: Store,
    pub client: Arc<dyn LlmClient>,
}

impl BatchRunner {
    pub fn new(store: Store, client: Arc<dyn LlmClient>) -> Self {
        Self { store, client }
    }

    /// Runs every (judge, question) assignment in the workspace, scoped to
    /// judges owned by `user_id`. Structural problems (no submissions, no
    /// questions) are errors; an empty assignment or judge set is a trivially
    /// successful run. Per-assignment failures never abort the batch.
    pub async fn run_workspace(
        &self,
        workspace_id: i64,
        user_id: &str,
    ) -> anyhow::Result<BatchSummary> {
        let submissions = self.store.submissions_for_workspace(workspace_id)?;
        if submissions.is_empty() {
            anyhow::bail!("no submissions found in workspace {}", workspace_id);
        }

        let submission_ids: Vec<i64> = submissions.iter().map(|s| s.id).collect();
        let questions = self.store.questions_for_submissions(&submission_ids)?;
        if questions.is_empty() {
            anyhow::bail!("no questions found in workspace {}", workspace_id);
        }

        let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let assignments = self.store.assignments_for_questions(&question_ids)?;
        if assignments.is_empty() {
            tracing::info!(workspace_id, "no assignments configured; nothing to evaluate");
            return Ok(BatchSummary::empty());
        }

        let judge_ids: Vec<i64> = {
            let mut seen = HashSet::new();
            assignments
                .iter()
                .map(|a| a.judge_id)
                .filter(|id| seen.insert(*id))
                .collect()
        };
        let judges = self.store.judges_by_ids(user_id, &judge_ids)?;
        if judges.is_empty() {
            tracing::info!(
                workspace_id,
                user_id,
                "no judges owned by caller; nothing to evaluate"
            );
            return Ok(BatchSummary::empty());
        }

        // Prune before processing so the final state always matches the
        // current assignment set, even when this run writes nothing new.
        self.reconcile_evaluations(&question_ids, &assignments)?;

        let judges_by_id: HashMap<i64, Judge> =
            judges.into_iter().map(|j| (j.id, j)).collect();
        let questions_by_id: HashMap<i64, QuestionRecord> =
            questions.into_iter().map(|q| (q.id, q)).collect();

        tracing::info!(
            workspace_id,
            assignments = assignments.len(),
            "starting batch evaluation"
        );

        // Strictly sequential: one outbound call at a time bounds the
        // provider rate and keeps the log order deterministic.
        let mut summary = BatchSummary::empty();
        for assignment in &assignments {
            let Some(judge) = judges_by_id.get(&assignment.judge_id) else {
                tracing::warn!(
                    judge_id = assignment.judge_id,
                    question_id = assignment.question_id,
                    "skipping assignment: judge not resolved"
                );
                continue;
            };
            let Some(question) = questions_by_id.get(&assignment.question_id) else {
                tracing::warn!(
                    judge_id = assignment.judge_id,
                    question_id = assignment.question_id,
                    "skipping assignment: question not resolved"
                );
                continue;
            };
            let result = self.evaluate_assignment(judge, question).await;
            summary.record(result);
        }

        tracing::info!(
            workspace_id,
            processed = summary.processed,
            passed = summary.passed,
            failed = summary.failed,
            inconclusive = summary.inconclusive,
            "batch evaluation finished"
        );
        Ok(summary)
    }

    /// Deletes evaluation rows for these questions whose (question, judge)
    /// pair is absent from the current assignment set.
    fn reconcile_evaluations(
        &self,
        question_ids: &[i64],
        assignments: &[Assignment],
    ) -> anyhow::Result<()> {
        let current: HashSet<(i64, i64)> = assignments
            .iter()
            .map(|a| (a.question_id, a.judge_id))
            .collect();
        let existing = self.store.evaluations_for_questions(question_ids)?;
        let stale: Vec<i64> = existing
            .iter()
            .filter(|e| !current.contains(&(e.question_id, e.judge_id)))
            .map(|e| e.id)
            .collect();
        if !stale.is_empty() {
            tracing::info!(count = stale.len(), "pruning evaluations for removed assignments");
            self.store.delete_evaluations(&stale)?;
        }
        Ok(())
    }

    /// Evaluates one (judge, question) pair. Never errors: any failure in the
    /// prompt/call/validate/persist chain is downgraded to an inconclusive
    /// evaluation with the error preserved as reasoning.
    pub async fn evaluate_assignment(
        &self,
        judge: &Judge,
        question: &QuestionRecord,
    ) -> EvaluationResult {
        match self.evaluate_inner(judge, question).await {
            Ok(verdict) => EvaluationResult {
                question_id: question.id,
                judge_id: judge.id,
                verdict,
                success: true,
                error: None,
            },
            Err(e) => {
                let message = format!("{:#}", e);
                let reasoning = format!("Error: {}", message);
                if let Err(save_err) = self.store.upsert_evaluation(
                    question.id,
                    judge.id,
                    question.submission_id,
                    Verdict::Inconclusive,
                    &reasoning,
                ) {
                    tracing::warn!(
                        question_id = question.id,
                        judge_id = judge.id,
                        error = %save_err,
                        "failed to persist fallback evaluation"
                    );
                }
                EvaluationResult {
                    question_id: question.id,
                    judge_id: judge.id,
                    verdict: Verdict::Inconclusive,
                    success: false,
                    error: Some(message),
                }
            }
        }
    }

    async fn evaluate_inner(
        &self,
        judge: &Judge,
        question: &QuestionRecord,
    ) -> anyhow::Result<Verdict> {
        let instruction =
            prompt::build_instruction(question.qtype, &question.text, question.answer.as_ref());
        let content = self
            .client
            .judge(&judge.model, &judge.system_prompt, &instruction)
            .await?;
        let judgement = validate::parse_judgement(&content);
        self.store
            .upsert_evaluation(
                question.id,
                judge.id,
                question.submission_id,
                judgement.verdict,
                &judgement.reasoning,
            )
            .context("failed to persist evaluation")?;
        Ok(judgement.verdict)
    }
}
