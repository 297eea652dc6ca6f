use crate::model::{
    Assignment, EvaluationRow, Judge, QuestionRecord, QuestionType, Submission, Verdict, Workspace,
};
use anyhow::Context;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    // --- workspaces ---

    pub fn create_workspace(
        &self,
        owner_id: &str,
        name: &str,
        temporary: bool,
    ) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO workspaces(owner_id, name, temporary, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, name, temporary as i64, now_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_workspace(&self, id: i64) -> anyhow::Result<Option<Workspace>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, temporary, created_at FROM workspaces WHERE id=?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Workspace {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                temporary: row.get::<_, i64>(3)? != 0,
                created_at: row.get(4)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Names a workspace and clears its temporary flag. Owner-scoped; returns
    /// false when no row matched (unknown id or foreign owner).
    pub fn save_workspace(&self, id: i64, owner_id: &str, name: &str) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE workspaces SET name=?1, temporary=0 WHERE id=?2 AND owner_id=?3",
            params![name, id, owner_id],
        )?;
        Ok(n > 0)
    }

    /// Cascades through submissions, questions, answers and evaluations.
    pub fn delete_workspace(&self, id: i64, owner_id: &str) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM workspaces WHERE id=?1 AND owner_id=?2",
            params![id, owner_id],
        )?;
        Ok(n > 0)
    }

    pub fn list_workspaces(&self, owner_id: &str) -> anyhow::Result<Vec<Workspace>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, temporary, created_at FROM workspaces
             WHERE owner_id=?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok(Workspace {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                temporary: row.get::<_, i64>(3)? != 0,
                created_at: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // --- submissions ---

    pub fn insert_submission(&self, workspace_id: i64, label: &str) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO submissions(workspace_id, label, created_at) VALUES (?1, ?2, ?3)",
            params![workspace_id, label, now_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn submissions_for_workspace(&self, workspace_id: i64) -> anyhow::Result<Vec<Submission>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, label, created_at FROM submissions
             WHERE workspace_id=?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(Submission {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                label: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // --- questions & answers ---

    pub fn insert_question(
        &self,
        submission_id: i64,
        text: &str,
        qtype: Option<QuestionType>,
    ) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO questions(submission_id, text, qtype) VALUES (?1, ?2, ?3)",
            params![submission_id, text, qtype.map(|t| t.as_str())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn upsert_answer(
        &self,
        question_id: i64,
        payload: &serde_json::Value,
    ) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO answers(question_id, payload_json) VALUES (?1, ?2)
             ON CONFLICT(question_id) DO UPDATE SET payload_json=excluded.payload_json",
            params![question_id, serde_json::to_string(payload)?],
        )?;
        Ok(())
    }

    /// Questions across the given submissions, each joined with its answer
    /// payload. A question without an answer comes back with `answer: None`.
    pub fn questions_for_submissions(
        &self,
        submission_ids: &[i64],
    ) -> anyhow::Result<Vec<QuestionRecord>> {
        if submission_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT q.id, q.submission_id, q.text, q.qtype, a.payload_json
             FROM questions q LEFT JOIN answers a ON a.question_id = q.id
             WHERE q.submission_id IN ({})
             ORDER BY q.id ASC",
            placeholders(submission_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(submission_ids.iter().copied()), |row| {
            let qtype: Option<String> = row.get(3)?;
            let payload: Option<String> = row.get(4)?;
            Ok(QuestionRecord {
                id: row.get(0)?,
                submission_id: row.get(1)?,
                text: row.get(2)?,
                qtype: qtype.as_deref().and_then(QuestionType::parse),
                answer: payload.and_then(|s| serde_json::from_str(&s).ok()),
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // --- judges ---

    pub fn create_judge(
        &self,
        owner_id: &str,
        name: &str,
        system_prompt: &str,
        model: &str,
    ) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO judges(owner_id, name, system_prompt, model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![owner_id, name, system_prompt, model, now_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn judges_for_owner(&self, owner_id: &str) -> anyhow::Result<Vec<Judge>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, system_prompt, model, created_at FROM judges
             WHERE owner_id=?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![owner_id], map_judge)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Resolves the given judge ids, keeping only those owned by the caller.
    pub fn judges_by_ids(&self, owner_id: &str, ids: &[i64]) -> anyhow::Result<Vec<Judge>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT id, owner_id, name, system_prompt, model, created_at FROM judges
             WHERE owner_id=? AND id IN ({})
             ORDER BY id ASC",
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut bind: Vec<rusqlite::types::Value> =
            vec![rusqlite::types::Value::Text(owner_id.to_string())];
        bind.extend(ids.iter().map(|id| rusqlite::types::Value::Integer(*id)));
        let rows = stmt.query_map(params_from_iter(bind), map_judge)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn delete_judge(&self, id: i64, owner_id: &str) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM judges WHERE id=?1 AND owner_id=?2",
            params![id, owner_id],
        )?;
        Ok(n > 0)
    }

    // --- assignments ---

    pub fn assign(&self, judge_id: i64, question_id: i64) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO assignments(judge_id, question_id) VALUES (?1, ?2)
             ON CONFLICT(judge_id, question_id) DO NOTHING",
            params![judge_id, question_id],
        )?;
        Ok(())
    }

    pub fn unassign(&self, judge_id: i64, question_id: i64) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM assignments WHERE judge_id=?1 AND question_id=?2",
            params![judge_id, question_id],
        )?;
        Ok(n > 0)
    }

    pub fn assignments_for_questions(
        &self,
        question_ids: &[i64],
    ) -> anyhow::Result<Vec<Assignment>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT judge_id, question_id FROM assignments
             WHERE question_id IN ({})
             ORDER BY question_id ASC, judge_id ASC",
            placeholders(question_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(question_ids.iter().copied()), |row| {
            Ok(Assignment {
                judge_id: row.get(0)?,
                question_id: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // --- evaluations ---

    /// Idempotent write: the conflict target is the unique (question, judge)
    /// pair, so a re-run overwrites instead of duplicating.
    pub fn upsert_evaluation(
        &self,
        question_id: i64,
        judge_id: i64,
        submission_id: i64,
        verdict: Verdict,
        reasoning: &str,
    ) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO evaluations(question_id, judge_id, submission_id, verdict, reasoning, evaluated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(question_id, judge_id) DO UPDATE SET
                submission_id=excluded.submission_id,
                verdict=excluded.verdict,
                reasoning=excluded.reasoning,
                evaluated_at=excluded.evaluated_at",
            params![
                question_id,
                judge_id,
                submission_id,
                verdict.as_str(),
                reasoning,
                now_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn evaluations_for_questions(
        &self,
        question_ids: &[i64],
    ) -> anyhow::Result<Vec<EvaluationRow>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT id, question_id, judge_id FROM evaluations
             WHERE question_id IN ({})
             ORDER BY id ASC",
            placeholders(question_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(question_ids.iter().copied()), |row| {
            Ok(EvaluationRow {
                id: row.get(0)?,
                question_id: row.get(1)?,
                judge_id: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn delete_evaluations(&self, row_ids: &[i64]) -> anyhow::Result<()> {
        if row_ids.is_empty() {
            return Ok(());
        }
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "DELETE FROM evaluations WHERE id IN ({})",
            placeholders(row_ids.len())
        );
        conn.execute(&sql, params_from_iter(row_ids.iter().copied()))?;
        Ok(())
    }
}

fn map_judge(row: &rusqlite::Row<'_>) -> rusqlite::Result<Judge> {
    Ok(Judge {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        system_prompt: row.get(3)?,
        model: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
