use serde::{Deserialize, Serialize};

/// Outcome of one judge grading one question. `Inconclusive` covers
/// ambiguity, contradictions and pipeline failures alike.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    Inconclusive,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Inconclusive => "inconclusive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pass" => Some(Verdict::Pass),
            "fail" => Some(Verdict::Fail),
            "inconclusive" => Some(Verdict::Inconclusive),
            _ => None,
        }
    }
}

/// Closed set of question shapes the prompt builder dispatches on. Untyped
/// questions carry `None` and get the generic instruction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    SingleChoiceWithReasoning,
    FreeForm,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::SingleChoiceWithReasoning => "single_choice_with_reasoning",
            QuestionType::FreeForm => "free_form",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            "single_choice_with_reasoning" => Some(QuestionType::SingleChoiceWithReasoning),
            "free_form" => Some(QuestionType::FreeForm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub temporary: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub workspace_id: i64,
    pub label: String,
    pub created_at: String,
}

/// A question joined with its (at most one) answer payload. The payload is
/// arbitrary JSON whose shape depends on the question type; a missing answer
/// is `None`, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub submission_id: i64,
    pub text: String,
    pub qtype: Option<QuestionType>,
    pub answer: Option<serde_json::Value>,
}

/// A stored (name, rubric, model) triple. Judges are owned by a user and
/// shared across that user's workspaces; they carry no evaluation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judge {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub system_prompt: String,
    pub model: String,
    pub created_at: String,
}

/// Declared obligation: this judge grades this question. Unique per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub judge_id: i64,
    pub question_id: i64,
}

/// Identity of a persisted evaluation row, used by reconciliation to prune
/// results whose assignment no longer exists.
#[derive(Debug, Clone)]
pub struct EvaluationRow {
    pub id: i64,
    pub question_id: i64,
    pub judge_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    #[serde(rename = "questionId")]
    pub question_id: i64,
    #[serde(rename = "judgeId")]
    pub judge_id: i64,
    pub verdict: Verdict,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub success: bool,
    pub processed: usize,
    pub passed: usize,
    pub failed: usize,
    pub inconclusive: usize,
    pub results: Vec<EvaluationResult>,
}

impl BatchSummary {
    pub fn empty() -> Self {
        Self {
            success: true,
            processed: 0,
            passed: 0,
            failed: 0,
            inconclusive: 0,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, result: EvaluationResult) {
        self.processed += 1;
        match result.verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
            Verdict::Inconclusive => self.inconclusive += 1,
        }
        self.results.push(result);
    }
}
