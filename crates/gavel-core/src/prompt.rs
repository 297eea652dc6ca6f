use crate::model::QuestionType;

const RESPONSE_CONTRACT: &str = "Respond with a JSON object with exactly two fields: \
\"verdict\" (one of \"pass\", \"fail\", \"inconclusive\") and \"reasoning\" (free text \
explaining the verdict).";

/// Builds the user instruction for one (question, answer) pair. Dispatch on
/// the question type is exhaustive; untyped questions get the generic arm
/// with no extraction guidance.
pub fn build_instruction(
    qtype: Option<QuestionType>,
    question: &str,
    answer: Option<&serde_json::Value>,
) -> String {
    let answer_json = match answer {
        Some(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| "null".to_string()),
        None => "null".to_string(),
    };

    let rules = match qtype {
        Some(QuestionType::MultipleChoice) => {
            "The submitted answer is a JSON object; the selected option(s) are in its \
             \"choice\", \"label\" or \"choices\" field. Extract the selection and compare it \
             against the correct answer defined by your grading criteria. Grade strictly \
             binary: \"pass\" if the selection is correct, \"fail\" otherwise."
        }
        Some(QuestionType::SingleChoiceWithReasoning) => {
            "The submitted answer is a JSON object containing both a selected choice (in a \
             \"choice\" or \"label\" field) and a free-text justification. Extract both. The \
             two must agree: if the choice is correct but the justification contradicts it or \
             expresses uncertainty or hedging, answer \"inconclusive\" rather than \"pass\"; \
             a correct selection without sound reasoning signals a guess."
        }
        Some(QuestionType::FreeForm) => {
            "The submitted answer's free text is in its \"text\" or \"content\" field. Judge \
             it qualitatively against your grading criteria; there is no single correct \
             answer to compare against."
        }
        None => "Judge the submitted answer against your grading criteria.",
    };

    format!(
        "Question:\n{}\n\nSubmitted answer (JSON):\n{}\n\n{}\n\n{}",
        question, answer_json, rules, RESPONSE_CONTRACT
    )
}
