use crate::model::Verdict;

pub const PARSE_FAILURE_REASONING: &str = "Failed to parse LLM response as JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub verdict: Verdict,
    pub reasoning: String,
}

/// Total validator for raw model output. Anything that is not a JSON object
/// with a recognized verdict collapses to `Inconclusive`; this is the single
/// point that guarantees verdict safety downstream.
pub fn parse_judgement(content: &str) -> Judgement {
    let Ok(val) = serde_json::from_str::<serde_json::Value>(content) else {
        return Judgement {
            verdict: Verdict::Inconclusive,
            reasoning: PARSE_FAILURE_REASONING.to_string(),
        };
    };

    let verdict = val
        .get("verdict")
        .and_then(|v| v.as_str())
        .and_then(Verdict::parse)
        .unwrap_or(Verdict::Inconclusive);
    let reasoning = val
        .get("reasoning")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    Judgement { verdict, reasoning }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_is_inconclusive_with_fixed_reasoning() {
        let j = parse_judgement("the model rambled instead of emitting JSON");
        assert_eq!(j.verdict, Verdict::Inconclusive);
        assert_eq!(j.reasoning, PARSE_FAILURE_REASONING);
    }

    #[test]
    fn unknown_verdict_value_is_coerced() {
        let j = parse_judgement(r#"{"verdict": "definitely", "reasoning": "hmm"}"#);
        assert_eq!(j.verdict, Verdict::Inconclusive);
        assert_eq!(j.reasoning, "hmm");
    }

    #[test]
    fn missing_fields_default_safely() {
        let j = parse_judgement(r#"{}"#);
        assert_eq!(j.verdict, Verdict::Inconclusive);
        assert_eq!(j.reasoning, "");
    }

    #[test]
    fn non_string_verdict_is_coerced() {
        let j = parse_judgement(r#"{"verdict": true, "reasoning": "typed wrong"}"#);
        assert_eq!(j.verdict, Verdict::Inconclusive);
    }

    #[test]
    fn well_formed_verdicts_pass_through() {
        for (raw, expected) in [
            ("pass", Verdict::Pass),
            ("fail", Verdict::Fail),
            ("inconclusive", Verdict::Inconclusive),
        ] {
            let j = parse_judgement(&format!(
                r#"{{"verdict": "{}", "reasoning": "r"}}"#,
                raw
            ));
            assert_eq!(j.verdict, expected);
            assert_eq!(j.reasoning, "r");
        }
    }
}
