use async_trait::async_trait;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One grading round trip: system prompt is the judge's rubric, the
    /// instruction is the built per-question prompt. Returns the raw content
    /// string; callers validate it into a verdict.
    async fn judge(
        &self,
        model: &str,
        system_prompt: &str,
        instruction: &str,
    ) -> anyhow::Result<String>;

    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod openai;
