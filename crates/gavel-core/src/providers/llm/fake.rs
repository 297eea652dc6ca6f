use super::LlmClient;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic in-memory client for engine tests. Replays scripted content
/// and records every instruction it receives.
pub struct FakeJudgeClient {
    responses: Mutex<VecDeque<String>>,
    fallback: String,
    pub calls: Mutex<Vec<String>>,
}

impl FakeJudgeClient {
    /// Same content for every call.
    pub fn returning(content: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: content.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scripted sequence; the last entry repeats once the queue drains.
    pub fn sequence(contents: Vec<String>) -> Self {
        let fallback = contents.last().cloned().unwrap_or_default();
        Self {
            responses: Mutex::new(contents.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for FakeJudgeClient {
    async fn judge(
        &self,
        _model: &str,
        _system_prompt: &str,
        instruction: &str,
    ) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(instruction.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Always fails; exercises the error-absorption path.
pub struct FailingJudgeClient {
    pub message: String,
}

impl FailingJudgeClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl LlmClient for FailingJudgeClient {
    async fn judge(
        &self,
        _model: &str,
        _system_prompt: &str,
        _instruction: &str,
    ) -> anyhow::Result<String> {
        anyhow::bail!("{}", self.message)
    }

    fn provider_name(&self) -> &'static str {
        "fake-failing"
    }
}
