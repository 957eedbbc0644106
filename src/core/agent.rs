use async_trait::async_trait;
use rig::agent::Agent as RigAgent;
use rig::completion::Prompt;
use rig::providers::gemini::{self, completion::CompletionModel};
use std::time::Duration;
use tracing::debug;

/// Anything that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, anyhow::Error>;
}

pub struct Agent {
    agent: RigAgent<CompletionModel>,
    timeout: Duration,
}

impl Agent {
    pub fn new(gemini_api_key: &str, model: &str, timeout: Duration) -> Self {
        let client = gemini::Client::new(gemini_api_key);
        let temperature = 0.9;

        let agent = client
            .agent(model)
            .temperature(temperature)
            .build();
        Agent { agent, timeout }
    }
}

#[async_trait]
impl TextGenerator for Agent {
    async fn generate(&self, prompt: &str) -> Result<String, anyhow::Error> {
        let response = tokio::time::timeout(self.timeout, self.agent.prompt(prompt))
            .await
            .map_err(|_| anyhow::anyhow!("text generation timed out after {:?}", self.timeout))??;

        let text = response.trim().to_string();
        debug!(chars = text.chars().count(), "generated text");
        Ok(text)
    }
}
