//! Shared test doubles for the agent tests.

use async_trait::async_trait;
use finagent_core::{AgentContext, Delivery, Envelope};
use finagent_llm::{GenerationRequest, TextGenerator};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Generator that replays scripted replies in order, repeating the last
/// one when the script runs out. Every request is recorded so tests can
/// assert on prompts and temperatures.
pub struct ScriptedGenerator {
    replies: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Stored reversed so pop() hands replies out in script order.
        let mut replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Generator that always answers with the same text.
    pub fn plain(reply: impl Into<String>) -> Arc<Self> {
        Self::new([reply.into()])
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> finagent_llm::Result<String> {
        self.requests.lock().unwrap().push(request);
        let mut replies = self.replies.lock().unwrap();
        match replies.len() {
            0 => Ok(String::new()),
            1 => Ok(replies[0].clone()),
            _ => Ok(replies.pop().unwrap()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Bus double that records every envelope and answers with a fixed reply.
pub struct CapturingBus {
    pub seen: Mutex<Vec<Envelope>>,
    reply: Value,
}

impl CapturingBus {
    pub fn new() -> Arc<Self> {
        Self::with_reply(json!({"status": "ok"}))
    }

    pub fn with_reply(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            reply,
        })
    }

    pub fn envelopes(&self) -> Vec<Envelope> {
        self.seen.lock().unwrap().clone()
    }

    pub fn sent_to(&self, receiver: &str) -> Vec<Envelope> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.receiver == receiver)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Delivery for CapturingBus {
    async fn deliver(&self, envelope: Envelope) -> Value {
        self.seen.lock().unwrap().push(envelope);
        self.reply.clone()
    }
}

/// Context with no bus attached; sends degrade per the core contract.
pub fn detached(name: &str, generator: Arc<dyn TextGenerator>) -> AgentContext {
    AgentContext::new(name, "test-model", generator)
}

/// Context wired to a capturing bus.
pub fn wired(name: &str, generator: Arc<dyn TextGenerator>, bus: &Arc<CapturingBus>) -> AgentContext {
    let delivery: Arc<dyn Delivery> = bus.clone();
    AgentContext::new(name, "test-model", generator).with_bus(&delivery)
}
