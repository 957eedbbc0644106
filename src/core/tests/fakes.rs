// In-memory collaborators for driving the runtime without Discord or the
// generation services.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::agent::TextGenerator;
use crate::core::platform::ChatPlatform;
use crate::models::{ChannelRef, IdentityRef, MessageRef, PetCard};
use crate::providers::image::ImageSource;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Text { channel: ChannelRef, content: String },
    Card { channel: ChannelRef, title: String, description: String, field_value: String, image: Option<String> },
    CreateIdentity { channel: ChannelRef, name: String, has_avatar: bool },
    SendAs { identity: u64, username: String, content: String },
    Edit { identity: u64, message: u64, content: String },
    DeleteIdentity { identity: u64 },
    React { message: u64, emoji: String },
    ClearReactions { message: u64 },
}

#[derive(Default)]
pub struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    identities: Mutex<HashMap<u64, ChannelRef>>,
    pub reaction: Option<String>,
}

impl FakePlatform {
    pub fn reacting(emoji: &str) -> Self {
        FakePlatform {
            reaction: Some(emoji.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn send_text(&self, channel: ChannelRef, content: &str) -> Result<()> {
        self.record(Call::Text { channel, content: content.to_string() });
        Ok(())
    }

    async fn send_card(&self, channel: ChannelRef, card: PetCard) -> Result<()> {
        self.record(Call::Card {
            channel,
            title: card.title,
            description: card.description,
            field_value: card.field_value,
            image: card.image.map(|image| image.filename),
        });
        Ok(())
    }

    async fn create_identity(&self, channel: ChannelRef, name: &str, avatar: Option<Bytes>) -> Result<IdentityRef> {
        self.record(Call::CreateIdentity {
            channel,
            name: name.to_string(),
            has_avatar: avatar.is_some(),
        });
        let identity = IdentityRef { id: self.next_id() };
        self.identities.lock().unwrap().insert(identity.id, channel);
        Ok(identity)
    }

    async fn send_as(&self, identity: &IdentityRef, username: &str, content: &str) -> Result<MessageRef> {
        self.record(Call::SendAs {
            identity: identity.id,
            username: username.to_string(),
            content: content.to_string(),
        });
        let channel = self.identities.lock().unwrap()[&identity.id];
        Ok(MessageRef { channel, id: self.next_id() })
    }

    async fn edit_as(&self, identity: &IdentityRef, message: &MessageRef, content: &str) -> Result<()> {
        self.record(Call::Edit {
            identity: identity.id,
            message: message.id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn delete_identity(&self, identity: &IdentityRef) -> Result<()> {
        self.record(Call::DeleteIdentity { identity: identity.id });
        Ok(())
    }

    async fn add_reaction(&self, message: &MessageRef, emoji: &str) -> Result<()> {
        self.record(Call::React { message: message.id, emoji: emoji.to_string() });
        Ok(())
    }

    async fn await_reaction(&self, _message: &MessageRef, _timeout: Duration) -> Result<Option<String>> {
        Ok(self.reaction.clone())
    }

    async fn clear_reactions(&self, message: &MessageRef) -> Result<()> {
        self.record(Call::ClearReactions { message: message.id });
        Ok(())
    }
}

/// Answers the n-th prompt with `text n`. `fail_at` makes that call error.
#[derive(Default)]
pub struct FakeWriter {
    prompts: Mutex<Vec<String>>,
    pub fail_at: Option<usize>,
}

impl FakeWriter {
    pub fn failing_at(index: usize) -> Self {
        FakeWriter {
            fail_at: Some(index),
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeWriter {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut prompts = self.prompts.lock().unwrap();
        let index = prompts.len();
        prompts.push(prompt.to_string());
        if self.fail_at == Some(index) {
            return Err(anyhow!("generation unavailable"));
        }
        Ok(format!("text {}", index))
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub image: Option<Bytes>,
    requests: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn returning(bytes: &'static [u8]) -> Self {
        FakeImages {
            image: Some(Bytes::from_static(bytes)),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn fetch_image(&self, prompt: &str) -> Result<Option<Bytes>> {
        self.requests.lock().unwrap().push(prompt.to_string());
        Ok(self.image.clone())
    }
}
