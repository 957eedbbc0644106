use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use crate::models::{ChannelRef, IdentityRef, MessageRef, PetCard};

/// The chat operations the pet needs. The Discord implementation lives in
/// `providers::discord`; tests use an in-memory recorder.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_text(&self, channel: ChannelRef, content: &str) -> Result<()>;

    async fn send_card(&self, channel: ChannelRef, card: PetCard) -> Result<()>;

    async fn create_identity(
        &self,
        channel: ChannelRef,
        name: &str,
        avatar: Option<Bytes>,
    ) -> Result<IdentityRef>;

    async fn send_as(&self, identity: &IdentityRef, username: &str, content: &str) -> Result<MessageRef>;

    async fn edit_as(&self, identity: &IdentityRef, message: &MessageRef, content: &str) -> Result<()>;

    async fn delete_identity(&self, identity: &IdentityRef) -> Result<()>;

    async fn add_reaction(&self, message: &MessageRef, emoji: &str) -> Result<()>;

    /// First reaction on `message` from anyone but the bot, or `None` once
    /// `timeout` elapses.
    async fn await_reaction(&self, message: &MessageRef, timeout: Duration) -> Result<Option<String>>;

    async fn clear_reactions(&self, message: &MessageRef) -> Result<()>;
}
