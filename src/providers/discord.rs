use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serenity::all::{
    ChannelId, Context, CreateAttachment, CreateEmbed, CreateMessage, CreateWebhook,
    EditWebhookMessage, EventHandler, ExecuteWebhook, GatewayIntents, Http, Message, MessageId,
    ReactionType, Ready, ShardMessenger, UserId, Webhook,
};
use serenity::collector::ReactionCollector;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info};

use crate::{
    core::{agent::TextGenerator, platform::ChatPlatform, runtime::Runtime},
    memory::PetStore,
    models::{ChannelRef, IdentityRef, MessageRef, PetCard},
    providers::image::ImageSource,
};

pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
}

/// A value that is swapped wholesale whenever the gateway hands out a new one.
pub struct Latest<T> {
    value: RwLock<T>,
}

impl<T: Clone> Latest<T> {
    pub fn new(value: T) -> Self {
        Self { value: RwLock::new(value) }
    }

    pub fn replace(&self, value: T) {
        match self.value.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    pub fn current(&self) -> T {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Whether a reaction came from someone who can play: a known user that is
/// neither this bot nor any other bot. The bot flag is only known when the
/// gateway attaches the member, which it does for guild reactions.
pub fn is_player(user_id: Option<UserId>, user_is_bot: Option<bool>, bot_id: UserId) -> bool {
    match user_id {
        Some(user) => user != bot_id && user_is_bot != Some(true),
        None => false,
    }
}

pub struct DiscordPlatform {
    http: Arc<Http>,
    shard: Latest<ShardMessenger>,
    bot_id: UserId,
    webhooks: Mutex<HashMap<u64, Webhook>>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>, shard: ShardMessenger, bot_id: UserId) -> Self {
        Self {
            http,
            shard: Latest::new(shard),
            bot_id,
            webhooks: Mutex::new(HashMap::new()),
        }
    }

    /// Points reaction collection at the shard from the most recent `ready`.
    pub fn refresh_shard(&self, shard: ShardMessenger) {
        self.shard.replace(shard);
    }

    fn webhook(&self, identity: &IdentityRef) -> Result<Webhook> {
        self.webhooks
            .lock()
            .map_err(|_| anyhow!("webhook registry poisoned"))?
            .get(&identity.id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown webhook {}", identity.id))
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn send_text(&self, channel: ChannelRef, content: &str) -> Result<()> {
        ChannelId::new(channel.0).say(&self.http, content).await?;
        Ok(())
    }

    async fn send_card(&self, channel: ChannelRef, card: PetCard) -> Result<()> {
        let mut embed = CreateEmbed::new()
            .title(card.title)
            .description(card.description)
            .colour(card.colour)
            .field(card.field_name, card.field_value, false);
        let mut builder = CreateMessage::new();

        if let Some(image) = card.image {
            embed = embed.image(format!("attachment://{}", image.filename));
            builder = builder.add_file(CreateAttachment::bytes(image.bytes.to_vec(), image.filename));
        }

        ChannelId::new(channel.0)
            .send_message(&self.http, builder.embed(embed))
            .await?;
        Ok(())
    }

    async fn create_identity(
        &self,
        channel: ChannelRef,
        name: &str,
        avatar: Option<Bytes>,
    ) -> Result<IdentityRef> {
        let mut builder = CreateWebhook::new(name);
        if let Some(avatar) = avatar {
            let attachment = CreateAttachment::bytes(avatar.to_vec(), "avatar.png");
            builder = builder.avatar(&attachment);
        }

        let webhook = ChannelId::new(channel.0)
            .create_webhook(&self.http, builder)
            .await?;
        let identity = IdentityRef { id: webhook.id.get() };

        self.webhooks
            .lock()
            .map_err(|_| anyhow!("webhook registry poisoned"))?
            .insert(identity.id, webhook);
        Ok(identity)
    }

    async fn send_as(&self, identity: &IdentityRef, username: &str, content: &str) -> Result<MessageRef> {
        let webhook = self.webhook(identity)?;
        let builder = ExecuteWebhook::new().content(content).username(username);

        let message = webhook
            .execute(&self.http, true, builder)
            .await?
            .ok_or_else(|| anyhow!("webhook {} returned no message", identity.id))?;

        Ok(MessageRef {
            channel: ChannelRef(message.channel_id.get()),
            id: message.id.get(),
        })
    }

    async fn edit_as(&self, identity: &IdentityRef, message: &MessageRef, content: &str) -> Result<()> {
        let webhook = self.webhook(identity)?;
        webhook
            .edit_message(
                &self.http,
                MessageId::new(message.id),
                EditWebhookMessage::new().content(content),
            )
            .await?;
        Ok(())
    }

    async fn delete_identity(&self, identity: &IdentityRef) -> Result<()> {
        let webhook = self.webhook(identity)?;
        webhook.delete(&self.http).await?;

        self.webhooks
            .lock()
            .map_err(|_| anyhow!("webhook registry poisoned"))?
            .remove(&identity.id);
        Ok(())
    }

    async fn add_reaction(&self, message: &MessageRef, emoji: &str) -> Result<()> {
        ChannelId::new(message.channel.0)
            .create_reaction(
                &self.http,
                MessageId::new(message.id),
                ReactionType::Unicode(emoji.to_string()),
            )
            .await?;
        Ok(())
    }

    async fn await_reaction(&self, message: &MessageRef, timeout: Duration) -> Result<Option<String>> {
        let bot_id = self.bot_id;
        let reaction = ReactionCollector::new(self.shard.current())
            .message_id(MessageId::new(message.id))
            .timeout(timeout)
            .filter(move |reaction| {
                let user_is_bot = reaction.member.as_ref().map(|member| member.user.bot);
                is_player(reaction.user_id, user_is_bot, bot_id)
            })
            .next()
            .await;

        Ok(reaction.map(|reaction| reaction.emoji.to_string()))
    }

    async fn clear_reactions(&self, message: &MessageRef) -> Result<()> {
        ChannelId::new(message.channel.0)
            .delete_reactions(&self.http, MessageId::new(message.id))
            .await?;
        Ok(())
    }
}

/// Gateway event handler. The runtime is built on the first `ready`, once
/// the shard messenger needed for reaction collection exists. Later `ready`
/// events only refresh that messenger.
pub struct PetHandler {
    writer: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageSource>,
    store: Arc<AsyncMutex<PetStore>>,
    platform: OnceLock<Arc<DiscordPlatform>>,
    runtime: OnceLock<Runtime>,
}

impl PetHandler {
    pub fn new(writer: Arc<dyn TextGenerator>, images: Arc<dyn ImageSource>) -> Self {
        Self {
            writer,
            images,
            store: Arc::new(AsyncMutex::new(PetStore::new())),
            platform: OnceLock::new(),
            runtime: OnceLock::new(),
        }
    }
}

#[serenity::async_trait]
impl EventHandler for PetHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);

        let mut fresh = false;
        let platform = self.platform.get_or_init(|| {
            fresh = true;
            Arc::new(DiscordPlatform::new(ctx.http.clone(), ctx.shard.clone(), ready.user.id))
        });
        if !fresh {
            // A re-identify replaces the shard runner behind the old messenger
            platform.refresh_shard(ctx.shard.clone());
            info!("Refreshed shard messenger after reconnect");
        }

        if self.runtime.get().is_some() {
            return;
        }
        let runtime = Runtime::new(
            Arc::clone(platform) as Arc<dyn ChatPlatform>,
            Arc::clone(&self.writer),
            Arc::clone(&self.images),
            Arc::clone(&self.store),
        );

        // Only the first `ready` starts the loop
        if self.runtime.set(runtime.clone()).is_ok() {
            tokio::spawn(runtime.run_scheduler());
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(runtime) = self.runtime.get() else {
            return;
        };

        let from_bot = msg.author.bot || msg.webhook_id.is_some();
        let channel = ChannelRef(msg.channel_id.get());
        if let Err(e) = runtime.handle_message(channel, from_bot, &msg.content).await {
            error!("Error handling message {:?}: {:#}", msg.content, e);
        }
    }
}
