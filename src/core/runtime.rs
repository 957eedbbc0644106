use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{
    character::{
        ball_reply, describe_prompt, place_prompt, released_notice, PetCharacter, ADOPT_USAGE,
        BALLS, BALL_TIMEOUT_REPLY, BAD_MOOD_COLOUR, GIFT_COLOUR, NOT_ADOPTED_NOTICE,
        SEARCHING_NOTICE, TEST_REPLY,
    },
    core::{
        agent::TextGenerator,
        command::Command,
        platform::ChatPlatform,
        scheduler::{collect_due, draw_due, BAD_MOOD_WINDOW, GIFT_WINDOW, TICK_INTERVAL},
    },
    memory::PetStore,
    models::{BallMood, ChannelRef, IdentityRef, Pet, PetCard, PetEvent},
    providers::image::ImageSource,
};

pub const IDENTITY_NAME: &str = "PET_Webhook";
pub const BALL_WAIT: Duration = Duration::from_secs(10);

/// Owns the pet state and every collaborator the handlers talk to. Cloning
/// is cheap and shares the same pet.
#[derive(Clone)]
pub struct Runtime {
    platform: Arc<dyn ChatPlatform>,
    writer: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageSource>,
    store: Arc<Mutex<PetStore>>,
}

impl Runtime {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        writer: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageSource>,
        store: Arc<Mutex<PetStore>>,
    ) -> Self {
        Runtime {
            platform,
            writer,
            images,
            store,
        }
    }

    pub fn store(&self) -> Arc<Mutex<PetStore>> {
        Arc::clone(&self.store)
    }

    /// Runs for the lifetime of the session.
    pub async fn run_scheduler(self) {
        info!("Scheduler started, ticking every {:?}", TICK_INTERVAL);
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            for event in self.tick(Utc::now()).await {
                self.dispatch(event);
            }
        }
    }

    /// One scheduler evaluation. Deadlines that fired are already redrawn
    /// when this returns.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<PetEvent> {
        let mut store = self.store.lock().await;
        if let Some(pet) = store.pet() {
            debug!(pet = %pet.name, gift_due = %pet.gift_due, bad_mood_due = %pet.bad_mood_due, "tick");
        }
        collect_due(&mut store, now, &mut rand::thread_rng())
    }

    /// Fire-and-forget: the handler runs on its own task and failures are
    /// only logged.
    pub fn dispatch(&self, event: PetEvent) -> JoinHandle<()> {
        let runtime = self.clone();
        tokio::spawn(async move {
            if let Err(e) = runtime.handle_event(event).await {
                error!("Error handling {} event: {:#}", event, e);
            }
        })
    }

    pub async fn handle_event(&self, event: PetEvent) -> Result<()> {
        match event {
            PetEvent::Gift => self.on_gift().await,
            PetEvent::BadMood => self.on_bad_mood().await,
        }
    }

    pub async fn handle_message(&self, channel: ChannelRef, from_bot: bool, content: &str) -> Result<()> {
        if from_bot {
            return Ok(());
        }
        let Some(command) = Command::parse(content) else {
            return Ok(());
        };
        debug!(?command, channel = channel.0, "command received");

        match command {
            Command::Adopt(Some(name)) => self.adopt(channel, &name).await,
            Command::Adopt(None) => self.platform.send_text(channel, ADOPT_USAGE).await,
            Command::PlayBall => self.play_ball(channel).await,
            Command::ForceGift => {
                info!("Forcing gift event");
                self.dispatch(PetEvent::Gift);
                let mut store = self.store.lock().await;
                store.reset_gift_due(Utc::now(), &mut rand::thread_rng());
                Ok(())
            }
            Command::ForceBadMood => {
                info!("Forcing bad mood event");
                self.dispatch(PetEvent::BadMood);
                let mut store = self.store.lock().await;
                store.reset_bad_mood_due(Utc::now(), &mut rand::thread_rng());
                Ok(())
            }
            Command::Test => self.platform.send_text(channel, TEST_REPLY).await,
        }
    }

    pub async fn adopt(&self, channel: ChannelRef, name: &str) -> Result<()> {
        info!(%name, channel = channel.0, "Adopting a new pet");
        self.platform.send_text(channel, SEARCHING_NOTICE).await?;

        let description = self
            .writer
            .generate(&describe_prompt(name))
            .await
            .context("generating pet description")?;
        let character = PetCharacter::new(name, &description);

        let avatar = self
            .images
            .fetch_image(&character.avatar_prompt())
            .await
            .context("fetching pet avatar")?;
        if avatar.is_none() {
            warn!(%name, "No avatar generated, adopting without one");
        }

        let identity = self
            .platform
            .create_identity(channel, IDENTITY_NAME, avatar.clone())
            .await
            .context("creating pet webhook")?;

        let outcome = async {
            let pet = new_pet(name, &description, channel, avatar);
            let prior = self.store.lock().await.adopt(pet);
            if let Some(prior) = prior {
                info!(prior = %prior.name, "Previous pet replaced");
                self.platform.send_text(channel, &released_notice(&prior.name)).await?;
            }

            let greeting = self
                .writer
                .generate(&character.greeting_prompt())
                .await
                .context("generating greeting")?;
            self.platform.send_as(&identity, name, &greeting).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;

        self.release_identity(&identity).await;
        outcome
    }

    pub async fn play_ball(&self, channel: ChannelRef) -> Result<()> {
        let pet = self.store.lock().await.snapshot();
        let Some(pet) = pet else {
            return self.platform.send_text(channel, NOT_ADOPTED_NOTICE).await;
        };

        let identity = self
            .platform
            .create_identity(channel, IDENTITY_NAME, pet.avatar.clone())
            .await
            .context("creating pet webhook")?;

        let outcome = self.ball_game(&identity, &pet).await;
        self.release_identity(&identity).await;
        outcome
    }

    async fn ball_game(&self, identity: &IdentityRef, pet: &Pet) -> Result<()> {
        let character = PetCharacter::new(&pet.name, &pet.description);
        let question = self
            .platform
            .send_as(identity, &pet.name, &character.ball_question())
            .await?;

        for ball in BALLS {
            self.platform.add_reaction(&question, ball).await?;
        }

        let reply = match self.platform.await_reaction(&question, BALL_WAIT).await? {
            Some(picked) => {
                let mood = BallMood::from_roll(rand::thread_rng().gen_range(1..=3));
                info!(%picked, ?mood, "Ball picked");
                ball_reply(mood)
            }
            None => {
                info!("Nobody picked a ball");
                BALL_TIMEOUT_REPLY
            }
        };

        self.platform.edit_as(identity, &question, reply).await?;
        self.platform.clear_reactions(&question).await?;
        Ok(())
    }

    async fn on_gift(&self) -> Result<()> {
        let pet = self.store.lock().await.snapshot();
        let Some(pet) = pet else {
            debug!("Gift skipped, no pet adopted");
            return Ok(());
        };
        let character = PetCharacter::new(&pet.name, &pet.description);

        let story = self
            .writer
            .generate(&character.gift_prompt())
            .await
            .context("generating gift story")?;
        let place = self
            .writer
            .generate(&place_prompt(&story))
            .await
            .context("extracting gift place")?;
        let image = self
            .images
            .fetch_image(&story)
            .await
            .context("fetching gift image")?;

        let card = PetCard::new(
            &pet.name,
            &format!("在 {}", place),
            GIFT_COLOUR,
            &character.gift_title(),
            &story,
        )
        .with_image("gift.png", image);

        self.platform.send_card(pet.channel, card).await?;
        info!(pet = %pet.name, %place, "Gift delivered");
        Ok(())
    }

    async fn on_bad_mood(&self) -> Result<()> {
        let pet = self.store.lock().await.snapshot();
        let Some(pet) = pet else {
            debug!("Bad mood skipped, no pet adopted");
            return Ok(());
        };
        let character = PetCharacter::new(&pet.name, &pet.description);

        let scene = self
            .writer
            .generate(&character.bad_mood_prompt())
            .await
            .context("generating bad mood scene")?;
        let image = self
            .images
            .fetch_image(&scene)
            .await
            .context("fetching bad mood image")?;

        let card = PetCard::new(
            &pet.name,
            "心情不好",
            BAD_MOOD_COLOUR,
            &character.bad_mood_title(),
            &scene,
        )
        .with_image("bad_mood.png", image);

        self.platform.send_card(pet.channel, card).await?;
        info!(pet = %pet.name, "Bad mood delivered");
        Ok(())
    }

    async fn release_identity(&self, identity: &IdentityRef) {
        if let Err(e) = self.platform.delete_identity(identity).await {
            warn!("Failed to delete pet webhook {}: {:#}", identity.id, e);
        }
    }
}

fn new_pet(name: &str, description: &str, channel: ChannelRef, avatar: Option<Bytes>) -> Pet {
    let now = Utc::now();
    let mut rng = rand::thread_rng();
    Pet {
        name: name.to_string(),
        description: description.to_string(),
        channel,
        gift_due: draw_due(now, GIFT_WINDOW, &mut rng),
        bad_mood_due: draw_due(now, BAD_MOOD_WINDOW, &mut rng),
        avatar,
    }
}
