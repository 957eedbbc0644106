use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;

// Discord embed limits, counted in characters.
pub const EMBED_TITLE_LIMIT: usize = 256;
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;
pub const EMBED_FIELD_NAME_LIMIT: usize = 256;
pub const EMBED_FIELD_VALUE_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelRef(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel: ChannelRef,
    pub id: u64,
}

/// A temporary webhook used to post messages under the pet's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityRef {
    pub id: u64,
}

#[derive(Debug, Clone)]
pub struct Pet {
    pub name: String,
    pub description: String,
    pub channel: ChannelRef,
    pub gift_due: DateTime<Utc>,
    pub bad_mood_due: DateTime<Utc>,
    pub avatar: Option<Bytes>,
}

/// Scheduled occurrences. The debug commands dispatch the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetEvent {
    Gift,
    BadMood,
}

impl fmt::Display for PetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetEvent::Gift => write!(f, "gift"),
            PetEvent::BadMood => write!(f, "bad_mood"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallMood {
    Unwilling,
    Okay,
    Happy,
}

impl BallMood {
    /// Maps a 1..=3 roll onto a mood, worst to best.
    pub fn from_roll(roll: u8) -> Self {
        match roll {
            1 => BallMood::Unwilling,
            2 => BallMood::Okay,
            _ => BallMood::Happy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardImage {
    pub filename: String,
    pub bytes: Bytes,
}

/// An embed-style message with a single field and an optional attached image.
#[derive(Debug, Clone)]
pub struct PetCard {
    pub title: String,
    pub description: String,
    pub colour: u32,
    pub field_name: String,
    pub field_value: String,
    pub image: Option<CardImage>,
}

impl PetCard {
    pub fn new(
        title: &str,
        description: &str,
        colour: u32,
        field_name: &str,
        field_value: &str,
    ) -> Self {
        PetCard {
            title: truncate_chars(title, EMBED_TITLE_LIMIT),
            description: truncate_chars(description, EMBED_DESCRIPTION_LIMIT),
            colour,
            field_name: truncate_chars(field_name, EMBED_FIELD_NAME_LIMIT),
            field_value: truncate_chars(field_value, EMBED_FIELD_VALUE_LIMIT),
            image: None,
        }
    }

    pub fn with_image(mut self, filename: &str, bytes: Option<Bytes>) -> Self {
        self.image = bytes.map(|bytes| CardImage {
            filename: filename.to_string(),
            bytes,
        });
        self
    }
}

pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
