use chrono::{DateTime, Utc};
use rand::Rng;

use crate::core::scheduler::{draw_due, BAD_MOOD_WINDOW, GIFT_WINDOW};
use crate::models::Pet;

/// Holds the one adopted pet. Nothing is written to disk; a restart forgets
/// the pet and both timers.
#[derive(Debug, Default)]
pub struct PetStore {
    pet: Option<Pet>,
}

impl PetStore {
    pub fn new() -> Self {
        PetStore { pet: None }
    }

    // A pet only counts once it has a name
    pub fn is_adopted(&self) -> bool {
        self.pet.as_ref().is_some_and(|pet| !pet.name.is_empty())
    }

    pub fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    pub fn adopted_mut(&mut self) -> Option<&mut Pet> {
        self.pet.as_mut().filter(|pet| !pet.name.is_empty())
    }

    /// Copy of the adopted pet, so callers can release the lock before any
    /// outbound call.
    pub fn snapshot(&self) -> Option<Pet> {
        self.pet.as_ref().filter(|pet| !pet.name.is_empty()).cloned()
    }

    /// Replaces the held pet and hands back the one it displaced.
    pub fn adopt(&mut self, pet: Pet) -> Option<Pet> {
        self.pet.replace(pet).filter(|prior| !prior.name.is_empty())
    }

    pub fn reset_gift_due<R: Rng>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Option<DateTime<Utc>> {
        let pet = self.adopted_mut()?;
        pet.gift_due = draw_due(now, GIFT_WINDOW, rng);
        Some(pet.gift_due)
    }

    pub fn reset_bad_mood_due<R: Rng>(&mut self, now: DateTime<Utc>, rng: &mut R) -> Option<DateTime<Utc>> {
        let pet = self.adopted_mut()?;
        pet.bad_mood_due = draw_due(now, BAD_MOOD_WINDOW, rng);
        Some(pet.bad_mood_due)
    }
}
