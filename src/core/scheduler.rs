use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::memory::PetStore;
use crate::models::PetEvent;

pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Minutes until the next gift, drawn uniformly.
pub const GIFT_WINDOW: RangeInclusive<i64> = 5..=10;
/// Minutes until the next bad mood, drawn uniformly.
pub const BAD_MOOD_WINDOW: RangeInclusive<i64> = 7..=14;

pub fn draw_due<R: Rng>(
    now: DateTime<Utc>,
    window: RangeInclusive<i64>,
    rng: &mut R,
) -> DateTime<Utc> {
    now + ChronoDuration::minutes(rng.gen_range(window))
}

/// Evaluates both deadlines against `now`. Every deadline that fired is
/// redrawn before returning, so the next tick cannot fire it again.
pub fn collect_due<R: Rng>(
    store: &mut PetStore,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<PetEvent> {
    let mut events = Vec::new();
    let Some(pet) = store.adopted_mut() else {
        return events;
    };

    if now >= pet.gift_due {
        events.push(PetEvent::Gift);
        pet.gift_due = draw_due(now, GIFT_WINDOW, rng);
    }

    if now >= pet.bad_mood_due {
        events.push(PetEvent::BadMood);
        pet.bad_mood_due = draw_due(now, BAD_MOOD_WINDOW, rng);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelRef, Pet};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pet_due_at(gift_due: DateTime<Utc>, bad_mood_due: DateTime<Utc>) -> Pet {
        Pet {
            name: "Mochi".to_string(),
            description: "一隻愛睡覺的貓".to_string(),
            channel: ChannelRef(42),
            gift_due,
            bad_mood_due,
            avatar: None,
        }
    }

    #[test]
    fn test_no_pet_no_events() {
        let mut store = PetStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(collect_due(&mut store, Utc::now(), &mut rng).is_empty());
        assert!(!store.is_adopted());
    }

    #[test]
    fn test_unnamed_pet_is_not_scheduled() {
        let now = Utc::now();
        let mut store = PetStore::new();
        let mut pet = pet_due_at(now, now);
        pet.name.clear();
        store.adopt(pet);

        let mut rng = StdRng::seed_from_u64(7);
        assert!(collect_due(&mut store, now, &mut rng).is_empty());
        assert_eq!(store.pet().map(|p| p.gift_due), Some(now));
    }

    #[test]
    fn test_expired_gift_is_redrawn_within_window() {
        let mut rng = StdRng::seed_from_u64(11);
        for offset in 0..200 {
            let now = Utc::now() + ChronoDuration::seconds(offset);
            let mut store = PetStore::new();
            store.adopt(pet_due_at(now - ChronoDuration::seconds(1), now + ChronoDuration::hours(1)));

            let events = collect_due(&mut store, now, &mut rng);
            assert_eq!(events, vec![PetEvent::Gift]);

            let pet = store.pet().expect("pet");
            assert!(pet.gift_due > now);
            assert!(pet.gift_due >= now + ChronoDuration::minutes(5));
            assert!(pet.gift_due <= now + ChronoDuration::minutes(10));
        }
    }

    #[test]
    fn test_expired_bad_mood_is_redrawn_within_window() {
        let mut rng = StdRng::seed_from_u64(13);
        for offset in 0..200 {
            let now = Utc::now() + ChronoDuration::seconds(offset);
            let mut store = PetStore::new();
            store.adopt(pet_due_at(now + ChronoDuration::hours(1), now));

            let events = collect_due(&mut store, now, &mut rng);
            assert_eq!(events, vec![PetEvent::BadMood]);

            let pet = store.pet().expect("pet");
            assert!(pet.bad_mood_due >= now + ChronoDuration::minutes(7));
            assert!(pet.bad_mood_due <= now + ChronoDuration::minutes(14));
        }
    }

    #[test]
    fn test_both_fire_once_per_expiry() {
        let now = Utc::now();
        let mut store = PetStore::new();
        store.adopt(pet_due_at(now, now - ChronoDuration::minutes(3)));
        let mut rng = StdRng::seed_from_u64(3);

        let first = collect_due(&mut store, now, &mut rng);
        assert_eq!(first, vec![PetEvent::Gift, PetEvent::BadMood]);

        let next_tick = now + ChronoDuration::from_std(TICK_INTERVAL).expect("tick");
        assert!(collect_due(&mut store, next_tick, &mut rng).is_empty());
    }

    #[test]
    fn test_future_deadlines_are_untouched() {
        let now = Utc::now();
        let gift_due = now + ChronoDuration::minutes(2);
        let bad_mood_due = now + ChronoDuration::minutes(9);
        let mut store = PetStore::new();
        store.adopt(pet_due_at(gift_due, bad_mood_due));
        let mut rng = StdRng::seed_from_u64(5);

        assert!(collect_due(&mut store, now, &mut rng).is_empty());
        let pet = store.pet().expect("pet");
        assert_eq!(pet.gift_due, gift_due);
        assert_eq!(pet.bad_mood_due, bad_mood_due);
    }
}
