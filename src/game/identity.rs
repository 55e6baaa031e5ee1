//! Identity & spawn service - ids and default attributes for new entities

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use super::entity::EntityId;
use super::map::SpawnArea;

pub const ADJECTIVES: &[&str] = &[
    "nimble", "keen", "whispering", "beautiful", "glossy", "jagged", "splendid",
    "comfortable", "reflective", "melodic", "misty", "decisive", "flimsy",
    "alleged", "dizzy", "sleepy", "yawning", "feeble", "inquisitive", "murky",
    "tranquil", "rhetorical", "enchanted", "dazzling", "foamy", "shiny", "liberal",
    "mysterious", "dark", "marvelous", "payable", "short", "tall", "medieval",
    "visiting", "apologetic", "talkative",
];

pub const ANIMALS: &[&str] = &[
    "squirrel", "lizard", "cat", "dog", "turtle", "fox", "armadillo", "kangaroo",
    "beetle", "coyote", "mongoose", "newt", "chicken", "cow", "sheep", "bunny",
    "rabbit", "snake", "badger", "kitten", "puppy", "camel", "bear", "wolf",
    "crab", "hyena", "anteater", "chipmunk", "eagle", "prawn", "salmon", "manatee",
    "caiman", "bee", "porpoise", "dolphin",
];

/// Default attributes for a freshly connected player
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnDefaults {
    pub display_name: String,
    pub x: f32,
    pub y: f32,
}

pub struct IdentityService {
    rng: ChaCha8Rng,
    spawn_area: SpawnArea,
    adjectives: &'static [&'static str],
    animals: &'static [&'static str],
}

impl IdentityService {
    pub fn new(spawn_area: SpawnArea) -> Self {
        Self::with_rng(spawn_area, ChaCha8Rng::from_entropy())
    }

    /// Deterministic service for tests and replays
    pub fn seeded(spawn_area: SpawnArea, seed: u64) -> Self {
        Self::with_rng(spawn_area, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(spawn_area: SpawnArea, rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            spawn_area,
            adjectives: ADJECTIVES,
            animals: ANIMALS,
        }
    }

    pub fn with_words(
        mut self,
        adjectives: &'static [&'static str],
        animals: &'static [&'static str],
    ) -> Self {
        self.adjectives = adjectives;
        self.animals = animals;
        self
    }

    /// Random v4 identifier, unique for the session with overwhelming probability
    pub fn new_id(&self) -> EntityId {
        EntityId::from_uuid(Uuid::new_v4())
    }

    pub fn spawn_player_defaults(&mut self) -> SpawnDefaults {
        let adjective = self.adjectives.choose(&mut self.rng).copied().unwrap_or("nameless");
        let animal = self.animals.choose(&mut self.rng).copied().unwrap_or("player");

        let area = self.spawn_area;
        let x = sample(&mut self.rng, area.min_x, area.max_x);
        let y = sample(&mut self.rng, area.min_y, area.max_y);

        SpawnDefaults {
            display_name: format!("{} {}", adjective, animal),
            x,
            y,
        }
    }
}

fn sample(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn area() -> SpawnArea {
        SpawnArea {
            min_x: 50.0,
            max_x: 750.0,
            min_y: 50.0,
            max_y: 550.0,
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let service = IdentityService::seeded(area(), 7);
        let ids: HashSet<EntityId> = (0..10_000).map(|_| service.new_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_spawn_defaults_inside_area() {
        let mut service = IdentityService::seeded(area(), 42);
        for _ in 0..500 {
            let defaults = service.spawn_player_defaults();
            assert!(area().contains(defaults.x, defaults.y));
        }
    }

    #[test]
    fn test_name_is_adjective_space_animal() {
        let mut service = IdentityService::seeded(area(), 1);
        let defaults = service.spawn_player_defaults();

        let (adjective, animal) = defaults.display_name.split_once(' ').unwrap();
        assert!(ADJECTIVES.contains(&adjective));
        assert!(ANIMALS.contains(&animal));
    }

    #[test]
    fn test_custom_word_lists() {
        let mut service = IdentityService::seeded(area(), 3).with_words(&["grumpy"], &["otter"]);
        assert_eq!(service.spawn_player_defaults().display_name, "grumpy otter");
    }

    #[test]
    fn test_same_seed_same_defaults() {
        let mut a = IdentityService::seeded(area(), 99);
        let mut b = IdentityService::seeded(area(), 99);
        assert_eq!(a.spawn_player_defaults(), b.spawn_player_defaults());
    }

    #[test]
    fn test_degenerate_area_pins_to_min() {
        let flat = SpawnArea {
            min_x: 10.0,
            max_x: 10.0,
            min_y: 20.0,
            max_y: 5.0,
        };
        let mut service = IdentityService::seeded(flat, 5);
        let defaults = service.spawn_player_defaults();
        assert_eq!((defaults.x, defaults.y), (10.0, 20.0));
    }
}
