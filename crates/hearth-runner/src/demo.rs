//! A small simulated village for the demo binary.
//!
//! Time of day runs fast, weather rerolls from a weighted table, and
//! villagers amble around the player. All randomness comes from one seeded
//! [`StdRng`] so a run with the same seed plays out the same way.

use std::collections::BTreeMap;
use std::time::Duration;

use hearth_runner::WorldView;
use hearth_types::{
    AgentId, AgentProfile, AgentRole, Persona, Position, Weather, WeatherKind, WorldSnapshot,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// In-game hours that pass per real second (one day every twelve minutes).
const HOURS_PER_SEC: f32 = 24.0 / 720.0;

/// Real time between weather rolls.
const WEATHER_PERIOD: Duration = Duration::from_secs(45);

/// Agents spawn within this radius of the player.
const SPAWN_RADIUS: f32 = 300.0;

/// Maximum wander speed, world units per second.
const WANDER_SPEED: f32 = 6.0;

/// Weather kind, its visibility, and its weight in the roll.
const WEATHER_TABLE: [(WeatherKind, f32, u32); 6] = [
    (WeatherKind::Clear, 1.0, 40),
    (WeatherKind::Cloudy, 0.8, 25),
    (WeatherKind::Rain, 0.6, 15),
    (WeatherKind::Storm, 0.3, 5),
    (WeatherKind::Fog, 0.25, 10),
    (WeatherKind::Snow, 0.5, 5),
];

/// Name, profession, personality, backstory.
const PERSONAS: [(&str, &str, &str, &str); 6] = [
    ("Bram", "blacksmith", "gruff but fair", "Took over the forge from his father."),
    ("Ada", "baker", "cheerful and nosy", "Knows every rumor before sunrise."),
    ("Tomas", "guard", "dutiful, suspicious of outsiders", "Lost an eye to bandits on the east road."),
    ("Wren", "herbalist", "soft-spoken and curious", "Arrived from the marshes three winters ago."),
    ("Olek", "merchant", "shrewd, loves a bargain", "Trades salt and cloth between the river towns."),
    ("Mira", "farmer", "patient and practical", "Works the barley fields north of the mill."),
];

/// Role handed out alongside each persona, in order.
const ROLES: [AgentRole; 3] = [AgentRole::Villager, AgentRole::Merchant, AgentRole::Guard];

/// Build `count` demo agent profiles with ids from `next_id`.
pub fn demo_profiles(count: usize, mut next_id: impl FnMut() -> AgentId) -> Vec<AgentProfile> {
    PERSONAS
        .iter()
        .cycle()
        .zip(ROLES.iter().cycle())
        .take(count)
        .map(|(&(name, profession, personality, backstory), &role)| AgentProfile {
            id: next_id(),
            role,
            persona: Persona {
                name: name.to_owned(),
                profession: profession.to_owned(),
                personality: personality.to_owned(),
                backstory: backstory.to_owned(),
            },
        })
        .collect()
}

/// The demo world: clock, weather, and positions.
pub struct DemoWorld {
    rng: StdRng,
    hour: f32,
    weather: Weather,
    since_weather: Duration,
    player: Position,
    positions: BTreeMap<AgentId, Position>,
}

impl DemoWorld {
    /// Start a world at `start_hour` with clear skies.
    pub fn new(seed: u64, start_hour: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            hour: start_hour.rem_euclid(24.0),
            weather: Weather::default(),
            since_weather: Duration::ZERO,
            player: Position::default(),
            positions: BTreeMap::new(),
        }
    }

    /// Place an agent somewhere near the player.
    pub fn spawn(&mut self, agent_id: AgentId) -> Position {
        let position = Position::new(
            self.rng.random_range(-SPAWN_RADIUS..SPAWN_RADIUS),
            self.rng.random_range(-SPAWN_RADIUS..SPAWN_RADIUS),
        );
        self.positions.insert(agent_id, position);
        position
    }

    /// Move time forward: advance the clock, maybe reroll weather, and let
    /// everyone wander a little.
    pub fn advance(&mut self, elapsed: Duration) {
        let secs = elapsed.as_secs_f32();
        self.hour = (self.hour + secs * HOURS_PER_SEC).rem_euclid(24.0);

        self.since_weather = self.since_weather.saturating_add(elapsed);
        if self.since_weather >= WEATHER_PERIOD {
            self.since_weather = Duration::ZERO;
            self.weather = self.roll_weather();
            info!(
                weather = self.weather.kind.as_str(),
                visibility = self.weather.visibility,
                hour = self.hour,
                "weather changed"
            );
        }

        let step = WANDER_SPEED * secs;
        for position in self.positions.values_mut() {
            position.x += self.rng.random_range(-1.0_f32..1.0) * step;
            position.y += self.rng.random_range(-1.0_f32..1.0) * step;
        }
    }

    /// The agent closest to the player, if any.
    pub fn nearest_agent(&self) -> Option<AgentId> {
        self.positions
            .iter()
            .map(|(id, p)| (*id, p.distance_to(self.player)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Weighted pick from [`WEATHER_TABLE`].
    fn roll_weather(&mut self) -> Weather {
        let total: u32 = WEATHER_TABLE
            .iter()
            .fold(0, |acc, &(_, _, weight)| acc.saturating_add(weight));
        let mut roll = self.rng.random_range(0..total.max(1));
        for &(kind, visibility, weight) in &WEATHER_TABLE {
            match roll.checked_sub(weight) {
                Some(rest) => roll = rest,
                None => return Weather { kind, visibility },
            }
        }
        Weather::default()
    }
}

impl WorldView for DemoWorld {
    fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            time_of_day: self.hour,
            weather: self.weather,
        }
    }

    fn reference_position(&self) -> Position {
        self.player
    }

    fn agent_position(&self, agent_id: AgentId) -> Option<Position> {
        self.positions.get(&agent_id).copied()
    }
}
