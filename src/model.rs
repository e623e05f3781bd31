use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const NAME_MAX: usize = 20;
pub(crate) const LOG_CAP: usize = 20;
pub(crate) const XP_PER_LEVEL: f32 = 25.0;

pub(crate) const TICK_MS_MIN: u64 = 250;
pub(crate) const TICK_MS_MAX: u64 = 2000;
pub(crate) const DECAY_RATE_MIN: f32 = 0.2;
pub(crate) const DECAY_RATE_MAX: f32 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Scene {
    Main,
    Settings,
    Help,
    Rename,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mood {
    Asleep,
    Ecstatic,
    Happy,
    Okay,
    Grumpy,
    Critical,
}

impl Mood {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Mood::Asleep => "asleep",
            Mood::Ecstatic => "ecstatic",
            Mood::Happy => "happy",
            Mood::Okay => "okay",
            Mood::Grumpy => "grumpy",
            Mood::Critical => "critical",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub(crate) struct Stats {
    #[serde(default = "default_hunger")]
    pub(crate) hunger: f32,
    #[serde(default = "default_fun")]
    pub(crate) fun: f32,
    #[serde(default = "default_hygiene")]
    pub(crate) hygiene: f32,
    #[serde(default = "default_energy")]
    pub(crate) energy: f32,
}

fn default_hunger() -> f32 {
    80.0
}

fn default_fun() -> f32 {
    70.0
}

fn default_hygiene() -> f32 {
    85.0
}

fn default_energy() -> f32 {
    80.0
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hunger: default_hunger(),
            fun: default_fun(),
            hygiene: default_hygiene(),
            energy: default_energy(),
        }
    }
}

impl Stats {
    pub(crate) fn average(&self) -> f32 {
        (self.hunger + self.fun + self.hygiene + self.energy) / 4.0
    }
}

/// Clamp a stat into its [0,100] band. Every stat write goes through this.
pub(crate) fn clamp_stat(v: f32) -> f32 {
    v.clamp(0.0, 100.0)
}

pub(crate) fn level_for_xp(xp: f32) -> u32 {
    1 + (xp.max(0.0) / XP_PER_LEVEL).floor() as u32
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Pet {
    #[serde(default = "default_name")]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) stats: Stats,
    #[serde(default)]
    pub(crate) xp: f32,
    #[serde(default = "default_level")]
    pub(crate) level: u32,
    #[serde(default = "Utc::now")]
    pub(crate) born_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub(crate) last_tick: DateTime<Utc>,
    #[serde(default)]
    pub(crate) is_asleep: bool,
}

fn default_name() -> String {
    "Tama".to_string()
}

fn default_level() -> u32 {
    1
}

impl Pet {
    pub(crate) fn new_default(now: DateTime<Utc>) -> Self {
        Self {
            name: default_name(),
            stats: Stats::default(),
            xp: 0.0,
            level: 1,
            born_at: now,
            last_tick: now,
            is_asleep: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Difficulty {
    Chill,
    Standard,
    Hard,
}

impl Difficulty {
    pub(crate) fn multiplier(self) -> f32 {
        match self {
            Difficulty::Chill => 0.7,
            Difficulty::Standard => 1.0,
            Difficulty::Hard => 1.4,
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Difficulty::Chill => Difficulty::Standard,
            Difficulty::Standard => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Chill,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Difficulty::Chill => "Chill",
            Difficulty::Standard => "Standard",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Settings {
    #[serde(default = "yes")]
    pub(crate) sound: bool,
    #[serde(default)]
    pub(crate) neon_grid: bool,
    #[serde(default)]
    pub(crate) ouroboros_skin: bool,
    #[serde(default = "default_tick_ms")]
    pub(crate) tick_ms: u64,
    #[serde(default = "default_decay_rate")]
    pub(crate) decay_rate: f32,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: Difficulty,
}

fn yes() -> bool {
    true
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_decay_rate() -> f32 {
    1.0
}

fn default_difficulty() -> Difficulty {
    Difficulty::Standard
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: true,
            neon_grid: false,
            ouroboros_skin: false,
            tick_ms: default_tick_ms(),
            decay_rate: default_decay_rate(),
            difficulty: default_difficulty(),
        }
    }
}

impl Settings {
    /// Numeric fields are range-clamped on every edit and after load.
    pub(crate) fn clamp_ranges(&mut self) {
        self.tick_ms = self.tick_ms.clamp(TICK_MS_MIN, TICK_MS_MAX);
        self.decay_rate = self.decay_rate.clamp(DECAY_RATE_MIN, DECAY_RATE_MAX);
    }
}

/// The single persisted record. Missing fields merge over defaults
/// field-by-field, so older or partial save files keep loading.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct SaveFile {
    #[serde(default = "default_pet")]
    pub(crate) pet: Pet,
    #[serde(default)]
    pub(crate) settings: Settings,
}

fn default_pet() -> Pet {
    Pet::new_default(Utc::now())
}

impl SaveFile {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            pet: Pet::new_default(now),
            settings: Settings::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct LogEntry {
    pub(crate) at: DateTime<Utc>,
    pub(crate) text: String,
}

/// Rolling activity log: newest entries kept, oldest dropped past LOG_CAP.
#[derive(Clone, Debug, Default)]
pub(crate) struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub(crate) fn push(&mut self, at: DateTime<Utc>, text: impl Into<String>) {
        self.entries.push(LogEntry {
            at,
            text: text.into(),
        });
        if self.entries.len() > LOG_CAP {
            let overflow = self.entries.len() - LOG_CAP;
            self.entries.drain(..overflow);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Newest first.
    pub(crate) fn iter_recent(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GameState {
    pub(crate) pet: Pet,
    pub(crate) settings: Settings,
    pub(crate) scene: Scene,
    pub(crate) log: ActivityLog,
    pub(crate) settings_cursor: usize,
    pub(crate) name_edit: String,
}

impl GameState {
    pub(crate) fn from_save(save: SaveFile) -> Self {
        let mut settings = save.settings;
        settings.clamp_ranges();
        let mut pet = save.pet;
        if pet.name.len() > NAME_MAX {
            let mut cut = NAME_MAX;
            while !pet.name.is_char_boundary(cut) {
                cut -= 1;
            }
            pet.name.truncate(cut);
        }
        pet.stats.hunger = clamp_stat(pet.stats.hunger);
        pet.stats.fun = clamp_stat(pet.stats.fun);
        pet.stats.hygiene = clamp_stat(pet.stats.hygiene);
        pet.stats.energy = clamp_stat(pet.stats.energy);
        pet.xp = pet.xp.max(0.0);
        pet.level = level_for_xp(pet.xp);
        Self {
            pet,
            settings,
            scene: Scene::Main,
            log: ActivityLog::default(),
            settings_cursor: 0,
            name_edit: String::new(),
        }
    }

    pub(crate) fn to_save(&self) -> SaveFile {
        SaveFile {
            pet: self.pet.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Fresh pet, cleared log. Settings survive a reset.
    pub(crate) fn reset_pet(&mut self, now: DateTime<Utc>) {
        self.pet = Pet::new_default(now);
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_law_holds_at_boundaries() {
        assert_eq!(level_for_xp(0.0), 1);
        assert_eq!(level_for_xp(24.9), 1);
        assert_eq!(level_for_xp(25.0), 2);
        assert_eq!(level_for_xp(49.9), 2);
        assert_eq!(level_for_xp(50.0), 3);
    }

    #[test]
    fn difficulty_multipliers() {
        assert_eq!(Difficulty::Chill.multiplier(), 0.7);
        assert_eq!(Difficulty::Standard.multiplier(), 1.0);
        assert_eq!(Difficulty::Hard.multiplier(), 1.4);
    }

    #[test]
    fn log_drops_oldest_past_cap() {
        let mut log = ActivityLog::default();
        let now = Utc::now();
        for i in 0..25 {
            log.push(now, format!("entry {i}"));
        }
        assert_eq!(log.len(), LOG_CAP);
        // newest first; entry 24 on top, entries 0..=4 gone
        let texts: Vec<&str> = log.iter_recent().map(|e| e.text.as_str()).collect();
        assert_eq!(texts[0], "entry 24");
        assert_eq!(texts[LOG_CAP - 1], "entry 5");
    }

    #[test]
    fn reset_keeps_settings_and_clears_log() {
        let now = Utc::now();
        let mut st = GameState::from_save(SaveFile::new(now));
        st.settings.difficulty = Difficulty::Hard;
        st.settings.tick_ms = 500;
        st.pet.xp = 40.0;
        st.pet.level = level_for_xp(st.pet.xp);
        st.log.push(now, "fed Tama");

        let later = now + chrono::Duration::minutes(5);
        st.reset_pet(later);

        assert_eq!(st.pet.xp, 0.0);
        assert_eq!(st.pet.level, 1);
        assert_eq!(st.pet.born_at, later);
        assert_eq!(st.pet.last_tick, later);
        assert_eq!(st.log.len(), 0);
        assert_eq!(st.settings.difficulty, Difficulty::Hard);
        assert_eq!(st.settings.tick_ms, 500);
    }

    #[test]
    fn from_save_clamps_out_of_band_values() {
        let mut save = SaveFile::new(Utc::now());
        save.pet.stats.hunger = 180.0;
        save.pet.stats.energy = -5.0;
        save.pet.xp = 60.0;
        save.pet.level = 99; // stale; must be rederived
        save.settings.tick_ms = 10;
        save.settings.decay_rate = 50.0;

        let st = GameState::from_save(save);
        assert_eq!(st.pet.stats.hunger, 100.0);
        assert_eq!(st.pet.stats.energy, 0.0);
        assert_eq!(st.pet.level, 3);
        assert_eq!(st.settings.tick_ms, TICK_MS_MIN);
        assert_eq!(st.settings.decay_rate, DECAY_RATE_MAX);
    }
}
