use crate::model::{clamp_stat, level_for_xp, GameState, Mood, Pet, Settings, NAME_MAX};
use chrono::{DateTime, Utc};

// Per-minute drain weights at effective rate k = decay_rate * difficulty.
const HUNGER_DRAIN: f32 = 1.2;
const FUN_DRAIN: f32 = 1.0;
const HYGIENE_DRAIN: f32 = 0.8;
const ENERGY_RATE: f32 = 0.9;

// Sleep dampens drains and amplifies energy recovery.
const SLEEP_SHIELD: f32 = 0.7;
const SLEEP_BOOST: f32 = 1.6;

const XP_PER_MINUTE: f32 = 0.25;

#[derive(Clone, Debug)]
pub(crate) enum PlayerAction {
    Feed,
    Play,
    Clean,
    SleepToggle,
    Reset,
    HelpToggle,
    RenameChar(char),
    RenameBackspace,
    RenameCommit,
    RenameCancel,
    SettingsOpen,
    SettingsMove(i32),
    SettingsActivate,
    SettingsAdjust(i32),
    Back,
    Quit,
}

/// Outcome of applying an action, so the app loop knows whether to persist
/// and whether the decay timer needs re-arming.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ActionOutcome {
    pub(crate) changed: bool,
    pub(crate) rearm_timer: bool,
}

impl GameState {
    /// Apply one decay tick at `now`, recomputing stats from wall-clock time
    /// elapsed since `last_tick`. Idempotent for zero elapsed time.
    pub(crate) fn decay_tick(&mut self, now: DateTime<Utc>) {
        decay(&mut self.pet, &self.settings, now);
    }

    /// Dispatch a care action. While asleep everything but the sleep toggle
    /// is suppressed.
    pub(crate) fn apply(&mut self, action: &PlayerAction, now: DateTime<Utc>) -> ActionOutcome {
        let asleep = self.pet.is_asleep;
        match action {
            PlayerAction::Feed if !asleep => {
                let s = &mut self.pet.stats;
                s.hunger = clamp_stat(s.hunger + 18.0);
                s.hygiene = clamp_stat(s.hygiene - 2.0);
                s.energy = clamp_stat(s.energy + 4.0);
                self.gain_xp(1.5);
                self.log.push(now, format!("fed {}", self.pet.name));
                ActionOutcome {
                    changed: true,
                    rearm_timer: false,
                }
            }
            PlayerAction::Play if !asleep => {
                let s = &mut self.pet.stats;
                s.fun = clamp_stat(s.fun + 18.0);
                s.energy = clamp_stat(s.energy - 8.0);
                s.hygiene = clamp_stat(s.hygiene - 3.0);
                self.gain_xp(1.8);
                self.log.push(now, format!("played with {}", self.pet.name));
                ActionOutcome {
                    changed: true,
                    rearm_timer: false,
                }
            }
            PlayerAction::Clean if !asleep => {
                let s = &mut self.pet.stats;
                s.hygiene = clamp_stat(s.hygiene + 22.0);
                s.fun = clamp_stat(s.fun - 2.0);
                self.gain_xp(1.2);
                self.log.push(now, format!("cleaned {}", self.pet.name));
                ActionOutcome {
                    changed: true,
                    rearm_timer: false,
                }
            }
            PlayerAction::SleepToggle => {
                self.pet.is_asleep = !self.pet.is_asleep;
                let line = if self.pet.is_asleep {
                    format!("{} fell asleep", self.pet.name)
                } else {
                    format!("{} woke up", self.pet.name)
                };
                self.log.push(now, line);
                ActionOutcome {
                    changed: true,
                    rearm_timer: true,
                }
            }
            PlayerAction::Reset => {
                self.reset_pet(now);
                ActionOutcome {
                    changed: true,
                    rearm_timer: true,
                }
            }
            PlayerAction::RenameChar(ch) => {
                if self.name_edit.len() < NAME_MAX {
                    self.name_edit.push(*ch);
                }
                ActionOutcome::default()
            }
            PlayerAction::RenameBackspace => {
                self.name_edit.pop();
                ActionOutcome::default()
            }
            PlayerAction::RenameCommit => {
                let trimmed = self.name_edit.trim();
                let changed = !trimmed.is_empty() && trimmed != self.pet.name;
                if changed {
                    self.pet.name = trimmed.to_string();
                }
                ActionOutcome {
                    changed,
                    rearm_timer: false,
                }
            }
            // feed/play/clean swallowed while asleep
            _ => ActionOutcome::default(),
        }
    }

    fn gain_xp(&mut self, amount: f32) {
        self.pet.xp += amount;
        self.pet.level = level_for_xp(self.pet.xp);
    }

    pub(crate) fn mood(&self) -> Mood {
        derive_mood(&self.pet)
    }
}

fn decay(pet: &mut Pet, settings: &Settings, now: DateTime<Utc>) {
    let elapsed_ms = (now - pet.last_tick).num_milliseconds().max(0);
    let m = elapsed_ms as f32 / 60_000.0;

    let k = settings.decay_rate * settings.difficulty.multiplier();
    let shield = if pet.is_asleep { SLEEP_SHIELD } else { 1.0 };

    let s = &mut pet.stats;
    s.hunger = clamp_stat(s.hunger - HUNGER_DRAIN * k * m * shield);
    s.fun = clamp_stat(s.fun - FUN_DRAIN * k * m * shield);
    s.hygiene = clamp_stat(s.hygiene - HYGIENE_DRAIN * k * m * shield);

    // Energy only recovers while asleep (boosted) and only drains while awake.
    if pet.is_asleep {
        s.energy = clamp_stat(s.energy + ENERGY_RATE * k * m * SLEEP_BOOST);
    } else {
        s.energy = clamp_stat(s.energy - ENERGY_RATE * k * m);
    }

    // xp accrues with lived time, regardless of sleep or difficulty.
    pet.xp += XP_PER_MINUTE * m;
    pet.level = level_for_xp(pet.xp);
    pet.last_tick = now;
}

pub(crate) fn derive_mood(pet: &Pet) -> Mood {
    if pet.is_asleep {
        return Mood::Asleep;
    }
    let avg = pet.stats.average();
    if avg > 85.0 {
        Mood::Ecstatic
    } else if avg > 70.0 {
        Mood::Happy
    } else if avg > 50.0 {
        Mood::Okay
    } else if avg > 30.0 {
        Mood::Grumpy
    } else {
        Mood::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, SaveFile, Stats};
    use chrono::Duration;

    fn state_with(stats: Stats) -> GameState {
        let mut st = GameState::from_save(SaveFile::new(Utc::now()));
        st.pet.stats = stats;
        st
    }

    fn flat(v: f32) -> Stats {
        Stats {
            hunger: v,
            fun: v,
            hygiene: v,
            energy: v,
        }
    }

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "expected {b}, got {a}");
    }

    #[test]
    fn one_awake_minute_at_standard_rate() {
        let mut st = state_with(flat(50.0));
        st.settings.decay_rate = 1.0;
        st.settings.difficulty = Difficulty::Standard;
        let now = st.pet.last_tick + Duration::minutes(1);

        st.decay_tick(now);

        assert_near(st.pet.stats.hunger, 48.8);
        assert_near(st.pet.stats.fun, 49.0);
        assert_near(st.pet.stats.hygiene, 49.2);
        assert_near(st.pet.stats.energy, 49.1);
        assert_near(st.pet.xp, 0.25);
        assert_eq!(st.pet.last_tick, now);
    }

    #[test]
    fn zero_elapsed_tick_only_moves_last_tick() {
        let mut st = state_with(flat(42.0));
        st.pet.xp = 5.0;
        let now = st.pet.last_tick;

        st.decay_tick(now);

        assert_eq!(st.pet.stats.hunger, 42.0);
        assert_eq!(st.pet.stats.fun, 42.0);
        assert_eq!(st.pet.stats.hygiene, 42.0);
        assert_eq!(st.pet.stats.energy, 42.0);
        assert_eq!(st.pet.xp, 5.0);
        assert_eq!(st.pet.last_tick, now);
    }

    #[test]
    fn clock_rewind_is_treated_as_zero_elapsed() {
        let mut st = state_with(flat(42.0));
        let earlier = st.pet.last_tick - Duration::minutes(10);

        st.decay_tick(earlier);

        assert_eq!(st.pet.stats.hunger, 42.0);
        assert_eq!(st.pet.xp, 0.0);
    }

    #[test]
    fn sleep_shields_drains_and_boosts_energy() {
        let mut st = state_with(flat(50.0));
        st.pet.is_asleep = true;
        let now = st.pet.last_tick + Duration::minutes(1);

        st.decay_tick(now);

        assert_near(st.pet.stats.hunger, 50.0 - 1.2 * 0.7);
        assert_near(st.pet.stats.fun, 50.0 - 1.0 * 0.7);
        assert_near(st.pet.stats.hygiene, 50.0 - 0.8 * 0.7);
        assert_near(st.pet.stats.energy, 50.0 + 0.9 * 1.6);
    }

    #[test]
    fn difficulty_scales_drains_but_not_xp() {
        let mut st = state_with(flat(50.0));
        st.settings.difficulty = Difficulty::Hard;
        let now = st.pet.last_tick + Duration::minutes(1);

        st.decay_tick(now);

        assert_near(st.pet.stats.hunger, 50.0 - 1.2 * 1.4);
        assert_near(st.pet.xp, 0.25);
    }

    #[test]
    fn stats_never_leave_band_under_long_decay() {
        let mut st = state_with(flat(3.0));
        st.settings.decay_rate = 3.0;
        st.settings.difficulty = Difficulty::Hard;
        let now = st.pet.last_tick + Duration::hours(48);

        st.decay_tick(now);

        for v in [
            st.pet.stats.hunger,
            st.pet.stats.fun,
            st.pet.stats.hygiene,
            st.pet.stats.energy,
        ] {
            assert!((0.0..=100.0).contains(&v), "stat out of band: {v}");
        }
    }

    #[test]
    fn xp_is_monotone_across_ticks_and_actions() {
        let mut st = state_with(flat(50.0));
        let mut prev = st.pet.xp;
        let mut now = st.pet.last_tick;
        for i in 0..10 {
            now += Duration::seconds(30);
            st.decay_tick(now);
            assert!(st.pet.xp >= prev);
            prev = st.pet.xp;
            let action = if i % 2 == 0 {
                PlayerAction::Feed
            } else {
                PlayerAction::Play
            };
            st.apply(&action, now);
            assert!(st.pet.xp >= prev);
            prev = st.pet.xp;
        }
    }

    #[test]
    fn feed_applies_fixed_deltas() {
        let mut st = state_with(Stats {
            hunger: 80.0,
            fun: 50.0,
            hygiene: 80.0,
            energy: 80.0,
        });
        st.pet.xp = 0.0;

        let out = st.apply(&PlayerAction::Feed, Utc::now());

        assert!(out.changed);
        assert_near(st.pet.stats.hunger, 98.0);
        assert_near(st.pet.stats.hygiene, 78.0);
        assert_near(st.pet.stats.energy, 84.0);
        assert_near(st.pet.xp, 1.5);
        assert_eq!(st.log.len(), 1);
    }

    #[test]
    fn clean_clamps_at_hundred() {
        let mut st = state_with(Stats {
            hunger: 50.0,
            fun: 50.0,
            hygiene: 95.0,
            energy: 50.0,
        });

        st.apply(&PlayerAction::Clean, Utc::now());

        assert_eq!(st.pet.stats.hygiene, 100.0);
        assert_near(st.pet.stats.fun, 48.0);
        assert_near(st.pet.xp, 1.2);
    }

    #[test]
    fn care_actions_suppressed_while_asleep_but_sleep_toggles() {
        let mut st = state_with(flat(50.0));
        st.pet.is_asleep = true;
        let now = Utc::now();

        for action in [PlayerAction::Feed, PlayerAction::Play, PlayerAction::Clean] {
            let out = st.apply(&action, now);
            assert!(!out.changed);
        }
        assert_eq!(st.pet.stats.hunger, 50.0);
        assert_eq!(st.pet.xp, 0.0);
        assert_eq!(st.log.len(), 0);

        let out = st.apply(&PlayerAction::SleepToggle, now);
        assert!(out.changed);
        assert!(out.rearm_timer);
        assert!(!st.pet.is_asleep);
    }

    #[test]
    fn level_follows_xp_through_actions() {
        let mut st = state_with(flat(50.0));
        st.pet.xp = 24.0;
        st.pet.level = level_for_xp(st.pet.xp);
        assert_eq!(st.pet.level, 1);

        st.apply(&PlayerAction::Play, Utc::now()); // +1.8 -> 25.8
        assert_eq!(st.pet.level, 2);
    }

    #[test]
    fn mood_thresholds() {
        let mut st = state_with(flat(90.0));
        assert_eq!(st.mood(), Mood::Ecstatic);
        st.pet.stats = flat(75.0);
        assert_eq!(st.mood(), Mood::Happy);
        st.pet.stats = flat(60.0);
        assert_eq!(st.mood(), Mood::Okay);
        st.pet.stats = flat(40.0);
        assert_eq!(st.mood(), Mood::Grumpy);
        st.pet.stats = flat(20.0);
        assert_eq!(st.mood(), Mood::Critical);
        st.pet.is_asleep = true;
        assert_eq!(st.mood(), Mood::Asleep);
    }

    #[test]
    fn mood_boundaries_are_exclusive() {
        let mut st = state_with(flat(85.0));
        assert_eq!(st.mood(), Mood::Happy);
        st.pet.stats = flat(70.0);
        assert_eq!(st.mood(), Mood::Okay);
        st.pet.stats = flat(50.0);
        assert_eq!(st.mood(), Mood::Grumpy);
        st.pet.stats = flat(30.0);
        assert_eq!(st.mood(), Mood::Critical);
    }

    #[test]
    fn rename_commit_trims_and_respects_cap() {
        let mut st = state_with(flat(50.0));
        st.name_edit = "  Nibbles  ".to_string();
        let out = st.apply(&PlayerAction::RenameCommit, Utc::now());
        assert!(out.changed);
        assert_eq!(st.pet.name, "Nibbles");

        st.name_edit = "x".repeat(NAME_MAX);
        for _ in 0..5 {
            st.apply(&PlayerAction::RenameChar('y'), Utc::now());
        }
        assert_eq!(st.name_edit.len(), NAME_MAX);
    }
}
