use crate::config::project_paths;
use crate::input::{collect_input_nonblocking, map_event_to_action};
use crate::model::{
    GameState, SaveFile, Scene, DECAY_RATE_MAX, DECAY_RATE_MIN, TICK_MS_MAX, TICK_MS_MIN,
};
use crate::render::{
    bounce_offset, draw_center_box, draw_neon_grid, draw_pet, draw_settings, panel_width,
    ui_overlay, Terminal, SETTINGS_ROWS,
};
use crate::sim::PlayerAction;
use crate::storage::{JsonFileStore, Store};
use chrono::Utc;
use std::time::{Duration, Instant};

const FRAME_MS: u64 = 33;

const TICK_MS_STEP: u64 = 250;
const DECAY_RATE_STEP: f32 = 0.1;

pub(crate) struct App<S: Store> {
    state: GameState,
    store: S,
    term: Terminal,
    should_quit: bool,
    frame: u64,
    next_decay_at: Instant,
}

impl<S: Store> App<S> {
    fn init(store: S) -> anyhow::Result<Self> {
        // best-effort load; anything unreadable falls back to defaults
        let save = store.load().unwrap_or_else(|| SaveFile::new(Utc::now()));
        let state = GameState::from_save(save);

        let term = Terminal::begin()?;
        let tick = Duration::from_millis(state.settings.tick_ms);

        Ok(Self {
            state,
            store,
            term,
            should_quit: false,
            frame: 0,
            next_decay_at: Instant::now() + tick,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_millis(FRAME_MS);

        while !self.should_quit {
            self.term.resize_if_needed()?;

            let events = collect_input_nonblocking(frame_dt)?;
            for ev in events {
                if let Some(action) = map_event_to_action(&self.state.scene, ev) {
                    self.handle_action(action)?;
                    if self.should_quit {
                        break;
                    }
                }
            }

            // decay timer: fires every tick_ms, re-armed on config change
            if Instant::now() >= self.next_decay_at {
                let prev_level = self.state.pet.level;
                self.state.decay_tick(Utc::now());
                self.rearm_timer();
                self.after_change(prev_level)?;
            }

            self.render_frame()?;
            self.frame += 1;

            spin_sleep(frame_dt, Instant::now());
        }

        self.save_now()?;
        self.term.end()?;
        Ok(())
    }

    fn handle_action(&mut self, action: PlayerAction) -> anyhow::Result<()> {
        match action {
            PlayerAction::Quit => {
                self.should_quit = true;
            }
            PlayerAction::HelpToggle => {
                self.state.scene = match self.state.scene {
                    Scene::Help => Scene::Main,
                    _ => Scene::Help,
                };
            }
            PlayerAction::SettingsOpen => {
                self.state.scene = Scene::Settings;
                self.state.settings_cursor = 0;
            }
            PlayerAction::Back => {
                self.state.scene = match self.state.scene {
                    Scene::Rename => Scene::Settings,
                    _ => Scene::Main,
                };
            }
            PlayerAction::SettingsMove(delta) => {
                let len = SETTINGS_ROWS as i32;
                let mut next = self.state.settings_cursor as i32 + delta;
                if next < 0 {
                    next = len - 1;
                } else if next >= len {
                    next = 0;
                }
                self.state.settings_cursor = next as usize;
            }
            PlayerAction::SettingsActivate => self.settings_activate()?,
            PlayerAction::SettingsAdjust(dir) => self.settings_adjust(dir)?,
            PlayerAction::RenameCancel => {
                self.state.scene = Scene::Settings;
            }
            PlayerAction::RenameCommit => {
                let out = self.state.apply(&PlayerAction::RenameCommit, Utc::now());
                self.state.scene = Scene::Settings;
                if out.changed {
                    self.save_now()?;
                }
            }
            other => {
                let prev_level = self.state.pet.level;
                let out = self.state.apply(&other, Utc::now());
                if out.rearm_timer {
                    self.rearm_timer();
                }
                if out.changed {
                    self.after_change(prev_level)?;
                }
            }
        }
        Ok(())
    }

    /// Enter on the selected settings row. Toggles toggle, single-step
    /// numerics step up, rename and reset open their flows.
    fn settings_activate(&mut self) -> anyhow::Result<()> {
        let s = &mut self.state.settings;
        match self.state.settings_cursor {
            0 => s.sound = !s.sound,
            1 => s.neon_grid = !s.neon_grid,
            2 => s.ouroboros_skin = !s.ouroboros_skin,
            3 | 4 | 5 => return self.settings_adjust(1),
            6 => {
                self.state.name_edit = self.state.pet.name.clone();
                self.state.scene = Scene::Rename;
                return Ok(());
            }
            _ => {
                let prev_level = self.state.pet.level;
                self.state.apply(&PlayerAction::Reset, Utc::now());
                self.rearm_timer();
                self.state.scene = Scene::Main;
                return self.after_change(prev_level);
            }
        }
        self.save_now()
    }

    /// Left/Right on the selected settings row; numeric fields are
    /// range-clamped on every edit.
    fn settings_adjust(&mut self, dir: i32) -> anyhow::Result<()> {
        let s = &mut self.state.settings;
        let mut rearm = true;
        match self.state.settings_cursor {
            3 => {
                s.tick_ms = if dir < 0 {
                    s.tick_ms.saturating_sub(TICK_MS_STEP)
                } else {
                    s.tick_ms.saturating_add(TICK_MS_STEP)
                }
                .clamp(TICK_MS_MIN, TICK_MS_MAX);
            }
            4 => {
                s.decay_rate = (s.decay_rate + dir as f32 * DECAY_RATE_STEP)
                    .clamp(DECAY_RATE_MIN, DECAY_RATE_MAX);
            }
            5 => {
                s.difficulty = s.difficulty.next();
                if dir < 0 {
                    // two more steps walk the 3-cycle backwards
                    s.difficulty = s.difficulty.next().next();
                }
            }
            _ => rearm = false,
        }
        if rearm {
            self.rearm_timer();
            self.save_now()?;
        }
        Ok(())
    }

    fn rearm_timer(&mut self) {
        self.next_decay_at = Instant::now() + Duration::from_millis(self.state.settings.tick_ms);
    }

    /// Persist after any pet/settings mutation; announce level-ups.
    fn after_change(&mut self, prev_level: u32) -> anyhow::Result<()> {
        if self.state.pet.level > prev_level {
            let line = format!("{} reached level {}", self.state.pet.name, self.state.pet.level);
            self.state.log.push(Utc::now(), line);
            if self.state.settings.sound {
                self.term.bell()?;
            }
        }
        self.save_now()
    }

    fn save_now(&mut self) -> anyhow::Result<()> {
        self.store.save(&self.state.to_save())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = crossterm::style::Color::Black;
        self.term.cur.clear(bg);

        let cols = self.term.cols;
        let rows = self.term.rows;
        let panel_w = panel_width(cols);

        if self.state.settings.neon_grid {
            draw_neon_grid(&mut self.term.cur, panel_w);
        }

        let cx = panel_w as i32 + (cols as i32 - panel_w as i32) / 2;
        let cy = rows as i32 / 2;
        let (bx, by) = bounce_offset(self.frame, self.state.pet.is_asleep);
        draw_pet(&mut self.term.cur, &self.state, cx + bx, cy + by);

        ui_overlay(&mut self.term.cur, &self.state);

        if matches!(self.state.scene, Scene::Settings) {
            draw_settings(&mut self.term.cur, &self.state);
        }

        if matches!(self.state.scene, Scene::Help) {
            draw_center_box(
                &mut self.term.cur,
                "How to play",
                "Keep the four meters up; their average sets the mood.\n\n\
                 F Feed: +hunger, +energy, a little mess.\n\
                 P Play: +fun, tires and dirties the pet.\n\
                 C Clean: +hygiene, slightly boring.\n\
                 S Sleep: dampens decay and restores energy;\n\
                   other actions wait until the pet wakes.\n\n\
                 XP accrues with time and care; 25 XP per level.\n\
                 Tab opens Settings (pace, decay, difficulty, skin).\n\n\
                 Esc or H to close help.",
            );
        }

        if matches!(self.state.scene, Scene::Rename) {
            let mut preview = self.state.name_edit.clone();
            if preview.len() < crate::model::NAME_MAX {
                preview.push('_');
            }
            draw_center_box(
                &mut self.term.cur,
                "Rename pet",
                &format!(
                    "Type a name (max {} chars).\n\nName: {}\n\nEnter save | Esc cancel | Backspace delete",
                    crate::model::NAME_MAX,
                    preview
                ),
            );
        }

        self.term.present()?;
        Ok(())
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let paths = project_paths()?;
    let store = JsonFileStore::new(paths.state_path);
    let mut app = App::init(store)?;
    app.run()?;
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
