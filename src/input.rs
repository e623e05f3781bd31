use crate::model::Scene;
use crate::sim::PlayerAction;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent { key: k.code });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(scene: &Scene, ev: InputEvent) -> Option<PlayerAction> {
    if matches!(scene, Scene::Rename) {
        return match ev.key {
            KeyCode::Enter => Some(PlayerAction::RenameCommit),
            KeyCode::Esc => Some(PlayerAction::RenameCancel),
            KeyCode::Backspace => Some(PlayerAction::RenameBackspace),
            KeyCode::Char(ch) => {
                if ch.is_ascii() && !ch.is_ascii_control() {
                    Some(PlayerAction::RenameChar(ch))
                } else {
                    None
                }
            }
            _ => None,
        };
    }

    // Global
    match ev.key {
        KeyCode::Char('h') | KeyCode::Char('H') => return Some(PlayerAction::HelpToggle),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(PlayerAction::Quit),
        KeyCode::Esc => return Some(PlayerAction::Back),
        _ => {}
    }

    match scene {
        Scene::Main => match ev.key {
            KeyCode::Char('f') | KeyCode::Char('F') => Some(PlayerAction::Feed),
            KeyCode::Char('p') | KeyCode::Char('P') => Some(PlayerAction::Play),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(PlayerAction::Clean),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(PlayerAction::SleepToggle),
            KeyCode::Tab => Some(PlayerAction::SettingsOpen),
            _ => None,
        },
        Scene::Settings => match ev.key {
            KeyCode::Up => Some(PlayerAction::SettingsMove(-1)),
            KeyCode::Down => Some(PlayerAction::SettingsMove(1)),
            KeyCode::Left => Some(PlayerAction::SettingsAdjust(-1)),
            KeyCode::Right => Some(PlayerAction::SettingsAdjust(1)),
            KeyCode::Enter => Some(PlayerAction::SettingsActivate),
            KeyCode::Tab => Some(PlayerAction::Back),
            _ => None,
        },
        Scene::Help => None,
        Scene::Rename => None,
    }
}
