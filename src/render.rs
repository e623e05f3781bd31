use crate::model::{GameState, Mood, Scene, XP_PER_LEVEL};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
            c.bold = false;
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let prev = CellBuffer::new(cols, rows);
        let cur = CellBuffer::new(cols, rows);

        Ok(Self {
            out,
            cols,
            rows,
            prev,
            cur,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }

    pub(crate) fn bell(&mut self) -> anyhow::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

/* -----------------------------
   Text + bars
------------------------------ */

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg,
                bold: false,
            },
        );
    }
}

fn bar(value01: f32, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

fn stat_color(v: f32) -> Color {
    if v > 70.0 {
        Color::Green
    } else if v > 30.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/* -----------------------------
   Side panel: stats, xp, log
------------------------------ */

pub(crate) fn panel_width(cols: u16) -> u16 {
    let cols = cols as i32;
    (26.max(cols / 3).min(cols - 10)).max(0) as u16
}

pub(crate) fn ui_overlay(buf: &mut CellBuffer, st: &GameState) {
    let bg = Color::Black;
    let fg = Color::White;

    let mood = st.mood();
    let title = format!(
        "Tamagotchy  |  {}  Lv{}  |  {}",
        st.pet.name,
        st.pet.level,
        mood.label()
    );
    draw_text(buf, 1, 0, &title, fg, bg);

    let s = st.pet.stats;
    let lines = [
        ("Hunger ", s.hunger),
        ("Fun    ", s.fun),
        ("Hygiene", s.hygiene),
        ("Energy ", s.energy),
    ];
    for (i, (name, val)) in lines.iter().enumerate() {
        let b = bar(*val / 100.0, 14);
        let line = format!("{name}: {b} {:>5.1}", val);
        draw_text(buf, 1, 2 + i as u16, &line, stat_color(*val), bg);
    }

    // xp progress toward next level
    let into_level = st.pet.xp % XP_PER_LEVEL;
    let xp_line = format!(
        "XP     : {} {:>4.1}/{}",
        bar(into_level / XP_PER_LEVEL, 14),
        into_level,
        XP_PER_LEVEL as u32
    );
    draw_text(buf, 1, 7, &xp_line, Color::Cyan, bg);

    if st.pet.is_asleep {
        draw_text(buf, 1, 9, "zZz  sleeping...", Color::Magenta, bg);
    }

    // activity log, newest first
    draw_text(buf, 1, 11, "Activity", Color::DarkGrey, bg);
    let log_rows = buf.h.saturating_sub(13) as usize;
    for (i, entry) in st.log.iter_recent().take(log_rows).enumerate() {
        let line = format!("{} {}", entry.at.format("%H:%M:%S"), entry.text);
        draw_text(buf, 1, 12 + i as u16, &line, Color::Grey, bg);
    }

    let help = match st.scene {
        Scene::Main => "Keys: f feed | p play | c clean | s sleep | tab settings | h help | q quit",
        Scene::Settings => "Settings: ↑↓ select | ←→ adjust | enter toggle | esc back",
        Scene::Help => "Help: esc back | h close | q quit",
        Scene::Rename => "Rename: type name | enter save | esc cancel",
    };
    draw_text(buf, 1, buf.h.saturating_sub(1), help, fg, bg);
}

/* -----------------------------
   Pet viewport: skins + backdrop
------------------------------ */

pub(crate) fn bounce_offset(frame: u64, asleep: bool) -> (i32, i32) {
    if asleep {
        return (0, 0);
    }
    let t = frame as f32 * 0.15;
    ((t.cos() * 2.0) as i32, (t.sin() * 1.0) as i32)
}

pub(crate) fn draw_neon_grid(buf: &mut CellBuffer, x0: u16) {
    let grid = Color::Rgb {
        r: 40,
        g: 20,
        b: 70,
    };
    for y in 0..buf.h {
        for x in x0..buf.w {
            let on_col = (x as usize) % 6 == 0;
            let on_row = (y as usize) % 3 == 0;
            let ch = match (on_col, on_row) {
                (true, true) => '┼',
                (true, false) => '│',
                (false, true) => '─',
                _ => continue,
            };
            buf.set(
                x,
                y,
                Cell {
                    ch,
                    fg: grid,
                    bg: Color::Black,
                    bold: false,
                },
            );
        }
    }
}

const BLOB_SKIN: [&str; 7] = [
    "    _______    ",
    "   /       \\   ",
    "  |  o   o  |  ",
    "  |    ^    |  ",
    "  |  \\___/  |  ",
    "   \\       /   ",
    "    \\_____/    ",
];

const OUROBOROS_SKIN: [&str; 7] = [
    "    .~~~~~.    ",
    "   /  _____\\,  ",
    "  |  /  o  \\ \\ ",
    "  | |      | | ",
    "  |  \\____/  | ",
    "   \\___><___/  ",
    "               ",
];

pub(crate) fn draw_pet(buf: &mut CellBuffer, st: &GameState, cx: i32, cy: i32) {
    let bg = Color::Black;
    let mood = st.mood();

    let fg = match mood {
        Mood::Asleep => Color::Magenta,
        Mood::Ecstatic => Color::Green,
        Mood::Happy => Color::Cyan,
        Mood::Okay => Color::White,
        Mood::Grumpy => Color::Yellow,
        Mood::Critical => Color::Red,
    };

    let mut grid: Vec<String> = if st.settings.ouroboros_skin {
        OUROBOROS_SKIN.iter().map(|s| s.to_string()).collect()
    } else {
        BLOB_SKIN.iter().map(|s| s.to_string()).collect()
    };

    // mood tweaks on the default skin: eyes and mouth
    if !st.settings.ouroboros_skin {
        match mood {
            Mood::Asleep => {
                grid[2] = "  |  -   -  |  ".to_string();
                grid[4] = "  |   ___   |  ".to_string();
            }
            Mood::Grumpy | Mood::Critical => {
                grid[4] = "  |  /___\\  |  ".to_string();
            }
            Mood::Ecstatic => {
                grid[2] = "  |  ^   ^  |  ".to_string();
            }
            _ => {}
        }
    }

    let w = 15i32;
    let h = grid.len() as i32;
    let x0 = cx - w / 2;
    let y0 = cy - h / 2;

    for (yy, line) in grid.iter().enumerate() {
        let y = y0 + yy as i32;
        if y < 0 || y >= buf.h as i32 {
            continue;
        }
        let mut x = x0;
        for ch in line.chars() {
            if ch != ' ' && x >= 0 && x < buf.w as i32 {
                buf.set(
                    x as u16,
                    y as u16,
                    Cell {
                        ch,
                        fg,
                        bg,
                        bold: false,
                    },
                );
            }
            x += 1;
        }
    }

    if st.pet.is_asleep {
        for (i, ch) in ['z', 'Z', 'z'].into_iter().enumerate() {
            let x = cx + w / 2 + 1 + i as i32;
            let y = y0 - 1 - i as i32;
            if x >= 0 && x < buf.w as i32 && y >= 0 && y < buf.h as i32 {
                buf.set(
                    x as u16,
                    y as u16,
                    Cell {
                        ch,
                        fg: Color::Magenta,
                        bg,
                        bold: true,
                    },
                );
            }
        }
    }
}

/* -----------------------------
   Settings rows
------------------------------ */

pub(crate) const SETTINGS_ROWS: usize = 8;

pub(crate) fn draw_settings(buf: &mut CellBuffer, st: &GameState) {
    let bg = Color::Black;
    let fg = Color::White;
    let hi = Color::Yellow;

    let x0 = panel_width(buf.w).saturating_add(4);
    let y0 = 2;

    draw_text(buf, x0, y0, "Settings", fg, bg);

    let s = &st.settings;
    let mut name_display = st.pet.name.clone();
    if name_display.len() > 16 {
        name_display.truncate(15);
        name_display.push_str("...");
    }

    let rows: [String; SETTINGS_ROWS] = [
        format!("Sound:          {}", if s.sound { "on" } else { "off" }),
        format!("Neon grid:      {}", if s.neon_grid { "on" } else { "off" }),
        format!(
            "Ouroboros skin: {}",
            if s.ouroboros_skin { "on" } else { "off" }
        ),
        format!("Tick interval:  {} ms", s.tick_ms),
        format!("Decay rate:     {:.1}", s.decay_rate),
        format!("Difficulty:     {}", s.difficulty.label()),
        format!("Rename pet      ({})", name_display),
        "Reset pet".to_string(),
    ];

    for (i, row) in rows.iter().enumerate() {
        let selected = st.settings_cursor == i;
        let line = format!("{} {row}", if selected { ">" } else { " " });
        draw_text(
            buf,
            x0,
            y0 + 2 + i as u16,
            &line,
            if selected { hi } else { fg },
            bg,
        );
    }
}

/* -----------------------------
   Centered overlay box
------------------------------ */

pub(crate) fn draw_center_box(buf: &mut CellBuffer, title: &str, body: &str) {
    let w = buf.w;
    let h = buf.h;
    let fg = Color::White;
    let bg = Color::Black;

    let bw = std::cmp::min(58, w.saturating_sub(4));
    let bh = std::cmp::min(16, h.saturating_sub(4));
    if bw < 6 || bh < 5 {
        return;
    }

    let x0 = (w - bw) / 2;
    let y0 = (h - bh) / 2;

    for y in y0..y0 + bh {
        for x in x0..x0 + bw {
            let ch = if y == y0 || y == y0 + bh - 1 {
                if x == x0 {
                    if y == y0 {
                        '┌'
                    } else {
                        '└'
                    }
                } else if x == x0 + bw - 1 {
                    if y == y0 {
                        '┐'
                    } else {
                        '┘'
                    }
                } else {
                    '─'
                }
            } else if x == x0 || x == x0 + bw - 1 {
                '│'
            } else {
                ' '
            };
            buf.set(
                x,
                y,
                Cell {
                    ch,
                    fg,
                    bg,
                    bold: false,
                },
            );
        }
    }

    draw_text(buf, x0 + 2, y0 + 1, title, fg, bg);

    let mut yy = y0 + 3;
    for line in body.lines() {
        if yy >= y0 + bh - 1 {
            break;
        }
        draw_text(buf, x0 + 2, yy, line, fg, bg);
        yy += 1;
    }
}
