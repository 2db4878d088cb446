//! Interactive board: event loop, key handling and screen layout.

pub mod face;
pub mod map;

use crate::api::{HttpApi, WorldApi};
use crate::app::WorldClock;
use crate::board::ActivationResult;
use crate::clock_sync::TimeSource;
use crate::config::BoardConfig;
use crate::fetch::{Fetcher, Outcome};
use crate::schedule::Periodic;
use crate::terminal::Terminal;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

const FRAME_POLL: Duration = Duration::from_millis(50);
const MAX_QUERY_LEN: usize = 80;

const HELP_TEXT: &str = "\
TERMCLOCK
─────────────────────────────
/ or a      Add a city
Enter       Search (while typing)
Esc         Cancel typing
Tab / →     Next city
S-Tab / ←   Previous city
1-9         Jump to card
l           Local time
x / Del     Remove selected city
r           Reset board
s           Sync with server now
t           Toggle 12/24 hour
?           Close help
q           Quit
─────────────────────────────
Map: yellow line is the terminator,
shaded cells are in night, red dot
is the selected city.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Input(String),
}

#[derive(Debug)]
pub struct UiState {
    pub mode: Mode,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::Browse,
            show_help: false,
        }
    }
}

/// Side effects a key asks the loop to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Redraw,
    Quit,
    Lookup { query: String, generation: u64 },
    SyncNow,
}

pub fn handle_key<S: TimeSource>(ui: &mut UiState, app: &mut WorldClock<S>, key: KeyEvent) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if let Mode::Input(buffer) = &mut ui.mode {
        return match key.code {
            KeyCode::Esc => {
                ui.mode = Mode::Browse;
                Action::Redraw
            }
            KeyCode::Enter => {
                let query = buffer.trim().to_string();
                ui.mode = Mode::Browse;
                match app.start_lookup(&query) {
                    Some(generation) => Action::Lookup { query, generation },
                    None => Action::Redraw,
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                Action::Redraw
            }
            KeyCode::Char(ch) if buffer.chars().count() < MAX_QUERY_LEN => {
                buffer.push(ch);
                Action::Redraw
            }
            _ => Action::None,
        };
    }

    if ui.show_help {
        return match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('?') | KeyCode::Esc => {
                ui.show_help = false;
                Action::Redraw
            }
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('/') | KeyCode::Char('a') => {
            ui.mode = Mode::Input(String::new());
            Action::Redraw
        }
        KeyCode::Tab | KeyCode::Right | KeyCode::Down | KeyCode::Char('j') => {
            app.cycle(true);
            Action::Redraw
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Up | KeyCode::Char('k') => {
            app.cycle(false);
            Action::Redraw
        }
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            let Some(id) = app.board().list().get(index).map(|city| city.id.clone()) else {
                return Action::None;
            };
            app.select(&id);
            Action::Redraw
        }
        KeyCode::Char('l') => {
            app.select_local();
            Action::Redraw
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            app.remove_active();
            Action::Redraw
        }
        KeyCode::Char('r') => {
            app.reset_board();
            Action::Redraw
        }
        KeyCode::Char('s') => Action::SyncNow,
        KeyCode::Char('t') => {
            app.toggle_twenty_four();
            Action::Redraw
        }
        KeyCode::Char('?') => {
            ui.show_help = true;
            Action::Redraw
        }
        _ => Action::None,
    }
}

/// Screen regions for a terminal size and card count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub hero_y: u16,
    pub map: Option<map::MapArea>,
    pub cards_y: u16,
    pub card_rows: u16,
    pub card_columns: u16,
    pub input_y: u16,
    pub footer_y: u16,
}

const MIN_MAP_ROWS: u16 = 4;
const CARD_MIN_WIDTH: u16 = 38;

pub fn layout(width: u16, height: u16, card_count: usize) -> Layout {
    let hero_y = 2;
    let footer_y = height.saturating_sub(1);
    let input_y = height.saturating_sub(4);
    let card_columns = (width / CARD_MIN_WIDTH).clamp(1, 4);
    let wanted_rows = card_count.div_ceil(card_columns as usize) as u16;

    let body_top = hero_y + face::HERO_HEIGHT + 1;
    let body_bottom = input_y.saturating_sub(1);
    let body = body_bottom.saturating_sub(body_top);

    // Cards get up to half the body, the map the rest
    let card_rows = wanted_rows.min(body / 2 / 2);
    let cards_y = body_bottom.saturating_sub(card_rows * 2);
    let map_rows = cards_y.saturating_sub(body_top + 1);

    let map = (map_rows >= MIN_MAP_ROWS).then(|| {
        let cols = (map_rows * 4).min(width.saturating_sub(2));
        let rows = (cols / 4).max(1).min(map_rows);
        map::MapArea {
            x: (width - cols) / 2,
            y: body_top,
            cols,
            rows,
        }
    });

    Layout {
        hero_y,
        map,
        cards_y,
        card_rows,
        card_columns,
        input_y,
        footer_y,
    }
}

/// First card to show so the active card stays on screen.
pub fn first_visible_card(active: Option<usize>, rows: u16, columns: u16) -> usize {
    let columns = columns.max(1) as usize;
    let rows = rows as usize;
    match active {
        Some(index) if rows > 0 => {
            let row = index / columns;
            row.saturating_sub(rows - 1) * columns
        }
        _ => 0,
    }
}

fn draw<S: TimeSource>(term: &mut Terminal, ui: &UiState, app: &WorldClock<S>) {
    term.clear();
    let (width, height) = term.size();
    let cards = app.cards();
    let layout = layout(width, height, cards.len());

    let (status, offset) = app.sync_status();
    face::draw_status(term, status, &offset, app.map_state());
    face::draw_hero(term, layout.hero_y as i32, &app.hero());

    if let Some(area) = layout.map {
        let markers: Vec<_> = app.hero_city().and_then(|c| app.city_point(c)).into_iter().collect();
        let scene = map::MapScene {
            projector: app.projector(),
            canvas: app.projector().canvas(),
            land: app.land(),
            curve: app.curve(),
            solar: app.solar(),
            markers: &markers,
        };
        map::draw(term, area, &scene);
    }

    let first = first_visible_card(app.board().active_index(), layout.card_rows, layout.card_columns);
    face::draw_cards(
        term,
        layout.cards_y as i32,
        layout.card_rows as usize,
        layout.card_columns as usize,
        first,
        &cards,
    );

    let editing = match &ui.mode {
        Mode::Input(text) => Some(text.as_str()),
        Mode::Browse => None,
    };
    face::draw_input(term, layout.input_y as i32, editing, app.lookup());
    face::draw_footer(term, layout.footer_y as i32, editing.is_some(), app.twenty_four());

    if ui.show_help {
        face::draw_help(term, HELP_TEXT);
    }
}

fn apply_outcome<S: TimeSource>(app: &mut WorldClock<S>, outcome: Outcome, sync: &mut Periodic) {
    match outcome {
        Outcome::Time(result) => app.apply_time(result),
        Outcome::Local(result) => app.apply_local(result),
        Outcome::City { generation, result } => {
            if let Some(Ok(ActivationResult::Added)) = app.finish_lookup(generation, result) {
                // New zone joins the next time request
                sync.trigger();
            }
        }
        Outcome::Map(result) => app.apply_map(result),
    }
}

pub fn run(config: BoardConfig) -> io::Result<()> {
    let api: Arc<dyn WorldApi> = Arc::new(HttpApi::new(&config.base_url, config.timeout));
    let fetcher = Fetcher::new(api);
    let mut app = WorldClock::with_system_clock(config.initial_board(), config.twenty_four);
    let mut ui = UiState::default();

    let mut display = Periodic::new(config.display_interval);
    let mut sync = Periodic::new(config.sync_interval);
    let mut terminator = Periodic::new(config.terminator_interval);

    log::info!("starting board against {}", config.base_url);
    fetcher.request_local();
    fetcher.request_map(config.map_source.clone(), config.map_object.clone(), config.timeout);

    let mut term = Terminal::new()?;
    let mut dirty = true;

    loop {
        for outcome in fetcher.drain() {
            apply_outcome(&mut app, outcome, &mut sync);
            dirty = true;
        }

        let now = Instant::now();
        if sync.due(now) && app.begin_sync() {
            fetcher.request_time(app.board().timezones());
            dirty = true;
        }
        if terminator.due(now) {
            app.recompute_terminator();
            dirty = true;
        }
        if display.due(now) {
            dirty = true;
        }

        if dirty {
            draw(&mut term, &ui, &app);
            term.present()?;
            dirty = false;
        }

        match term.poll_event(FRAME_POLL)? {
            Some(Event::Key(key)) => match handle_key(&mut ui, &mut app, key) {
                Action::Quit => break,
                Action::Lookup { query, generation } => {
                    log::debug!("lookup #{generation}: {query}");
                    fetcher.request_city(query, generation);
                    dirty = true;
                }
                Action::SyncNow => {
                    sync.trigger();
                    dirty = true;
                }
                Action::Redraw => dirty = true,
                Action::None => {}
            },
            Some(Event::Resize(w, h)) => {
                term.resize(w, h)?;
                dirty = true;
            }
            _ => {}
        }
    }

    log::info!("board closed");
    Ok(())
}
