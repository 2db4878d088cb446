//! Clock face widgets: status bar, hero clock, city cards, input line, help box.

use crate::app::{CardView, HeroView, LookupState};
use crate::clock_sync::SyncStatus;
use crate::projection::MapState;
use crate::terminal::{colors, Terminal};
use crossterm::style::Color;

const GLYPH_ROWS: usize = 3;

static DIGIT_GLYPHS: [[&str; GLYPH_ROWS]; 10] = [
    ["█▀█", "█ █", "█▄█"],
    ["▄█ ", " █ ", "▄█▄"],
    ["▀▀█", "▄▀▀", "█▄▄"],
    ["▀▀█", " ▀█", "▄▄█"],
    ["█ █", "▀▀█", "  █"],
    ["█▀▀", "▀▀█", "▄▄█"],
    ["█▀▀", "█▀█", "█▄█"],
    ["▀▀█", "  █", "  █"],
    ["█▀█", "█▀█", "█▄█"],
    ["█▀█", "▀▀█", "▄▄█"],
];
static SEPARATOR_GLYPH: [&str; GLYPH_ROWS] = [" ", "▀", "▀"];
const GLYPH_GAP: usize = 1;

fn glyph(ch: char) -> Option<&'static [&'static str; GLYPH_ROWS]> {
    match ch {
        ':' => Some(&SEPARATOR_GLYPH),
        '0'..='9' => Some(&DIGIT_GLYPHS[(ch as u8 - b'0') as usize]),
        _ => None,
    }
}

/// Rendered width of a block-digit string.
pub fn big_width(text: &str) -> usize {
    let widths: Vec<usize> = text
        .chars()
        .filter_map(glyph)
        .map(|g| g[0].chars().count())
        .collect();
    widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * GLYPH_GAP
}

/// Draw `text` in block digits starting at column `x`. Returns the end column.
pub fn draw_big(term: &mut Terminal, x: i32, y: i32, text: &str, color: Color) -> i32 {
    let mut cursor = x;
    for g in text.chars().filter_map(glyph) {
        for (row, line) in g.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    term.set(cursor + col as i32, y + row as i32, ch, Some(color), true);
                }
            }
        }
        cursor += g[0].chars().count() as i32 + GLYPH_GAP as i32;
    }
    cursor - GLYPH_GAP as i32
}

/// Cut to `width` columns, marking the cut with an ellipsis.
pub fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

pub fn draw_status(term: &mut Terminal, status: SyncStatus, offset: &str, map: MapState) {
    let (width, _) = term.size();
    term.set_str(1, 0, "termclock", Some(colors::ACCENT), true);

    let map_note = match map {
        MapState::Pending => "map loading",
        MapState::Loaded => "",
        MapState::Unavailable => "map unavailable",
    };
    term.set_str(12, 0, map_note, Some(colors::MUTED), false);

    let color = match status {
        SyncStatus::Synced => colors::OK,
        SyncStatus::Syncing => colors::WARN,
        SyncStatus::SyncFailed => colors::ERROR,
        SyncStatus::Unsynced => colors::MUTED,
    };
    let label = status.label();
    let right = label.chars().count() + offset.chars().count() + 5;
    let x = width as i32 - right as i32;
    term.set(x, 0, '●', Some(color), false);
    term.set_str(x + 2, 0, label, Some(color), true);
    term.set_str(x + 2 + label.chars().count() as i32 + 2, 0, offset, Some(colors::MUTED), false);
}

/// Hero block. Occupies `HERO_HEIGHT` rows from `y`.
pub const HERO_HEIGHT: u16 = 7;

pub fn draw_hero(term: &mut Terminal, y: i32, hero: &HeroView) {
    let (width, _) = term.size();
    term.set_str_centered(y, &hero.location, Some(colors::MUTED), false);

    let digits = big_width(&hero.time) as i32;
    let suffix = hero.suffix.chars().count() as i32;
    let total = digits + if suffix > 0 { suffix + 1 } else { 0 };
    let x = (width as i32 - total).max(0) / 2;
    let end = draw_big(term, x, y + 1, &hero.time, colors::HERO);
    term.set_str(end + 1, y + 3, hero.suffix, Some(colors::ACCENT), true);

    term.set_str_centered(y + 4, &hero.date, Some(colors::TEXT), false);
    term.set_str_centered(y + 5, &hero.zone, Some(colors::ACCENT), true);
    term.set_str_centered(y + 6, &hero.sun, Some(colors::MUTED), false);
}

/// Cards laid out in `columns`, two rows each, starting at card `first`.
pub fn draw_cards(term: &mut Terminal, y: i32, rows: usize, columns: usize, first: usize, cards: &[CardView]) {
    let (width, _) = term.size();
    let columns = columns.max(1);
    let card_w = (width as usize / columns).max(1);
    for (slot, card) in cards.iter().skip(first).take(rows * columns).enumerate() {
        let x = ((slot % columns) * card_w) as i32 + 1;
        let top = y + (slot / columns) as i32 * 2;
        let inner = card_w.saturating_sub(3);

        let time_w = card.time.chars().count();
        let label = fit(&card.label, inner.saturating_sub(time_w + 3));
        let (marker, label_color) = if card.active {
            ('▸', colors::ACCENT)
        } else {
            (' ', colors::TEXT)
        };
        term.set(x, top, marker, Some(colors::ACCENT), true);
        term.set_str(x + 2, top, &label, Some(label_color), card.active);
        let time_x = x + inner as i32 - time_w as i32 + 1;
        term.set_str(time_x, top, &card.time, Some(colors::HERO), card.active);
        term.set_str(x + 2, top + 1, &fit(&card.meta, inner), Some(colors::MUTED), false);
    }
}

pub fn draw_input(term: &mut Terminal, y: i32, editing: Option<&str>, lookup: &LookupState) {
    let prompt = "Add city › ";
    term.set_str(1, y, prompt, Some(colors::ACCENT), true);
    let x = 1 + prompt.chars().count() as i32;
    match editing {
        Some(text) => {
            term.set_str(x, y, text, Some(colors::HERO), false);
            term.set(x + text.chars().count() as i32, y, '█', Some(colors::ACCENT), false);
        }
        None => {
            term.set_str(x, y, lookup.placeholder, Some(colors::MUTED), false);
        }
    }
    let hint_color = if lookup.is_busy() { colors::WARN } else { colors::MUTED };
    term.set_str(1, y + 1, lookup.hint, Some(hint_color), false);
}

pub fn draw_footer(term: &mut Terminal, y: i32, editing: bool, twenty_four: bool) {
    let keys = if editing {
        "enter search  esc cancel".to_string()
    } else {
        let hours = if twenty_four { "12h" } else { "24h" };
        format!("/ add  tab next  l local  x remove  r reset  s sync  t {hours}  ? help  q quit")
    };
    term.set_str(1, y, &keys, Some(colors::MUTED), false);
}

/// Centered bordered box over whatever is already drawn.
pub fn draw_help(term: &mut Terminal, text: &str) {
    let lines: Vec<&str> = text.lines().collect();
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_w = inner + 4;
    let box_h = lines.len() + 2;
    let (width, height) = term.size();
    let left = (width as usize).saturating_sub(box_w) as i32 / 2;
    let top = (height as usize).saturating_sub(box_h) as i32 / 2;
    let right = left + box_w as i32 - 1;
    let bottom = top + box_h as i32 - 1;
    let border = Some(colors::HERO);

    for x in left..=right {
        let (t, b) = match x {
            _ if x == left => ('┌', '└'),
            _ if x == right => ('┐', '┘'),
            _ => ('─', '─'),
        };
        term.set_with_bg(x, top, t, border, None, false);
        term.set_with_bg(x, bottom, b, border, None, false);
    }
    for (i, line) in lines.iter().enumerate() {
        let y = top + 1 + i as i32;
        term.set_with_bg(left, y, '│', border, None, false);
        let padded = format!(" {line:<inner$} ");
        for (j, ch) in padded.chars().enumerate() {
            term.set_with_bg(left + 1 + j as i32, y, ch, Some(colors::TEXT), None, false);
        }
        term.set_with_bg(right, y, '│', border, None, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_digit_widths() {
        assert_eq!(big_width("8"), 3);
        assert_eq!(big_width("10:05:09"), 6 * 3 + 2 + 7);
        assert_eq!(big_width("2:05:09"), 5 * 3 + 2 + 6);
        // Non-glyph characters are skipped
        assert_eq!(big_width("AM"), 0);
    }

    #[test]
    fn glyph_rows_are_uniform() {
        for g in DIGIT_GLYPHS.iter() {
            assert!(g.iter().all(|row| row.chars().count() == 3));
        }
        assert!(SEPARATOR_GLYPH.iter().all(|row| row.chars().count() == 1));
    }

    #[test]
    fn fit_truncates_with_ellipsis() {
        assert_eq!(fit("Tokyo", 10), "Tokyo");
        assert_eq!(fit("America/Los_Angeles", 8), "America…");
        assert_eq!(fit("anything", 0), "");
    }
}
