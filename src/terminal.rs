use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Back buffer over the alternate screen. Draw into it, then `present`.
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
}

#[derive(Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Enter raw mode on the alternate screen.
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) -> io::Result<()> {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
        execute!(stdout(), Clear(ClearType::All))
    }

    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(&mut self.buffer[y as usize][x as usize])
    }

    /// Write a glyph, keeping whatever background the cell already has.
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if let Some(cell) = self.cell_mut(x, y) {
            *cell = Cell { ch, fg, bg: cell.bg, bold };
        }
    }

    pub fn set_with_bg(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bg: Option<Color>, bold: bool) {
        if let Some(cell) = self.cell_mut(x, y) {
            *cell = Cell { ch, fg, bg, bold };
        }
    }

    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Horizontally centered text. Returns the starting column.
    pub fn set_str_centered(&mut self, y: i32, s: &str, fg: Option<Color>, bold: bool) -> i32 {
        let x = (self.width as i32 - s.chars().count() as i32).max(0) / 2;
        self.set_str(x, y, s, fg, bold);
        x
    }

    /// Flush the whole buffer to the screen.
    pub fn present(&mut self) -> io::Result<()> {
        let mut out = stdout().lock();
        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;
            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                if let Some(bg) = cell.bg {
                    queue!(out, SetBackgroundColor(bg))?;
                }
                if let Some(fg) = cell.fg {
                    queue!(out, SetForegroundColor(fg))?;
                }
                queue!(out, Print(cell.ch))?;
                if cell.bold || cell.fg.is_some() || cell.bg.is_some() {
                    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
                }
            }
        }
        out.flush()
    }

    /// Next input or resize event, waiting at most `timeout`.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if poll(timeout)? {
            return Ok(Some(read()?));
        }
        Ok(None)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

/// Palette for the clock face and map.
pub mod colors {
    use crossterm::style::Color;

    pub const HERO: Color = Color::White;
    pub const ACCENT: Color = Color::Cyan;
    pub const MUTED: Color = Color::DarkGrey;
    pub const TEXT: Color = Color::Grey;
    pub const WARN: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
    pub const OK: Color = Color::Green;
    pub const LAND_DAY: Color = Color::DarkGreen;
    pub const LAND_NIGHT: Color = Color::DarkBlue;
    pub const TERMINATOR: Color = Color::Yellow;
    pub const MARKER: Color = Color::Red;
    pub const SUN: Color = Color::Yellow;
}
