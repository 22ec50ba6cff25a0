use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, BufWriter, Write};
use std::time::Duration;

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
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

/// Off-screen cell buffer, flushed to the terminal with `present`
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    front: Vec<Vec<Cell>>,
    interactive: bool,
}

impl Terminal {
    /// Take over the terminal: raw mode, alternate screen, mouse capture
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;

        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;

        Ok(Self::with_size(width, height, true))
    }

    /// Detached buffer that never touches the real terminal
    pub fn headless(width: u16, height: u16) -> Self {
        Self::with_size(width, height, false)
    }

    fn with_size(width: u16, height: u16, interactive: bool) -> Self {
        Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
            front: Vec::new(),
            interactive,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
        self.front.clear();
    }

    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.front.clear();
        if self.interactive {
            execute!(stdout(), Clear(ClearType::All))?;
        }
        Ok(())
    }

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

    /// Set a string starting at position; returns the number of cells written
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) -> usize {
        let mut n = 0;
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
            n += 1;
        }
        n
    }

    /// Paint a background color over a rectangle, keeping characters
    pub fn fill_bg(&mut self, x: i32, y: i32, w: u16, h: u16, bg: Color) {
        for yy in y..y + h as i32 {
            for xx in x..x + w as i32 {
                if let Some(cell) = self.cell_mut(xx, yy) {
                    cell.bg = Some(bg);
                }
            }
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.buffer.get(y as usize)?.get(x as usize)
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.buffer.get_mut(y as usize)?.get_mut(x as usize)
    }

    /// Flush cells that changed since the last frame
    pub fn present(&mut self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        let full = self.front.len() != self.buffer.len();
        let mut out = BufWriter::new(stdout());

        for (y, row) in self.buffer.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if !full && self.front[y].get(x) == Some(cell) {
                    continue;
                }
                queue!(out, MoveTo(x as u16, y as u16))?;
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                if let Some(bg) = cell.bg {
                    queue!(out, SetBackgroundColor(bg))?;
                }
                if let Some(fg) = cell.fg {
                    queue!(out, SetForegroundColor(fg))?;
                }
                queue!(out, Print(cell.ch), ResetColor)?;
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        self.front = self.buffer.clone();
        Ok(())
    }

    /// Next input event, waiting at most `timeout`
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<Event>> {
        if poll(timeout)? {
            return Ok(Some(read()?));
        }
        Ok(None)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.interactive {
            let _ = execute!(stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}
