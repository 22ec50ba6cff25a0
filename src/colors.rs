use crossterm::event::KeyCode;
use crossterm::style::Color;

pub const SCHEME_COUNT: u8 = 5;

/// Globe color scheme, switched with Shift+digit
#[derive(Clone, Copy)]
pub struct ColorState {
    pub scheme: u8,
}

impl ColorState {
    pub fn new(default_scheme: u8) -> Self {
        Self { scheme: default_scheme % SCHEME_COUNT }
    }

    /// Handle color scheme key input. Returns true if key was handled.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(')') => self.scheme = 0,  // Shift+0: matrix
            KeyCode::Char('!') => self.scheme = 1,  // Shift+1: fire
            KeyCode::Char('@') => self.scheme = 2,  // Shift+2: ocean
            KeyCode::Char('#') => self.scheme = 3,  // Shift+3: gold
            KeyCode::Char('$') => self.scheme = 4,  // Shift+4: mono
            _ => return false,
        }
        true
    }

    pub fn name(&self) -> &'static str {
        match self.scheme {
            1 => "fire",
            2 => "ocean",
            3 => "gold",
            4 => "mono",
            _ => "matrix",
        }
    }

    /// Color for globe line work at `intensity` 0 (graticule, night side) to 3 (lit coastline)
    pub fn globe(&self, intensity: u8) -> Color {
        scheme_color(self.scheme, intensity)
    }
}

pub fn scheme_color(scheme: u8, intensity: u8) -> Color {
    match scheme {
        1 => match intensity {  // fire
            0 => Color::DarkRed,
            1 => Color::Red,
            2 => Color::DarkYellow,
            _ => Color::Yellow,
        },
        2 => match intensity {  // ocean
            0 => Color::DarkBlue,
            1 => Color::Blue,
            2 => Color::DarkCyan,
            _ => Color::Rgb { r: 96, g: 165, b: 250 },
        },
        3 => match intensity {  // gold
            0 => Color::DarkYellow,
            1 => Color::Yellow,
            2 => Color::White,
            _ => Color::AnsiValue(11),
        },
        4 => match intensity {  // mono
            0 => Color::DarkGrey,
            1 => Color::Grey,
            _ => Color::White,
        },
        _ => match intensity {  // matrix
            0 => Color::DarkGreen,
            1 => Color::Green,
            2 => Color::Green,
            _ => Color::AnsiValue(10),
        },
    }
}

pub const PANEL_BG: Color = Color::Rgb { r: 17, g: 24, b: 39 };
pub const TEXT: Color = Color::Grey;
pub const TEXT_DIM: Color = Color::DarkGrey;
pub const HEADING: Color = Color::White;
pub const ACCENT: Color = Color::Rgb { r: 96, g: 165, b: 250 };
pub const HISTORY: Color = Color::Rgb { r: 251, g: 191, b: 36 };
