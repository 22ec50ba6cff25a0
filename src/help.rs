use crate::colors;
use crate::terminal::Terminal;

pub const HELP: &str = "\
GLOBETREK
──────────────────────────────
←→↑↓ / hjkl   Pan the globe
+ - / wheel   Zoom in / out
drag          Pan with the mouse
r             Toggle auto-rotate
Tab S-Tab     Cycle visible markers
Enter/click   Open landmark
!)@#$         Color scheme
?             Toggle this help
q             Quit

DETAIL PANEL
──────────────────────────────
1 / 2         Overview / Timeline
n / p         Next / previous event
v             Visualize selected era
b             Back to now
g             Open 3D earth view
Esc           Close panel";

/// Render a centered help box into the back buffer
pub fn render_help_overlay(term: &mut Terminal, width: u16, height: u16, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;
    let (x0, y0) = (start_x as i32, start_y as i32);
    let (x1, y1) = (x0 + box_width as i32 - 1, y0 + box_height as i32 - 1);

    let border = Some(colors::HEADING);
    term.fill_bg(x0, y0, box_width as u16, box_height as u16, colors::PANEL_BG);

    for x in x0 + 1..x1 {
        term.set(x, y0, '─', border, false);
        term.set(x, y1, '─', border, false);
    }
    for y in y0 + 1..y1 {
        term.set(x0, y, '│', border, false);
        term.set(x1, y, '│', border, false);
    }
    term.set(x0, y0, '┌', border, false);
    term.set(x1, y0, '┐', border, false);
    term.set(x0, y1, '└', border, false);
    term.set(x1, y1, '┘', border, false);

    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 1 + i as i32;
        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        term.set_str(x0 + 1, y, &padded, Some(colors::TEXT), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_is_centered_and_boxed() {
        let mut term = Terminal::headless(80, 40);
        render_help_overlay(&mut term, 80, 40, "ab\ncd");
        // box is 6 wide, 4 tall
        assert_eq!(term.get(37, 18).map(|c| c.ch), Some('┌'));
        assert_eq!(term.get(42, 21).map(|c| c.ch), Some('┘'));
        assert_eq!(term.get(39, 19).map(|c| c.ch), Some('a'));
    }

    #[test]
    fn empty_help_draws_nothing() {
        let mut term = Terminal::headless(10, 5);
        render_help_overlay(&mut term, 10, 5, "");
        assert_eq!(term.get(0, 0).map(|c| c.ch), Some(' '));
    }
}
