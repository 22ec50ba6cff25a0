//! Landmark detail side panel

use crate::catalog::Landmark;
use crate::colors::{ACCENT, HEADING, HISTORY, PANEL_BG, TEXT, TEXT_DIM};
use crate::content::HistoryEvent;
use crate::detail::{DetailOrchestrator, PanelView};
use crate::image_view::ImageView;
use crate::terminal::Terminal;
use crossterm::style::Color;
use std::io;
use std::process::{Command, Stdio};

const MIN_WIDTH: u16 = 36;
const MAX_WIDTH: u16 = 64;

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if len > 0 {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
            len = 0;
        }
        if len > 0 {
            line.push(' ');
            len += 1;
        }
        len += word.len();
        line.extend(word);
    }
    if len > 0 {
        lines.push(line);
    }
    lines
}

/// Deep link into the 3D earth viewer, looking down at the landmark
pub fn deep_link(base: &str, landmark: &Landmark) -> String {
    format!(
        "{}/@{},{},1000d,35y,0h,60t,0r",
        base.trim_end_matches('/'),
        landmark.lat,
        landmark.lng
    )
}

/// Hand a URL to the platform opener without waiting for it
pub fn open_external(url: &str) -> io::Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

/// Panel-local UI state: timeline cursor and the decoded image
pub struct Panel {
    cursor: usize,
    image: ImageView,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        Self { cursor: 0, image: ImageView::new() }
    }

    /// Forget per-landmark state; call on every new selection
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.image.clear();
    }

    pub fn width_for(term_w: u16) -> u16 {
        (term_w * 2 / 5).clamp(MIN_WIDTH, MAX_WIDTH).min(term_w)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next_event(&mut self, len: usize) {
        if len > 0 {
            self.cursor = (self.cursor + 1).min(len - 1);
        }
    }

    pub fn prev_event(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn selected_event<'a>(&self, orch: &'a DetailOrchestrator) -> Option<&'a HistoryEvent> {
        orch.history().get(self.cursor)
    }

    pub fn render(&mut self, term: &mut Terminal, orch: &DetailOrchestrator, x: u16, h: u16, w: u16, earth_url: &str) {
        let Some(landmark) = orch.landmark() else { return };
        let (x0, inner) = (x as i32 + 2, w.saturating_sub(4) as usize);

        term.fill_bg(x as i32, 0, w, h, PANEL_BG);
        for y in 0..h as i32 {
            term.set(x as i32, y, '│', Some(TEXT_DIM), false);
        }

        // Header
        let mut y = 1;
        term.set(x0, y, '●', Some(landmark.category.color()), false);
        term.set_str(x0 + 2, y, &truncate(landmark.name, inner.saturating_sub(8)), Some(HEADING), true);
        term.set_str(x as i32 + w as i32 - 6, y, "[Esc]", Some(TEXT_DIM), false);
        y += 1;
        let subtitle = format!("{} · {}", landmark.country.to_uppercase(), landmark.category.label());
        term.set_str(x0 + 2, y, &subtitle, Some(TEXT_DIM), false);
        y += 2;

        // Image
        let image_h = (w * 9 / 32).clamp(6, (h / 3).max(6));
        self.render_image(term, orch, x0 as u16, y as u16, inner as u16, image_h);
        y += image_h as i32 + 1;

        // Tabs
        let tabs = [(PanelView::Overview, "1 Overview"), (PanelView::Timeline, "2 Timeline")];
        let mut tx = x0;
        for (view, label) in tabs {
            let active = orch.view() == view;
            let color = if active { ACCENT } else { TEXT_DIM };
            let n = term.set_str(tx, y, label, Some(color), active);
            if active {
                for i in 0..n as i32 {
                    term.set(tx + i, y + 1, '─', Some(ACCENT), false);
                }
            }
            tx += n as i32 + 3;
        }
        y += 3;

        let bottom = h as i32 - 3;
        match orch.view() {
            PanelView::Overview => render_overview(term, orch, x0, y, bottom, inner),
            PanelView::Timeline => self.render_timeline(term, orch, x0, y, bottom, inner),
        }

        // Footer deep link
        term.set_str(x0, h as i32 - 2, "g  View in 3D Earth ↗", Some(ACCENT), false);
        let link = deep_link(earth_url, landmark);
        term.set_str(x0, h as i32 - 1, &truncate(&link, inner), Some(TEXT_DIM), false);
    }

    fn render_image(&mut self, term: &mut Terminal, orch: &DetailOrchestrator, x: u16, y: u16, w: u16, h: u16) {
        let loading = orch.loading();
        let shown = match orch.display_image() {
            Some(img) => self.image.show(img),
            None => {
                self.image.clear();
                false
            }
        };

        if shown {
            self.image.render(term, x, y, w, h);
        } else if !loading.image {
            overlay(term, x, y, w, h, "Image unavailable", TEXT_DIM);
        }

        if orch.generating_historical().is_some() {
            overlay(term, x, y, w, h, "Reconstructing history...", HISTORY);
        } else if loading.image {
            overlay(term, x, y, w, h, "Generating view...", TEXT);
        } else if shown && orch.showing_historical() {
            term.set_str(x as i32, y as i32, " Historical View ", Some(Color::Black), true);
            term.fill_bg(x as i32, y as i32, 17, 1, HISTORY);
            let back = "[b] Back to Now";
            term.set_str(
                (x + w) as i32 - back.len() as i32,
                (y + h) as i32 - 1,
                back,
                Some(HEADING),
                true,
            );
        }
    }

    fn render_timeline(&self, term: &mut Terminal, orch: &DetailOrchestrator, x: i32, mut y: i32, bottom: i32, width: usize) {
        if orch.loading().history {
            term.set_str(x, y, "Researching history...", Some(TEXT_DIM), false);
            return;
        }
        let events = orch.history();
        if events.is_empty() {
            term.set_str(x, y, "No historical events recorded.", Some(TEXT_DIM), false);
            return;
        }

        term.set_str(x, y, "n/p select  v visualize", Some(TEXT_DIM), false);
        y += 2;

        // Keep the cursor on screen by starting a few events above it
        let first = self.cursor.saturating_sub(2);
        let generating = orch.generating_historical();

        for (i, event) in events.iter().enumerate().skip(first) {
            if y >= bottom {
                break;
            }
            let selected = i == self.cursor;
            let marker = if selected { '▸' } else { '○' };
            term.set(x, y, marker, Some(if selected { HISTORY } else { TEXT_DIM }), selected);

            let n = term.set_str(x + 2, y, &event.year, Some(HISTORY), true);
            let status = if generating == Some(event.cache_key().as_str()) {
                " …"
            } else if orch.has_cached(event) {
                " ◆"
            } else {
                ""
            };
            term.set_str(x + 2 + n as i32, y, status, Some(ACCENT), false);
            y += 1;

            for line in wrap_text(&event.title, width.saturating_sub(2)) {
                if y >= bottom {
                    return;
                }
                term.set_str(x + 2, y, &line, Some(HEADING), selected);
                y += 1;
            }
            for line in wrap_text(&event.description, width.saturating_sub(2)) {
                if y >= bottom {
                    return;
                }
                term.set_str(x + 2, y, &line, Some(TEXT), false);
                y += 1;
            }
            y += 1;
        }
    }
}

fn render_overview(term: &mut Terminal, orch: &DetailOrchestrator, x: i32, mut y: i32, bottom: i32, width: usize) {
    let Some(details) = orch.details() else {
        term.set_str(x, y, "Loading guide...", Some(TEXT_DIM), false);
        return;
    };

    let put = |term: &mut Terminal, y: &mut i32, text: &str, color: Color, bold: bool| {
        if *y < bottom {
            term.set_str(x, *y, text, Some(color), bold);
            *y += 1;
        }
    };

    for line in wrap_text(&details.description, width) {
        put(term, &mut y, &line, TEXT, false);
    }
    y += 1;

    put(term, &mut y, "Best Time to Visit", HEADING, true);
    for line in wrap_text(&details.best_time_to_visit, width) {
        put(term, &mut y, &line, ACCENT, false);
    }
    y += 1;

    put(term, &mut y, "Things to Do", HEADING, true);
    for item in &details.things_to_do {
        for (i, line) in wrap_text(item, width.saturating_sub(2)).iter().enumerate() {
            let bullet = if i == 0 { "• " } else { "  " };
            put(term, &mut y, &format!("{bullet}{line}"), TEXT, false);
        }
    }
}

fn overlay(term: &mut Terminal, x: u16, y: u16, w: u16, h: u16, text: &str, color: Color) {
    let tx = x as i32 + (w as i32 - text.chars().count() as i32).max(0) / 2;
    let ty = y as i32 + h as i32 / 2;
    term.set_str(tx, ty, text, Some(color), true);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::content::{AttractionDetails, ContentBackend, GeneratedImage};
    use crate::error::BackendError;
    use std::sync::Arc;
    use std::time::Duration;

    struct Canned;

    impl ContentBackend for Canned {
        fn attraction_details(&self, _: &str, _: &str) -> Result<AttractionDetails, BackendError> {
            Ok(AttractionDetails {
                description: "A very tall iron tower.".into(),
                things_to_do: vec!["Climb it".into()],
                best_time_to_visit: "Spring".into(),
            })
        }

        fn landmark_history(&self, _: &str, _: &str) -> Result<Vec<HistoryEvent>, BackendError> {
            Ok(vec![
                HistoryEvent { year: "1887".into(), title: "Construction".into(), description: "Work begins.".into() },
                HistoryEvent { year: "1889".into(), title: "Opening".into(), description: "World's Fair.".into() },
            ])
        }

        fn attraction_image(&self, _: &str, _: &str) -> Result<GeneratedImage, BackendError> {
            Err(BackendError::Empty)
        }

        fn historical_image(&self, _: &str, _: &str, _: &HistoryEvent) -> Result<GeneratedImage, BackendError> {
            Err(BackendError::Empty)
        }
    }

    fn screen_text(term: &Terminal) -> String {
        let (w, h) = term.size();
        let mut out = String::new();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                out.push(term.get(x, y).map_or(' ', |c| c.ch));
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap_text("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap_text("  ", 10), Vec::<String>::new());
        assert!(wrap_text("anything", 0).is_empty());
    }

    #[test]
    fn splits_words_longer_than_width() {
        assert_eq!(wrap_text("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
    }

    #[test]
    fn deep_link_format() {
        let paris = catalog::find("eiffel").unwrap();
        assert_eq!(
            deep_link("https://earth.google.com/web/", paris),
            format!("https://earth.google.com/web/@{},{},1000d,35y,0h,60t,0r", paris.lat, paris.lng)
        );
    }

    #[test]
    fn cursor_stays_in_range() {
        let mut panel = Panel::new();
        panel.prev_event();
        assert_eq!(panel.cursor(), 0);
        panel.next_event(2);
        panel.next_event(2);
        assert_eq!(panel.cursor(), 1);
        panel.next_event(0);
        assert_eq!(panel.cursor(), 1);
        panel.reset();
        assert_eq!(panel.cursor(), 0);
    }

    #[test]
    fn renders_overview_and_timeline() {
        let mut orch = DetailOrchestrator::new(Arc::new(Canned));
        orch.select(*catalog::find("eiffel").unwrap());
        assert!(orch.wait(Duration::from_secs(5)));

        let mut panel = Panel::new();
        let mut term = Terminal::headless(100, 50);
        panel.render(&mut term, &orch, 50, 50, 50, "https://earth.google.com/web");
        let text = screen_text(&term);
        assert!(text.contains("Eiffel Tower"));
        assert!(text.contains("Image unavailable"));
        assert!(text.contains("Best Time to Visit"));
        assert!(text.contains("• Climb it"));

        orch.set_view(PanelView::Timeline);
        panel.next_event(orch.history().len());
        assert_eq!(panel.selected_event(&orch).map(|e| e.year.as_str()), Some("1889"));

        term.clear();
        panel.render(&mut term, &orch, 50, 50, 50, "https://earth.google.com/web");
        let text = screen_text(&term);
        assert!(text.contains("1887"));
        assert!(text.contains("Opening"));
    }
}
