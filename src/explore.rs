//! Interactive explorer: the frame loop tying camera, zoom tiers, globe and
//! detail panel together.

use crate::borders::BorderLoader;
use crate::camera::Camera;
use crate::catalog::{Category, Landmark, LANDMARKS};
use crate::colors::{ColorState, ACCENT, HEADING, PANEL_BG, TEXT, TEXT_DIM};
use crate::config::ExploreConfig;
use crate::content::ContentBackend;
use crate::detail::{DetailOrchestrator, HistoricalRequest, PanelView};
use crate::globe::{pick_marker, GlobeRenderer, MarkerHit, Projection, Viewport};
use crate::help::{render_help_overlay, HELP};
use crate::panel::{deep_link, open_external, Panel};
use crate::terminal::Terminal;
use crate::visibility::VisibilityController;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

const START_LAT: f32 = 20.0;
const START_LNG: f32 = 0.0;

/// Fly-to target when a landmark is opened
const FOCUS_ALTITUDE: f32 = 0.3;
const FOCUS_DURATION_MS: u64 = 1500;

const ZOOM_STEP: f32 = 0.8;
const FLASH_SECS: u64 = 3;

pub struct App {
    camera: Camera,
    visibility: VisibilityController<'static>,
    orchestrator: DetailOrchestrator,
    panel: Panel,
    globe: GlobeRenderer,
    borders: BorderLoader,
    colors: ColorState,
    earth_url: String,

    panel_w: u16,
    hits: Vec<MarkerHit<'static>>,
    focus: Option<&'static Landmark>,
    drag: Option<(u16, u16, bool)>,
    flash: Option<(String, Instant)>,
    show_help: bool,
    quit: bool,
}

impl App {
    pub fn new(
        config: &ExploreConfig,
        backend: Arc<dyn ContentBackend>,
        borders: BorderLoader,
        (w, h): (u16, u16),
    ) -> Self {
        let mut camera = Camera::new(START_LAT, START_LNG, config.altitude, config.auto_rotate_speed);
        camera.auto_rotate = config.auto_rotate;

        Self {
            camera,
            visibility: VisibilityController::new(LANDMARKS),
            orchestrator: DetailOrchestrator::new(backend),
            panel: Panel::new(),
            globe: GlobeRenderer::new(Viewport { x: 0, y: 0, w, h }, config.seed),
            borders,
            colors: ColorState::new(config.color_scheme),
            earth_url: config.earth_viewer_url.clone(),
            panel_w: 0,
            hits: Vec::new(),
            focus: None,
            drag: None,
            flash: None,
            show_help: false,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    fn panel_open(&self) -> bool {
        self.orchestrator.landmark().is_some()
    }

    fn flash(&mut self, message: impl Into<String>) {
        self.flash = Some((message.into(), Instant::now()));
    }

    /// Open `landmark`: fly to it, stop rotating and start fetching its content
    pub fn select(&mut self, landmark: &'static Landmark) {
        self.camera.set_view(landmark.lat, landmark.lng, FOCUS_ALTITUDE, FOCUS_DURATION_MS);
        self.camera.auto_rotate = false;
        self.focus = Some(landmark);
        self.panel.reset();
        self.orchestrator.select(*landmark);
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, .. }: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            if matches!(code, KeyCode::Char('?') | KeyCode::Esc) {
                return;
            }
        }
        if self.colors.handle_key(code) {
            self.flash(format!("Color scheme: {}", self.colors.name()));
            return;
        }
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        if self.panel_open() && self.handle_panel_key(code) {
            return;
        }

        // Pan step shrinks as the camera descends
        let step = (self.camera.altitude() * 4.0).clamp(0.5, 10.0);
        match code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Left | KeyCode::Char('h') => self.camera.pan(0.0, -step),
            KeyCode::Right | KeyCode::Char('l') => self.camera.pan(0.0, step),
            KeyCode::Up | KeyCode::Char('k') => self.camera.pan(step, 0.0),
            KeyCode::Down | KeyCode::Char('j') => self.camera.pan(-step, 0.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.camera.zoom_by(ZOOM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.camera.zoom_by(1.0 / ZOOM_STEP),
            KeyCode::Char('r') => {
                self.camera.auto_rotate = !self.camera.auto_rotate;
                let state = if self.camera.auto_rotate { "on" } else { "off" };
                self.flash(format!("Auto-rotate {state}"));
            }
            KeyCode::Tab => self.cycle_focus(1),
            KeyCode::BackTab => self.cycle_focus(-1),
            KeyCode::Enter => {
                if let Some(landmark) = self.focus {
                    self.select(landmark);
                }
            }
            _ => {}
        }
    }

    /// Keys that only mean something while the detail panel is open
    fn handle_panel_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.orchestrator.close();
                self.panel.reset();
            }
            KeyCode::Char('1') => self.orchestrator.set_view(PanelView::Overview),
            KeyCode::Char('2') => self.orchestrator.set_view(PanelView::Timeline),
            KeyCode::Char('n') => self.panel.next_event(self.orchestrator.history().len()),
            KeyCode::Char('p') => self.panel.prev_event(),
            KeyCode::Char('v') => self.visualize_selected(),
            KeyCode::Char('b') => self.orchestrator.revert_to_modern(),
            KeyCode::Char('g') => self.open_earth_view(),
            _ => return false,
        }
        true
    }

    fn visualize_selected(&mut self) {
        let Some(event) = self.panel.selected_event(&self.orchestrator).cloned() else {
            return;
        };
        self.orchestrator.set_view(PanelView::Timeline);
        match self.orchestrator.visualize_event(&event) {
            HistoricalRequest::Busy => self.flash("Still reconstructing another era"),
            HistoricalRequest::Dispatched => self.flash(format!("Reconstructing {}...", event.year)),
            HistoricalRequest::Cached | HistoricalRequest::NoSelection => {}
        }
    }

    fn open_earth_view(&mut self) {
        let Some(landmark) = self.orchestrator.landmark() else { return };
        let url = deep_link(&self.earth_url, landmark);
        match open_external(&url) {
            Ok(()) => {
                tracing::info!(%url, "opened earth view");
                self.flash("Opened 3D earth view");
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "could not launch browser");
                self.flash(format!("Could not open browser: {url}"));
            }
        }
    }

    fn cycle_focus(&mut self, dir: isize) {
        if self.hits.is_empty() {
            return;
        }
        let len = self.hits.len() as isize;
        let next = match self.focus.and_then(|f| self.hits.iter().position(|h| h.landmark.id == f.id)) {
            Some(i) => (i as isize + dir).rem_euclid(len),
            None if dir > 0 => 0,
            None => len - 1,
        };
        self.focus = Some(self.hits[next as usize].landmark);
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let view = self.globe.viewport();
        let on_globe = view.contains(column as i32, row as i32);

        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = on_globe.then_some((column, row, false));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some((x, y, _)) = self.drag else { return };
                let (dx, dy) = (column as f32 - x as f32, row as f32 - y as f32);
                // One cell is this many degrees of arc at the globe's center
                let radius = Projection::radius_for(view, self.camera.altitude()).max(1.0);
                let deg = 57.3 / radius;
                self.camera.pan(dy * deg * 2.0, -dx * deg);
                self.drag = Some((column, row, true));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let dragged = matches!(self.drag.take(), Some((_, _, true)));
                if dragged {
                    return;
                }
                if on_globe {
                    if let Some(landmark) = pick_marker(&self.hits, column as i32, row as i32) {
                        self.select(landmark);
                    }
                } else if self.panel_open() {
                    self.click_panel(column, row);
                }
            }
            MouseEventKind::Moved if on_globe => {
                if let Some(landmark) = pick_marker(&self.hits, column as i32, row as i32) {
                    self.focus = Some(landmark);
                }
            }
            MouseEventKind::ScrollUp if on_globe => self.camera.zoom_by(ZOOM_STEP),
            MouseEventKind::ScrollDown if on_globe => self.camera.zoom_by(1.0 / ZOOM_STEP),
            _ => {}
        }
    }

    fn click_panel(&mut self, column: u16, row: u16) {
        let view = self.globe.viewport();
        let panel_right = view.x + view.w + self.panel_w;
        if row == 1 && column + 7 >= panel_right {
            self.orchestrator.close();
            self.panel.reset();
        } else if row + 1 == view.h {
            // "View in 3D Earth" line, just above the link itself
            self.open_earth_view();
        }
    }

    /// Advance camera and background work to `now`
    pub fn update(&mut self, now: Instant, dt: f32) {
        self.camera.tick(now, dt);

        if let Some(change) = self.visibility.observe(self.camera.altitude()) {
            if change.stop_auto_rotate {
                self.camera.auto_rotate = false;
            }
            if let Some(f) = self.focus {
                if !change.visible.iter().any(|l| l.id == f.id) {
                    self.focus = None;
                }
            }
        }

        self.orchestrator.poll();
        if self.borders.poll() {
            self.flash(format!("{} country borders loaded", self.borders.countries().len()));
        }
        if self.flash.as_ref().is_some_and(|(_, at)| at.elapsed() > Duration::from_secs(FLASH_SECS)) {
            self.flash = None;
        }
    }

    pub fn render(&mut self, term: &mut Terminal, dt: f32) {
        let (w, h) = term.size();
        let panel_w = if self.panel_open() { Panel::width_for(w) } else { 0 };
        self.panel_w = panel_w;
        let globe_h = h.saturating_sub(1);
        self.globe.set_viewport(Viewport { x: 0, y: 0, w: w - panel_w, h: globe_h });

        let highlighted = self.orchestrator.landmark().copied().or(self.focus.copied());
        self.hits = self.globe.render(
            term,
            self.camera.pov(),
            self.borders.countries(),
            self.visibility.visible(),
            highlighted.as_ref(),
            &self.colors,
            dt,
        );

        self.render_title(term);
        if self.visibility.is_exploring() {
            self.render_legend(term, globe_h);
        }
        self.render_status(term, w - panel_w, h);

        if panel_w > 0 {
            self.panel.render(term, &self.orchestrator, w - panel_w, h, panel_w, &self.earth_url);
        }
        if self.show_help {
            render_help_overlay(term, w, h, HELP);
        }
    }

    fn render_title(&self, term: &mut Terminal) {
        term.set_str(2, 1, "GLOBETREK", Some(HEADING), true);
        term.set_str(2, 2, "Zoom in to discover landmarks", Some(TEXT_DIM), false);
    }

    fn render_legend(&self, term: &mut Terminal, bottom: u16) {
        let y0 = bottom as i32 - 5;
        term.fill_bg(1, y0, 14, 5, PANEL_BG);
        term.set_str(2, y0, "MAP KEY", Some(TEXT_DIM), true);
        for (i, category) in [Category::Cultural, Category::Natural, Category::Modern].iter().enumerate() {
            let y = y0 + 1 + i as i32;
            term.set(2, y, '●', Some(category.color()), false);
            term.set_str(4, y, category.label(), Some(TEXT), false);
        }
    }

    fn render_status(&self, term: &mut Terminal, w: u16, h: u16) {
        let y = h as i32 - 1;
        let pov = self.camera.pov();
        let tier = self.visibility.tier();

        let mut status = format!(
            " {:>5.1}°{} {:>6.1}°{}  alt {:.2}  {}",
            pov.lat.abs(),
            if pov.lat >= 0.0 { 'N' } else { 'S' },
            pov.lng.abs(),
            if pov.lng >= 0.0 { 'E' } else { 'W' },
            pov.altitude,
            tier.label(),
        );
        if let Some(country) = self.borders.country_at(pov.lat, pov.lng) {
            status.push_str(&format!("  · {}", country.name));
        }
        if self.camera.auto_rotate {
            status.push_str("  ↻");
        }
        let n = term.set_str(0, y, &status, Some(TEXT), false);

        if let Some((message, _)) = &self.flash {
            term.set_str(n as i32 + 3, y, message, Some(ACCENT), true);
        }
        let hint = "? help ";
        term.set_str(w as i32 - hint.len() as i32, y, hint, Some(TEXT_DIM), false);
    }
}

/// Run the explorer until the user quits
pub fn run(config: ExploreConfig, backend: Arc<dyn ContentBackend>) -> io::Result<()> {
    let borders = if config.borders_url.is_empty() {
        BorderLoader::disabled()
    } else {
        BorderLoader::spawn(&config.borders_url)
    };

    let mut term = Terminal::new()?;
    term.clear_screen()?;

    let mut app = App::new(&config, backend, borders, term.size());
    let frame = Duration::from_secs_f32(config.time_step);
    let mut last = Instant::now();

    tracing::info!(altitude = config.altitude, "explorer started");

    while !app.should_quit() {
        let size = crossterm::terminal::size().unwrap_or(term.size());
        if size != term.size() {
            term.resize(size.0, size.1);
            term.clear_screen()?;
        }

        // Block for the frame budget on the first event, then drain the rest
        if let Some(event) = term.poll_event(frame)? {
            app.handle_event(event);
            while let Some(event) = term.poll_event(Duration::ZERO)? {
                app.handle_event(event);
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        app.update(now, dt);
        term.clear();
        app.render(&mut term, dt);
        term.present()?;
    }

    tracing::info!("explorer exited");
    Ok(())
}
