//! Braille-dot orthographic globe with landmark markers
//!
//! The globe is drawn into a 2x4 dot-per-cell canvas (graticule, borders,
//! limb), then markers and labels are stamped on top as whole cells.

use crate::borders::{Country, CONTINENT_OUTLINES};
use crate::camera::{shortest_delta_deg, PointOfView, DEFAULT_ALTITUDE};
use crate::catalog::{Landmark, Tier};
use crate::colors::ColorState;
use crate::terminal::Terminal;
use crossterm::style::Color;
use rand::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Viewport {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && y >= self.y as i32
            && x < (self.x + self.w) as i32
            && y < (self.y + self.h) as i32
    }
}

/// Orthographic projection centered on the camera's point of view
pub struct Projection {
    cx: f32,
    cy: f32,
    radius: f32,
    center_lng: f32,
    sin_lat0: f32,
    cos_lat0: f32,
}

impl Projection {
    pub fn new(view: Viewport, pov: PointOfView) -> Self {
        let lat0 = pov.lat.to_radians();
        Self {
            cx: view.x as f32 + view.w as f32 / 2.0,
            cy: view.y as f32 + view.h as f32 / 2.0,
            radius: Self::radius_for(view, pov.altitude),
            center_lng: pov.lng,
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        }
    }

    /// Globe radius in cells. At the default altitude the globe fills about
    /// 80% of the shorter side; it grows as the camera descends.
    pub fn radius_for(view: Viewport, altitude: f32) -> f32 {
        let base = (view.h as f32 * 1.8).min(view.w as f32 * 0.8) * 0.4;
        base * (DEFAULT_ALTITUDE + 0.1) / (altitude + 0.1)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self) -> (f32, f32) {
        (self.cx, self.cy)
    }

    /// Unit-sphere coordinates after rotation: (x right, depth toward viewer, z up)
    fn rotate(&self, lat: f32, lng: f32) -> (f32, f32, f32) {
        let lat = lat.to_radians();
        let dlng = shortest_delta_deg(self.center_lng, lng).to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lng, cos_lng) = dlng.sin_cos();

        let x = cos_lat * sin_lng;
        let y = cos_lat * cos_lng;
        let z = sin_lat;

        let depth = y * self.cos_lat0 + z * self.sin_lat0;
        let up = -y * self.sin_lat0 + z * self.cos_lat0;
        (x, depth, up)
    }

    /// Screen position in cells, or None when the point is on the far side
    pub fn project(&self, lat: f32, lng: f32) -> Option<(f32, f32)> {
        let (x, depth, up) = self.rotate(lat, lng);
        if depth < 0.0 {
            return None;
        }
        Some((self.cx + x * self.radius, self.cy - up * self.radius * 0.5))
    }
}

/// Sub-cell dot canvas. Each dot stores an intensity; 0 means empty.
struct Canvas {
    w: i32,
    h: i32,
    dots: Vec<u8>,
}

impl Canvas {
    fn new(cells_w: u16, cells_h: u16) -> Self {
        let w = cells_w as i32 * 2;
        let h = cells_h as i32 * 4;
        Self { w, h, dots: vec![0; (w * h).max(0) as usize] }
    }

    fn resize(&mut self, cells_w: u16, cells_h: u16) {
        *self = Self::new(cells_w, cells_h);
    }

    fn clear(&mut self) {
        self.dots.iter_mut().for_each(|d| *d = 0);
    }

    fn plot(&mut self, x: i32, y: i32, intensity: u8) {
        if x >= 0 && y >= 0 && x < self.w && y < self.h {
            let d = &mut self.dots[(y * self.w + x) as usize];
            *d = (*d).max(intensity);
        }
    }

    fn line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32), intensity: u8) {
        if (x0 < 0 && x1 < 0) || (y0 < 0 && y1 < 0) || (x0 >= self.w && x1 >= self.w) || (y0 >= self.h && y1 >= self.h) {
            return;
        }
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.plot(x, y, intensity);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Braille glyph and peak intensity for the cell at (cx, cy)
    fn cell(&self, cx: i32, cy: i32) -> Option<(char, u8)> {
        const BITS: [(i32, i32, u8); 8] = [
            (0, 0, 0x01), (0, 1, 0x02), (0, 2, 0x04), (1, 0, 0x08),
            (1, 1, 0x10), (1, 2, 0x20), (0, 3, 0x40), (1, 3, 0x80),
        ];
        let (bx, by) = (cx * 2, cy * 4);
        let mut mask = 0u8;
        let mut peak = 0u8;
        for (dx, dy, bit) in BITS {
            let v = self.dots[((by + dy) * self.w + bx + dx) as usize];
            if v > 0 {
                mask |= bit;
                peak = peak.max(v);
            }
        }
        if mask == 0 {
            return None;
        }
        char::from_u32(0x2800 + mask as u32).map(|ch| (ch, peak))
    }
}

/// Subsolar longitude in degrees for day/night shading
pub fn solar_longitude(now: SystemTime) -> f32 {
    let secs = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let hours_utc = (secs % 86_400) as f32 / 3600.0;
    (12.0 - hours_utc) / 24.0 * 360.0
}

fn is_daylight(solar_lng: f32, lng: f32) -> bool {
    shortest_delta_deg(solar_lng, lng).abs() < 95.0
}

/// A marker drawn this frame, for click and keyboard hit-testing
#[derive(Debug, Clone, Copy)]
pub struct MarkerHit<'a> {
    pub landmark: &'a Landmark,
    pub x: i32,
    pub y: i32,
}

pub fn marker_glyph(tier: Tier, highlighted: bool) -> char {
    if highlighted {
        return '◉';
    }
    match tier {
        Tier::Icon => '●',
        Tier::Region => '•',
        Tier::Attraction => '◦',
    }
}

/// Closest marker to a cell, within a small pick radius
pub fn pick_marker<'a>(hits: &[MarkerHit<'a>], x: i32, y: i32) -> Option<&'a Landmark> {
    hits.iter()
        .map(|h| (h, (h.x - x).pow(2) + ((h.y - y) * 2).pow(2)))
        .filter(|(_, d)| *d <= 8)
        .min_by_key(|(_, d)| *d)
        .map(|(h, _)| h.landmark)
}

struct Star {
    fx: f32,
    fy: f32,
    phase: f32,
}

pub struct GlobeRenderer {
    canvas: Canvas,
    view: Viewport,
    stars: Vec<Star>,
    clock: f32,
}

impl GlobeRenderer {
    pub fn new(view: Viewport, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let stars = (0..160)
            .map(|_| Star {
                fx: rng.gen_range(0.0..1.0),
                fy: rng.gen_range(0.0..1.0),
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
            })
            .collect();

        Self { canvas: Canvas::new(view.w, view.h), view, stars, clock: 0.0 }
    }

    pub fn set_viewport(&mut self, view: Viewport) {
        if view != self.view {
            self.view = view;
            self.canvas.resize(view.w, view.h);
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.view
    }

    /// Draw the globe and `visible` markers; returns the markers that landed on screen
    pub fn render<'a>(
        &mut self,
        term: &mut Terminal,
        pov: PointOfView,
        countries: &[Country],
        visible: &[&'a Landmark],
        highlighted: Option<&Landmark>,
        colors: &ColorState,
        dt: f32,
    ) -> Vec<MarkerHit<'a>> {
        self.clock += dt;
        self.canvas.clear();

        let view = self.view;
        let proj = Projection::new(view, pov);
        let solar = solar_longitude(SystemTime::now());

        self.draw_stars(term, &proj);
        self.draw_limb(&proj);
        self.draw_graticule(&proj);

        if countries.is_empty() {
            for outline in CONTINENT_OUTLINES {
                self.draw_ring(&proj, outline, solar);
            }
        } else {
            for country in countries {
                for ring in &country.rings {
                    self.draw_ring(&proj, ring, solar);
                }
            }
        }

        for cy in 0..view.h as i32 {
            for cx in 0..view.w as i32 {
                if let Some((ch, peak)) = self.canvas.cell(cx, cy) {
                    let color = colors.globe(peak.saturating_sub(1));
                    term.set(view.x as i32 + cx, view.y as i32 + cy, ch, Some(color), peak >= 4);
                }
            }
        }

        self.draw_markers(term, &proj, visible, highlighted)
    }

    fn to_dots(&self, proj: &Projection, lat: f32, lng: f32) -> Option<(i32, i32)> {
        let (sx, sy) = proj.project(lat, lng)?;
        let x = ((sx - self.view.x as f32) * 2.0).round() as i32;
        let y = ((sy - self.view.y as f32) * 4.0).round() as i32;
        Some((x, y))
    }

    fn draw_stars(&self, term: &mut Terminal, proj: &Projection) {
        let (cx, cy) = proj.center();
        let r = proj.radius();
        for star in &self.stars {
            let x = self.view.x as f32 + star.fx * self.view.w as f32;
            let y = self.view.y as f32 + star.fy * self.view.h as f32;
            let (dx, dy) = ((x - cx) / r, (y - cy) / (r * 0.5));
            if dx * dx + dy * dy <= 1.05 {
                continue;
            }
            let twinkle = (self.clock * 1.5 + star.phase).sin();
            let (ch, color) = if twinkle > 0.6 { ('+', Color::Grey) } else { ('·', Color::DarkGrey) };
            term.set(x as i32, y as i32, ch, Some(color), false);
        }
    }

    fn draw_limb(&mut self, proj: &Projection) {
        let (cx, cy) = proj.center();
        let r = proj.radius();
        let steps = ((r * 12.0) as i32).clamp(90, 2000);
        for i in 0..steps {
            let a = i as f32 / steps as f32 * std::f32::consts::TAU;
            let x = ((cx + a.cos() * r - self.view.x as f32) * 2.0) as i32;
            let y = ((cy + a.sin() * r * 0.5 - self.view.y as f32) * 4.0) as i32;
            self.canvas.plot(x, y, 1);
        }
    }

    fn draw_graticule(&mut self, proj: &Projection) {
        for lat in (-60..=60).step_by(30) {
            let mut prev = None;
            for lng in (-180..=180).step_by(2) {
                let p = self.to_dots(proj, lat as f32, lng as f32);
                self.segment(prev, p, 1);
                prev = p;
            }
        }
        for lng in (-180..180).step_by(30) {
            let mut prev = None;
            for lat in (-90..=90).step_by(2) {
                let p = self.to_dots(proj, lat as f32, lng as f32);
                self.segment(prev, p, 1);
                prev = p;
            }
        }
    }

    fn draw_ring(&mut self, proj: &Projection, ring: &[(f32, f32)], solar: f32) {
        let mut prev: Option<(i32, i32)> = None;
        for pair in ring.windows(2) {
            let ((lat0, lng0), (lat1, lng1)) = (pair[0], pair[1]);
            let dlng = shortest_delta_deg(lng0, lng1);
            let steps = ((lat1 - lat0).abs().max(dlng.abs()) / 2.0).ceil().max(1.0) as i32;
            let intensity = if is_daylight(solar, lng0) { 4 } else { 3 };

            if prev.is_none() {
                prev = self.to_dots(proj, lat0, lng0);
            }
            for s in 1..=steps {
                let t = s as f32 / steps as f32;
                let p = self.to_dots(proj, lat0 + (lat1 - lat0) * t, lng0 + dlng * t);
                self.segment(prev, p, intensity);
                prev = p;
            }
        }
    }

    fn segment(&mut self, a: Option<(i32, i32)>, b: Option<(i32, i32)>, intensity: u8) {
        match (a, b) {
            (Some(a), Some(b)) => self.canvas.line(a, b, intensity),
            (None, Some((x, y))) => self.canvas.plot(x, y, intensity),
            _ => {}
        }
    }

    fn draw_markers<'a>(
        &self,
        term: &mut Terminal,
        proj: &Projection,
        visible: &[&'a Landmark],
        highlighted: Option<&Landmark>,
    ) -> Vec<MarkerHit<'a>> {
        let mut hits = Vec::new();
        let mut label = None;

        for &landmark in visible {
            let Some((sx, sy)) = proj.project(landmark.lat, landmark.lng) else { continue };
            let (x, y) = (sx.floor() as i32, sy.floor() as i32);
            if !self.view.contains(x, y) {
                continue;
            }
            let lit = highlighted.is_some_and(|h| h.id == landmark.id);
            let glyph = marker_glyph(landmark.tier, lit);
            term.set(x, y, glyph, Some(landmark.category.color()), lit || landmark.tier == Tier::Icon);
            if lit {
                label = Some((landmark, x, y));
            }
            hits.push(MarkerHit { landmark, x, y });
        }

        // Tooltip above the highlighted marker: name, then country
        if let Some((landmark, x, y)) = label {
            let name = format!(" {} ", landmark.name);
            let country = landmark.country.to_uppercase();
            let lx = (x - name.chars().count() as i32 / 2).max(self.view.x as i32);
            let cx = (x - country.chars().count() as i32 / 2).max(self.view.x as i32);
            term.set_str(lx, y - 2, &name, Some(Color::White), true);
            term.set_str(cx, y - 1, &country, Some(Color::DarkGrey), false);
        }

        hits
    }
}
