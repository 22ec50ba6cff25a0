//! Globe camera: point of view, eased fly-to and auto-rotation
//!
//! Altitude is the unitless camera-to-surface distance in globe radii, the
//! same proxy the zoom tiers are defined on.

use std::time::{Duration, Instant};

pub const DEFAULT_ALTITUDE: f32 = 2.5;
pub const MIN_ALTITUDE: f32 = 0.1;
pub const MAX_ALTITUDE: f32 = 4.0;

/// Degrees per second of longitude drift per unit of auto-rotate speed
const ROTATE_DEG_PER_SEC: f32 = 6.0;

/// Shortest signed delta from `from` to `to` in degrees, within -180..180
pub fn shortest_delta_deg(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Wrap a longitude into -180..=180
pub fn wrap_lng(lng: f32) -> f32 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointOfView {
    pub lat: f32,
    pub lng: f32,
    pub altitude: f32,
}

struct Flight {
    from: PointOfView,
    to: PointOfView,
    start: Instant,
    duration: Duration,
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub struct Camera {
    pov: PointOfView,
    flight: Option<Flight>,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

impl Camera {
    pub fn new(lat: f32, lng: f32, altitude: f32, auto_rotate_speed: f32) -> Self {
        Self {
            pov: PointOfView {
                lat: lat.clamp(-90.0, 90.0),
                lng: wrap_lng(lng),
                altitude: altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE),
            },
            flight: None,
            auto_rotate: true,
            auto_rotate_speed,
        }
    }

    pub fn pov(&self) -> PointOfView {
        self.pov
    }

    pub fn altitude(&self) -> f32 {
        self.pov.altitude
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Animate to a location. A zero duration jumps immediately.
    pub fn set_view(&mut self, lat: f32, lng: f32, altitude: f32, duration_ms: u64) {
        let to = PointOfView {
            lat: lat.clamp(-90.0, 90.0),
            lng: wrap_lng(lng),
            altitude: altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE),
        };
        if duration_ms == 0 {
            self.pov = to;
            self.flight = None;
            return;
        }
        self.flight = Some(Flight {
            from: self.pov,
            to,
            start: Instant::now(),
            duration: Duration::from_millis(duration_ms),
        });
    }

    /// Manual pan in degrees. Cancels any flight in progress.
    pub fn pan(&mut self, dlat: f32, dlng: f32) {
        self.flight = None;
        self.pov.lat = (self.pov.lat + dlat).clamp(-89.0, 89.0);
        self.pov.lng = wrap_lng(self.pov.lng + dlng);
    }

    /// Multiply altitude by `factor` (< 1 zooms in)
    pub fn zoom_by(&mut self, factor: f32) {
        self.flight = None;
        self.pov.altitude = (self.pov.altitude * factor).clamp(MIN_ALTITUDE, MAX_ALTITUDE);
    }

    /// Advance animation and auto-rotation to `now`; `dt` is seconds since the last tick
    pub fn tick(&mut self, now: Instant, dt: f32) {
        if let Some(flight) = &self.flight {
            let elapsed = now.saturating_duration_since(flight.start).as_secs_f32();
            let t = (elapsed / flight.duration.as_secs_f32()).min(1.0);
            let k = ease_in_out(t);
            let (from, to) = (flight.from, flight.to);

            self.pov = PointOfView {
                lat: from.lat + (to.lat - from.lat) * k,
                lng: wrap_lng(from.lng + shortest_delta_deg(from.lng, to.lng) * k),
                altitude: from.altitude + (to.altitude - from.altitude) * k,
            };
            if t >= 1.0 {
                self.pov = to;
                self.flight = None;
            }
            return;
        }

        if self.auto_rotate {
            self.pov.lng = wrap_lng(self.pov.lng + self.auto_rotate_speed * ROTATE_DEG_PER_SEC * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn shortest_delta_crosses_antimeridian() {
        assert!(close(shortest_delta_deg(170.0, -170.0), 20.0));
        assert!(close(shortest_delta_deg(-170.0, 170.0), -20.0));
        assert!(close(shortest_delta_deg(10.0, 50.0), 40.0));
    }

    #[test]
    fn wrap_keeps_range() {
        assert!(close(wrap_lng(190.0), -170.0));
        assert!(close(wrap_lng(-190.0), 170.0));
        assert!(close(wrap_lng(540.0), 180.0));
        assert!(close(wrap_lng(45.0), 45.0));
    }

    #[test]
    fn flight_reaches_target() {
        let mut cam = Camera::new(0.0, 0.0, DEFAULT_ALTITUDE, 0.5);
        cam.set_view(48.8, 2.3, 0.3, 1500);
        assert!(cam.is_flying());

        let start = Instant::now();
        cam.tick(start + Duration::from_millis(750), 0.75);
        let mid = cam.pov();
        assert!(mid.lat > 0.0 && mid.lat < 48.8);
        assert!(mid.altitude < DEFAULT_ALTITUDE && mid.altitude > 0.3);

        cam.tick(start + Duration::from_millis(1600), 0.85);
        assert!(!cam.is_flying());
        let end = cam.pov();
        assert!(close(end.lat, 48.8) && close(end.lng, 2.3) && close(end.altitude, 0.3));
    }

    #[test]
    fn flight_suspends_auto_rotate() {
        let mut cam = Camera::new(0.0, 0.0, 1.0, 1.0);
        cam.set_view(0.0, 0.0, 1.0, 1000);
        cam.tick(Instant::now(), 1.0);
        assert!(close(cam.pov().lng, 0.0));
    }

    #[test]
    fn auto_rotate_drifts_longitude() {
        let mut cam = Camera::new(0.0, 0.0, DEFAULT_ALTITUDE, 0.5);
        cam.tick(Instant::now(), 1.0);
        assert!(close(cam.pov().lng, 3.0));
        cam.auto_rotate = false;
        cam.tick(Instant::now(), 1.0);
        assert!(close(cam.pov().lng, 3.0));
    }

    #[test]
    fn zoom_and_pan_are_clamped() {
        let mut cam = Camera::new(0.0, 0.0, 1.0, 0.0);
        for _ in 0..50 {
            cam.zoom_by(0.5);
        }
        assert!(close(cam.altitude(), MIN_ALTITUDE));
        cam.pan(200.0, 0.0);
        assert!(close(cam.pov().lat, 89.0));
    }

    #[test]
    fn zero_duration_jumps() {
        let mut cam = Camera::new(0.0, 0.0, 2.0, 0.0);
        cam.set_view(10.0, 20.0, 0.5, 0);
        assert!(!cam.is_flying());
        assert!(close(cam.altitude(), 0.5));
    }
}
