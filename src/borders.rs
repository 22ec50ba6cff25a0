//! Country borders for the globe
//!
//! Fetched once in the background from a GeoJSON FeatureCollection; until it
//! lands (or if it never does) a coarse built-in continent outline is drawn.

use crate::error::BackendError;
use serde::Deserialize;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

/// Outer boundary ring as (lat, lng) degrees
pub type Ring = Vec<(f32, f32)>;

#[derive(Debug, Clone)]
pub struct Country {
    pub name: String,
    pub rings: Vec<Ring>,
}

impl Country {
    pub fn contains(&self, lat: f32, lng: f32) -> bool {
        self.rings.iter().any(|r| ring_contains(r, lat, lng))
    }
}

/// Even-odd ray cast in lat/lng space
pub fn ring_contains(ring: &[(f32, f32)], lat: f32, lng: f32) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (lat_i, lng_i) = ring[i];
        let (lat_j, lng_j) = ring[j];
        if (lat_i > lat) != (lat_j > lat) {
            let cross = lng_i + (lat - lat_i) / (lat_j - lat_i) * (lng_j - lng_i);
            if lng < cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Value,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Position = Vec<f64>;

fn outer_ring(polygon: Vec<Vec<Position>>) -> Option<Ring> {
    let ring: Ring = polygon
        .into_iter()
        .next()?
        .into_iter()
        .filter_map(|p| match p.as_slice() {
            [lng, lat, ..] => Some((*lat as f32, *lng as f32)),
            _ => None,
        })
        .collect();
    (ring.len() >= 3).then_some(ring)
}

/// Parse a GeoJSON FeatureCollection, keeping Polygon/MultiPolygon features
pub fn parse_geojson(text: &str) -> Result<Vec<Country>, BackendError> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    let mut countries = Vec::new();

    for feature in collection.features {
        let Some(geometry) = feature.geometry else { continue };
        let rings: Vec<Ring> = match geometry.kind.as_str() {
            "Polygon" => {
                let polygon: Vec<Vec<Position>> = serde_json::from_value(geometry.coordinates)?;
                outer_ring(polygon).into_iter().collect()
            }
            "MultiPolygon" => {
                let polygons: Vec<Vec<Vec<Position>>> = serde_json::from_value(geometry.coordinates)?;
                polygons.into_iter().filter_map(outer_ring).collect()
            }
            _ => continue,
        };
        if rings.is_empty() {
            continue;
        }

        let name = ["ADMIN", "NAME", "name"]
            .iter()
            .find_map(|k| feature.properties.get(*k).and_then(Value::as_str))
            .unwrap_or("")
            .to_string();
        countries.push(Country { name, rings });
    }

    Ok(countries)
}

fn fetch_borders(url: &str) -> Result<Vec<Country>, BackendError> {
    let body = ureq::get(url)
        .timeout(Duration::from_secs(20))
        .call()?
        .into_string()?;
    parse_geojson(&body)
}

/// Background loader; poll each frame until the borders arrive
pub struct BorderLoader {
    receiver: Option<Receiver<Result<Vec<Country>, BackendError>>>,
    countries: Vec<Country>,
}

impl BorderLoader {
    pub fn spawn(url: &str) -> Self {
        let (tx, rx) = mpsc::channel();
        let url = url.to_string();

        thread::spawn(move || {
            let _ = tx.send(fetch_borders(&url));
        });

        Self { receiver: Some(rx), countries: Vec::new() }
    }

    /// Never fetch; the globe stays on continent outlines
    pub fn disabled() -> Self {
        Self { receiver: None, countries: Vec::new() }
    }

    /// Check for a finished download. Returns true when borders just arrived.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.receiver else { return false };
        match rx.try_recv() {
            Ok(Ok(countries)) => {
                tracing::info!(count = countries.len(), "country borders loaded");
                self.countries = countries;
                self.receiver = None;
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "country borders unavailable, using continent outlines");
                self.receiver = None;
                false
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                false
            }
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn country_at(&self, lat: f32, lng: f32) -> Option<&Country> {
        self.countries.iter().find(|c| c.contains(lat, lng))
    }
}

/// Coarse continent outlines, (lat, lng) degrees
pub static CONTINENT_OUTLINES: &[&[(f32, f32)]] = &[
    // North America
    &[
        (69.5, -90.5), (67.1, -81.4), (58.9, -94.7), (51.2, -79.9), (62.6, -77.4),
        (58.2, -67.6), (60.3, -64.6), (53.3, -55.8), (46.8, -71.1), (49.2, -65.1),
        (45.9, -59.8), (39.2, -76.3), (31.4, -81.3), (25.2, -80.4), (30.1, -84.1),
        (27.8, -97.1), (18.8, -95.9), (21.5, -87.1), (15.9, -88.9), (15.3, -83.4),
        (9.0, -82.2), (7.2, -80.9), (19.3, -105.0), (31.2, -113.1), (23.4, -109.4),
        (40.3, -124.4), (49.0, -122.8), (58.1, -134.1), (61.3, -150.6), (54.4, -164.8),
        (65.7, -168.1), (71.4, -156.6), (67.4, -108.9), (71.9, -95.2), (69.5, -90.5),
    ],
    // South America
    &[
        (11.1, -74.9), (10.7, -61.9), (4.2, -51.3), (-0.1, -50.4), (-7.3, -34.7),
        (-21.9, -40.9), (-34.4, -53.8), (-41.1, -65.1), (-53.8, -71.0), (-46.6, -75.6),
        (-18.3, -70.4), (-4.7, -81.4), (3.8, -77.1), (11.1, -74.9),
    ],
    // Europe
    &[
        (36.0, -5.9), (43.0, -9.4), (43.4, -1.9), (48.7, -4.6), (53.5, 8.1),
        (57.1, 8.5), (54.4, 19.7), (59.2, 23.3), (65.7, 22.2), (70.5, 31.3),
        (69.3, 33.8), (47.3, 39.1), (41.1, 28.8), (36.4, 23.2), (45.6, 13.9),
        (37.9, 15.7), (44.4, 8.9), (36.0, -5.9),
    ],
    // Africa
    &[
        (31.5, -9.8), (35.8, -5.9), (37.1, 10.2), (31.2, 29.7), (29.9, 32.4),
        (11.7, 42.7), (10.6, 51.0), (-4.7, 39.2), (-14.7, 40.8), (-24.1, 35.5),
        (-34.8, 19.6), (-18.1, 11.8), (3.7, 9.4), (4.4, -8.0), (14.7, -17.6),
        (31.5, -9.8),
    ],
    // Asia
    &[
        (77.0, 107.0), (69.4, 178.6), (59.9, 163.5), (51.0, 156.8), (54.7, 135.1),
        (39.8, 127.5), (40.9, 121.6), (28.2, 121.7), (19.8, 105.9), (8.6, 105.2),
        (1.3, 104.2), (22.8, 91.4), (8.0, 77.5), (21.4, 72.6), (30.3, 48.9),
        (22.3, 59.8), (12.6, 43.5), (31.2, 34.3), (41.5, 41.6), (68.1, 68.5),
        (77.0, 107.0),
    ],
    // Australia
    &[
        (-13.8, 143.6), (-26.1, 153.1), (-37.4, 150.0), (-38.0, 140.6), (-31.5, 131.3),
        (-34.2, 115.0), (-21.8, 114.1), (-14.2, 125.7), (-11.1, 132.4), (-17.7, 140.2),
        (-11.0, 142.1), (-13.8, 143.6),
    ],
    // Greenland
    &[
        (83.5, -27.1), (81.3, -12.2), (74.3, -19.4), (65.5, -39.8), (60.1, -43.4),
        (69.9, -50.9), (78.0, -73.3), (83.5, -27.1),
    ],
    // Japan
    &[
        (37.1, 141.0), (33.5, 135.8), (31.4, 130.2), (38.2, 139.4), (41.2, 140.3),
        (37.1, 141.0),
    ],
    // Great Britain
    &[(58.6, -3.0), (51.3, 1.4), (50.0, -5.2), (54.0, -2.9), (56.8, -6.1), (58.6, -3.0)],
];

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "ADMIN": "Squareland" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]] }
            },
            {
                "type": "Feature",
                "properties": { "ADMIN": "Archipelago" },
                "geometry": { "type": "MultiPolygon", "coordinates": [
                    [[[20,20],[22,20],[22,22],[20,20]]],
                    [[[30,-5],[35,-5],[35,5],[30,5],[30,-5]], [[31,-1],[32,-1],[32,1],[31,-1]]]
                ] }
            },
            { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1,2] } },
            { "type": "Feature", "properties": { "ADMIN": "Nowhere" }, "geometry": null }
        ]
    }"#;

    #[test]
    fn parses_polygons_and_multipolygons() {
        let countries = parse_geojson(SAMPLE).unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "Squareland");
        assert_eq!(countries[0].rings.len(), 1);
        assert_eq!(countries[1].rings.len(), 2);
        // coordinates flip from [lng, lat] to (lat, lng)
        assert_eq!(countries[1].rings[1][1], (-5.0, 35.0));
    }

    #[test]
    fn point_in_polygon() {
        let countries = parse_geojson(SAMPLE).unwrap();
        assert!(countries[0].contains(5.0, 5.0));
        assert!(!countries[0].contains(15.0, 5.0));
        assert!(countries[1].contains(0.0, 33.0));
        assert!(!countries[1].contains(50.0, 50.0));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        assert!(!ring_contains(&[(0.0, 0.0), (1.0, 1.0)], 0.5, 0.5));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(parse_geojson("{ nope"), Err(BackendError::Parse(_))));
    }

    #[test]
    fn outlines_are_closed() {
        for outline in CONTINENT_OUTLINES {
            assert_eq!(outline.first(), outline.last());
        }
    }
}
