//! Static landmark catalog
//!
//! Ordered by tier: global icons first, then major cities/regions, then
//! specific attractions that only appear when zoomed all the way in.

use crossterm::style::Color;

/// What kind of place a landmark is (drives marker color)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Cultural,
    Natural,
    Modern,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Cultural => "Cultural",
            Category::Natural => "Natural",
            Category::Modern => "Modern",
        }
    }

    /// Marker color: amber, emerald, blue
    pub fn color(&self) -> Color {
        match self {
            Category::Cultural => Color::Rgb { r: 245, g: 158, b: 11 },
            Category::Natural => Color::Rgb { r: 16, g: 185, b: 129 },
            Category::Modern => Color::Rgb { r: 59, g: 130, b: 246 },
        }
    }
}

/// Minimum zoom-in needed before a landmark is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Icon = 1,
    Region = 2,
    Attraction = 3,
}

impl Tier {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(v: u8) -> Option<Self> {
        match v {
            1 => Some(Tier::Icon),
            2 => Some(Tier::Region),
            3 => Some(Tier::Attraction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub id: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    pub lat: f32,
    pub lng: f32,
    pub category: Category,
    pub tier: Tier,
}

const fn lm(
    id: &'static str,
    name: &'static str,
    country: &'static str,
    lat: f32,
    lng: f32,
    category: Category,
    tier: Tier,
) -> Landmark {
    Landmark { id, name, country, lat, lng, category, tier }
}

use Category::{Cultural, Modern, Natural};
use Tier::{Attraction, Icon, Region};

pub static LANDMARKS: &[Landmark] = &[
    // Tier 1: global icons
    lm("eiffel-tower", "Eiffel Tower", "France", 48.8584, 2.2945, Modern, Icon),
    lm("great-wall", "Great Wall of China", "China", 40.4319, 116.5704, Cultural, Icon),
    lm("machu-picchu", "Machu Picchu", "Peru", -13.1631, -72.5450, Cultural, Icon),
    lm("grand-canyon", "Grand Canyon", "United States", 36.1069, -112.1129, Natural, Icon),
    lm("taj-mahal", "Taj Mahal", "India", 27.1751, 78.0421, Cultural, Icon),
    lm("pyramids-giza", "Pyramids of Giza", "Egypt", 29.9792, 31.1342, Cultural, Icon),
    lm("sydney-opera-house", "Sydney Opera House", "Australia", -33.8568, 151.2153, Modern, Icon),
    lm("mount-everest", "Mount Everest", "Nepal", 27.9881, 86.9250, Natural, Icon),
    lm("christ-redeemer", "Christ the Redeemer", "Brazil", -22.9519, -43.2105, Cultural, Icon),
    lm("colosseum", "Colosseum", "Italy", 41.8902, 12.4922, Cultural, Icon),
    lm("statue-liberty", "Statue of Liberty", "United States", 40.6892, -74.0445, Cultural, Icon),
    lm("victoria-falls", "Victoria Falls", "Zambia", -17.9243, 25.8572, Natural, Icon),
    // Tier 2: major cities and regions
    lm("kyoto", "Kyoto", "Japan", 35.0116, 135.7681, Cultural, Region),
    lm("dubai", "Dubai", "United Arab Emirates", 25.2048, 55.2708, Modern, Region),
    lm("istanbul", "Istanbul", "Turkey", 41.0082, 28.9784, Cultural, Region),
    lm("banff", "Banff National Park", "Canada", 51.4968, -115.9281, Natural, Region),
    lm("santorini", "Santorini", "Greece", 36.3932, 25.4615, Natural, Region),
    lm("petra", "Petra", "Jordan", 30.3285, 35.4444, Cultural, Region),
    lm("angkor-wat", "Angkor Wat", "Cambodia", 13.4125, 103.8670, Cultural, Region),
    lm("serengeti", "Serengeti", "Tanzania", -2.3333, 34.8333, Natural, Region),
    lm("iceland-highlands", "Icelandic Highlands", "Iceland", 64.9631, -19.0208, Natural, Region),
    lm("singapore", "Singapore", "Singapore", 1.3521, 103.8198, Modern, Region),
    lm("cape-town", "Cape Town", "South Africa", -33.9249, 18.4241, Natural, Region),
    lm("patagonia", "Torres del Paine", "Chile", -50.9423, -73.4068, Natural, Region),
    // Tier 3: specific attractions
    lm("sagrada-familia", "Sagrada Familia", "Spain", 41.4036, 2.1744, Cultural, Attraction),
    lm("neuschwanstein", "Neuschwanstein Castle", "Germany", 47.5576, 10.7498, Cultural, Attraction),
    lm("burj-khalifa", "Burj Khalifa", "United Arab Emirates", 25.1972, 55.2744, Modern, Attraction),
    lm("fushimi-inari", "Fushimi Inari Taisha", "Japan", 34.9671, 135.7727, Cultural, Attraction),
    lm("golden-gate", "Golden Gate Bridge", "United States", 37.8199, -122.4783, Modern, Attraction),
    lm("stonehenge", "Stonehenge", "United Kingdom", 51.1789, -1.8262, Cultural, Attraction),
    lm("uluru", "Uluru", "Australia", -25.3444, 131.0369, Natural, Attraction),
    lm("chichen-itza", "Chichen Itza", "Mexico", 20.6843, -88.5678, Cultural, Attraction),
    lm("moai", "Moai of Rapa Nui", "Chile", -27.1127, -109.3497, Cultural, Attraction),
    lm("marina-bay-sands", "Marina Bay Sands", "Singapore", 1.2834, 103.8607, Modern, Attraction),
    lm("ha-long-bay", "Ha Long Bay", "Vietnam", 20.9101, 107.1839, Natural, Attraction),
    lm("alhambra", "Alhambra", "Spain", 37.1761, -3.5881, Cultural, Attraction),
];

/// Find a landmark by exact id or case-insensitive name
pub fn find(query: &str) -> Option<&'static Landmark> {
    let q = query.trim();
    LANDMARKS
        .iter()
        .find(|l| l.id == q)
        .or_else(|| LANDMARKS.iter().find(|l| l.name.eq_ignore_ascii_case(q)))
        .or_else(|| {
            let lower = q.to_lowercase();
            LANDMARKS.iter().find(|l| l.name.to_lowercase().contains(&lower))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = LANDMARKS.iter().map(|l| l.id).collect();
        assert_eq!(ids.len(), LANDMARKS.len());
    }

    #[test]
    fn catalog_is_partitioned_by_tier() {
        let tiers: Vec<Tier> = LANDMARKS.iter().map(|l| l.tier).collect();
        let mut sorted = tiers.clone();
        sorted.sort();
        assert_eq!(tiers, sorted);
        for t in [Tier::Icon, Tier::Region, Tier::Attraction] {
            assert!(LANDMARKS.iter().any(|l| l.tier == t));
        }
    }

    #[test]
    fn coordinates_in_range() {
        for l in LANDMARKS {
            assert!((-90.0..=90.0).contains(&l.lat), "{}", l.id);
            assert!((-180.0..=180.0).contains(&l.lng), "{}", l.id);
        }
    }

    #[test]
    fn find_by_id_name_and_fragment() {
        assert_eq!(find("colosseum").map(|l| l.id), Some("colosseum"));
        assert_eq!(find("taj mahal").map(|l| l.id), Some("taj-mahal"));
        assert_eq!(find("Khalifa").map(|l| l.id), Some("burj-khalifa"));
        assert!(find("atlantis").is_none());
    }

    #[test]
    fn tier_value_round_trip() {
        assert_eq!(Tier::from_value(2), Some(Tier::Region));
        assert_eq!(Tier::from_value(0), None);
        assert_eq!(Tier::Attraction.value(), 3);
    }
}
