//! Zoom-tier marker visibility
//!
//! Maps the camera altitude onto a discrete zoom tier and tracks which
//! landmarks should be on the globe. Changes are reported only when the tier
//! moves, so a camera that drifts inside one band costs nothing.

use crate::catalog::{Landmark, Tier};

/// Altitude above which nothing is shown
pub const SPACE_ALTITUDE: f32 = 1.6;
/// Altitude at or below which regions join the icons
pub const REGION_ALTITUDE: f32 = 0.8;
/// Altitude at or below which every landmark is shown
pub const ATTRACTION_ALTITUDE: f32 = 0.4;

/// Camera zoom band, 0 (space) to 3 (street level attractions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ZoomTier {
    Space = 0,
    Icons = 1,
    Regions = 2,
    Attractions = 3,
}

impl ZoomTier {
    pub fn from_altitude(altitude: f32) -> Self {
        if altitude > SPACE_ALTITUDE {
            ZoomTier::Space
        } else if altitude > REGION_ALTITUDE {
            ZoomTier::Icons
        } else if altitude > ATTRACTION_ALTITUDE {
            ZoomTier::Regions
        } else {
            ZoomTier::Attractions
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_exploring(self) -> bool {
        self > ZoomTier::Space
    }

    /// Whether a landmark of `tier` is shown in this zoom band
    pub fn admits(self, tier: Tier) -> bool {
        match self {
            ZoomTier::Space => false,
            ZoomTier::Icons => tier == Tier::Icon,
            ZoomTier::Regions => tier <= Tier::Region,
            ZoomTier::Attractions => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ZoomTier::Space => "orbit",
            ZoomTier::Icons => "global icons",
            ZoomTier::Regions => "cities & regions",
            ZoomTier::Attractions => "attractions",
        }
    }
}

/// Landmarks of `catalog` visible at `zoom`, in catalog order
pub fn visible_set(catalog: &[Landmark], zoom: ZoomTier) -> Vec<&Landmark> {
    catalog.iter().filter(|l| zoom.admits(l.tier)).collect()
}

/// Emitted when the zoom tier moves
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityChange<'a> {
    pub tier: ZoomTier,
    pub visible: Vec<&'a Landmark>,
    pub exploring: bool,
    /// Set exactly once: the first time the camera dips into exploring range
    pub stop_auto_rotate: bool,
}

pub struct VisibilityController<'a> {
    catalog: &'a [Landmark],
    tier: ZoomTier,
    visible: Vec<&'a Landmark>,
    auto_rotate_released: bool,
}

impl<'a> VisibilityController<'a> {
    pub fn new(catalog: &'a [Landmark]) -> Self {
        Self {
            catalog,
            tier: ZoomTier::Space,
            visible: Vec::new(),
            auto_rotate_released: false,
        }
    }

    pub fn tier(&self) -> ZoomTier {
        self.tier
    }

    pub fn visible(&self) -> &[&'a Landmark] {
        &self.visible
    }

    pub fn is_exploring(&self) -> bool {
        self.tier.is_exploring()
    }

    /// Feed a new altitude reading. Returns `Some` only when the tier changed.
    pub fn observe(&mut self, altitude: f32) -> Option<VisibilityChange<'a>> {
        let tier = ZoomTier::from_altitude(altitude);
        if tier == self.tier {
            return None;
        }

        self.tier = tier;
        self.visible = visible_set(self.catalog, tier);

        let exploring = tier.is_exploring();
        let stop_auto_rotate = exploring && !self.auto_rotate_released;
        if stop_auto_rotate {
            self.auto_rotate_released = true;
        }

        tracing::debug!(
            altitude,
            tier = tier.value(),
            visible = self.visible.len(),
            "zoom tier changed"
        );

        Some(VisibilityChange {
            tier,
            visible: self.visible.clone(),
            exploring,
            stop_auto_rotate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, LANDMARKS};

    fn landmark(id: &'static str, tier: Tier) -> Landmark {
        Landmark {
            id,
            name: id,
            country: "Testland",
            lat: 0.0,
            lng: 0.0,
            category: Category::Natural,
            tier,
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(ZoomTier::from_altitude(2.5), ZoomTier::Space);
        assert_eq!(ZoomTier::from_altitude(1.61), ZoomTier::Space);
        assert_eq!(ZoomTier::from_altitude(1.6), ZoomTier::Icons);
        assert_eq!(ZoomTier::from_altitude(1.59), ZoomTier::Icons);
        assert_eq!(ZoomTier::from_altitude(0.81), ZoomTier::Icons);
        assert_eq!(ZoomTier::from_altitude(0.8), ZoomTier::Regions);
        assert_eq!(ZoomTier::from_altitude(0.79), ZoomTier::Regions);
        assert_eq!(ZoomTier::from_altitude(0.41), ZoomTier::Regions);
        assert_eq!(ZoomTier::from_altitude(0.4), ZoomTier::Attractions);
        assert_eq!(ZoomTier::from_altitude(0.39), ZoomTier::Attractions);
        assert_eq!(ZoomTier::from_altitude(0.0), ZoomTier::Attractions);
    }

    #[test]
    fn visible_set_grows_with_tier() {
        let sizes: Vec<usize> = [
            ZoomTier::Space,
            ZoomTier::Icons,
            ZoomTier::Regions,
            ZoomTier::Attractions,
        ]
        .iter()
        .map(|&t| visible_set(LANDMARKS, t).len())
        .collect();

        assert_eq!(sizes[0], 0);
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sizes[3], LANDMARKS.len());
    }

    #[test]
    fn visible_set_filters_by_tier() {
        let icons = visible_set(LANDMARKS, ZoomTier::Icons);
        assert!(icons.iter().all(|l| l.tier == Tier::Icon));
        let regions = visible_set(LANDMARKS, ZoomTier::Regions);
        assert!(regions.iter().all(|l| l.tier <= Tier::Region));
        assert!(regions.iter().any(|l| l.tier == Tier::Region));
    }

    #[test]
    fn descent_walks_every_tier() {
        let mut ctl = VisibilityController::new(LANDMARKS);
        let mut tiers = vec![ctl.tier()];
        let mut sizes = vec![ctl.visible().len()];

        for altitude in [2.0, 0.9, 0.5, 0.2] {
            if let Some(change) = ctl.observe(altitude) {
                assert_eq!(change.visible.len(), ctl.visible().len());
            }
            tiers.push(ctl.tier());
            sizes.push(ctl.visible().len());
        }

        assert_eq!(
            tiers[1..],
            [ZoomTier::Space, ZoomTier::Icons, ZoomTier::Regions, ZoomTier::Attractions]
        );
        assert_eq!(sizes[1], 0);
        assert_eq!(sizes[2], visible_set(LANDMARKS, ZoomTier::Icons).len());
        assert_eq!(sizes[3], visible_set(LANDMARKS, ZoomTier::Regions).len());
        assert_eq!(sizes[4], LANDMARKS.len());
    }

    #[test]
    fn unchanged_tier_is_silent() {
        let mut ctl = VisibilityController::new(LANDMARKS);
        assert!(ctl.observe(2.5).is_none());
        assert!(ctl.observe(1.2).is_some());
        assert!(ctl.observe(1.0).is_none());
        assert!(ctl.observe(0.9).is_none());
    }

    #[test]
    fn equal_sized_sets_still_notify() {
        // Only tier-2 landmarks would make Icons and Space both empty, and
        // Regions and Attractions the same size.
        let catalog = [landmark("a", Tier::Region), landmark("b", Tier::Region)];
        let mut ctl = VisibilityController::new(&catalog);

        let change = ctl.observe(0.5).expect("regions");
        assert_eq!(change.visible.len(), 2);
        let change = ctl.observe(0.2).expect("attractions has the same count");
        assert_eq!(change.tier, ZoomTier::Attractions);
        assert_eq!(change.visible.len(), 2);

        let change = ctl.observe(1.0).expect("icons");
        assert!(change.visible.is_empty());
        assert!(change.exploring);
    }

    #[test]
    fn auto_rotate_released_once() {
        let mut ctl = VisibilityController::new(LANDMARKS);
        let first = ctl.observe(1.0).expect("entered icons");
        assert!(first.exploring);
        assert!(first.stop_auto_rotate);

        let out = ctl.observe(3.0).expect("back to space");
        assert!(!out.exploring);
        assert!(!out.stop_auto_rotate);

        let again = ctl.observe(1.0).expect("icons again");
        assert!(again.exploring);
        assert!(!again.stop_auto_rotate);
    }
}
