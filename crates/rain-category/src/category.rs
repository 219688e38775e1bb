//! Severity Bucket Classification

use serde::{Deserialize, Serialize};

/// Rainfall intensity bucket (mm/day)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainCategory {
    /// Below 0.5 mm
    None,
    /// 0.5 to 20 mm
    Light,
    /// 20 to 50 mm
    Moderate,
    /// 50 to 100 mm
    Heavy,
    /// 100 to 150 mm
    VeryHeavy,
    /// 150 mm and above
    Extreme,
}

/// Lower bounds (inclusive) of every bucket above `None`, ascending.
const THRESHOLDS: [(f64, RainCategory); 5] = [
    (0.5, RainCategory::Light),
    (20.0, RainCategory::Moderate),
    (50.0, RainCategory::Heavy),
    (100.0, RainCategory::VeryHeavy),
    (150.0, RainCategory::Extreme),
];

impl RainCategory {
    /// All buckets in ascending severity order
    pub const ALL: [RainCategory; 6] = [
        RainCategory::None,
        RainCategory::Light,
        RainCategory::Moderate,
        RainCategory::Heavy,
        RainCategory::VeryHeavy,
        RainCategory::Extreme,
    ];

    /// Classify a rainfall amount.
    ///
    /// Bins are lower-inclusive and upper-exclusive. Negative amounts and NaN land in `None`.
    pub fn from_rainfall(rainfall_mm: f64) -> Self {
        THRESHOLDS
            .iter()
            .rev()
            .find(|(lower, _)| rainfall_mm >= *lower)
            .map(|(_, category)| *category)
            .unwrap_or(RainCategory::None)
    }

    /// Position in the severity ordering, 0 for `None`
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Display label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            RainCategory::None => "Tidak Ada Hujan ☀️",
            RainCategory::Light => "Hujan Ringan 🌤️",
            RainCategory::Moderate => "Hujan Sedang 🌦️",
            RainCategory::Heavy => "Hujan Lebat 🌧️",
            RainCategory::VeryHeavy => "Hujan Sangat Lebat ⛈️",
            RainCategory::Extreme => "Hujan Ekstrem 🌊",
        }
    }

    /// Stable machine-readable tag
    pub fn severity_tag(&self) -> &'static str {
        match self {
            RainCategory::None => "none",
            RainCategory::Light => "light",
            RainCategory::Moderate => "moderate",
            RainCategory::Heavy => "heavy",
            RainCategory::VeryHeavy => "very_heavy",
            RainCategory::Extreme => "extreme",
        }
    }

    /// Human-readable range of the bucket
    pub fn range_desc(&self) -> &'static str {
        match self {
            RainCategory::None => "< 0.5 mm/hari",
            RainCategory::Light => "0.5 - 20 mm/hari",
            RainCategory::Moderate => "20 - 50 mm/hari",
            RainCategory::Heavy => "50 - 100 mm/hari",
            RainCategory::VeryHeavy => "100 - 150 mm/hari",
            RainCategory::Extreme => "> 150 mm/hari",
        }
    }

    /// Text color class used by the web frontend
    pub fn color(&self) -> &'static str {
        match self {
            RainCategory::None => "text-blue-400",
            RainCategory::Light => "text-green-500",
            RainCategory::Moderate => "text-yellow-500",
            RainCategory::Heavy => "text-red-500",
            RainCategory::VeryHeavy => "text-purple-600",
            RainCategory::Extreme => "text-red-700",
        }
    }
}

/// Category together with its display metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInfo {
    pub category: RainCategory,
    pub label: &'static str,
    pub severity_tag: &'static str,
    pub range_desc: &'static str,
    pub color: &'static str,
}

impl From<RainCategory> for CategoryInfo {
    fn from(category: RainCategory) -> Self {
        Self {
            category,
            label: category.label(),
            severity_tag: category.severity_tag(),
            range_desc: category.range_desc(),
            color: category.color(),
        }
    }
}

/// Classify a rainfall amount and attach its display metadata
pub fn categorize(rainfall_mm: f64) -> CategoryInfo {
    RainCategory::from_rainfall(rainfall_mm).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lower_bounds_are_inclusive() {
        assert_eq!(RainCategory::from_rainfall(0.5), RainCategory::Light);
        assert_eq!(RainCategory::from_rainfall(0.4999), RainCategory::None);
        assert_eq!(RainCategory::from_rainfall(20.0), RainCategory::Moderate);
        assert_eq!(RainCategory::from_rainfall(49.99), RainCategory::Moderate);
        assert_eq!(RainCategory::from_rainfall(50.0), RainCategory::Heavy);
        assert_eq!(RainCategory::from_rainfall(100.0), RainCategory::VeryHeavy);
        assert_eq!(RainCategory::from_rainfall(149.999), RainCategory::VeryHeavy);
        assert_eq!(RainCategory::from_rainfall(150.0), RainCategory::Extreme);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(RainCategory::from_rainfall(-3.0), RainCategory::None);
        assert_eq!(RainCategory::from_rainfall(f64::NAN), RainCategory::None);
        assert_eq!(RainCategory::from_rainfall(f64::NEG_INFINITY), RainCategory::None);
        assert_eq!(RainCategory::from_rainfall(f64::INFINITY), RainCategory::Extreme);
    }

    #[test]
    fn test_metadata() {
        let info = categorize(8.2);
        assert_eq!(info.category, RainCategory::Light);
        assert_eq!(info.label, "Hujan Ringan 🌤️");
        assert_eq!(info.severity_tag, "light");
        assert_eq!(info.range_desc, "0.5 - 20 mm/hari");
        assert_eq!(info.color, "text-green-500");
    }

    #[test]
    fn test_ranks_follow_declaration_order() {
        for (idx, category) in RainCategory::ALL.iter().enumerate() {
            assert_eq!(category.rank() as usize, idx);
        }
    }

    proptest! {
        #[test]
        fn prop_monotonic(a in -500.0f64..1000.0, b in -500.0f64..1000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                RainCategory::from_rainfall(lo).rank() <= RainCategory::from_rainfall(hi).rank()
            );
        }

        #[test]
        fn prop_total(value in any::<f64>()) {
            let category = RainCategory::from_rainfall(value);
            prop_assert!(RainCategory::ALL.contains(&category));
        }
    }
}
