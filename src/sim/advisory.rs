use serde::Serialize;

/// Health guidance for a given AQI band.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HealthAdvisory {
    pub level: &'static str,
    pub color: &'static str,
    pub recommendations: &'static [&'static str],
}

const GOOD: HealthAdvisory = HealthAdvisory {
    level: "Good",
    color: "#4ade80",
    recommendations: &[
        "Air quality is satisfactory",
        "Perfect for outdoor activities",
        "No respiratory concerns",
    ],
};

const MODERATE: HealthAdvisory = HealthAdvisory {
    level: "Moderate",
    color: "#facc15",
    recommendations: &[
        "Air quality is acceptable",
        "Sensitive individuals should limit outdoor exertion",
        "Wear mask if doing heavy exercise",
    ],
};

const SENSITIVE: HealthAdvisory = HealthAdvisory {
    level: "Unhealthy for Sensitive Groups",
    color: "#fb923c",
    recommendations: &[
        "Members of sensitive groups may experience health effects",
        "Children and elderly should limit outdoor activity",
        "Consider using air purifier indoors",
    ],
};

const UNHEALTHY: HealthAdvisory = HealthAdvisory {
    level: "Unhealthy",
    color: "#ef4444",
    recommendations: &[
        "Everyone may experience health effects",
        "Avoid outdoor activities",
        "Use N95 masks if going outside",
        "Stay indoors with air purifier",
    ],
};

pub fn advisory_for(aqi: u32) -> HealthAdvisory {
    match aqi {
        0..=50 => GOOD,
        51..=100 => MODERATE,
        101..=150 => SENSITIVE,
        _ => UNHEALTHY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_inclusive_at_the_top() {
        assert_eq!(advisory_for(0).level, "Good");
        assert_eq!(advisory_for(50).level, "Good");
        assert_eq!(advisory_for(51).level, "Moderate");
        assert_eq!(advisory_for(100).level, "Moderate");
        assert_eq!(advisory_for(150).color, "#fb923c");
        assert_eq!(advisory_for(151).color, "#ef4444");
        assert_eq!(advisory_for(151).recommendations.len(), 4);
    }
}
