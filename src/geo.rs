//! Bounding-box math for the nearby-requests search.
//!
//! The platform uses a fixed degrees-per-kilometre approximation rather than
//! geodesic distance: good enough for a city-scale map filter, and it keeps
//! the query a plain BETWEEN on two indexed columns.

const LAT_DEGREES_PER_KM: f64 = 0.09;
const LNG_DEGREES_PER_KM: f64 = 0.14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// Box spanning `radius_km` around a centre point.
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_range = LAT_DEGREES_PER_KM * radius_km;
    let lng_range = LNG_DEGREES_PER_KM * radius_km;

    BoundingBox {
        min_lat: lat - lat_range,
        max_lat: lat + lat_range,
        min_lng: lng - lng_range,
        max_lng: lng + lng_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_spans_the_radius() {
        let bbox = bounding_box(55.75, 37.62, 10.0);
        assert!((bbox.min_lat - 54.85).abs() < 1e-9);
        assert!((bbox.max_lat - 56.65).abs() < 1e-9);
        assert!((bbox.min_lng - 36.22).abs() < 1e-9);
        assert!((bbox.max_lng - 39.02).abs() < 1e-9);
    }

    #[test]
    fn test_contains() {
        let bbox = bounding_box(0.0, 0.0, 1.0);
        assert!(bbox.contains(0.0, 0.0));
        assert!(bbox.contains(0.09, 0.14));
        assert!(!bbox.contains(0.1, 0.0));
        assert!(!bbox.contains(0.0, 0.15));
    }
}
