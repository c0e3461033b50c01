//! Simulated marker motion over the continental US.
//!
//! Shared by the server's mock generator and `dmap-cli mock` so both drive
//! markers the same way. A [`Track`] steps along its heading at its speed
//! with per-step jitter, drifts its heading, and bounces off the box edges.

use rand::Rng;

use crate::LatLng;

pub const LAT_RANGE: (f64, f64) = (25.0, 49.0);
pub const LNG_RANGE: (f64, f64) = (-125.0, -66.0);

pub const CALLSIGNS: &[&str] = &[
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliet", "Kilo", "Lima",
    "Mike", "November", "Oscar",
];

/// Display name for the `index`th generated unit: `Alpha-01`, `Bravo-02`, ...
#[must_use]
pub fn unit_name(index: usize) -> String {
    let callsign = CALLSIGNS[index % CALLSIGNS.len()];
    format!("{callsign}-{:02}", index + 1)
}

/// Position plus motion state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub lat_lng: LatLng,
    /// Degrees clockwise from north, in `[0, 360)`.
    pub heading: f64,
    /// Degrees per step.
    pub speed: f64,
}

impl Track {
    /// A random position inside the box with a random heading and speed.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            lat_lng: LatLng::new(
                round4(rng.random_range(LAT_RANGE.0..=LAT_RANGE.1)),
                round4(rng.random_range(LNG_RANGE.0..=LNG_RANGE.1)),
            ),
            heading: rng.random_range(0.0..360.0),
            speed: rng.random_range(0.4..=1.2),
        }
    }

    /// Step along the heading with jitter, drift the heading, and bounce off
    /// the bounding box.
    pub fn advance(&mut self, rng: &mut impl Rng) {
        let angle = self.heading.to_radians();
        let dlat = self.speed * angle.cos() * rng.random_range(0.6..=1.4);
        let dlng = self.speed * angle.sin() * rng.random_range(0.6..=1.4);

        self.heading = (self.heading + rng.random_range(-20.0..=20.0)).rem_euclid(360.0);

        let mut lat = self.lat_lng.lat + dlat;
        let mut lng = self.lat_lng.lng + dlng;

        if !(LAT_RANGE.0..=LAT_RANGE.1).contains(&lat) {
            self.heading = (180.0 - self.heading).rem_euclid(360.0);
            lat = lat.clamp(LAT_RANGE.0, LAT_RANGE.1);
        }
        if !(LNG_RANGE.0..=LNG_RANGE.1).contains(&lng) {
            self.heading = (360.0 - self.heading).rem_euclid(360.0);
            lng = lng.clamp(LNG_RANGE.0, LNG_RANGE.1);
        }

        self.lat_lng = LatLng::new(round4(lat), round4(lng));
    }
}

/// Whether `lat_lng` lies inside the bounding box, edges included.
#[must_use]
pub fn in_box(lat_lng: LatLng) -> bool {
    (LAT_RANGE.0..=LAT_RANGE.1).contains(&lat_lng.lat) && (LNG_RANGE.0..=LNG_RANGE.1).contains(&lat_lng.lng)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
#[path = "motion_test.rs"]
mod tests;
