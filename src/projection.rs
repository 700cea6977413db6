use std::f64::consts::PI;
use std::fmt::Write;

use crate::geography::Polygon;

/// Latitude limit of the Mercator projection, in degrees.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Spherical Mercator in radians, before scaling. `y` grows northwards.
pub fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = lon.to_radians();
    let y = (PI / 4.0 + lat / 2.0).tan().ln();
    (x, y)
}

/// Mercator projection scaled and translated onto a pixel surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Projection {
    /// Fits the projection so the given positions fill a `width` × `height`
    /// surface, centred on the shorter axis. Returns `None` when there is
    /// nothing to fit or all positions collapse onto a point.
    pub fn fit_size<I>(width: f64, height: f64, positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for [lon, lat] in positions {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            let (x, y) = mercator(lon, lat);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        let span_x = max_x - min_x;
        let span_y = max_y - min_y;
        if !span_x.is_finite() || !span_y.is_finite() || (span_x <= 0.0 && span_y <= 0.0) {
            return None;
        }

        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (width / span_x).min(height / span_y),
            (true, false) => width / span_x,
            _ => height / span_y,
        };

        Some(Self {
            scale,
            translate_x: (width - scale * (min_x + max_x)) / 2.0,
            translate_y: (height + scale * (min_y + max_y)) / 2.0,
        })
    }

    /// Projects a longitude/latitude pair to surface coordinates, `y` downwards.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = mercator(lon, lat);
        (
            self.translate_x + self.scale * x,
            self.translate_y - self.scale * y,
        )
    }

    /// SVG path data for a set of polygons, one closed subpath per ring.
    pub fn svg_path(&self, polygons: &[Polygon]) -> String {
        let mut path = String::new();

        for ring in polygons.iter().flatten() {
            let mut points = ring.iter().map(|[lon, lat]| self.project(*lon, *lat));

            let Some((x, y)) = points.next() else {
                continue;
            };
            let _ = write!(path, "M{:.2},{:.2}", x, y);

            for (x, y) in points {
                let _ = write!(path, "L{:.2},{:.2}", x, y);
            }
            path.push('Z');
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-6
    }

    #[test]
    fn equator_and_prime_meridian_map_to_origin() {
        let (x, y) = mercator(0.0, 0.0);
        assert!(close(x, 0.0));
        assert!(close(y, 0.0));
    }

    #[test]
    fn latitude_is_clamped_at_the_poles() {
        let (_, north) = mercator(0.0, 90.0);
        assert!(north.is_finite());
        assert!(close(north, PI));
    }

    #[test]
    fn fitted_bounds_touch_the_surface_edges() {
        let square = [[-10.0, -10.0], [10.0, -10.0], [10.0, 10.0], [-10.0, 10.0]];
        let projection = Projection::fit_size(600.0, 650.0, square).expect("square should fit");

        let (left, top) = projection.project(-10.0, 10.0);
        let (right, bottom) = projection.project(10.0, -10.0);

        assert!(close(top, 0.0) || close(left, 0.0));
        assert!(close(bottom, 650.0) || close(right, 600.0));
        assert!(close((left + right) / 2.0, 300.0));
        assert!(close((top + bottom) / 2.0, 325.0));
        assert!(left >= -1e-6 && right <= 600.0 + 1e-6);
        assert!(top >= -1e-6 && bottom <= 650.0 + 1e-6);
    }

    #[test]
    fn north_is_drawn_above_south() {
        let projection =
            Projection::fit_size(100.0, 100.0, [[0.0, -30.0], [20.0, 30.0]]).expect("should fit");

        let (_, north) = projection.project(10.0, 30.0);
        let (_, south) = projection.project(10.0, -30.0);
        assert!(north < south);
    }

    #[test]
    fn nothing_to_fit_yields_none() {
        assert!(Projection::fit_size(600.0, 650.0, Vec::<[f64; 2]>::new()).is_none());
        assert!(Projection::fit_size(600.0, 650.0, [[5.0, 5.0], [5.0, 5.0]]).is_none());
    }

    #[test]
    fn svg_path_closes_every_ring() {
        let projection =
            Projection::fit_size(100.0, 100.0, [[0.0, 0.0], [10.0, 10.0]]).expect("should fit");
        let polygons = vec![
            vec![vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]],
            vec![vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0]], Vec::new()],
        ];

        let path = projection.svg_path(&polygons);

        assert_eq!(path.matches('M').count(), 2);
        assert_eq!(path.matches('Z').count(), 2);
        assert!(path.starts_with('M'));
    }
}
