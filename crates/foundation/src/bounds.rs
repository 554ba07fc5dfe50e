use crate::math::LatLng;

/// Axis-aligned geographic bounding box (degrees).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Degenerate box around a single point.
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            0.5 * (self.south_west.lat + self.north_east.lat),
            0.5 * (self.south_west.lng + self.north_east.lng),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::LatLngBounds;
    use crate::math::LatLng;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_has_no_bounds() {
        assert_eq!(LatLngBounds::from_points(Vec::new()), None);
    }

    #[test]
    fn covers_all_points() {
        let pts = vec![
            LatLng::new(48.9, 2.2),
            LatLng::new(48.7, 2.5),
            LatLng::new(48.8, 2.3),
        ];
        let b = LatLngBounds::from_points(pts).expect("bounds");
        assert_eq!(b.south_west, LatLng::new(48.7, 2.2));
        assert_eq!(b.north_east, LatLng::new(48.9, 2.5));
    }

    #[test]
    fn center_is_midpoint() {
        let b = LatLngBounds::from_points([LatLng::new(10.0, 20.0), LatLng::new(20.0, 40.0)])
            .expect("bounds");
        assert_eq!(b.center(), LatLng::new(15.0, 30.0));
    }
}
