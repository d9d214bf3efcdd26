/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lon: f64,
    pub lat: f64,
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    pub fn clamp(&self, point: LngLat) -> LngLat {
        LngLat {
            lon: point.lon.clamp(self.west, self.east),
            lat: point.lat.clamp(self.south, self.north),
        }
    }

    /// `[[west, south], [east, north]]`, the shape map libraries expect.
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [[self.west, self.south], [self.east, self.north]]
    }
}

pub const MIN_ZOOM: f64 = 8.0;
pub const MAX_ZOOM: f64 = 20.0;
pub const DEFAULT_ZOOM: f64 = 10.0;
pub const DEFAULT_CENTER: LngLat = LngLat {
    lon: 11.34,
    lat: 44.49,
};

/// The metropolitan area the map is locked to.
pub const MAX_BOUNDS: Bounds = Bounds {
    west: 10.489197,
    south: 44.193036,
    east: 12.174225,
    north: 44.783785,
};

/// Everything the URL hash persists about the current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f64,
    pub center: LngLat,
    /// Index into the layer chooser options.
    pub foreground_index: Option<usize>,
    /// Index into the basemap choices.
    pub background_index: Option<usize>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            center: DEFAULT_CENTER,
            foreground_index: None,
            background_index: None,
        }
    }
}

impl ViewState {
    /// Clamp zoom and center into the ranges the map accepts.
    pub fn clamped(self) -> Self {
        let zoom = if self.zoom.is_nan() {
            DEFAULT_ZOOM
        } else {
            self.zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        };
        let center = if self.center.lon.is_nan() || self.center.lat.is_nan() {
            DEFAULT_CENTER
        } else {
            MAX_BOUNDS.clamp(self.center)
        };
        Self {
            zoom,
            center,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_CENTER, LngLat, MAX_BOUNDS, MAX_ZOOM, MIN_ZOOM, ViewState};

    #[test]
    fn default_view_is_inside_bounds() {
        let view = ViewState::default();
        assert_eq!(view.clamped(), view);
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&view.zoom));
    }

    #[test]
    fn clamped_pulls_zoom_and_center_into_range() {
        let view = ViewState {
            zoom: 42.0,
            center: LngLat {
                lon: -3.0,
                lat: 60.0,
            },
            foreground_index: Some(1),
            background_index: None,
        }
        .clamped();

        assert_eq!(view.zoom, MAX_ZOOM);
        assert_eq!(view.center.lon, MAX_BOUNDS.west);
        assert_eq!(view.center.lat, MAX_BOUNDS.north);
        assert_eq!(view.foreground_index, Some(1));
    }

    #[test]
    fn clamped_replaces_nan_with_defaults() {
        let view = ViewState {
            zoom: f64::NAN,
            center: LngLat {
                lon: f64::NAN,
                lat: 44.5,
            },
            ..ViewState::default()
        }
        .clamped();

        assert_eq!(view.zoom, ViewState::default().zoom);
        assert_eq!(view.center, DEFAULT_CENTER);
    }

    #[test]
    fn clamped_leaves_in_range_view_untouched() {
        let view = ViewState {
            zoom: 12.5,
            center: LngLat {
                lon: 11.3,
                lat: 44.5,
            },
            foreground_index: Some(2),
            background_index: Some(1),
        };
        assert_eq!(view.clamped(), view);
    }
}
