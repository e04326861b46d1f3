//! A map surface and collaborators for running the controller without a
//! display. Every call is reported through `tracing`.

use std::time::Duration;

use quad_core::{Coordinates, Location, ViewportState};
use quad_map::style::marker_size_px;
use quad_map::{AuthContext, GeolocationError, Geocoder, Geolocator, MapSurface, MarkerSpec, MarkerStyle, Router};

/// Headless marker handle.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedMarker {
    pub id: String,
    pub coordinates: Coordinates,
    pub style: MarkerStyle,
    pub scale: f64,
}

/// Keeps a camera and logs every draw call. Markers count as rendered as
/// soon as they are created; [`TracingSurface::take_rendered`] hands their
/// ids back so the controller can be told.
#[derive(Debug)]
pub struct TracingSurface {
    camera: ViewportState,
    user_marker: Option<Coordinates>,
    rendered: Vec<String>,
}

impl TracingSurface {
    #[must_use]
    pub const fn new(camera: ViewportState) -> Self {
        Self {
            camera,
            user_marker: None,
            rendered: Vec::new(),
        }
    }

    /// Ids of markers created since the last call.
    pub fn take_rendered(&mut self) -> Vec<String> {
        std::mem::take(&mut self.rendered)
    }

    #[must_use]
    pub const fn user_marker(&self) -> Option<Coordinates> {
        self.user_marker
    }
}

impl MapSurface for TracingSurface {
    type Marker = TracedMarker;

    fn create_marker(&mut self, location: &Location, spec: MarkerSpec) -> TracedMarker {
        tracing::info!(
            id = %location.id,
            name = %location.name,
            category = %location.category,
            lat = location.coordinates.lat,
            lon = location.coordinates.lon,
            color = spec.style.color,
            icon = spec.style.icon,
            size_px = marker_size_px(spec.scale),
            delay_ms = u64::try_from(spec.appear_delay.as_millis()).unwrap_or(u64::MAX),
            "marker created"
        );
        self.rendered.push(location.id.clone());
        TracedMarker {
            id: location.id.clone(),
            coordinates: location.coordinates,
            style: spec.style,
            scale: spec.scale,
        }
    }

    fn move_marker(&mut self, marker: &mut TracedMarker, to: Coordinates) {
        tracing::info!(id = %marker.id, lat = to.lat, lon = to.lon, "marker moved");
        marker.coordinates = to;
    }

    fn restyle_marker(&mut self, marker: &mut TracedMarker, style: MarkerStyle) {
        tracing::info!(id = %marker.id, color = style.color, icon = style.icon, "marker restyled");
        marker.style = style;
    }

    fn set_marker_scale(&mut self, marker: &mut TracedMarker, scale: f64) {
        tracing::trace!(id = %marker.id, scale, "marker scaled");
        marker.scale = scale;
    }

    fn pulse_marker(&mut self, marker: &mut TracedMarker, peak: f64, duration: Duration) {
        tracing::info!(
            id = %marker.id,
            peak,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "marker pulsed"
        );
    }

    fn remove_marker(&mut self, marker: TracedMarker) {
        tracing::info!(id = %marker.id, "marker removed");
    }

    fn place_user_marker(&mut self, at: Coordinates) {
        tracing::info!(lat = at.lat, lon = at.lon, "user marker placed");
        self.user_marker = Some(at);
    }

    fn set_camera(&mut self, viewport: ViewportState) {
        tracing::info!(
            lat = viewport.center.lat,
            lon = viewport.center.lon,
            zoom = viewport.zoom,
            "camera set"
        );
        self.camera = viewport;
    }

    fn fly_to(&mut self, center: Coordinates, zoom: f64) {
        tracing::info!(lat = center.lat, lon = center.lon, zoom, "camera flying");
        self.camera = ViewportState::new(center, zoom);
    }

    fn camera(&self) -> ViewportState {
        self.camera
    }

    fn resize(&mut self) {
        tracing::debug!("surface resized");
    }
}

/// Logs navigation requests in place of a detail view.
pub struct LogRouter;

impl Router for LogRouter {
    fn navigate(&self, location_id: &str) {
        tracing::info!(location_id, "navigate to location detail");
    }
}

/// Fixed sign-in state for the session.
pub struct SessionAuth(pub bool);

impl AuthContext for SessionAuth {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

/// Device position given on the command line, if any.
pub struct FixedPosition(pub Option<Coordinates>);

impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.0
            .ok_or_else(|| GeolocationError::Unavailable("no --position given".into()))
    }
}

/// Place-name lookup is not available headless; only coordinate queries
/// resolve.
pub struct NoGeocoder;

impl Geocoder for NoGeocoder {
    async fn lookup(&self, _query: &str) -> Option<Coordinates> {
        None
    }
}
