//! Recording surface and fake collaborators for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use quad_core::{Coordinates, Location, ViewportState};

use crate::collab::{AuthContext, Geocoder, Geolocator, Router};
use crate::error::GeolocationError;
use crate::style::{MarkerSpec, MarkerStyle};
use crate::surface::MapSurface;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Create { id: String, spec: MarkerSpec },
    Move { id: String, to: Coordinates },
    Restyle { id: String, style: MarkerStyle },
    Scale { id: String, scale: f64 },
    Pulse { id: String, peak: f64, duration: Duration },
    Remove { id: String },
    UserMarker(Coordinates),
    SetCamera(ViewportState),
    FlyTo { center: Coordinates, zoom: f64 },
    Resize,
}

/// Marker handle of the recording surface: just the location id.
#[derive(Debug, PartialEq, Eq)]
pub struct FakeMarker(pub String);

#[derive(Debug)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
    pub camera: ViewportState,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            camera: ViewportState::new(Coordinates { lat: 0.0, lon: 0.0 }, 1.0),
        }
    }
}

impl RecordingSurface {
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }
}

impl MapSurface for RecordingSurface {
    type Marker = FakeMarker;

    fn create_marker(&mut self, location: &Location, spec: MarkerSpec) -> FakeMarker {
        self.ops.push(Op::Create {
            id: location.id.clone(),
            spec,
        });
        FakeMarker(location.id.clone())
    }

    fn move_marker(&mut self, marker: &mut FakeMarker, to: Coordinates) {
        self.ops.push(Op::Move {
            id: marker.0.clone(),
            to,
        });
    }

    fn restyle_marker(&mut self, marker: &mut FakeMarker, style: MarkerStyle) {
        self.ops.push(Op::Restyle {
            id: marker.0.clone(),
            style,
        });
    }

    fn set_marker_scale(&mut self, marker: &mut FakeMarker, scale: f64) {
        self.ops.push(Op::Scale {
            id: marker.0.clone(),
            scale,
        });
    }

    fn pulse_marker(&mut self, marker: &mut FakeMarker, peak: f64, duration: Duration) {
        self.ops.push(Op::Pulse {
            id: marker.0.clone(),
            peak,
            duration,
        });
    }

    fn remove_marker(&mut self, marker: FakeMarker) {
        self.ops.push(Op::Remove { id: marker.0 });
    }

    fn place_user_marker(&mut self, at: Coordinates) {
        self.ops.push(Op::UserMarker(at));
    }

    fn set_camera(&mut self, viewport: ViewportState) {
        self.camera = viewport;
        self.ops.push(Op::SetCamera(viewport));
    }

    fn fly_to(&mut self, center: Coordinates, zoom: f64) {
        self.camera = ViewportState::new(center, zoom);
        self.ops.push(Op::FlyTo { center, zoom });
    }

    fn camera(&self) -> ViewportState {
        self.camera
    }

    fn resize(&mut self) {
        self.ops.push(Op::Resize);
    }
}

#[derive(Default)]
pub struct RecordingRouter {
    pub visited: Mutex<Vec<String>>,
}

impl Router for RecordingRouter {
    fn navigate(&self, location_id: &str) {
        self.visited.lock().unwrap().push(location_id.to_string());
    }
}

pub struct FixedAuth(pub bool);

impl AuthContext for FixedAuth {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

/// Answers immediately with a fixed result.
pub struct FixedGeolocator(pub Result<Coordinates, GeolocationError>);

impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.0.clone()
    }
}

/// Never answers.
pub struct HangingGeolocator;

impl Geolocator for HangingGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        std::future::pending().await
    }
}

pub struct FixedGeocoder(pub Option<Coordinates>);

impl Geocoder for FixedGeocoder {
    async fn lookup(&self, _query: &str) -> Option<Coordinates> {
        self.0
    }
}
