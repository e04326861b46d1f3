//! The rendering seam between the controller and a concrete map widget.

use std::time::Duration;

use quad_core::{Coordinates, Location, ViewportState};

use crate::style::{MarkerSpec, MarkerStyle};

/// A map widget the controller can drive.
///
/// The controller is the only caller and owns every `Marker` handle it gets
/// back. A handle passed to [`MapSurface::remove_marker`] is consumed: the
/// surface detaches the visual element and releases its listeners.
pub trait MapSurface {
    type Marker;

    fn create_marker(&mut self, location: &Location, spec: MarkerSpec) -> Self::Marker;

    fn move_marker(&mut self, marker: &mut Self::Marker, to: Coordinates);

    fn restyle_marker(&mut self, marker: &mut Self::Marker, style: MarkerStyle);

    fn set_marker_scale(&mut self, marker: &mut Self::Marker, scale: f64);

    /// Scale up to `peak` and back within `duration`.
    fn pulse_marker(&mut self, marker: &mut Self::Marker, peak: f64, duration: Duration);

    fn remove_marker(&mut self, marker: Self::Marker);

    /// Show the single "place a new location here" pin at `at`, moving it if
    /// it already exists.
    fn place_user_marker(&mut self, at: Coordinates);

    /// Move the camera without animation.
    fn set_camera(&mut self, viewport: ViewportState);

    /// Animate the camera to `center` at `zoom`.
    fn fly_to(&mut self, center: Coordinates, zoom: f64);

    /// Current camera center and zoom.
    fn camera(&self) -> ViewportState;

    /// Re-measure the container after a layout change.
    fn resize(&mut self);
}
