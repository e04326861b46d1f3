//! The map controller: viewport, user marker, data markers.

use std::sync::Arc;

use quad_cache::LocalCache;
use quad_config::MapConfig;
use quad_core::{CacheState, Coordinates, ViewportState};
use quad_events::{Event, EventBus, Topic};
use tokio::task::JoinHandle;

use crate::collab::{AuthContext, Geocoder, Geolocator, Router, parse_coordinate_query};
use crate::error::{GeolocationError, MapError};
use crate::registry::{MarkerDiff, MarkerRegistry};
use crate::style::{PULSE_SCALE, scale_for_zoom};
use crate::surface::MapSurface;

/// Drives one [`MapSurface`].
///
/// All methods take `&mut self`: the controller lives on a single task and
/// is the only thing that touches the marker registry. Feed it bus events
/// with [`MapController::handle_event`].
pub struct MapController<S: MapSurface> {
    surface: S,
    registry: MarkerRegistry<S::Marker>,
    cache: Arc<LocalCache>,
    bus: EventBus,
    router: Arc<dyn Router>,
    auth: Arc<dyn AuthContext>,
    config: MapConfig,
    default_viewport: ViewportState,
    user_marker: Option<Coordinates>,
    scale: f64,
    ready: bool,
}

impl<S: MapSurface> MapController<S> {
    /// Topics [`MapController::handle_event`] reacts to.
    pub const TOPICS: &'static [Topic] = &[
        Topic::LocationsChanged,
        Topic::MarkersShouldRefresh,
        Topic::DrawerClosed,
        Topic::AddLocationRequested,
    ];

    /// # Errors
    ///
    /// Returns [`MapError::Core`] if the configured default center is not a
    /// valid coordinate.
    pub fn new(
        surface: S,
        cache: Arc<LocalCache>,
        bus: EventBus,
        router: Arc<dyn Router>,
        auth: Arc<dyn AuthContext>,
        config: MapConfig,
    ) -> Result<Self, MapError> {
        let default_viewport = ViewportState::new(
            Coordinates::new(config.default_center_lat, config.default_center_lon)?,
            config.default_zoom,
        );
        Ok(Self {
            surface,
            registry: MarkerRegistry::default(),
            cache,
            bus,
            router,
            auth,
            scale: scale_for_zoom(default_viewport.zoom),
            config,
            default_viewport,
            user_marker: None,
            ready: false,
        })
    }

    /// Position the camera, place the user marker, render cached markers and
    /// publish [`Event::MapReady`].
    ///
    /// The starting viewport is the persisted one if any, else a device fix
    /// (bounded by the geolocation timeout), else the configured default.
    /// Initialization never fails on geolocation.
    pub async fn init<G: Geolocator>(&mut self, geolocator: &G) -> ViewportState {
        let viewport = match self.cache.viewport() {
            Some(saved) => {
                tracing::debug!(?saved, "restoring saved viewport");
                saved
            }
            None => match self.locate(geolocator).await {
                Ok(center) => ViewportState::new(center, self.config.default_zoom),
                Err(error) => {
                    tracing::warn!(%error, "no device location; using default center");
                    self.default_viewport
                }
            },
        };

        self.surface.set_camera(viewport);
        self.place_user_marker(viewport.center);
        self.scale = scale_for_zoom(viewport.zoom);
        let state = self.cache.read();
        self.reconcile(&state);

        self.ready = true;
        tracing::info!(markers = self.registry.len(), "map ready");
        self.bus.publish(&Event::MapReady);
        viewport
    }

    /// Diff the registry against `state` and apply the minimal changes.
    pub fn reconcile(&mut self, state: &CacheState) -> MarkerDiff {
        let diff = self.registry.reconcile(&mut self.surface, state, self.scale);
        if !diff.is_empty() {
            tracing::debug!(
                created = diff.created.len(),
                moved = diff.moved.len(),
                restyled = diff.restyled.len(),
                destroyed = diff.destroyed.len(),
                "markers reconciled"
            );
        }
        diff
    }

    /// React to one bus event. Unrelated topics are ignored.
    pub async fn handle_event(&mut self, event: &Event) {
        match event {
            // The payload may already be behind the cache when commits race
            // their publishes, so markers always follow the committed state.
            Event::LocationsChanged { .. } | Event::MarkersShouldRefresh => {
                let state = self.cache.read();
                self.reconcile(&state);
            }
            Event::DrawerClosed => {
                tokio::time::sleep(self.config.drawer_settle()).await;
                self.surface.resize();
                let state = self.cache.read();
                self.reconcile(&state);
            }
            Event::AddLocationRequested => self.on_add_location_requested(),
            _ => {}
        }
    }

    /// Background click: move the pending pin there and announce it.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Core`] if `at` is not a valid coordinate.
    pub fn on_map_click(&mut self, at: Coordinates) -> Result<(), MapError> {
        let at = Coordinates::new(at.lat, at.lon)?;
        self.place_user_marker(at);
        self.persist_pending(at);
        self.surface.fly_to(at, self.config.default_zoom);
        self.bus.publish(&Event::MarkerSelected { coordinates: at });
        Ok(())
    }

    /// Click on the pending pin: open the add flow, or ask for a login.
    pub fn on_user_marker_click(&mut self) {
        let Some(at) = self.user_marker else {
            return;
        };
        if self.auth.is_authenticated() {
            self.bus.publish(&Event::AddFlowOpened { coordinates: at });
        } else {
            tracing::debug!("add flow requires login");
            self.bus.publish(&Event::LoginRequired);
        }
    }

    /// The "add" trigger: snap the pending pin to the map center, then act
    /// as if the pin was clicked.
    pub fn on_add_location_requested(&mut self) {
        let center = self.surface.camera().center;
        self.place_user_marker(center);
        self.persist_pending(center);
        self.on_user_marker_click();
    }

    /// Fly to the device position and move the pending pin there.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Geolocation`] if no fix arrived in time.
    pub async fn locate_me<G: Geolocator>(&mut self, geolocator: &G) -> Result<Coordinates, MapError> {
        let at = self.locate(geolocator).await?;
        self.surface.fly_to(at, self.config.default_zoom);
        self.place_user_marker(at);
        Ok(at)
    }

    /// Data marker click: fly to it, pulse it, and navigate to its detail
    /// view once the navigate delay has passed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownMarker`] if no marker exists for `id`.
    pub fn click_marker(&mut self, id: &str) -> Result<JoinHandle<()>, MapError> {
        let zoom = self.surface.camera().zoom.max(self.config.select_min_zoom);
        let entry = self
            .registry
            .get_mut(id)
            .ok_or_else(|| MapError::UnknownMarker(id.to_string()))?;

        self.surface.fly_to(entry.coordinates, zoom);
        self.surface
            .pulse_marker(&mut entry.handle, PULSE_SCALE, self.config.pulse_duration());

        let router = Arc::clone(&self.router);
        let delay = self.config.navigate_delay();
        let id = id.to_string();
        Ok(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(location_id = %id, "navigating to location");
            router.navigate(&id);
        }))
    }

    /// Rescale every marker for a new zoom level.
    pub fn on_zoom(&mut self, zoom: f64) {
        let scale = scale_for_zoom(zoom);
        self.scale = scale;
        for entry in self.registry.entries_mut() {
            self.surface.set_marker_scale(&mut entry.handle, scale);
        }
    }

    /// Camera settled: persist it.
    pub fn on_move_end(&mut self) {
        let viewport = self.surface.camera();
        if let Err(error) = self.cache.write_viewport(viewport) {
            tracing::warn!(%error, "could not persist viewport");
        }
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom_by(1.0)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom_by(-1.0)
    }

    /// Search by `"<lon>, <lat>"` or, failing that, through `geocoder`.
    /// Flies to the result and returns it.
    pub async fn search<C: Geocoder>(&mut self, query: &str, geocoder: &C) -> Option<Coordinates> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let found = match parse_coordinate_query(query) {
            Some(at) => Some(at),
            None => geocoder.lookup(query).await,
        };
        match found {
            Some(at) => self.surface.fly_to(at, self.config.default_zoom),
            None => tracing::info!(query, "no place found"),
        }
        found
    }

    /// Surface-side notification that a marker finished its pop-in.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Core`] if the marker was already rendered.
    pub fn on_marker_rendered(&mut self, id: &str) -> Result<(), MapError> {
        self.registry.mark_rendered(id)?;
        Ok(())
    }

    #[must_use]
    pub const fn registry(&self) -> &MarkerRegistry<S::Marker> {
        &self.registry
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub const fn user_marker(&self) -> Option<Coordinates> {
        self.user_marker
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Remove every data marker from the surface.
    pub fn teardown(&mut self) -> usize {
        self.ready = false;
        self.registry.clear(&mut self.surface)
    }

    fn zoom_by(&mut self, delta: f64) -> f64 {
        let camera = self.surface.camera();
        let zoom = (camera.zoom + delta).clamp(self.config.min_zoom, self.config.max_zoom);
        self.surface.fly_to(camera.center, zoom);
        self.on_zoom(zoom);
        zoom
    }

    fn place_user_marker(&mut self, at: Coordinates) {
        self.surface.place_user_marker(at);
        self.user_marker = Some(at);
    }

    fn persist_pending(&self, at: Coordinates) {
        if let Err(error) = self.cache.write_pending_placement(at) {
            tracing::warn!(%error, "could not persist pending placement");
        }
    }

    async fn locate<G: Geolocator>(&self, geolocator: &G) -> Result<Coordinates, GeolocationError> {
        let timeout = self.config.geolocation_timeout();
        tokio::time::timeout(timeout, geolocator.current_position())
            .await
            .map_err(|_| GeolocationError::Timeout(timeout))?
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quad_core::{Category, Location};

    use super::*;
    use crate::style::MarkerStyle;
    use crate::testing::{
        FakeMarker, FixedAuth, FixedGeocoder, FixedGeolocator, HangingGeolocator, Op,
        RecordingRouter, RecordingSurface,
    };

    fn loc(id: &str, lat: f64, lon: f64, category: Category) -> Location {
        Location {
            id: id.into(),
            name: id.to_uppercase(),
            coordinates: Coordinates { lat, lon },
            category,
            updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    fn state(locations: Vec<Location>) -> CacheState {
        CacheState::from_locations(locations, None)
    }

    struct Harness {
        controller: MapController<RecordingSurface>,
        cache: Arc<LocalCache>,
        bus: EventBus,
        router: Arc<RecordingRouter>,
    }

    fn harness(authenticated: bool) -> Harness {
        let cache = Arc::new(LocalCache::in_memory());
        let bus = EventBus::new();
        let router = Arc::new(RecordingRouter::default());
        let controller = MapController::new(
            RecordingSurface::default(),
            Arc::clone(&cache),
            bus.clone(),
            Arc::clone(&router) as Arc<dyn Router>,
            Arc::new(FixedAuth(authenticated)),
            MapConfig::default(),
        )
        .unwrap();
        Harness {
            controller,
            cache,
            bus,
            router,
        }
    }

    fn recorded<T: Clone + Send + 'static>(
        bus: &EventBus,
        topic: Topic,
        pick: impl Fn(&Event) -> Option<T> + Send + Sync + 'static,
    ) -> (Arc<std::sync::Mutex<Vec<T>>>, quad_events::Subscription) {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = bus.subscribe(topic, move |event| {
            if let Some(value) = pick(event) {
                sink.lock().unwrap().push(value);
            }
        });
        (seen, sub)
    }

    #[test]
    fn diff_destroys_creates_and_keeps() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.reconcile(&state(vec![
            loc("a", 1.0, 1.0, Category::Food),
            loc("b", 2.0, 2.0, Category::Food),
            loc("c", 3.0, 3.0, Category::Food),
        ]));
        c.surface_mut().take_ops();

        let diff = c.reconcile(&state(vec![
            loc("b", 2.0, 2.0, Category::Food),
            loc("c", 3.0, 3.0, Category::Food),
            loc("d", 4.0, 4.0, Category::Food),
        ]));

        assert_eq!(diff.destroyed, vec!["a".to_string()]);
        assert_eq!(diff.created, vec!["d".to_string()]);
        assert!(diff.moved.is_empty());
        assert!(diff.restyled.is_empty());
        assert_eq!(c.registry().ids().collect::<Vec<_>>(), vec!["b", "c", "d"]);

        let ops = c.surface_mut().take_ops();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], Op::Remove { id: "a".into() });
        assert!(matches!(&ops[1], Op::Create { id, .. } if id == "d"));
    }

    #[test]
    fn moved_location_is_repositioned_in_place() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.reconcile(&state(vec![loc("a", 1.0, 1.0, Category::Food)]));
        c.surface_mut().take_ops();

        let diff = c.reconcile(&state(vec![loc("a", 1.5, 1.0, Category::Food)]));

        assert_eq!(diff.moved, vec!["a".to_string()]);
        assert_eq!(
            c.surface_mut().take_ops(),
            vec![Op::Move {
                id: "a".into(),
                to: Coordinates { lat: 1.5, lon: 1.0 },
            }]
        );
        assert_eq!(c.registry().get("a").unwrap().handle, FakeMarker("a".into()));
    }

    #[test]
    fn category_change_restyles_without_recreate() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.reconcile(&state(vec![loc("a", 1.0, 1.0, Category::Food)]));
        c.surface_mut().take_ops();

        c.reconcile(&state(vec![loc("a", 1.0, 1.0, Category::Admin)]));

        assert_eq!(
            c.surface_mut().take_ops(),
            vec![Op::Restyle {
                id: "a".into(),
                style: MarkerStyle::for_category(Category::Admin),
            }]
        );
    }

    #[test]
    fn unchanged_state_is_a_no_op() {
        let mut h = harness(true);
        let c = &mut h.controller;
        let s = state(vec![loc("a", 1.0, 1.0, Category::Food)]);
        c.reconcile(&s);
        c.surface_mut().take_ops();

        assert!(c.reconcile(&s).is_empty());
        assert!(c.surface_mut().take_ops().is_empty());
    }

    #[test]
    fn invalid_coordinates_get_no_marker() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.reconcile(&state(vec![loc("ok", 0.0, 0.0, Category::Food)]));
        assert_eq!(c.registry().len(), 1);

        // Becoming invalid removes the marker; the location itself stays cached.
        let diff = c.reconcile(&state(vec![loc("ok", 91.0, 0.0, Category::Food)]));
        assert_eq!(diff.destroyed, vec!["ok".to_string()]);
        assert!(c.registry().is_empty());
    }

    #[test]
    fn created_markers_pop_in_staggered() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.reconcile(&state(vec![
            loc("a", 1.0, 1.0, Category::Food),
            loc("b", 2.0, 2.0, Category::Hostel),
            loc("c", 3.0, 3.0, Category::Default),
        ]));

        let delays: Vec<Duration> = c
            .surface_mut()
            .take_ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Create { spec, .. } => Some(spec.appear_delay),
                _ => None,
            })
            .collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(30),
                Duration::from_millis(60)
            ]
        );
    }

    #[test]
    fn rendered_then_destroyed_then_fresh_instance() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.reconcile(&state(vec![loc("a", 1.0, 1.0, Category::Food)]));
        c.on_marker_rendered("a").unwrap();
        assert!(c.on_marker_rendered("a").is_err());

        c.reconcile(&state(vec![]));
        c.reconcile(&state(vec![loc("a", 1.0, 1.0, Category::Food)]));

        let entry = c.registry().get("a").unwrap();
        assert_eq!(entry.state, crate::MarkerState::Created);
    }

    #[test]
    fn zoom_rescales_whole_registry_once() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.reconcile(&state(vec![
            loc("a", 1.0, 1.0, Category::Food),
            loc("b", 2.0, 2.0, Category::Food),
        ]));
        c.surface_mut().take_ops();

        c.on_zoom(20.0);

        assert_eq!(
            c.surface_mut().take_ops(),
            vec![
                Op::Scale {
                    id: "a".into(),
                    scale: 1.4
                },
                Op::Scale {
                    id: "b".into(),
                    scale: 1.4
                },
            ]
        );

        // New markers are created at the current scale.
        c.reconcile(&state(vec![loc("z", 5.0, 5.0, Category::Food)]));
        let created_scale = c.surface_mut().take_ops().into_iter().find_map(|op| match op {
            Op::Create { spec, .. } => Some(spec.scale),
            _ => None,
        });
        assert_eq!(created_scale, Some(1.4));
    }

    #[test]
    fn zoom_controls_are_clamped() {
        let mut h = harness(true);
        let c = &mut h.controller;
        c.surface_mut().camera = ViewportState::new(Coordinates { lat: 0.0, lon: 0.0 }, 21.5);

        assert!((c.zoom_in() - 22.0).abs() < f64::EPSILON);
        assert!((c.zoom_in() - 22.0).abs() < f64::EPSILON);
        assert!((c.zoom_out() - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn map_click_moves_pin_persists_and_publishes() {
        let mut h = harness(true);
        let (selected, _sub) = recorded(&h.bus, Topic::MarkerSelected, |e| match e {
            Event::MarkerSelected { coordinates } => Some(*coordinates),
            _ => None,
        });
        let at = Coordinates { lat: 12.5, lon: 77.5 };

        h.controller.on_map_click(at).unwrap();

        assert_eq!(h.controller.user_marker(), Some(at));
        assert_eq!(h.cache.pending_placement(), Some(at));
        assert_eq!(*selected.lock().unwrap(), vec![at]);
        assert_eq!(
            h.controller.surface_mut().take_ops(),
            vec![Op::UserMarker(at), Op::FlyTo { center: at, zoom: 14.0 }]
        );
    }

    #[test]
    fn map_click_rejects_invalid_point() {
        let mut h = harness(true);
        let err = h
            .controller
            .on_map_click(Coordinates { lat: 100.0, lon: 0.0 })
            .unwrap_err();
        assert!(matches!(err, MapError::Core(_)));
        assert!(h.controller.user_marker().is_none());
    }

    #[test]
    fn add_trigger_snaps_to_center_and_gates_on_auth() {
        let mut h = harness(false);
        let center = Coordinates { lat: 3.0, lon: 4.0 };
        h.controller.surface_mut().camera = ViewportState::new(center, 15.0);
        let (logins, _s1) = recorded(&h.bus, Topic::LoginRequired, |_| Some(()));
        let (opened, _s2) = recorded(&h.bus, Topic::AddFlowOpened, |_| Some(()));

        h.controller.on_add_location_requested();

        assert_eq!(h.controller.user_marker(), Some(center));
        assert_eq!(h.cache.pending_placement(), Some(center));
        assert_eq!(logins.lock().unwrap().len(), 1);
        assert!(opened.lock().unwrap().is_empty());
    }

    #[test]
    fn user_marker_click_opens_add_flow_when_signed_in() {
        let mut h = harness(true);
        let at = Coordinates { lat: 1.0, lon: 1.0 };
        h.controller.on_map_click(at).unwrap();
        let (opened, _sub) = recorded(&h.bus, Topic::AddFlowOpened, |e| match e {
            Event::AddFlowOpened { coordinates } => Some(*coordinates),
            _ => None,
        });

        h.controller.on_user_marker_click();

        assert_eq!(*opened.lock().unwrap(), vec![at]);
    }

    #[tokio::test(start_paused = true)]
    async fn marker_click_flies_pulses_then_navigates() {
        let mut h = harness(true);
        h.controller
            .reconcile(&state(vec![loc("lib", 12.0, 77.0, Category::LectureHall)]));
        h.controller.surface_mut().camera =
            ViewportState::new(Coordinates { lat: 0.0, lon: 0.0 }, 13.0);
        h.controller.surface_mut().take_ops();

        let navigation = h.controller.click_marker("lib").unwrap();

        assert_eq!(
            h.controller.surface_mut().take_ops(),
            vec![
                Op::FlyTo {
                    center: Coordinates { lat: 12.0, lon: 77.0 },
                    zoom: 16.0
                },
                Op::Pulse {
                    id: "lib".into(),
                    peak: 1.3,
                    duration: Duration::from_millis(300)
                },
            ]
        );

        tokio::time::sleep(Duration::from_millis(399)).await;
        assert!(h.router.visited.lock().unwrap().is_empty());

        navigation.await.unwrap();
        assert_eq!(*h.router.visited.lock().unwrap(), vec!["lib".to_string()]);
    }

    #[tokio::test]
    async fn marker_click_keeps_deeper_zoom() {
        let mut h = harness(true);
        h.controller
            .reconcile(&state(vec![loc("a", 1.0, 1.0, Category::Food)]));
        h.controller.surface_mut().camera =
            ViewportState::new(Coordinates { lat: 0.0, lon: 0.0 }, 18.0);

        h.controller.click_marker("a").unwrap().abort();

        assert!((h.controller.surface().camera.zoom - 18.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_marker_click_is_an_error() {
        let mut h = harness(true);
        let err = h.controller.click_marker("nope").unwrap_err();
        assert!(matches!(err, MapError::UnknownMarker(id) if id == "nope"));
    }

    #[tokio::test]
    async fn init_prefers_saved_viewport_over_device() {
        let mut h = harness(true);
        let saved = ViewportState::new(Coordinates { lat: 10.0, lon: 20.0 }, 15.0);
        h.cache.write_viewport(saved).unwrap();
        h.cache
            .write(CacheState::from_locations(
                [loc("a", 10.0, 20.0, Category::Food)],
                None,
            ))
            .unwrap();
        let (ready, _sub) = recorded(&h.bus, Topic::MapReady, |_| Some(()));

        let device = FixedGeolocator(Ok(Coordinates { lat: -5.0, lon: -5.0 }));
        let viewport = h.controller.init(&device).await;

        assert!(viewport.approx_eq(&saved, 1e-9));
        assert_eq!(h.controller.user_marker(), Some(saved.center));
        assert_eq!(h.controller.registry().len(), 1);
        assert!(h.controller.is_ready());
        assert_eq!(ready.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn init_uses_device_fix_without_saved_viewport() {
        let mut h = harness(true);
        let here = Coordinates { lat: -1.0, lon: 36.0 };

        let viewport = h.controller.init(&FixedGeolocator(Ok(here))).await;

        assert_eq!(viewport, ViewportState::new(here, 14.0));
    }

    #[tokio::test]
    async fn init_falls_back_to_default_when_denied() {
        let mut h = harness(true);

        let viewport = h
            .controller
            .init(&FixedGeolocator(Err(GeolocationError::Denied)))
            .await;

        assert_eq!(
            viewport,
            ViewportState::new(Coordinates { lat: 12.9716, lon: 77.5946 }, 14.0)
        );
        assert!(h.controller.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn init_does_not_wait_forever_for_geolocation() {
        let mut h = harness(true);

        let viewport = h.controller.init(&HangingGeolocator).await;

        assert!((viewport.zoom - 14.0).abs() < f64::EPSILON);
        assert!(h.controller.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn locate_me_times_out() {
        let mut h = harness(true);
        let err = h.controller.locate_me(&HangingGeolocator).await.unwrap_err();
        assert!(matches!(
            err,
            MapError::Geolocation(GeolocationError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn locate_me_moves_pin_and_camera() {
        let mut h = harness(true);
        let here = Coordinates { lat: 7.0, lon: 8.0 };

        h.controller.locate_me(&FixedGeolocator(Ok(here))).await.unwrap();

        assert_eq!(h.controller.user_marker(), Some(here));
        assert_eq!(h.controller.surface().camera, ViewportState::new(here, 14.0));
    }

    #[test]
    fn move_end_persists_viewport() {
        let mut h = harness(true);
        let camera = ViewportState::new(Coordinates { lat: 10.0, lon: 20.0 }, 15.0);
        h.controller.surface_mut().camera = camera;

        h.controller.on_move_end();

        assert_eq!(h.cache.viewport(), Some(camera));
    }

    #[tokio::test(start_paused = true)]
    async fn drawer_closed_resizes_then_refreshes_after_settle() {
        let mut h = harness(true);
        h.cache
            .write(CacheState::from_locations(
                [loc("new", 1.0, 1.0, Category::Recreation)],
                None,
            ))
            .unwrap();

        let started = tokio::time::Instant::now();
        h.controller.handle_event(&Event::DrawerClosed).await;

        assert!(started.elapsed() >= Duration::from_millis(350));
        let ops = h.controller.surface_mut().take_ops();
        assert_eq!(ops[0], Op::Resize);
        assert!(matches!(&ops[1], Op::Create { id, .. } if id == "new"));
    }

    #[tokio::test]
    async fn locations_changed_event_reconciles() {
        let mut h = harness(true);
        let current = state(vec![loc("a", 1.0, 1.0, Category::Food)]);
        h.cache.write(current.clone()).unwrap();

        h.controller
            .handle_event(&Event::LocationsChanged {
                state: Arc::new(current),
            })
            .await;

        assert_eq!(h.controller.registry().len(), 1);
    }

    #[tokio::test]
    async fn late_locations_changed_does_not_roll_markers_back() {
        let mut h = harness(true);
        let older = CacheState::from_locations(
            [loc("a", 1.0, 1.0, Category::Food)],
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 2, 0, 0).unwrap()),
        );
        let newer = CacheState::from_locations(
            [loc("b", 2.0, 2.0, Category::Hostel)],
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap()),
        );
        h.cache.write(newer.clone()).unwrap();

        // Publishes arrive newest first, then the stale one.
        for published in [newer, older] {
            h.controller
                .handle_event(&Event::LocationsChanged {
                    state: Arc::new(published),
                })
                .await;
        }

        assert_eq!(h.controller.registry().ids().collect::<Vec<_>>(), vec!["b"]);
    }

    #[tokio::test]
    async fn coordinate_search_skips_geocoder() {
        let mut h = harness(true);
        let geocoder = FixedGeocoder(Some(Coordinates { lat: 0.0, lon: 0.0 }));

        let found = h.controller.search("77.59, 12.97", &geocoder).await;

        let expected = Coordinates { lat: 12.97, lon: 77.59 };
        assert_eq!(found, Some(expected));
        assert_eq!(
            h.controller.surface_mut().take_ops(),
            vec![Op::FlyTo {
                center: expected,
                zoom: 14.0
            }]
        );
    }

    #[tokio::test]
    async fn name_search_uses_geocoder() {
        let mut h = harness(true);
        let library = Coordinates { lat: 1.0, lon: 2.0 };

        let found = h
            .controller
            .search("Central Library", &FixedGeocoder(Some(library)))
            .await;
        assert_eq!(found, Some(library));

        let missing = h.controller.search("Atlantis", &FixedGeocoder(None)).await;
        assert_eq!(missing, None);
    }
}
