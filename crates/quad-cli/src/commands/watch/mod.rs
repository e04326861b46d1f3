//! `quad watch`: the map runtime without a display.
//!
//! One task owns the [`MapController`] and drains three inputs: bus events
//! the controller reacts to, stdin line commands, and Ctrl-C. Background
//! sync runs on its own task through [`SyncScheduler`] and reaches the
//! controller only through the bus.

mod input;
mod surface;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use quad_core::{Coordinates, SyncStatus, ViewportState};
use quad_events::{Event, EventBus, Topic};
use quad_map::{MapController, MapSurface, parse_coordinate_query};
use quad_sync::SyncScheduler;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::root_commands::WatchArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

use input::Input;
use surface::{FixedPosition, LogRouter, NoGeocoder, SessionAuth, TracingSurface};

/// Events printed as they happen, one JSON line each.
const NOTICE_TOPICS: &[Topic] = &[
    Topic::MapReady,
    Topic::MarkerSelected,
    Topic::AddFlowOpened,
    Topic::LoginRequired,
    Topic::SyncStatusChanged,
    Topic::LocationsChanged,
];

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum Notice {
    MapReady,
    MarkerSelected {
        coordinates: Coordinates,
    },
    AddFlowOpened {
        coordinates: Coordinates,
    },
    LoginRequired,
    SyncStatus {
        status: SyncStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    LocationsChanged {
        total: usize,
        watermark: Option<DateTime<Utc>>,
    },
}

impl Notice {
    fn from_event(event: &Event) -> Option<Self> {
        let notice = match event {
            Event::MapReady => Self::MapReady,
            Event::MarkerSelected { coordinates } => Self::MarkerSelected {
                coordinates: *coordinates,
            },
            Event::AddFlowOpened { coordinates } => Self::AddFlowOpened {
                coordinates: *coordinates,
            },
            Event::LoginRequired => Self::LoginRequired,
            Event::SyncStatusChanged { status, reason } => Self::SyncStatus {
                status: *status,
                reason: reason.clone(),
            },
            Event::LocationsChanged { state } => Self::LocationsChanged {
                total: state.len(),
                watermark: state.watermark,
            },
            _ => return None,
        };
        Some(notice)
    }
}

#[derive(Debug, Serialize)]
struct WatchSummary {
    markers_removed: usize,
    locations: usize,
    watermark: Option<DateTime<Utc>>,
    viewport: Option<ViewportState>,
}

/// Handle `quad watch`.
pub async fn handle(args: &WatchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let position = args
        .position
        .as_deref()
        .map(|raw| {
            parse_coordinate_query(raw)
                .with_context(|| format!("invalid --position '{raw}'; expected '<lon>, <lat>'"))
        })
        .transpose()?;

    let mut map_events = ctx.bus.stream(MapController::<TracingSurface>::TOPICS);
    let mut notices = ctx.bus.stream(NOTICE_TOPICS);

    let controller = MapController::new(
        TracingSurface::new(ctx.config.map.default_viewport()?),
        Arc::clone(&ctx.cache),
        ctx.bus.clone(),
        Arc::new(LogRouter),
        Arc::new(SessionAuth(args.authenticated)),
        ctx.config.map.clone(),
    )?;
    let mut session = Session {
        controller,
        bus: ctx.bus.clone(),
        locator: FixedPosition(position),
    };
    session.start().await;

    let scheduler = match ctx.sync_engine() {
        Ok(engine) => {
            let period = args
                .refresh_secs
                .map_or_else(|| ctx.config.sync.refresh_interval(), Duration::from_secs);
            tracing::info!(period_secs = period.as_secs(), "background sync started");
            Some(SyncScheduler::new(Arc::new(engine), period).spawn(&ctx.bus))
        }
        Err(error) => {
            tracing::warn!("{error:#}; running without background sync");
            None
        }
    };

    if !flags.quiet {
        eprintln!("{}", input::HELP);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(event) = map_events.recv() => session.on_map_event(&event).await,
            Some(event) = notices.recv() => {
                if let Some(notice) = Notice::from_event(&event) {
                    output(&notice, OutputFormat::Raw)?;
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match input::parse(&line) {
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(input)) => session.apply(input).await,
                    Ok(None) => {}
                    Err(message) => tracing::warn!("{message}"),
                },
                Ok(None) => {
                    tracing::debug!("stdin closed; running until Ctrl-C");
                    stdin_open = false;
                }
                Err(error) => {
                    tracing::warn!(%error, "stdin unreadable; running until Ctrl-C");
                    stdin_open = false;
                }
            },
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    if let Some(scheduler) = scheduler {
        scheduler.abort();
    }
    output(&session.finish(), flags.format)
}

/// Commands that other parts of the app would raise on the bus rather than
/// call on the map directly.
fn bus_event(input: &Input) -> Option<Event> {
    match input {
        Input::Add => Some(Event::AddLocationRequested),
        Input::DrawerClosed => Some(Event::DrawerClosed),
        Input::RefreshMarkers => Some(Event::MarkersShouldRefresh),
        Input::Focus => Some(Event::FocusRegained),
        _ => None,
    }
}

/// The controller plus the collaborators stdin commands need.
struct Session {
    controller: MapController<TracingSurface>,
    bus: EventBus,
    locator: FixedPosition,
}

impl Session {
    async fn start(&mut self) {
        self.controller.init(&self.locator).await;
        self.acknowledge_rendered();
    }

    async fn on_map_event(&mut self, event: &Event) {
        self.controller.handle_event(event).await;
        self.acknowledge_rendered();
    }

    /// Apply one stdin command. A camera change is persisted as if the map
    /// had settled.
    async fn apply(&mut self, input: Input) {
        if let Some(event) = bus_event(&input) {
            self.bus.publish(&event);
            return;
        }

        let before = self.controller.surface().camera();
        let result = match input {
            Input::Click(at) => self.controller.on_map_click(at),
            Input::Pin => {
                self.controller.on_user_marker_click();
                Ok(())
            }
            Input::Marker(id) => self.controller.click_marker(&id).map(drop),
            Input::Move(at) => {
                let zoom = before.zoom;
                self.controller
                    .surface_mut()
                    .set_camera(ViewportState::new(at, zoom));
                Ok(())
            }
            Input::ZoomIn => {
                self.controller.zoom_in();
                Ok(())
            }
            Input::ZoomOut => {
                self.controller.zoom_out();
                Ok(())
            }
            Input::Locate => self.controller.locate_me(&self.locator).await.map(drop),
            Input::Search(query) => {
                self.controller.search(&query, &NoGeocoder).await;
                Ok(())
            }
            Input::Add
            | Input::DrawerClosed
            | Input::RefreshMarkers
            | Input::Focus
            | Input::Quit => Ok(()),
        };

        if let Err(error) = result {
            tracing::warn!(%error, "map command failed");
        }
        if self.controller.surface().camera() != before {
            self.controller.on_move_end();
        }
        self.acknowledge_rendered();
    }

    /// Tell the controller which markers finished drawing.
    fn acknowledge_rendered(&mut self) {
        for id in self.controller.surface_mut().take_rendered() {
            if let Err(error) = self.controller.on_marker_rendered(&id) {
                tracing::debug!(%error, %id, "render acknowledgement ignored");
            }
        }
    }

    /// Persist the final camera and remove every marker.
    fn finish(mut self) -> WatchSummary {
        self.controller.on_move_end();
        let markers_removed = self.controller.teardown();
        let cache = self.controller.cache();
        let state = cache.read();
        WatchSummary {
            markers_removed,
            locations: state.len(),
            watermark: state.watermark,
            viewport: cache.viewport(),
        }
    }
}
