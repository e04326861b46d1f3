//! Line commands read from stdin while `quad watch` runs.

use quad_core::Coordinates;
use quad_map::parse_coordinate_query;

/// One interaction with the headless map.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Background click at a coordinate.
    Click(Coordinates),
    /// Click on the pending placement pin.
    Pin,
    /// Click on a data marker.
    Marker(String),
    /// Pan the camera and let it settle.
    Move(Coordinates),
    ZoomIn,
    ZoomOut,
    Locate,
    Search(String),
    /// The bottom navigation "add" button.
    Add,
    DrawerClosed,
    RefreshMarkers,
    /// The app came back to the foreground.
    Focus,
    Quit,
}

pub const HELP: &str = "commands: click <lon>, <lat> | pin | marker <id> | move <lon>, <lat> | \
zoom in|out | locate | search <query> | add | drawer-closed | refresh | focus | quit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    let input = match (verb.to_ascii_lowercase().as_str(), rest) {
        ("click", at) => Input::Click(coordinate(at)?),
        ("move", at) => Input::Move(coordinate(at)?),
        ("pin", "") => Input::Pin,
        ("marker", id) if !id.is_empty() => Input::Marker(id.to_string()),
        ("zoom", "in") => Input::ZoomIn,
        ("zoom", "out") => Input::ZoomOut,
        ("locate", "") => Input::Locate,
        ("search", query) if !query.is_empty() => Input::Search(query.to_string()),
        ("add", "") => Input::Add,
        ("drawer-closed", "") => Input::DrawerClosed,
        ("refresh", "") => Input::RefreshMarkers,
        ("focus", "") => Input::Focus,
        ("quit" | "exit", "") => Input::Quit,
        _ => return Err(format!("unrecognised command '{line}'; {HELP}")),
    };
    Ok(Some(input))
}

fn coordinate(raw: &str) -> Result<Coordinates, String> {
    parse_coordinate_query(raw).ok_or_else(|| format!("expected '<lon>, <lat>', got '{raw}'"))
}
