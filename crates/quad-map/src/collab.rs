//! Collaborators the controller calls out to.

use std::future::Future;

use quad_core::Coordinates;

use crate::error::GeolocationError;

/// Receives navigation requests from marker clicks.
pub trait Router: Send + Sync {
    fn navigate(&self, location_id: &str);
}

/// Whether the current user may add locations.
pub trait AuthContext: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// One-shot device position lookup.
pub trait Geolocator {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>>;
}

/// Free-text place lookup, used when a search query is not a coordinate
/// pair.
pub trait Geocoder {
    /// The best match for `query`, or `None` if nothing was found.
    fn lookup(&self, query: &str) -> impl Future<Output = Option<Coordinates>>;
}

/// Parse a `"<lon>, <lat>"` search query.
///
/// Both parts must be plain decimals (optional leading `-`, optional
/// fraction). Whitespace is allowed around the pair and after the comma.
/// The result must be a valid coordinate.
#[must_use]
pub fn parse_coordinate_query(query: &str) -> Option<Coordinates> {
    let (lon, lat) = query.trim().split_once(',')?;
    let lon = parse_decimal(lon)?;
    let lat = parse_decimal(lat.trim_start())?;
    Coordinates::new(lat, lon).ok()
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || !frac.is_none_or(all_digits) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("77.5946, 12.9716", Some((12.9716, 77.5946)))]
    #[case("  -0.1276,51.5072  ", Some((51.5072, -0.1276)))]
    #[case("10,20", Some((20.0, 10.0)))]
    #[case("77.59 , 12.97", None)]
    #[case("Main Library", None)]
    #[case("1e3, 2", None)]
    #[case("12.,5", None)]
    #[case("200, 10", None)]
    #[case("10, 95", None)]
    fn coordinate_queries(#[case] query: &str, #[case] expected: Option<(f64, f64)>) {
        assert_eq!(
            parse_coordinate_query(query),
            expected.map(|(lat, lon)| Coordinates { lat, lon })
        );
    }
}
