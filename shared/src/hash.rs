//! View state carried in the URL fragment.
//!
//! Two shapes are accepted, the legacy three-field one and the extended one
//! with a trailing pair of chooser indices:
//!
//! ```text
//! fragment = "#" zoom "/" coord "/" coord [ "/" index "/" index ]
//! zoom     = decimal
//! coord    = [ "-" ] decimal
//! decimal  = digits [ "." [ digits ] ] | "." digits
//! index    = digits
//! ```
//!
//! Coordinates are written latitude first. Encoding always emits the
//! extended shape with zoom rounded to 2 decimals and coordinates to 6.

use nom::{
    IResult,
    branch::alt,
    character::complete::{char, digit0, digit1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    sequence::{pair, preceded, tuple},
};

use crate::view_state::{LngLat, ViewState};

/// Raw fields of a syntactically valid fragment, before bounds checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashState {
    pub zoom: f64,
    pub lat: f64,
    pub lon: f64,
    /// Foreground and background chooser indices (extended shape only).
    pub indices: Option<(usize, usize)>,
}

/// Parse a fragment. Returns `None` for anything outside the grammar.
pub fn parse(fragment: &str) -> Option<HashState> {
    fragment_state(fragment).ok().map(|(_, state)| state)
}

/// Decode a fragment into a view state.
///
/// Indices are kept only when they address an existing option in lists of
/// `layer_choices` and `basemap_choices` entries. Zoom and center are clamped
/// into the map limits. `None` means the caller should use the default view.
pub fn decode(fragment: &str, layer_choices: usize, basemap_choices: usize) -> Option<ViewState> {
    let state = parse(fragment)?;
    let (foreground_index, background_index) = match state.indices {
        Some((fg, bg)) => (
            (fg < layer_choices).then_some(fg),
            (bg < basemap_choices).then_some(bg),
        ),
        None => (None, None),
    };

    Some(
        ViewState {
            zoom: state.zoom,
            center: LngLat {
                lon: state.lon,
                lat: state.lat,
            },
            foreground_index,
            background_index,
        }
        .clamped(),
    )
}

/// Encode a view state in the extended shape. Missing indices encode as 0.
pub fn encode(view: &ViewState) -> String {
    format!(
        "#{:.2}/{:.6}/{:.6}/{}/{}",
        view.zoom,
        view.center.lat,
        view.center.lon,
        view.foreground_index.unwrap_or(0),
        view.background_index.unwrap_or(0),
    )
}

fn fragment_state(input: &str) -> IResult<&str, HashState> {
    map(
        all_consuming(tuple((
            preceded(char('#'), zoom),
            preceded(char('/'), coordinate),
            preceded(char('/'), coordinate),
            opt(pair(preceded(char('/'), index), preceded(char('/'), index))),
        ))),
        |(zoom, lat, lon, indices)| HashState {
            zoom,
            lat,
            lon,
            indices,
        },
    )(input)
}

fn decimal(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

fn zoom(input: &str) -> IResult<&str, f64> {
    map_res(decimal, str::parse::<f64>)(input)
}

fn coordinate(input: &str) -> IResult<&str, f64> {
    map_res(recognize(pair(opt(char('-')), decimal)), str::parse::<f64>)(input)
}

// Digits that overflow `usize` can never be in range, so they saturate
// instead of rejecting the whole fragment.
fn index(input: &str) -> IResult<&str, usize> {
    map(digit1, |digits: &str| {
        digits.parse::<usize>().unwrap_or(usize::MAX)
    })(input)
}
