//! Session state domain models.
//!
//! Contains the UI state that survives process restarts, and the scalar
//! encoding it is persisted with.

use crate::point::Point;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CENTER_LAT: f64 = 55.751244;
pub const DEFAULT_CENTER_LON: f64 = 37.618423;

/// Storage keys. Structured values are split across several scalar keys.
pub mod keys {
    pub const CENTER_LAT: &str = "centerLat";
    pub const CENTER_LON: &str = "centerLon";
    pub const CHAT_OPEN: &str = "showChatDrawer";
    pub const CHAT_INPUT: &str = "inputMessage";
    pub const MESSAGES: &str = "messages";
    pub const SELECTED_NAME: &str = "sel_name";
    pub const SELECTED_LAT: &str = "sel_lat";
    pub const SELECTED_LON: &str = "sel_lon";
    pub const ADD_LAT: &str = "add_lat";
    pub const ADD_LON: &str = "add_lon";
}

/// Chat transcript shown on first launch.
pub fn default_messages() -> Vec<String> {
    vec![
        "Привет!".to_string(),
        "Добро пожаловать в чат.".to_string(),
        "Готов к работе?".to_string(),
    ]
}

/// A primitive value the session state store can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Double(f64),
    Text(String),
    TextList(Vec<String>),
}

impl StateValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for StateValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for StateValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for StateValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<String>> for StateValue {
    fn from(v: Vec<String>) -> Self {
        Self::TextList(v)
    }
}

/// A pending "add point" dialog anchored at a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingAddDialog {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single key write. `None` removes the key.
pub type StateEntry = (&'static str, Option<StateValue>);

/// UI state that persists across restarts.
///
/// Every field restores independently. A structured field whose scalar keys
/// are only partially present (or hold the wrong type) restores as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub center_lat: f64,
    pub center_lon: f64,
    pub chat_open: bool,
    pub chat_input: String,
    pub chat_transcript: Vec<String>,
    /// A value copy, never tied to a row of the live collection.
    pub selected_point: Option<Point>,
    pub pending_add_dialog: Option<PendingAddDialog>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            center_lat: DEFAULT_CENTER_LAT,
            center_lon: DEFAULT_CENTER_LON,
            chat_open: false,
            chat_input: String::new(),
            chat_transcript: default_messages(),
            selected_point: None,
            pending_add_dialog: None,
        }
    }
}

impl SessionState {
    pub fn center_entries(lat: f64, lon: f64) -> Vec<StateEntry> {
        vec![
            (keys::CENTER_LAT, Some(lat.into())),
            (keys::CENTER_LON, Some(lon.into())),
        ]
    }

    pub fn chat_entries(&self) -> Vec<StateEntry> {
        vec![
            (keys::CHAT_OPEN, Some(self.chat_open.into())),
            (keys::CHAT_INPUT, Some(self.chat_input.clone().into())),
            (keys::MESSAGES, Some(self.chat_transcript.clone().into())),
        ]
    }

    /// Encodes the selected point as a name/lat/lon triple.
    pub fn selected_point_entries(point: Option<&Point>) -> Vec<StateEntry> {
        match point {
            Some(p) => vec![
                (keys::SELECTED_NAME, Some(p.name.clone().into())),
                (keys::SELECTED_LAT, Some(p.latitude.into())),
                (keys::SELECTED_LON, Some(p.longitude.into())),
            ],
            None => vec![
                (keys::SELECTED_NAME, None),
                (keys::SELECTED_LAT, None),
                (keys::SELECTED_LON, None),
            ],
        }
    }

    pub fn pending_dialog_entries(dialog: Option<PendingAddDialog>) -> Vec<StateEntry> {
        match dialog {
            Some(d) => vec![
                (keys::ADD_LAT, Some(d.latitude.into())),
                (keys::ADD_LON, Some(d.longitude.into())),
            ],
            None => vec![(keys::ADD_LAT, None), (keys::ADD_LON, None)],
        }
    }

    /// Rebuilds a selected point from its stored triple.
    pub fn decode_selected_point(
        name: Option<&StateValue>,
        lat: Option<&StateValue>,
        lon: Option<&StateValue>,
    ) -> Option<Point> {
        let name = name?.as_str()?;
        let lat = lat?.as_f64()?;
        let lon = lon?.as_f64()?;
        Some(Point::new(name, lat, lon))
    }

    pub fn decode_pending_dialog(
        lat: Option<&StateValue>,
        lon: Option<&StateValue>,
    ) -> Option<PendingAddDialog> {
        Some(PendingAddDialog {
            latitude: lat?.as_f64()?,
            longitude: lon?.as_f64()?,
        })
    }
}
