//! Point DTOs for the wire format and the on-disk document.

use serde::{Deserialize, Deserializer, Serialize};
use varmap_core::point::Point;

/// Wire representation: `{id: number|null, name, latitude, longitude}`.
///
/// The id is decoded leniently: a number, a numeric string, or null. Zero is
/// the "unassigned" sentinel and maps to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    #[serde(default, deserialize_with = "deserialize_lenient_id")]
    pub id: Option<i64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Point> for PointDto {
    fn from(point: Point) -> Self {
        Self {
            id: point.id.filter(|id| *id != 0),
            name: point.name,
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

impl From<PointDto> for Point {
    fn from(dto: PointDto) -> Self {
        Self {
            id: dto.id.filter(|id| *id != 0),
            name: dto.name,
            latitude: dto.latitude,
            longitude: dto.longitude,
        }
    }
}

fn deserialize_lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(n)) => Ok(Some(n)),
        Some(RawId::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid point id: {:?}", s))),
    }
}

/// On-disk document for the local collection (`points.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointsDocument {
    #[serde(default)]
    pub points: Vec<Point>,
}
