//! Point domain model.

use serde::{Deserialize, Serialize};

/// A named geographic coordinate.
///
/// `id` is `None` until a store or the remote assigns one. A point created on
/// this device stays unassigned until the first successful push replaces it
/// with the remote's copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    /// Creates a point with no id.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.id.is_some()
    }

    /// Returns a copy with the id stripped.
    pub fn detached(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }
}

/// Brings a collection into the order every store publishes.
///
/// Assigned points come first, ascending by id; unassigned points follow in
/// insertion order. When the same id occurs more than once the last
/// occurrence wins and takes the slot of the first.
pub fn canonical_order(points: Vec<Point>) -> Vec<Point> {
    let mut collapsed: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        let existing = point
            .id
            .and_then(|id| collapsed.iter().position(|p| p.id == Some(id)));
        match existing {
            Some(index) => collapsed[index] = point,
            None => collapsed.push(point),
        }
    }
    collapsed.sort_by_key(|p| (p.id.is_none(), p.id));
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_point_is_unassigned() {
        let point = Point::new("Dock", 10.0, 20.0);
        assert!(!point.is_assigned());
        assert!(point.with_id(3).is_assigned());
    }

    #[test]
    fn test_detached_drops_id() {
        let local = Point::new("X", 5.0, 6.0);
        let remote = Point::new("X", 5.0, 6.0).with_id(42);
        assert_eq!(remote.detached(), local);
    }

    #[test]
    fn test_canonical_order_sorts_assigned_first() {
        let ordered = canonical_order(vec![
            Point::new("local-a", 0.0, 0.0),
            Point::new("b", 0.0, 0.0).with_id(7),
            Point::new("local-b", 0.0, 0.0),
            Point::new("a", 0.0, 0.0).with_id(2),
        ]);
        let names: Vec<&str> = ordered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "local-a", "local-b"]);
    }

    #[test]
    fn test_canonical_order_collapses_duplicate_ids() {
        let ordered = canonical_order(vec![
            Point::new("old", 1.0, 1.0).with_id(1),
            Point::new("other", 2.0, 2.0).with_id(2),
            Point::new("new", 3.0, 3.0).with_id(1),
        ]);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].name, "new");
        assert_eq!(ordered[1].name, "other");
    }

    #[test]
    fn test_serde_skips_missing_id() {
        let json = serde_json::to_string(&Point::new("X", 5.0, 6.0)).unwrap();
        assert!(!json.contains("id"));
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, None);
    }
}
