use serde::{Deserialize, Serialize};

/// Where a marker came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerSource {
    /// Supplied by the caller through a marker command.
    Manual,
    /// Emitted by the anomaly detector for a region.
    Detected,
}

/// A tagged 3D position owned by one slice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Physical position `[x, y, z]` (index scaled by spacing).
    pub position: [f32; 3],
    /// Slice the marker is drawn on.
    pub slice: usize,
    pub tag: String,
    pub source: MarkerSource,
    /// Region the marker was derived from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<u32>,
}

impl Marker {
    pub fn manual(position: [f32; 3], slice: usize, tag: impl Into<String>) -> Self {
        Self {
            position,
            slice,
            tag: tag.into(),
            source: MarkerSource::Manual,
            label: None,
        }
    }
}

/// Ordered, append-only marker collection.
///
/// Markers are only removed by an explicit `clear`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    /// Markers owned by slice `z`, in insertion order.
    pub fn on_slice(&self, z: usize) -> impl Iterator<Item = &Marker> + '_ {
        self.markers.iter().filter(move |m| m.slice == z)
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

impl Extend<Marker> for MarkerSet {
    fn extend<T: IntoIterator<Item = Marker>>(&mut self, iter: T) {
        self.markers.extend(iter);
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_keep_insertion_order_until_cleared() {
        let mut set = MarkerSet::new();
        set.push(Marker::manual([0.0, 0.0, 2.0], 2, "a"));
        set.extend([
            Marker::manual([1.0, 0.0, 0.0], 0, "b"),
            Marker::manual([2.0, 0.0, 2.0], 2, "c"),
        ]);
        assert_eq!(set.len(), 3);
        let tags: Vec<&str> = set.iter().map(|m| m.tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
        let on_two: Vec<&str> = set.on_slice(2).map(|m| m.tag.as_str()).collect();
        assert_eq!(on_two, vec!["a", "c"]);
        assert_eq!(set.on_slice(5).count(), 0);

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn marker_set_serializes_as_array() {
        let mut set = MarkerSet::new();
        set.push(Marker::manual([1.0, 2.0, 3.0], 3, "anomaly"));
        let json = serde_json::to_value(&set).expect("serialize");
        assert!(json.is_array());
        assert_eq!(json[0]["source"], "manual");
        assert!(json[0].get("label").is_none());
    }
}
