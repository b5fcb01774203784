use crate::anomaly::{Marker, MarkerSet};
use log::debug;
use serde::{Deserialize, Serialize};

/// Caller-supplied edit of the session's marker list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum MarkerCommand {
    /// Place a manual marker; ignored while marking is disabled.
    Add {
        position: [f32; 3],
        slice: usize,
        tag: String,
    },
    /// Remove every marker.
    Clear,
}

/// Mutable state owned by the caller and threaded through pipeline runs.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    current_slice: usize,
    marking_enabled: bool,
    markers: MarkerSet,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_slice(&self) -> usize {
        self.current_slice
    }

    pub fn set_current_slice(&mut self, z: usize) {
        self.current_slice = z;
    }

    /// Keep the current slice inside a volume of `depth` slices.
    pub(crate) fn clamp_slice(&mut self, depth: usize) {
        self.current_slice = self.current_slice.min(depth.saturating_sub(1));
    }

    pub fn marking_enabled(&self) -> bool {
        self.marking_enabled
    }

    /// Toggle manual marking; switching it off clears all markers.
    pub fn set_marking(&mut self, enabled: bool) {
        self.marking_enabled = enabled;
        if !enabled {
            self.markers.clear();
        }
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Markers owned by the current slice.
    pub fn current_markers(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.markers.on_slice(self.current_slice)
    }

    pub fn record<I: IntoIterator<Item = Marker>>(&mut self, markers: I) {
        self.markers.extend(markers);
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Apply commands in order, returning how many markers were added.
    pub fn apply<I: IntoIterator<Item = MarkerCommand>>(&mut self, commands: I) -> usize {
        let mut added = 0;
        for command in commands {
            match command {
                MarkerCommand::Add {
                    position,
                    slice,
                    tag,
                } => {
                    if !self.marking_enabled {
                        debug!("Session::apply marking disabled, dropping marker slice={slice}");
                        continue;
                    }
                    self.markers.push(Marker::manual(position, slice, tag));
                    added += 1;
                }
                MarkerCommand::Clear => self.markers.clear(),
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::MarkerSource;

    fn add(z: usize, tag: &str) -> MarkerCommand {
        MarkerCommand::Add {
            position: [1.0, 2.0, z as f32],
            slice: z,
            tag: tag.to_string(),
        }
    }

    #[test]
    fn manual_markers_require_marking_mode() {
        let mut session = Session::new();
        assert_eq!(session.apply([add(0, "missing")]), 0);
        assert!(session.markers().is_empty());

        session.set_marking(true);
        assert_eq!(session.apply([add(0, "missing"), add(3, "missing")]), 2);
        assert_eq!(session.markers().len(), 2);
        assert!(session
            .markers()
            .iter()
            .all(|m| m.source == MarkerSource::Manual));

        session.set_current_slice(3);
        assert_eq!(session.current_markers().count(), 1);
    }

    #[test]
    fn clear_is_explicit() {
        let mut session = Session::new();
        session.set_marking(true);
        session.apply([add(1, "a"), MarkerCommand::Clear, add(2, "b")]);
        let tags: Vec<&str> = session.markers().iter().map(|m| m.tag.as_str()).collect();
        assert_eq!(tags, vec!["b"]);

        session.set_marking(false);
        assert!(session.markers().is_empty());
    }

    #[test]
    fn commands_parse_from_json() {
        let commands: Vec<MarkerCommand> = serde_json::from_str(
            r#"[{"command":"add","position":[1,2,3],"slice":3,"tag":"missing"},{"command":"clear"}]"#,
        )
        .expect("parse commands");
        assert_eq!(commands[0], add(3, "missing"));
        assert_eq!(commands[1], MarkerCommand::Clear);
    }
}
