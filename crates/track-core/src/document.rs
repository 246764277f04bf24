//! The live editing model: one graph per category plus global settings.
//!
//! A [`TrackDocument`] is what the viewport, panels, and tools read from and
//! mutate through the graph operations; the codec rebuilds it on load and
//! flattens it on save. Undo frames deep-clone the whole document because
//! cross-references span categories.

use crate::entities::{
    Area, Camera, Checkpoint, EnemyPoint, ItemPoint, RespawnPoint, RoutePoint, SectionKind,
    StartPoint, TrackObject, TrackSettings, PATH_LIMITS, POINT_LIMITS, ROUTE_LIMITS, START_LIMITS,
    UNUSED,
};
use crate::error::{LoadDiagnostic, TrackError};
use crate::graph::NodeGraph;
use crate::sections;

/// A successfully loaded document plus whatever was recovered around.
#[derive(Debug)]
pub struct LoadOutcome {
    /// The decoded document.
    pub document: TrackDocument,
    /// Record-corruption events that were skipped rather than aborting the
    /// load. Empty for a well-formed file.
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// The complete editable state of one course file.
#[derive(Debug, Clone)]
pub struct TrackDocument {
    /// Player spawn points.
    pub start_points: NodeGraph<StartPoint>,
    /// AI driving paths (group-encoded).
    pub enemy_paths: NodeGraph<EnemyPoint>,
    /// Item paths (group-encoded).
    pub item_paths: NodeGraph<ItemPoint>,
    /// Checkpoints (group-encoded).
    pub checkpoints: NodeGraph<Checkpoint>,
    /// Racer recovery points.
    pub respawn_points: NodeGraph<RespawnPoint>,
    /// Decorative and functional objects.
    pub objects: NodeGraph<TrackObject>,
    /// Motion-route points; every maximal 1/1 chain is one route.
    pub routes: NodeGraph<RoutePoint>,
    /// Interactive area triggers.
    pub areas: NodeGraph<Area>,
    /// Replay and opening cameras.
    pub cameras: NodeGraph<Camera>,
    /// Global stage settings.
    pub settings: TrackSettings,
}

impl Default for TrackDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackDocument {
    /// An empty document with every category at its bounds.
    pub fn new() -> Self {
        Self {
            start_points: NodeGraph::new(START_LIMITS),
            enemy_paths: NodeGraph::new(PATH_LIMITS),
            item_paths: NodeGraph::new(PATH_LIMITS),
            checkpoints: NodeGraph::new(PATH_LIMITS),
            respawn_points: NodeGraph::new(POINT_LIMITS),
            objects: NodeGraph::new(POINT_LIMITS),
            routes: NodeGraph::new(ROUTE_LIMITS),
            areas: NodeGraph::new(POINT_LIMITS),
            cameras: NodeGraph::new(POINT_LIMITS),
            settings: TrackSettings::default(),
        }
    }

    /// Decode a course file.
    ///
    /// Structural corruption (bad magic, truncation, out-of-range section
    /// offset) aborts with an error. Record-level corruption is recovered:
    /// the offending record is skipped and reported in the outcome's
    /// diagnostics, because course files circulate with many hand-edited and
    /// third-party-tool variants.
    pub fn load(bytes: &[u8]) -> Result<LoadOutcome, TrackError> {
        let (document, mut diagnostics) = sections::decode_file(bytes)?;
        document.check_cross_references(&mut diagnostics);
        for diagnostic in &diagnostics {
            log::warn!("recovered while loading: {diagnostic}");
        }
        Ok(LoadOutcome {
            document,
            diagnostics,
        })
    }

    /// Encode the document to file bytes.
    ///
    /// `battle` overrides the stored battle-arena flag, mirroring the save
    /// dialog's choice. The encoding is deterministic: saving an unmodified
    /// document twice produces byte-identical output.
    pub fn save(&self, battle: bool) -> Result<Vec<u8>, TrackError> {
        sections::encode_file(self, battle)
    }

    /// Total node count across every category.
    pub fn node_count(&self) -> usize {
        self.start_points.len()
            + self.enemy_paths.len()
            + self.item_paths.len()
            + self.checkpoints.len()
            + self.respawn_points.len()
            + self.objects.len()
            + self.routes.len()
            + self.areas.len()
            + self.cameras.len()
    }

    /// Report cross-reference indices that point past the referenced
    /// category. The raw values are kept (the format round-trips them
    /// verbatim); this only surfaces them so a frontend can warn.
    fn check_cross_references(&self, diagnostics: &mut Vec<LoadDiagnostic>) {
        let respawns = self.respawn_points.len();
        for (i, (_, node)) in self.checkpoints.iter().enumerate() {
            let r = node.data.respawn_index;
            if r != UNUSED && (r as usize) >= respawns {
                diagnostics.push(LoadDiagnostic {
                    section: SectionKind::Checkpoints,
                    record: i,
                    message: format!("respawn reference {r} exceeds {respawns} respawn point(s)"),
                });
            }
        }

        let routes = sections::route_count(&self.routes);
        for (i, (_, node)) in self.objects.iter().enumerate() {
            let r = node.data.route_index;
            if r != 0xffff && (r as usize) >= routes {
                diagnostics.push(LoadDiagnostic {
                    section: SectionKind::Objects,
                    record: i,
                    message: format!("route reference {r} exceeds {routes} route(s)"),
                });
            }
        }

        let cameras = self.cameras.len();
        for (i, (_, node)) in self.areas.iter().enumerate() {
            let c = node.data.camera_index;
            if c != UNUSED && (c as usize) >= cameras {
                diagnostics.push(LoadDiagnostic {
                    section: SectionKind::Areas,
                    record: i,
                    message: format!("camera reference {c} exceeds {cameras} camera(s)"),
                });
            }
            let r = node.data.route_index;
            if r != UNUSED && (r as usize) >= routes {
                diagnostics.push(LoadDiagnostic {
                    section: SectionKind::Areas,
                    record: i,
                    message: format!("route reference {r} exceeds {routes} route(s)"),
                });
            }
        }

        for (i, (_, node)) in self.cameras.iter().enumerate() {
            let n = node.data.next_camera;
            if n != UNUSED && (n as usize) >= cameras {
                diagnostics.push(LoadDiagnostic {
                    section: SectionKind::Cameras,
                    record: i,
                    message: format!("next-camera reference {n} exceeds {cameras} camera(s)"),
                });
            }
            let r = node.data.route_index;
            if r != UNUSED && (r as usize) >= routes {
                diagnostics.push(LoadDiagnostic {
                    section: SectionKind::Cameras,
                    record: i,
                    message: format!("route reference {r} exceeds {routes} route(s)"),
                });
            }
        }
    }
}
