#![warn(missing_docs)]
//! Track Core - Headless Racing-Track Editor Kernel
//!
//! # Overview
//!
//! `track-core` is a headless editing kernel for console racing-game course
//! files: a binary container describing spawn points, AI paths, item paths,
//! checkpoints, cameras, respawn points, interactive areas, objects, and
//! motion routes. It owns the track-graph data model, the lossless binary
//! codec, and undo/redo state management. It does not render, pick, or open
//! file dialogs; the viewport, panels, and tools are consumers that read the
//! model and mutate it through the graph operations.
//!
//! # Core Features
//!
//! - **Bounded-degree multigraph model**: every category is a graph of
//!   positioned nodes with mirrored, multiplicity-counted links
//! - **Group segmentation codec**: converts arbitrarily branching point
//!   graphs into the format's linear "group" runs and back, losslessly and
//!   deterministically
//! - **Partial-recovery loading**: corrupt records are skipped with
//!   diagnostics instead of aborting the whole load
//! - **Coalesced undo/redo**: whole-document snapshot frames, one per
//!   gesture rather than one per mouse event, with saved-state tracking
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document & History (undo/redo, settings)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Entity Graphs (8 typed categories)         │  ← Editing Model
//! ├─────────────────────────────────────────────┤
//! │  Group Segmentation & Flat Record Codecs    │  ← Graph ↔ Records
//! ├─────────────────────────────────────────────┤
//! │  Section Table (framing, per-record layout) │  ← File Structure
//! ├─────────────────────────────────────────────┤
//! │  Byte Cursor (big-endian reader/writer)     │  ← Raw Bytes
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Building and saving a course
//!
//! ```rust
//! use track_core::{EnemyPoint, TrackDocument, Vec3};
//!
//! let mut document = TrackDocument::new();
//! let a = document
//!     .enemy_paths
//!     .try_add(EnemyPoint {
//!         position: Vec3::new(0.0, 0.0, -100.0),
//!         ..EnemyPoint::default()
//!     })
//!     .unwrap();
//! let b = document.enemy_paths.try_add(EnemyPoint::default()).unwrap();
//! document.enemy_paths.try_link(a, b).unwrap();
//!
//! let bytes = document.save(false).unwrap();
//! let loaded = TrackDocument::load(&bytes).unwrap();
//! assert!(loaded.diagnostics.is_empty());
//! assert_eq!(loaded.document.enemy_paths.len(), 2);
//! ```
//!
//! ## Undo with gesture coalescing
//!
//! ```rust
//! use track_core::{EditContext, History, StartPoint, TrackDocument};
//!
//! let mut document = TrackDocument::new();
//! let context = EditContext::default();
//! let mut history = History::new(&document, &context);
//!
//! // Many mutations inside one gesture...
//! document.start_points.try_add(StartPoint::default()).unwrap();
//! history.mark_dirty();
//!
//! // ...become a single frame at the gesture boundary.
//! history.set_undo_point(&document, &context);
//! let frame = history.undo(&document, &context).unwrap();
//! assert!(frame.document.start_points.is_empty());
//! ```
//!
//! # Module Description
//!
//! - [`cursor`] - Big-endian byte cursor over the file buffer
//! - [`graph`] - The bounded-degree multigraph ADT
//! - [`entities`] - Per-category payloads and capacity bounds
//! - [`groups`] - Group segmentation codec (graph ↔ linear runs)
//! - [`document`] - The aggregate document and load/save entry points
//! - [`history`] - Deep-clone undo/redo with edit coalescing
//! - [`collision`] - Raycast seam to the course-geometry provider
//!
//! # Determinism
//!
//! Saving is reproducible: group discovery follows node array order, so an
//! unmodified document re-encodes byte-identically. Tools diffing course
//! files rely on this.

pub mod collision;
pub mod cursor;
pub mod document;
pub mod entities;
pub mod error;
pub mod graph;
pub mod groups;
pub mod history;
pub mod math;
mod sections;

pub use collision::{CollisionProvider, RayHit, snap_to_ground};
pub use cursor::{ByteReader, ByteWriter};
pub use document::{LoadOutcome, TrackDocument};
pub use entities::{
    Area, AreaShape, Camera, CameraKind, Checkpoint, CheckpointKind, EnemyPoint, ItemPoint,
    MAX_GROUPS, PATH_LIMITS, POINT_LIMITS, PolePosition, RespawnPoint, ROUTE_LIMITS, RoutePoint,
    START_LIMITS, SectionKind, StartPoint, TrackObject, TrackSettings, UNUSED,
};
pub use error::{EditError, LoadDiagnostic, TrackError};
pub use graph::{GraphLimits, Link, Node, NodeGraph, NodeId};
pub use groups::{GroupLayout, GroupRecord, MAX_GROUP_LINKS, decode_groups, encode_groups};
pub use history::{DEFAULT_MAX_FRAMES, EditContext, History, UndoFrame};
pub use math::{Vec2, Vec3};
pub use sections::{FILE_MAGIC, FORMAT_VERSION};
