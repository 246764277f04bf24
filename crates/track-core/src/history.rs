//! Undo/redo over whole-document snapshots.
//!
//! # Overview
//!
//! The history wraps the entire [`TrackDocument`], not individual entities,
//! because cross-references span categories. Every frame is an independent
//! deep clone — frames never alias live document nodes, or later edits would
//! corrupt history.
//!
//! # Coalescing
//!
//! Mutations only set a `dirty` flag ([`History::mark_dirty`]); a frame is
//! captured when [`History::set_undo_point`] runs at a gesture boundary
//! (pointer down/up, discrete commands) *and* the flag is set. Dragging a
//! point through a hundred mouse-move events therefore costs one frame, not
//! a hundred.
//!
//! # Saved-state tracking
//!
//! A clean index marks the frame that matches the bytes on disk, so
//! [`History::is_modified`] stays correct across undo past a save and back,
//! and becomes permanently true when the clean frame is truncated away.

use crate::document::TrackDocument;
use crate::entities::SectionKind;
use crate::graph::NodeId;

/// Default cap on retained frames. Frames are whole-document clones, so the
/// cap is far lower than a delta-based history would use.
pub const DEFAULT_MAX_FRAMES: usize = 256;

/// The editing-session state restored together with the document: which
/// category panel and route were active, and what was selected. Node handles
/// stay meaningful across snapshot/restore because clones preserve them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditContext {
    /// Category whose panel/tool was active.
    pub active_section: Option<SectionKind>,
    /// Route being edited (any handle on the route's chain).
    pub selected_route: Option<NodeId>,
    /// Selected nodes in the active category.
    pub selection: Vec<NodeId>,
}

/// One restorable snapshot.
#[derive(Debug, Clone)]
pub struct UndoFrame {
    /// Deep copy of the whole document.
    pub document: TrackDocument,
    /// Session context at the time of capture.
    pub context: EditContext,
}

/// Linear undo/redo history with a cursor.
#[derive(Debug)]
pub struct History {
    frames: Vec<UndoFrame>,
    /// Index of the frame describing the last committed state.
    pos: usize,
    /// Set by any mutation since the last captured frame.
    dirty: bool,
    /// Frame index matching the bytes on disk, when still reachable.
    clean: Option<usize>,
    max_frames: usize,
}

impl History {
    /// Start a history at the given initial state, which is also the clean
    /// (saved) state.
    pub fn new(document: &TrackDocument, context: &EditContext) -> Self {
        Self::with_capacity(document, context, DEFAULT_MAX_FRAMES)
    }

    /// As [`History::new`] with an explicit frame cap (at least 2: the
    /// current state plus one undo step).
    pub fn with_capacity(
        document: &TrackDocument,
        context: &EditContext,
        max_frames: usize,
    ) -> Self {
        Self {
            frames: vec![UndoFrame {
                document: document.clone(),
                context: context.clone(),
            }],
            pos: 0,
            dirty: false,
            clean: Some(0),
            max_frames: max_frames.max(2),
        }
    }

    /// Record that a mutation happened. Cheap and idempotent; called by the
    /// editing layer on every graph or settings change.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether an uncaptured mutation is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the live document differs from the last saved bytes.
    pub fn is_modified(&self) -> bool {
        self.dirty || self.clean != Some(self.pos)
    }

    /// Frames available behind the cursor.
    pub fn undo_depth(&self) -> usize {
        self.pos + usize::from(self.dirty)
    }

    /// Frames available ahead of the cursor.
    pub fn redo_depth(&self) -> usize {
        if self.dirty {
            0
        } else {
            self.frames.len() - 1 - self.pos
        }
    }

    /// True when [`History::undo`] would restore something.
    pub fn can_undo(&self) -> bool {
        self.undo_depth() > 0
    }

    /// True when [`History::redo`] would restore something.
    pub fn can_redo(&self) -> bool {
        self.redo_depth() > 0
    }

    /// Number of retained frames (for tests and status displays).
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Capture the current state as a frame, if anything changed since the
    /// last capture. Invoked at gesture boundaries; the `dirty` gate is what
    /// coalesces a continuous drag into a single frame. Truncates any
    /// forward (redo) history.
    pub fn set_undo_point(&mut self, document: &TrackDocument, context: &EditContext) {
        if !self.dirty {
            return;
        }
        if let Some(clean) = self.clean
            && clean > self.pos
        {
            // The saved state lived in the redo range being discarded.
            self.clean = None;
        }
        self.frames.truncate(self.pos + 1);
        self.frames.push(UndoFrame {
            document: document.clone(),
            context: context.clone(),
        });
        self.pos += 1;
        self.dirty = false;

        if self.frames.len() > self.max_frames {
            self.frames.remove(0);
            self.pos -= 1;
            self.clean = match self.clean {
                Some(0) | None => None,
                Some(i) => Some(i - 1),
            };
        }
    }

    /// Step back and return the frame to restore, or `None` at the oldest
    /// state. Pending uncaptured edits are committed first so a later redo
    /// can return to them.
    pub fn undo(&mut self, document: &TrackDocument, context: &EditContext) -> Option<UndoFrame> {
        self.set_undo_point(document, context);
        if self.pos == 0 {
            return None;
        }
        self.pos -= 1;
        Some(self.frames[self.pos].clone())
    }

    /// Step forward and return the frame to restore, or `None` at the newest
    /// state. Pending edits are committed first, which truncates the forward
    /// history (a branch point discards the old future).
    pub fn redo(&mut self, document: &TrackDocument, context: &EditContext) -> Option<UndoFrame> {
        self.set_undo_point(document, context);
        if self.pos + 1 >= self.frames.len() {
            return None;
        }
        self.pos += 1;
        Some(self.frames[self.pos].clone())
    }

    /// Mark the current state as matching the bytes just written to disk.
    /// Pending edits are committed first so the clean index names a real
    /// frame.
    pub fn mark_saved(&mut self, document: &TrackDocument, context: &EditContext) {
        self.set_undo_point(document, context);
        self.clean = Some(self.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StartPoint;
    use crate::math::Vec3;

    fn doc_with_point(x: f32) -> TrackDocument {
        let mut document = TrackDocument::new();
        document
            .start_points
            .try_add(StartPoint {
                position: Vec3::new(x, 0.0, 0.0),
                ..StartPoint::default()
            })
            .unwrap();
        document
    }

    fn first_x(document: &TrackDocument) -> f32 {
        let id = document.start_points.at(0).unwrap();
        document.start_points.node(id).unwrap().data.position.x
    }

    #[test]
    fn drag_coalesces_to_one_frame() {
        let base = TrackDocument::new();
        let context = EditContext::default();
        let mut history = History::new(&base, &context);

        // A drag: many mutations, one boundary.
        let live = doc_with_point(1.0);
        for _ in 0..100 {
            history.mark_dirty();
        }
        history.set_undo_point(&live, &context);
        assert_eq!(history.frame_count(), 2);

        // A second boundary with nothing dirty captures nothing.
        history.set_undo_point(&live, &context);
        assert_eq!(history.frame_count(), 2);

        let frame = history.undo(&live, &context).unwrap();
        assert_eq!(frame.document.start_points.len(), 0);
    }

    #[test]
    fn undo_redo_round_trip() {
        let v0 = TrackDocument::new();
        let context = EditContext::default();
        let mut history = History::new(&v0, &context);

        let v1 = doc_with_point(1.0);
        history.mark_dirty();
        history.set_undo_point(&v1, &context);

        let mut v2 = v1.clone();
        {
            let id = v2.start_points.at(0).unwrap();
            v2.start_points.node_mut(id).unwrap().data.position.x = 2.0;
        }
        history.mark_dirty();
        history.set_undo_point(&v2, &context);

        let frame = history.undo(&v2, &context).unwrap();
        assert_eq!(first_x(&frame.document), 1.0);
        let frame = history.undo(&frame.document, &context).unwrap();
        assert_eq!(frame.document.start_points.len(), 0);
        assert!(history.undo(&frame.document, &context).is_none());

        let frame = history.redo(&frame.document, &context).unwrap();
        assert_eq!(first_x(&frame.document), 1.0);
        let frame = history.redo(&frame.document, &context).unwrap();
        assert_eq!(first_x(&frame.document), 2.0);
        assert!(history.redo(&frame.document, &context).is_none());
    }

    #[test]
    fn pending_edits_commit_on_undo() {
        let v0 = TrackDocument::new();
        let context = EditContext::default();
        let mut history = History::new(&v0, &context);

        let live = doc_with_point(5.0);
        history.mark_dirty();

        // No explicit boundary: undo captures the pending state first so
        // redo can come back to it.
        let frame = history.undo(&live, &context).unwrap();
        assert_eq!(frame.document.start_points.len(), 0);
        let frame = history.redo(&frame.document, &context).unwrap();
        assert_eq!(first_x(&frame.document), 5.0);
    }

    #[test]
    fn new_edit_truncates_redo() {
        let v0 = TrackDocument::new();
        let context = EditContext::default();
        let mut history = History::new(&v0, &context);

        let v1 = doc_with_point(1.0);
        history.mark_dirty();
        history.set_undo_point(&v1, &context);

        history.undo(&v1, &context).unwrap();
        assert!(history.can_redo());

        let branch = doc_with_point(9.0);
        history.mark_dirty();
        history.set_undo_point(&branch, &context);
        assert!(!history.can_redo());
        assert!(history.redo(&branch, &context).is_none());

        let frame = history.undo(&branch, &context).unwrap();
        assert_eq!(frame.document.start_points.len(), 0);
    }

    #[test]
    fn clean_tracking_across_undo_and_save() {
        let v0 = TrackDocument::new();
        let context = EditContext::default();
        let mut history = History::new(&v0, &context);
        assert!(!history.is_modified());

        let v1 = doc_with_point(1.0);
        history.mark_dirty();
        assert!(history.is_modified());
        history.set_undo_point(&v1, &context);
        assert!(history.is_modified());

        history.mark_saved(&v1, &context);
        assert!(!history.is_modified());

        history.undo(&v1, &context).unwrap();
        assert!(history.is_modified());
        history.redo(&v0, &context).unwrap();
        assert!(!history.is_modified());

        // Editing away from the saved frame makes the clean point
        // unreachable for good.
        history.undo(&v1, &context).unwrap();
        let branch = doc_with_point(7.0);
        history.mark_dirty();
        history.set_undo_point(&branch, &context);
        assert!(history.is_modified());
        history.undo(&branch, &context).unwrap();
        assert!(history.is_modified());
    }

    #[test]
    fn oldest_frames_evicted_at_cap() {
        let v0 = TrackDocument::new();
        let context = EditContext::default();
        let mut history = History::with_capacity(&v0, &context, 4);

        for i in 0..10 {
            let doc = doc_with_point(i as f32);
            history.mark_dirty();
            history.set_undo_point(&doc, &context);
        }
        assert_eq!(history.frame_count(), 4);
        // Undo bottoms out at the oldest retained frame, not the original.
        let mut last = None;
        let live = doc_with_point(9.0);
        let mut frame = history.undo(&live, &context);
        while let Some(f) = frame {
            last = Some(f.document);
            frame = history.undo(last.as_ref().unwrap(), &context);
        }
        assert_eq!(first_x(last.as_ref().unwrap()), 6.0);
    }

    #[test]
    fn frames_do_not_alias_the_live_document() {
        let v0 = doc_with_point(1.0);
        let context = EditContext::default();
        let mut history = History::new(&v0, &context);

        let mut live = v0.clone();
        let id = live.start_points.at(0).unwrap();
        live.start_points.node_mut(id).unwrap().data.position.x = 42.0;
        history.mark_dirty();

        // The initial frame must still hold the original value.
        let frame = history.undo(&live, &context).unwrap();
        assert_eq!(first_x(&frame.document), 1.0);
    }
}
