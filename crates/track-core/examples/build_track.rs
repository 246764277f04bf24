//! Track building example
//!
//! Builds a minimal playable oval from scratch, saves it, reloads it, and
//! walks through an undo/redo cycle.

use track_core::{
    Checkpoint, CheckpointKind, EditContext, EnemyPoint, History, RespawnPoint, StartPoint,
    TrackDocument, Vec2, Vec3,
};

fn main() {
    let mut doc = TrackDocument::new();
    let context = EditContext::default();
    let mut history = History::new(&doc, &context);

    println!("1. Placing the start and a respawn point");
    doc.start_points
        .try_add(StartPoint {
            position: Vec3::new(0.0, 0.0, -500.0),
            player_index: -1,
            ..StartPoint::default()
        })
        .unwrap();
    doc.respawn_points
        .try_add(RespawnPoint::default())
        .unwrap();
    history.mark_dirty();
    history.set_undo_point(&doc, &context);

    println!("2. Laying an eight-point enemy lap");
    let ids: Vec<_> = (0..8)
        .map(|i| {
            let angle = i as f32 / 8.0 * std::f32::consts::TAU;
            doc.enemy_paths
                .try_add(EnemyPoint {
                    position: Vec3::new(angle.cos() * 1000.0, 0.0, angle.sin() * 1500.0),
                    ..EnemyPoint::default()
                })
                .unwrap()
        })
        .collect();
    for pair in ids.windows(2) {
        doc.enemy_paths.try_link(pair[0], pair[1]).unwrap();
    }
    doc.enemy_paths.try_link(ids[7], ids[0]).unwrap();
    history.mark_dirty();
    history.set_undo_point(&doc, &context);

    println!("3. Adding the lap line");
    doc.checkpoints
        .try_add(Checkpoint {
            left: Vec2::new(-200.0, -500.0),
            right: Vec2::new(200.0, -500.0),
            respawn_index: 0,
            kind: CheckpointKind::LapLine,
        })
        .unwrap();
    history.mark_dirty();
    history.set_undo_point(&doc, &context);

    let bytes = doc.save(false).unwrap();
    println!("4. Saved {} bytes ({} nodes)", bytes.len(), doc.node_count());

    let outcome = TrackDocument::load(&bytes).unwrap();
    println!(
        "5. Reloaded {} nodes, {} diagnostic(s)",
        outcome.document.node_count(),
        outcome.diagnostics.len()
    );

    let frame = history.undo(&doc, &context).unwrap();
    println!(
        "6. Undo removed the lap line: {} checkpoint(s) left",
        frame.document.checkpoints.len()
    );
    let frame = history.redo(&frame.document, &context).unwrap();
    println!(
        "7. Redo restored it: {} checkpoint(s)",
        frame.document.checkpoints.len()
    );
}
