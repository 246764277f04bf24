use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use track_core::{Checkpoint, CheckpointKind, EnemyPoint, TrackDocument, Vec2, Vec3};

/// A course near the format's capacity: a 200-point enemy lap with periodic
/// shortcuts, and a matching checkpoint lap.
fn large_track() -> TrackDocument {
    let mut doc = TrackDocument::new();

    let ids: Vec<_> = (0..200)
        .map(|i| {
            doc.enemy_paths
                .try_add(EnemyPoint {
                    position: Vec3::new((i as f32).sin() * 1000.0, 0.0, i as f32 * 50.0),
                    ..EnemyPoint::default()
                })
                .unwrap()
        })
        .collect();
    for pair in ids.windows(2) {
        doc.enemy_paths.try_link(pair[0], pair[1]).unwrap();
    }
    doc.enemy_paths.try_link(ids[199], ids[0]).unwrap();
    for i in (0..180).step_by(40) {
        doc.enemy_paths.try_link(ids[i], ids[i + 15]).unwrap();
    }

    let cks: Vec<_> = (0..100)
        .map(|i| {
            doc.checkpoints
                .try_add(Checkpoint {
                    left: Vec2::new(-100.0, i as f32 * 100.0),
                    right: Vec2::new(100.0, i as f32 * 100.0),
                    respawn_index: 0,
                    kind: if i == 0 {
                        CheckpointKind::LapLine
                    } else {
                        CheckpointKind::Normal
                    },
                })
                .unwrap()
        })
        .collect();
    for pair in cks.windows(2) {
        doc.checkpoints.try_link(pair[0], pair[1]).unwrap();
    }
    doc.checkpoints.try_link(cks[99], cks[0]).unwrap();

    doc.respawn_points
        .try_add(track_core::RespawnPoint::default())
        .unwrap();

    doc
}

fn bench_save(c: &mut Criterion) {
    let doc = large_track();
    c.bench_function("save/300_points", |b| {
        b.iter(|| black_box(doc.save(false).unwrap()))
    });
}

fn bench_load(c: &mut Criterion) {
    let bytes = large_track().save(false).unwrap();
    c.bench_function("load/300_points", |b| {
        b.iter(|| black_box(TrackDocument::load(black_box(&bytes)).unwrap()))
    });
}

fn bench_undo_snapshot(c: &mut Criterion) {
    use track_core::{EditContext, History};
    let doc = large_track();
    let context = EditContext::default();
    c.bench_function("undo_snapshot/300_points", |b| {
        b.iter_batched(
            || History::new(&doc, &context),
            |mut history| {
                history.mark_dirty();
                history.set_undo_point(&doc, &context);
                black_box(history.frame_count());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_save, bench_load, bench_undo_snapshot);
criterion_main!(benches);
