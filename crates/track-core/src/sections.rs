//! Section-table framing and per-record codecs for every course section.
//!
//! File bytes pass through here in both directions: the header's offset
//! table locates each section, the byte cursor decodes fixed-width records,
//! and the group segmentation codec turns path sections into graphs (and
//! back). Each section decodes independently; sections are identified by
//! their magic tag, so a reordered or partially written table still loads
//! what it can.
//!
//! Failure policy follows the two-tier taxonomy: truncation and bad offsets
//! are structural and abort the load, while a malformed individual record is
//! skipped with a diagnostic and the rest of its section survives.

use std::collections::HashMap;

use crate::cursor::{ByteReader, ByteWriter};
use crate::document::TrackDocument;
use crate::entities::{
    Area, AreaShape, Camera, CameraKind, Checkpoint, CheckpointKind, EnemyPoint, ItemPoint,
    PolePosition, RespawnPoint, RoutePoint, SectionKind, StartPoint, TrackObject, TrackSettings,
    MAX_GROUPS, PATH_LIMITS, POINT_LIMITS, ROUTE_LIMITS, START_LIMITS, UNUSED,
};
use crate::error::{LoadDiagnostic, TrackError};
use crate::graph::{GraphLimits, NodeGraph};
use crate::groups::{decode_groups, encode_groups, GroupRecord};

/// File container magic.
pub const FILE_MAGIC: [u8; 4] = *b"RKTD";
/// Container format version this kernel reads and writes.
pub const FORMAT_VERSION: u32 = 1;

/// Header size: magic + length + section count + header length + version +
/// one `u32` offset per section.
const HEADER_LEN: usize = 4 + 4 + 2 + 2 + 4 + SectionKind::ALL.len() * 4;

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Raw section payloads gathered in a first pass, before graph assembly.
/// Sections may appear in any table order; missing sections stay empty.
#[derive(Default)]
struct RawSections {
    start_points: Vec<StartPoint>,
    enemy_points: Vec<EnemyPoint>,
    enemy_groups: Vec<GroupRecord>,
    item_points: Vec<ItemPoint>,
    item_groups: Vec<GroupRecord>,
    checkpoints: Vec<Checkpoint>,
    checkpoint_groups: Vec<GroupRecord>,
    objects: Vec<TrackObject>,
    routes: Vec<RawRoute>,
    areas: Vec<Area>,
    cameras: Vec<Camera>,
    respawn_points: Vec<RespawnPoint>,
    settings: Option<TrackSettings>,
    opening_camera: u8,
}

struct RawRoute {
    smooth: bool,
    cyclic: bool,
    points: Vec<RoutePoint>,
}

pub(crate) fn decode_file(
    bytes: &[u8],
) -> Result<(TrackDocument, Vec<LoadDiagnostic>), TrackError> {
    let mut reader = ByteReader::new(bytes);
    let magic = reader.read_magic()?;
    if magic != FILE_MAGIC {
        return Err(TrackError::BadMagic { found: magic });
    }
    let _declared_len = reader.read_u32()?;
    let section_count = reader.read_u16()? as usize;
    let header_len = reader.read_u16()? as usize;
    let version = reader.read_u32()?;
    if version > FORMAT_VERSION {
        return Err(TrackError::UnsupportedVersion(version));
    }
    let mut offsets = Vec::with_capacity(section_count);
    for _ in 0..section_count {
        offsets.push(reader.read_u32()? as usize);
    }

    let by_magic: HashMap<[u8; 4], SectionKind> = SectionKind::ALL
        .iter()
        .map(|&kind| (kind.magic(), kind))
        .collect();

    let mut raw = RawSections {
        opening_camera: UNUSED,
        ..RawSections::default()
    };
    let mut diagnostics = Vec::new();

    for (i, &relative) in offsets.iter().enumerate() {
        let offset = header_len + relative;
        if offset >= bytes.len() {
            return Err(TrackError::SectionOffset {
                section: i,
                offset,
                len: bytes.len(),
            });
        }
        reader.seek(offset)?;
        let magic = reader.read_magic()?;
        let count = reader.read_u16()? as usize;
        let aux = reader.read_u16()?;
        let Some(&kind) = by_magic.get(&magic) else {
            log::warn!(
                "skipping unknown section {:?} at table slot {i}",
                magic.map(|b| b as char)
            );
            continue;
        };
        decode_section(&mut reader, kind, count, aux, &mut raw, &mut diagnostics)?;
    }

    let document = assemble(raw, &mut diagnostics);
    Ok((document, diagnostics))
}

fn decode_section(
    reader: &mut ByteReader<'_>,
    kind: SectionKind,
    count: usize,
    aux: u16,
    raw: &mut RawSections,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> Result<(), TrackError> {
    match kind {
        SectionKind::StartPoints => {
            for _ in 0..count {
                let position = reader.read_vec3()?;
                let rotation = reader.read_vec3()?;
                let player_index = reader.read_i16()?;
                reader.skip(2)?;
                raw.start_points.push(StartPoint {
                    position,
                    rotation,
                    player_index,
                });
            }
        }
        SectionKind::EnemyPoints => {
            for _ in 0..count {
                let position = reader.read_vec3()?;
                let size = reader.read_f32()?;
                let setting1 = reader.read_u16()?;
                let setting2 = reader.read_u8()?;
                let setting3 = reader.read_u8()?;
                raw.enemy_points.push(EnemyPoint {
                    position,
                    size,
                    setting1,
                    setting2,
                    setting3,
                });
            }
            cap_points(&mut raw.enemy_points, kind, PATH_LIMITS, diagnostics);
        }
        SectionKind::EnemyGroups => {
            decode_group_section(reader, count, kind, &mut raw.enemy_groups, diagnostics)?;
        }
        SectionKind::ItemPoints => {
            for _ in 0..count {
                let position = reader.read_vec3()?;
                let size = reader.read_f32()?;
                let setting1 = reader.read_u16()?;
                let setting2 = reader.read_u16()?;
                raw.item_points.push(ItemPoint {
                    position,
                    size,
                    setting1,
                    setting2,
                });
            }
            cap_points(&mut raw.item_points, kind, PATH_LIMITS, diagnostics);
        }
        SectionKind::ItemGroups => {
            decode_group_section(reader, count, kind, &mut raw.item_groups, diagnostics)?;
        }
        SectionKind::Checkpoints => {
            for _ in 0..count {
                let left = reader.read_vec2()?;
                let right = reader.read_vec2()?;
                let respawn_index = reader.read_u8()?;
                let kind_raw = reader.read_u8()?;
                // Within-group neighbour bytes are derivable; recomputed at save.
                reader.skip(2)?;
                raw.checkpoints.push(Checkpoint {
                    left,
                    right,
                    respawn_index,
                    kind: CheckpointKind::from_raw(kind_raw),
                });
            }
            cap_points(&mut raw.checkpoints, kind, PATH_LIMITS, diagnostics);
        }
        SectionKind::CheckpointGroups => {
            decode_group_section(reader, count, kind, &mut raw.checkpoint_groups, diagnostics)?;
        }
        SectionKind::Objects => {
            for _ in 0..count {
                let object_id = reader.read_u16()?;
                reader.skip(2)?;
                let position = reader.read_vec3()?;
                let rotation = reader.read_vec3()?;
                let scale = reader.read_vec3()?;
                let route_index = reader.read_u16()?;
                let mut settings = [0u16; 8];
                for slot in &mut settings {
                    *slot = reader.read_u16()?;
                }
                let presence_flags = reader.read_u16()?;
                raw.objects.push(TrackObject {
                    object_id,
                    position,
                    rotation,
                    scale,
                    route_index,
                    settings,
                    presence_flags,
                });
            }
        }
        SectionKind::Routes => {
            for _ in 0..count {
                let point_count = reader.read_u16()? as usize;
                let smooth = reader.read_u8()? != 0;
                let cyclic = reader.read_u8()? != 0;
                let mut points = Vec::with_capacity(point_count);
                for _ in 0..point_count {
                    let position = reader.read_vec3()?;
                    let setting1 = reader.read_u16()?;
                    let setting2 = reader.read_u16()?;
                    points.push(RoutePoint {
                        position,
                        setting1,
                        setting2,
                        smooth,
                    });
                }
                raw.routes.push(RawRoute {
                    smooth,
                    cyclic,
                    points,
                });
            }
        }
        SectionKind::Areas => {
            for _ in 0..count {
                let shape = AreaShape::from_raw(reader.read_u8()?);
                let area_kind = reader.read_u8()?;
                let camera_index = reader.read_u8()?;
                let priority = reader.read_u8()?;
                let position = reader.read_vec3()?;
                let rotation = reader.read_vec3()?;
                let scale = reader.read_vec3()?;
                let setting1 = reader.read_u16()?;
                let setting2 = reader.read_u16()?;
                let route_index = reader.read_u8()?;
                let enemy_point_index = reader.read_u8()?;
                reader.skip(2)?;
                raw.areas.push(Area {
                    shape,
                    kind: area_kind,
                    camera_index,
                    priority,
                    position,
                    rotation,
                    scale,
                    setting1,
                    setting2,
                    route_index,
                    enemy_point_index,
                });
            }
        }
        SectionKind::Cameras => {
            raw.opening_camera = if aux > 0xff { UNUSED } else { aux as u8 };
            for _ in 0..count {
                let camera_kind = CameraKind::from_raw(reader.read_u8()?);
                let next_camera = reader.read_u8()?;
                let shake = reader.read_u8()?;
                let route_index = reader.read_u8()?;
                let point_speed = reader.read_u16()?;
                let zoom_speed = reader.read_u16()?;
                let view_speed = reader.read_u16()?;
                let start_flag = reader.read_u8()?;
                let movie_flag = reader.read_u8()?;
                let position = reader.read_vec3()?;
                let rotation = reader.read_vec3()?;
                let zoom_start = reader.read_f32()?;
                let zoom_end = reader.read_f32()?;
                let view_start = reader.read_vec3()?;
                let view_end = reader.read_vec3()?;
                let time = reader.read_f32()?;
                raw.cameras.push(Camera {
                    kind: camera_kind,
                    next_camera,
                    shake,
                    route_index,
                    point_speed,
                    zoom_speed,
                    view_speed,
                    start_flag,
                    movie_flag,
                    position,
                    rotation,
                    zoom_start,
                    zoom_end,
                    view_start,
                    view_end,
                    time,
                });
            }
        }
        SectionKind::RespawnPoints => {
            for _ in 0..count {
                let position = reader.read_vec3()?;
                let rotation = reader.read_vec3()?;
                // The stored id is the record's own index; recomputed at save.
                reader.skip(2)?;
                let range = reader.read_i16()?;
                raw.respawn_points.push(RespawnPoint {
                    position,
                    rotation,
                    range,
                });
            }
        }
        SectionKind::StageInfo => {
            for i in 0..count {
                let lap_count = reader.read_u8()?;
                let pole_position = PolePosition::from_raw(reader.read_u8()?);
                let narrow_start = reader.read_u8()? != 0;
                let battle = reader.read_u8()? != 0;
                let flare_flash = reader.read_u8()? != 0;
                reader.skip(1)?;
                let flare_color = reader.read_u32()?;
                let speed_modifier = reader.read_f32()?;
                if i == 0 {
                    raw.settings = Some(TrackSettings {
                        lap_count,
                        pole_position,
                        narrow_start,
                        battle,
                        flare_flash,
                        flare_color,
                        speed_modifier,
                        opening_camera: UNUSED,
                    });
                } else {
                    diagnostics.push(LoadDiagnostic {
                        section: kind,
                        record: i,
                        message: "extra stage-info record ignored".to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn decode_group_section(
    reader: &mut ByteReader<'_>,
    count: usize,
    kind: SectionKind,
    out: &mut Vec<GroupRecord>,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> Result<(), TrackError> {
    for i in 0..count {
        let start = reader.read_u8()?;
        let len = reader.read_u8()?;
        let mut record = GroupRecord::new(start, len);
        for slot in &mut record.prev {
            *slot = reader.read_u8()?;
        }
        for slot in &mut record.next {
            *slot = reader.read_u8()?;
        }
        reader.skip(2)?;
        if out.len() < MAX_GROUPS {
            out.push(record);
        } else {
            diagnostics.push(LoadDiagnostic {
                section: kind,
                record: i,
                message: format!("group dropped, section stores at most {MAX_GROUPS}"),
            });
        }
    }
    Ok(())
}

/// Drop points past the category capacity, keeping file order.
fn cap_points<T>(
    points: &mut Vec<T>,
    kind: SectionKind,
    limits: GraphLimits,
    diagnostics: &mut Vec<LoadDiagnostic>,
) {
    if points.len() > limits.max_nodes {
        for record in limits.max_nodes..points.len() {
            diagnostics.push(LoadDiagnostic {
                section: kind,
                record,
                message: format!("point dropped, category holds at most {}", limits.max_nodes),
            });
        }
        points.truncate(limits.max_nodes);
    }
}

fn assemble(raw: RawSections, diagnostics: &mut Vec<LoadDiagnostic>) -> TrackDocument {
    let mut document = TrackDocument::new();

    document.start_points = fill_graph(
        SectionKind::StartPoints,
        raw.start_points,
        START_LIMITS,
        diagnostics,
    );
    document.respawn_points = fill_graph(
        SectionKind::RespawnPoints,
        raw.respawn_points,
        POINT_LIMITS,
        diagnostics,
    );
    document.objects = fill_graph(SectionKind::Objects, raw.objects, POINT_LIMITS, diagnostics);
    document.areas = fill_graph(SectionKind::Areas, raw.areas, POINT_LIMITS, diagnostics);
    document.cameras = fill_graph(SectionKind::Cameras, raw.cameras, POINT_LIMITS, diagnostics);

    document.enemy_paths = decode_path(
        SectionKind::EnemyGroups,
        &raw.enemy_groups,
        raw.enemy_points,
        diagnostics,
    );
    document.item_paths = decode_path(
        SectionKind::ItemGroups,
        &raw.item_groups,
        raw.item_points,
        diagnostics,
    );
    document.checkpoints = decode_path(
        SectionKind::CheckpointGroups,
        &raw.checkpoint_groups,
        raw.checkpoints,
        diagnostics,
    );

    document.routes = assemble_routes(raw.routes, diagnostics);

    document.settings = raw.settings.unwrap_or_default();
    document.settings.opening_camera = raw.opening_camera;
    document
}

fn fill_graph<T>(
    kind: SectionKind,
    records: Vec<T>,
    limits: GraphLimits,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> NodeGraph<T> {
    let mut graph = NodeGraph::new(limits);
    for (i, record) in records.into_iter().enumerate() {
        if let Err(err) = graph.try_add(record) {
            diagnostics.push(LoadDiagnostic {
                section: kind,
                record: i,
                message: format!("record dropped: {err}"),
            });
        }
    }
    graph
}

fn decode_path<T>(
    group_kind: SectionKind,
    records: &[GroupRecord],
    points: Vec<T>,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> NodeGraph<T> {
    let (graph, issues) = decode_groups(records, points, PATH_LIMITS);
    for (record, message) in issues {
        diagnostics.push(LoadDiagnostic {
            section: group_kind,
            record,
            message,
        });
    }
    graph
}

fn assemble_routes(
    routes: Vec<RawRoute>,
    diagnostics: &mut Vec<LoadDiagnostic>,
) -> NodeGraph<RoutePoint> {
    let mut graph = NodeGraph::new(ROUTE_LIMITS);
    for (i, route) in routes.into_iter().enumerate() {
        let mut ids = Vec::with_capacity(route.points.len());
        let mut dropped = false;
        for mut point in route.points {
            point.smooth = route.smooth;
            match graph.try_add(point) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    if !dropped {
                        diagnostics.push(LoadDiagnostic {
                            section: SectionKind::Routes,
                            record: i,
                            message: format!("route truncated: {err}"),
                        });
                        dropped = true;
                    }
                }
            }
        }
        for w in ids.windows(2) {
            graph
                .try_link(w[0], w[1])
                .expect("fresh chain satisfies 1/1 bounds");
        }
        if route.cyclic && !dropped {
            if let (Some(&first), Some(&last)) = (ids.first(), ids.last()) {
                graph
                    .try_link(last, first)
                    .expect("closing a fresh chain satisfies 1/1 bounds");
            }
        }
    }
    graph
}

/// Number of routes the graph will serialize to (its maximal 1/1 chains).
pub(crate) fn route_count(graph: &NodeGraph<RoutePoint>) -> usize {
    encode_groups(graph).groups.len()
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

pub(crate) fn encode_file(document: &TrackDocument, battle: bool) -> Result<Vec<u8>, TrackError> {
    let mut body = ByteWriter::new();
    let mut offsets = Vec::with_capacity(SectionKind::ALL.len());

    let enemy = encode_groups(&document.enemy_paths);
    let item = encode_groups(&document.item_paths);
    let checkpoint = encode_groups(&document.checkpoints);
    let routes = encode_groups(&document.routes);
    for (kind, layout) in [
        (SectionKind::EnemyGroups, &enemy),
        (SectionKind::ItemGroups, &item),
        (SectionKind::CheckpointGroups, &checkpoint),
    ] {
        if layout.groups.len() > MAX_GROUPS {
            return Err(TrackError::SectionOverflow {
                section: kind,
                count: layout.groups.len(),
                limit: MAX_GROUPS,
            });
        }
    }

    for kind in SectionKind::ALL {
        offsets.push(body.len() as u32);
        match kind {
            SectionKind::StartPoints => {
                section_header(&mut body, kind, document.start_points.len(), 0);
                for (_, node) in document.start_points.iter() {
                    let p = &node.data;
                    body.put_vec3(p.position);
                    body.put_vec3(p.rotation);
                    body.put_i16(p.player_index);
                    body.put_u16(0);
                }
            }
            SectionKind::EnemyPoints => {
                section_header(&mut body, kind, enemy.order.len(), 0);
                for &id in &enemy.order {
                    let p = &document.enemy_paths.node(id).expect("layout id").data;
                    body.put_vec3(p.position);
                    body.put_f32(p.size);
                    body.put_u16(p.setting1);
                    body.put_u8(p.setting2);
                    body.put_u8(p.setting3);
                }
            }
            SectionKind::EnemyGroups => encode_group_section(&mut body, kind, &enemy.groups),
            SectionKind::ItemPoints => {
                section_header(&mut body, kind, item.order.len(), 0);
                for &id in &item.order {
                    let p = &document.item_paths.node(id).expect("layout id").data;
                    body.put_vec3(p.position);
                    body.put_f32(p.size);
                    body.put_u16(p.setting1);
                    body.put_u16(p.setting2);
                }
            }
            SectionKind::ItemGroups => encode_group_section(&mut body, kind, &item.groups),
            SectionKind::Checkpoints => {
                section_header(&mut body, kind, checkpoint.order.len(), 0);
                let neighbours = run_neighbours(&checkpoint.groups, checkpoint.order.len());
                for (flat, &id) in checkpoint.order.iter().enumerate() {
                    let p = &document.checkpoints.node(id).expect("layout id").data;
                    body.put_vec2(p.left);
                    body.put_vec2(p.right);
                    body.put_u8(p.respawn_index);
                    body.put_u8(p.kind.to_raw());
                    body.put_u8(neighbours[flat].0);
                    body.put_u8(neighbours[flat].1);
                }
            }
            SectionKind::CheckpointGroups => {
                encode_group_section(&mut body, kind, &checkpoint.groups)
            }
            SectionKind::Objects => {
                section_header(&mut body, kind, document.objects.len(), 0);
                for (_, node) in document.objects.iter() {
                    let o = &node.data;
                    body.put_u16(o.object_id);
                    body.put_u16(0);
                    body.put_vec3(o.position);
                    body.put_vec3(o.rotation);
                    body.put_vec3(o.scale);
                    body.put_u16(o.route_index);
                    for setting in o.settings {
                        body.put_u16(setting);
                    }
                    body.put_u16(o.presence_flags);
                }
            }
            SectionKind::Routes => {
                section_header(&mut body, kind, routes.groups.len(), routes.order.len() as u16);
                for record in &routes.groups {
                    let start = record.start as usize;
                    let run = &routes.order[start..start + record.len as usize];
                    let first = &document.routes.node(run[0]).expect("layout id").data;
                    let cyclic = record.next_entries().next().is_some();
                    body.put_u16(record.len as u16);
                    body.put_u8(first.smooth as u8);
                    body.put_u8(cyclic as u8);
                    for &id in run {
                        let p = &document.routes.node(id).expect("layout id").data;
                        body.put_vec3(p.position);
                        body.put_u16(p.setting1);
                        body.put_u16(p.setting2);
                    }
                }
            }
            SectionKind::Areas => {
                section_header(&mut body, kind, document.areas.len(), 0);
                for (_, node) in document.areas.iter() {
                    let a = &node.data;
                    body.put_u8(a.shape.to_raw());
                    body.put_u8(a.kind);
                    body.put_u8(a.camera_index);
                    body.put_u8(a.priority);
                    body.put_vec3(a.position);
                    body.put_vec3(a.rotation);
                    body.put_vec3(a.scale);
                    body.put_u16(a.setting1);
                    body.put_u16(a.setting2);
                    body.put_u8(a.route_index);
                    body.put_u8(a.enemy_point_index);
                    body.put_u16(0);
                }
            }
            SectionKind::Cameras => {
                let aux = if document.settings.opening_camera == UNUSED {
                    0xffff
                } else {
                    document.settings.opening_camera as u16
                };
                section_header(&mut body, kind, document.cameras.len(), aux);
                for (_, node) in document.cameras.iter() {
                    let c = &node.data;
                    body.put_u8(c.kind.to_raw());
                    body.put_u8(c.next_camera);
                    body.put_u8(c.shake);
                    body.put_u8(c.route_index);
                    body.put_u16(c.point_speed);
                    body.put_u16(c.zoom_speed);
                    body.put_u16(c.view_speed);
                    body.put_u8(c.start_flag);
                    body.put_u8(c.movie_flag);
                    body.put_vec3(c.position);
                    body.put_vec3(c.rotation);
                    body.put_f32(c.zoom_start);
                    body.put_f32(c.zoom_end);
                    body.put_vec3(c.view_start);
                    body.put_vec3(c.view_end);
                    body.put_f32(c.time);
                }
            }
            SectionKind::RespawnPoints => {
                section_header(&mut body, kind, document.respawn_points.len(), 0);
                for (i, (_, node)) in document.respawn_points.iter().enumerate() {
                    let r = &node.data;
                    body.put_vec3(r.position);
                    body.put_vec3(r.rotation);
                    body.put_u16(i as u16);
                    body.put_i16(r.range);
                }
            }
            SectionKind::StageInfo => {
                section_header(&mut body, kind, 1, 0);
                let s = &document.settings;
                body.put_u8(s.lap_count);
                body.put_u8(s.pole_position.to_raw());
                body.put_u8(s.narrow_start as u8);
                body.put_u8(battle as u8);
                body.put_u8(s.flare_flash as u8);
                body.put_u8(0);
                body.put_u32(s.flare_color);
                body.put_f32(s.speed_modifier);
            }
        }
    }

    let mut file = ByteWriter::new();
    file.put_magic(FILE_MAGIC);
    file.put_u32(0); // patched below
    file.put_u16(SectionKind::ALL.len() as u16);
    file.put_u16(HEADER_LEN as u16);
    file.put_u32(FORMAT_VERSION);
    for offset in offsets {
        file.put_u32(offset);
    }
    debug_assert_eq!(file.len(), HEADER_LEN);
    let body = body.into_bytes();
    file.put_slice(&body);
    file.patch_u32(4, (HEADER_LEN + body.len()) as u32);
    Ok(file.into_bytes())
}

fn section_header(body: &mut ByteWriter, kind: SectionKind, count: usize, aux: u16) {
    body.put_magic(kind.magic());
    body.put_u16(count as u16);
    body.put_u16(aux);
}

fn encode_group_section(body: &mut ByteWriter, kind: SectionKind, groups: &[GroupRecord]) {
    section_header(body, kind, groups.len(), 0);
    for record in groups {
        body.put_u8(record.start);
        body.put_u8(record.len);
        for slot in record.prev {
            body.put_u8(slot);
        }
        for slot in record.next {
            body.put_u8(slot);
        }
        body.put_u16(0);
    }
}

/// Within-group neighbour bytes for every flat checkpoint index: the file
/// stores each point's previous/next point inside its own run, with `0xff`
/// at the run edges.
fn run_neighbours(groups: &[GroupRecord], point_count: usize) -> Vec<(u8, u8)> {
    let mut neighbours = vec![(UNUSED, UNUSED); point_count];
    for record in groups {
        let start = record.start as usize;
        let len = record.len as usize;
        for i in start..start + len {
            let prev = if i == start { UNUSED } else { (i - 1) as u8 };
            let next = if i + 1 == start + len {
                UNUSED
            } else {
                (i + 1) as u8
            };
            neighbours[i] = (prev, next);
        }
    }
    neighbours
}
