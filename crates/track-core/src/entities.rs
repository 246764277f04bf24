//! Per-category entity payloads and their capacity bounds.
//!
//! Each of the eight course categories wraps a [`NodeGraph`] with a payload
//! struct from this module. Path categories (enemy paths, item paths,
//! checkpoints) carry the 6/6 degree bounds that the serialized prev/next
//! group arrays can express; point categories allow a single implicit "next"
//! used only for duplication chains in the editor, never serialized; route
//! points form 1/1 chains where every maximal chain is one motion route.
//!
//! Payloads implement `Default` (new-node initialization) and `Clone`
//! (duplication and undo snapshots). Copying points between categories is an
//! explicit typed conversion ([`EnemyPoint::from_item`] and
//! [`ItemPoint::from_enemy`]), not a runtime-swapped factory hook.

use crate::graph::GraphLimits;
use crate::math::{Vec2, Vec3};

/// Degree/capacity bounds for the group-encoded path categories.
///
/// `max_nodes` of 255 keeps every flat-array index expressible in the
/// format's `u8` group fields; 6/6 matches the fixed prev/next arrays.
pub const PATH_LIMITS: GraphLimits = GraphLimits {
    max_nodes: 255,
    max_next: 6,
    max_prev: 6,
};

/// Bounds for flat point categories (respawns, objects, areas, cameras).
pub const POINT_LIMITS: GraphLimits = GraphLimits {
    max_nodes: 255,
    max_next: 1,
    max_prev: 1,
};

/// Bounds for start points; the format seats at most twelve players.
pub const START_LIMITS: GraphLimits = GraphLimits {
    max_nodes: 12,
    max_next: 1,
    max_prev: 1,
};

/// Bounds for route points (1/1 chains, one chain per motion route).
pub const ROUTE_LIMITS: GraphLimits = GraphLimits {
    max_nodes: 255,
    max_next: 1,
    max_prev: 1,
};

/// Maximum group records per path section: `u8` group indices with `0xff`
/// reserved as the unused-slot sentinel.
pub const MAX_GROUPS: usize = 255;

/// Sentinel for an unused `u8` slot or reference field.
pub const UNUSED: u8 = 0xff;

/// The course-file sections, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Player spawn points (`KTPT`).
    StartPoints,
    /// Enemy-path points (`ENPT`).
    EnemyPoints,
    /// Enemy-path groups (`ENPH`).
    EnemyGroups,
    /// Item-path points (`ITPT`).
    ItemPoints,
    /// Item-path groups (`ITPH`).
    ItemGroups,
    /// Checkpoints (`CKPT`).
    Checkpoints,
    /// Checkpoint groups (`CKPH`).
    CheckpointGroups,
    /// Decorative and functional objects (`GOBJ`).
    Objects,
    /// Motion routes (`POTI`).
    Routes,
    /// Interactive areas (`AREA`).
    Areas,
    /// Cameras (`CAME`).
    Cameras,
    /// Respawn points (`JGPT`).
    RespawnPoints,
    /// Global stage settings (`STGI`).
    StageInfo,
}

impl SectionKind {
    /// All sections in file order.
    pub const ALL: [SectionKind; 13] = [
        SectionKind::StartPoints,
        SectionKind::EnemyPoints,
        SectionKind::EnemyGroups,
        SectionKind::ItemPoints,
        SectionKind::ItemGroups,
        SectionKind::Checkpoints,
        SectionKind::CheckpointGroups,
        SectionKind::Objects,
        SectionKind::Routes,
        SectionKind::Areas,
        SectionKind::Cameras,
        SectionKind::RespawnPoints,
        SectionKind::StageInfo,
    ];

    /// The section's 4-byte magic tag.
    pub fn magic(self) -> [u8; 4] {
        match self {
            SectionKind::StartPoints => *b"KTPT",
            SectionKind::EnemyPoints => *b"ENPT",
            SectionKind::EnemyGroups => *b"ENPH",
            SectionKind::ItemPoints => *b"ITPT",
            SectionKind::ItemGroups => *b"ITPH",
            SectionKind::Checkpoints => *b"CKPT",
            SectionKind::CheckpointGroups => *b"CKPH",
            SectionKind::Objects => *b"GOBJ",
            SectionKind::Routes => *b"POTI",
            SectionKind::Areas => *b"AREA",
            SectionKind::Cameras => *b"CAME",
            SectionKind::RespawnPoints => *b"JGPT",
            SectionKind::StageInfo => *b"STGI",
        }
    }
}

/// A player spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StartPoint {
    /// World position.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
    /// Seat index, or -1 for "all players" on single-spawn tracks.
    pub player_index: i16,
}

/// One point on an AI driving path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyPoint {
    /// World position.
    pub position: Vec3,
    /// Half-width of the drivable corridor around the point.
    pub size: f32,
    /// Primary behaviour setting (item/drift hints).
    pub setting1: u16,
    /// Secondary behaviour setting.
    pub setting2: u8,
    /// Tertiary behaviour setting.
    pub setting3: u8,
}

impl Default for EnemyPoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            size: 10.0,
            setting1: 0,
            setting2: 0,
            setting3: 0,
        }
    }
}

impl EnemyPoint {
    /// Typed replacement for the repurposed-factory trick the original used
    /// when copying an item path into the enemy-path category: geometry is
    /// kept, behaviour settings reset to category defaults.
    pub fn from_item(item: &ItemPoint) -> Self {
        Self {
            position: item.position,
            size: item.size,
            ..Self::default()
        }
    }
}

/// One point on an item (shell/projectile) path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPoint {
    /// World position.
    pub position: Vec3,
    /// Half-width of the corridor around the point.
    pub size: f32,
    /// Primary behaviour setting.
    pub setting1: u16,
    /// Secondary behaviour setting.
    pub setting2: u16,
}

impl Default for ItemPoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            size: 10.0,
            setting1: 0,
            setting2: 0,
        }
    }
}

impl ItemPoint {
    /// Typed conversion from an enemy-path point; see [`EnemyPoint::from_item`].
    pub fn from_enemy(enemy: &EnemyPoint) -> Self {
        Self {
            position: enemy.position,
            size: enemy.size,
            ..Self::default()
        }
    }
}

/// Classification of a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckpointKind {
    /// Ordinary progress checkpoint.
    #[default]
    Normal,
    /// The start/finish line.
    LapLine,
    /// A mandatory key checkpoint with its ordering number (1..=254).
    Key(u8),
}

impl CheckpointKind {
    /// Decode from the record's kind byte (`0xff` normal, `0` lap line,
    /// anything else a key checkpoint number).
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            UNUSED => CheckpointKind::Normal,
            0 => CheckpointKind::LapLine,
            n => CheckpointKind::Key(n),
        }
    }

    /// Encode to the record's kind byte.
    pub fn to_raw(self) -> u8 {
        match self {
            CheckpointKind::Normal => UNUSED,
            CheckpointKind::LapLine => 0,
            CheckpointKind::Key(n) => n,
        }
    }
}

/// A checkpoint: a gate spanned by two ground-plane posts.
///
/// The only two-point-per-node category. `respawn_index` is a raw
/// cross-reference into the respawn-point array; it is copied verbatim by
/// the codec and not rewritten when that array changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Checkpoint {
    /// Left gate post (x/z, the gate is vertical).
    pub left: Vec2,
    /// Right gate post.
    pub right: Vec2,
    /// Index of the respawn point used when a racer is recovered here.
    pub respawn_index: u8,
    /// Checkpoint classification.
    pub kind: CheckpointKind,
}

impl Checkpoint {
    /// Midpoint of the gate, used for picking and distance checks.
    pub fn center(&self) -> Vec2 {
        self.left.midpoint(self.right)
    }
}

/// A racer recovery point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnPoint {
    /// World position.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
    /// Activation range tuning; -1 leaves the engine default.
    pub range: i16,
}

impl Default for RespawnPoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            range: -1,
        }
    }
}

/// A decorative or functional track object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackObject {
    /// Engine object identifier.
    pub object_id: u16,
    /// World position.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Route cross-reference, or `0xffff` for stationary objects.
    pub route_index: u16,
    /// The object's eight type-specific settings, stored opaquely.
    pub settings: [u16; 8],
    /// Game-mode presence bitmask.
    pub presence_flags: u16,
}

impl Default for TrackObject {
    fn default() -> Self {
        Self {
            object_id: 0,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            route_index: 0xffff,
            settings: [0; 8],
            presence_flags: 0x07,
        }
    }
}

/// One point of a motion route.
///
/// `smooth` is route-level data in the file (one byte per route record); in
/// the graph model it lives on every point of the chain. Encoding takes the
/// chain's first point, decoding stamps the route value on all its points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoutePoint {
    /// World position.
    pub position: Vec3,
    /// Usually the dwell time or speed at this point.
    pub setting1: u16,
    /// Secondary per-point setting.
    pub setting2: u16,
    /// Whether the owning route interpolates smoothly through its points.
    pub smooth: bool,
}

/// Geometric shape of an area trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AreaShape {
    /// Axis-scaled box.
    #[default]
    Box,
    /// Vertical cylinder.
    Cylinder,
}

impl AreaShape {
    /// Decode from the record's shape byte; unknown values fall back to box.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => AreaShape::Cylinder,
            _ => AreaShape::Box,
        }
    }

    /// Encode to the record's shape byte.
    pub fn to_raw(self) -> u8 {
        match self {
            AreaShape::Box => 0,
            AreaShape::Cylinder => 1,
        }
    }
}

/// An interactive area trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    /// Trigger shape.
    pub shape: AreaShape,
    /// Area type (camera trigger, env effect, moving-road, etc.), opaque.
    pub kind: u8,
    /// Camera cross-reference for camera-trigger areas, else `0xff`.
    pub camera_index: u8,
    /// Evaluation priority among overlapping areas.
    pub priority: u8,
    /// World position.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
    /// Per-axis scale of the trigger volume.
    pub scale: Vec3,
    /// First type-specific setting.
    pub setting1: u16,
    /// Second type-specific setting.
    pub setting2: u16,
    /// Route cross-reference for moving-road areas, else `0xff`.
    pub route_index: u8,
    /// Enemy-point cross-reference for force-recalculation areas, else `0xff`.
    pub enemy_point_index: u8,
}

impl Default for Area {
    fn default() -> Self {
        Self {
            shape: AreaShape::Box,
            kind: 0,
            camera_index: UNUSED,
            priority: 0,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            setting1: 0,
            setting2: 0,
            route_index: UNUSED,
            enemy_point_index: UNUSED,
        }
    }
}

/// Behaviour class of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    /// Post-goal camera.
    Goal,
    /// Fixed position, searches for the kart.
    FixSearch,
    /// Follows its route, searches for the kart.
    PathSearch,
    /// Follows the kart from a relative offset.
    KartFollow,
    /// Follows its route while tracking the kart.
    KartPathFollow,
    /// Opening-sequence camera moving between its view points.
    OpeningFixMove,
    /// Opening-sequence camera moving along its route.
    OpeningPathMove,
    /// Any raw type this kernel has no name for; preserved losslessly.
    Other(u8),
}

impl CameraKind {
    /// Decode from the record's kind byte.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => CameraKind::Goal,
            1 => CameraKind::FixSearch,
            2 => CameraKind::PathSearch,
            3 => CameraKind::KartFollow,
            4 => CameraKind::KartPathFollow,
            5 => CameraKind::OpeningFixMove,
            6 => CameraKind::OpeningPathMove,
            n => CameraKind::Other(n),
        }
    }

    /// Encode to the record's kind byte.
    pub fn to_raw(self) -> u8 {
        match self {
            CameraKind::Goal => 0,
            CameraKind::FixSearch => 1,
            CameraKind::PathSearch => 2,
            CameraKind::KartFollow => 3,
            CameraKind::KartPathFollow => 4,
            CameraKind::OpeningFixMove => 5,
            CameraKind::OpeningPathMove => 6,
            CameraKind::Other(n) => n,
        }
    }
}

/// A replay or opening camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Behaviour class.
    pub kind: CameraKind,
    /// Cross-reference to the camera played after this one, or `0xff`.
    pub next_camera: u8,
    /// Camera-shake intensity.
    pub shake: u8,
    /// Route cross-reference for path cameras, else `0xff`.
    pub route_index: u8,
    /// Speed along the route, in distance units per hundredth of a second.
    pub point_speed: u16,
    /// Zoom interpolation speed.
    pub zoom_speed: u16,
    /// View-target interpolation speed.
    pub view_speed: u16,
    /// Whether this camera starts an opening sequence.
    pub start_flag: u8,
    /// Whether this camera belongs to the intro movie.
    pub movie_flag: u8,
    /// World position.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
    /// Field-of-view at the start of the shot, in degrees.
    pub zoom_start: f32,
    /// Field-of-view at the end of the shot.
    pub zoom_end: f32,
    /// View target at the start of the shot.
    pub view_start: Vec3,
    /// View target at the end of the shot.
    pub view_end: Vec3,
    /// Shot duration in sixtieths of a second.
    pub time: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            kind: CameraKind::Goal,
            next_camera: UNUSED,
            shake: 0,
            route_index: UNUSED,
            point_speed: 0,
            zoom_speed: 0,
            view_speed: 0,
            start_flag: 0,
            movie_flag: 0,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            zoom_start: 0.0,
            zoom_end: 0.0,
            view_start: Vec3::ZERO,
            view_end: Vec3::ZERO,
            time: 0.0,
        }
    }
}

/// Starting-grid side of the pole position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolePosition {
    /// Pole on the left of the grid.
    #[default]
    Left,
    /// Pole on the right.
    Right,
}

impl PolePosition {
    /// Decode from the stage-info byte; anything non-zero means right.
    pub fn from_raw(raw: u8) -> Self {
        if raw == 0 {
            PolePosition::Left
        } else {
            PolePosition::Right
        }
    }

    /// Encode to the stage-info byte.
    pub fn to_raw(self) -> u8 {
        match self {
            PolePosition::Left => 0,
            PolePosition::Right => 1,
        }
    }
}

/// Global track settings from the stage-info section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSettings {
    /// Number of laps to finish the race.
    pub lap_count: u8,
    /// Which side of the grid holds first place.
    pub pole_position: PolePosition,
    /// Whether the start zone packs racers into a narrow column.
    pub narrow_start: bool,
    /// Whether this course is a battle arena rather than a race track.
    pub battle: bool,
    /// Whether the sun produces a lens-flare flash.
    pub flare_flash: bool,
    /// Lens-flare colour (RGBA).
    pub flare_color: u32,
    /// Engine speed multiplier; 0 leaves the engine default.
    pub speed_modifier: f32,
    /// Raw index of the camera that opens the replay, or `0xff`.
    pub opening_camera: u8,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            lap_count: 3,
            pole_position: PolePosition::Left,
            narrow_start: false,
            battle: false,
            flare_flash: true,
            flare_color: 0xffff_ff00,
            speed_modifier: 0.0,
            opening_camera: UNUSED,
        }
    }
}
