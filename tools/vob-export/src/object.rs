//! Input object model
//!
//! The compiler consumes an already-validated in-memory tree: global
//! vertex/index pools, an animation table, and per-LOD command lists.
//! Everything derives serde so the CLI can load object descriptions from
//! JSON, and the vertex records are Pod so the quantizer can view them as
//! flat f32 data.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Number of f32 lanes in a [`TriVertex`]
pub const TRI_VERTEX_LANES: usize = 8;

/// Number of f32 lanes in a [`LineVertex`]
pub const LINE_VERTEX_LANES: usize = 6;

/// Triangle-pool vertex: position, normal, texture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct TriVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Line-pool vertex: position and RGB color.
///
/// Lines feed scale and bounds derivation only; the player draws triangles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// One keyframe: dataref sample value and the driven vector.
///
/// Rotations use `value[0]` as the angle in degrees; translations use all
/// three components; show/hide use only `key`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub key: f32,
    pub value: [f32; 3],
}

/// One entry in the object's animation table, referenced by index from
/// rotate/translate/show/hide commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimData {
    /// Dataref path driving the animation
    pub dataref: String,
    /// Rotation axis; unused by other animation kinds
    #[serde(default)]
    pub axis: [f32; 3],
    pub keyframes: Vec<Keyframe>,
}

/// Legacy attributes the format refuses to carry.
///
/// The player cannot express these, and silently dropping them would
/// change how the object renders, so each one fails the compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedAttr {
    TwoSided,
    SmokePuff,
    LegacyLight,
    CockpitTexture,
    BlendControl,
    FlatShading,
    MaterialLighting,
    DepthWriteControl,
}

impl UnsupportedAttr {
    pub fn describe(&self) -> &'static str {
        match self {
            UnsupportedAttr::TwoSided => "two-sided geometry",
            UnsupportedAttr::SmokePuff => "smoke puffs",
            UnsupportedAttr::LegacyLight => "legacy RGB lights",
            UnsupportedAttr::CockpitTexture => "cockpit textures",
            UnsupportedAttr::BlendControl => "blend control",
            UnsupportedAttr::FlatShading => "flat shading",
            UnsupportedAttr::MaterialLighting => "material lighting attributes",
            UnsupportedAttr::DepthWriteControl => "depth-write control",
        }
    }
}

/// One command in a LOD's command list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Draw a range of the index buffer
    DrawTris { start: u32, count: u32 },
    /// Set the polygon-offset level; 0 resets
    PolygonOffset { offset: u8 },
    /// Toggle the hard-surface (collision) flag for following draws
    HardSurface { hard: bool },
    AnimBegin,
    AnimEnd,
    /// Keyframed rotation; `anim` indexes [`ObjectModel::animations`]
    Rotate { anim: usize },
    /// Keyframed translation
    Translate { anim: usize },
    Show { anim: usize },
    Hide { anim: usize },
    /// Place a named light from the catalog
    LightNamed { name: String, position: [f32; 3] },
    /// Assign the object to a draw-order layer band
    LayerGroup { name: String, offset: i32 },
    Unsupported(UnsupportedAttr),
}

/// One level of detail: visibility range plus its command list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LodLevel {
    pub near: f32,
    /// Far visibility distance; <= 0 on the last LOD means "derive one"
    pub far: f32,
    pub commands: Vec<Command>,
}

/// A complete source object, ready to compile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectModel {
    /// Day texture path; may be empty
    #[serde(default)]
    pub texture_day: String,
    /// Self-illuminated texture path; empty means none
    #[serde(default)]
    pub texture_lit: String,
    pub tri_vertices: Vec<TriVertex>,
    #[serde(default)]
    pub line_vertices: Vec<LineVertex>,
    pub indices: Vec<u32>,
    #[serde(default)]
    pub animations: Vec<AnimData>,
    pub lods: Vec<LodLevel>,
}
