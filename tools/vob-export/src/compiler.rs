//! Command stream compiler
//!
//! The central state machine. Every LOD's command list is walked exactly
//! twice - an opaque/animation pass, then a light pass - because triangle
//! batches and 4-byte-aligned bulk light runs must not interleave in the
//! stream. LOD headers carry a 16-bit skip field that is back-patched as
//! soon as the next header (or the terminator) lands, so the player can
//! hop header-to-header without decoding bodies.

use std::path::Path;

use bytemuck::cast_slice;
use glam::Vec3;

use crate::bounds::{bounding_sphere, grow_sphere, Sphere};
use crate::error::CompileError;
use crate::layers::{layer_group_index, DEFAULT_LAYER_GROUP};
use crate::lights::light_info;
use crate::object::{
    AnimData, Command, LodLevel, ObjectModel, LINE_VERTEX_LANES, TRI_VERTEX_LANES,
};
use crate::quantize::{derive_scales, pack_vertices, QuantScales};
use crate::strings::StringTable;
use vob_common::format::{
    EmbedProps, CMD_ANIM_BEGIN, CMD_ANIM_END, CMD_DRAW_TRIS, CMD_HIDE, CMD_LIGHT_BULK,
    CMD_LIGHT_NAMED, CMD_LOD, CMD_NOP, CMD_POLY_OFFSET, CMD_ROTATE, CMD_SHOW, CMD_STOP,
    CMD_TRANSLATE, CMD_TRANSLATE_STATIC,
};

/// Hard ceiling on the command stream. The player budgets the same bound,
/// so exceeding it is an input error, not a resize.
pub const CMD_BUFFER_CAP: usize = 4 * 1024 * 1024;

/// Keyframe counts ride in a one-byte field
const MAX_KEYFRAMES: usize = 255;

/// Which of the two traversals is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Draw batches, state and animation
    Opaque,
    /// Named-light placements
    Lights,
}

// =============================================================================
// Command Buffer
// =============================================================================

/// Growable instruction buffer plus the back-patch bookkeeping: the byte
/// offset of the most recent LOD header and of its unresolved skip field.
/// Offsets, never pointers - the vector may reallocate under us.
struct CmdBuffer {
    bytes: Vec<u8>,
    last_header: Option<usize>,
    patch_at: Option<usize>,
}

impl CmdBuffer {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            last_header: None,
            patch_at: None,
        }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn put_bytes(&mut self, data: &[u8]) -> Result<(), CompileError> {
        if self.bytes.len() + data.len() > CMD_BUFFER_CAP {
            return Err(CompileError::CommandBufferFull(CMD_BUFFER_CAP));
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    fn put_u8(&mut self, v: u8) -> Result<(), CompileError> {
        self.put_bytes(&[v])
    }

    fn put_u16(&mut self, v: u16) -> Result<(), CompileError> {
        self.put_bytes(&v.to_le_bytes())
    }

    fn put_f32(&mut self, v: f32) -> Result<(), CompileError> {
        self.put_bytes(&v.to_le_bytes())
    }

    /// Pad with no-ops to a 4-byte boundary
    fn align4(&mut self) -> Result<(), CompileError> {
        while self.bytes.len() % 4 != 0 {
            self.put_u8(CMD_NOP)?;
        }
        Ok(())
    }

    fn patch_u16(&mut self, at: usize, v: u16) {
        self.bytes[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }

    fn span_u16(from: usize, to: usize) -> Result<u16, CompileError> {
        u16::try_from(to - from).map_err(|_| CompileError::LodSpanOverflow(to - from))
    }

    /// A new LOD header landed at `new_header`: resolve the previous
    /// header's skip field with the distance between the two.
    fn link_header(&mut self, new_header: usize) -> Result<(), CompileError> {
        if let (Some(prev), Some(at)) = (self.last_header, self.patch_at) {
            let span = Self::span_u16(prev, new_header)?;
            self.patch_u16(at, span);
        }
        self.last_header = Some(new_header);
        self.patch_at = None;
        Ok(())
    }

    /// Record where the current header's unresolved skip field lives
    fn set_patch(&mut self, at: usize) {
        self.patch_at = Some(at);
    }

    /// The pass's terminator landed at `stop`: resolve the final header
    /// against it and forget the header chain so the next pass starts
    /// fresh.
    fn finish_pass(&mut self, stop: usize) -> Result<(), CompileError> {
        if let (Some(prev), Some(at)) = (self.last_header, self.patch_at) {
            let span = Self::span_u16(prev, stop)?;
            self.patch_u16(at, span);
        }
        self.last_header = None;
        self.patch_at = None;
        Ok(())
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// =============================================================================
// Animation Lookahead
// =============================================================================

/// Decide whether the animation block opening at `cmds[0]` contributes
/// anything to `pass`. Returns the relative index of the matching end
/// command when the whole block should be skipped, `None` when it must be
/// emitted. Tracks begin/end nesting; state changes inside a block and
/// blocks that never close are format violations.
fn scan_animation(cmds: &[Command], pass: Pass) -> Result<Option<usize>, CompileError> {
    let mut nest = 0usize;
    for (n, cmd) in cmds.iter().enumerate() {
        match cmd {
            Command::AnimBegin => nest += 1,
            Command::DrawTris { .. } if pass == Pass::Opaque => return Ok(None),
            Command::LightNamed { .. } if pass == Pass::Lights => return Ok(None),
            Command::HardSurface { .. } | Command::PolygonOffset { .. } => {
                return Err(CompileError::StateChangeInAnimation)
            }
            Command::AnimEnd => {
                nest -= 1;
                if nest == 0 {
                    return Ok(Some(n));
                }
            }
            _ => {}
        }
    }
    Err(CompileError::UnterminatedAnimation)
}

// =============================================================================
// Compiler
// =============================================================================

/// Everything the writer needs to lay out a blob
pub struct CompiledObject {
    pub props: EmbedProps,
    pub commands: Vec<u8>,
    pub vertices: Vec<i16>,
    pub indices: Vec<u16>,
    pub strings: StringTable,
}

struct Emitter<'a> {
    obj: &'a ObjectModel,
    scales: QuantScales,
    max_lod: f32,
    cmds: CmdBuffer,
    strings: StringTable,
    layer_group: i32,
    /// Index span covered by hard-surface draws, accumulated across LODs
    hard_span: Option<(u32, u32)>,
    light_off: u16,
}

impl<'a> Emitter<'a> {
    fn anim(&self, idx: usize) -> Result<&'a AnimData, CompileError> {
        self.obj
            .animations
            .get(idx)
            .ok_or(CompileError::BadAnimReference(idx, self.obj.animations.len()))
    }

    fn run_pass(&mut self, pass: Pass) -> Result<(), CompileError> {
        if pass == Pass::Lights {
            // Align the light section itself so bulk-run alignment holds
            // relative to light_off as well as to the stream start.
            self.cmds.align4()?;
            let off = self.cmds.len();
            self.light_off = u16::try_from(off)
                .map_err(|_| CompileError::LightSectionOverflow(off))?;
        }

        for (li, lod) in self.obj.lods.iter().enumerate() {
            self.emit_lod(pass, li, lod)?;
        }

        let stop = self.cmds.len();
        self.cmds.put_u8(CMD_STOP)?;
        self.cmds.finish_pass(stop)
    }

    fn emit_lod(&mut self, pass: Pass, li: usize, lod: &LodLevel) -> Result<(), CompileError> {
        let header = self.cmds.len();
        self.cmds.put_u8(CMD_LOD)?;
        self.cmds.link_header(header)?;

        self.cmds.put_f32(lod.near)?;
        let far = if lod.far > 0.0 {
            lod.far
        } else if li + 1 == self.obj.lods.len() {
            self.max_lod
        } else {
            return Err(CompileError::UnboundedLod(li));
        };
        self.cmds.put_f32(far)?;
        let patch = self.cmds.len();
        self.cmds.put_u16(0)?;
        self.cmds.set_patch(patch);

        let mut is_hard = false;
        let mut poly_offset = 0u8;
        let mut anim_depth = 0usize;

        let mut i = 0;
        while i < lod.commands.len() {
            match &lod.commands[i] {
                Command::DrawTris { start, count } => {
                    if pass == Pass::Opaque {
                        if *start > u16::MAX as u32 || *count > u16::MAX as u32 {
                            return Err(CompileError::IndexOverflow {
                                start: *start,
                                count: *count,
                            });
                        }
                        self.cmds.put_u8(CMD_DRAW_TRIS)?;
                        self.cmds.put_u16(*start as u16)?;
                        self.cmds.put_u16(*count as u16)?;
                        if is_hard {
                            self.extend_hard_span(*start, *start + *count)?;
                        }
                    }
                }
                Command::PolygonOffset { offset } => {
                    if anim_depth > 0 {
                        return Err(CompileError::StateChangeInAnimation);
                    }
                    if pass == Pass::Opaque && *offset != poly_offset {
                        self.cmds.put_u8(CMD_POLY_OFFSET)?;
                        self.cmds.put_u8(*offset)?;
                        poly_offset = *offset;
                    }
                }
                Command::HardSurface { hard } => {
                    if anim_depth > 0 {
                        return Err(CompileError::StateChangeInAnimation);
                    }
                    if pass == Pass::Opaque {
                        is_hard = *hard;
                    }
                }
                Command::AnimBegin => match scan_animation(&lod.commands[i..], pass)? {
                    Some(rel_end) => {
                        // Nothing for this pass in the whole block: drop
                        // the begin/end pair and everything between.
                        i += rel_end;
                    }
                    None => {
                        self.cmds.put_u8(CMD_ANIM_BEGIN)?;
                        anim_depth += 1;
                    }
                },
                Command::AnimEnd => {
                    self.cmds.put_u8(CMD_ANIM_END)?;
                    anim_depth = anim_depth.saturating_sub(1);
                }
                Command::Rotate { anim } => self.emit_rotate(*anim)?,
                Command::Translate { anim } => self.emit_translate(*anim)?,
                Command::Show { anim } => self.emit_show_hide(CMD_SHOW, *anim)?,
                Command::Hide { anim } => self.emit_show_hide(CMD_HIDE, *anim)?,
                Command::LightNamed { name, position } => {
                    if pass == Pass::Lights {
                        i = self.emit_lights(&lod.commands, i, name, *position)?;
                        continue;
                    }
                }
                Command::LayerGroup { name, offset } => {
                    if pass == Pass::Opaque {
                        match layer_group_index(name, *offset) {
                            Some(idx) => self.layer_group = idx,
                            None => tracing::warn!("ignoring unknown layer group {:?}", name),
                        }
                    }
                }
                Command::Unsupported(attr) => {
                    return Err(CompileError::UnsupportedCommand(*attr))
                }
            }
            i += 1;
        }

        // Never leak polygon-offset state into the next LOD.
        if pass == Pass::Opaque && poly_offset != 0 {
            self.cmds.put_u8(CMD_POLY_OFFSET)?;
            self.cmds.put_u8(0)?;
        }
        Ok(())
    }

    fn extend_hard_span(&mut self, start: u32, end: u32) -> Result<(), CompileError> {
        match self.hard_span {
            None => self.hard_span = Some((start, end)),
            Some((s, e)) => {
                if start > e || end < s {
                    return Err(CompileError::DiscontiguousHardRegion {
                        start,
                        end,
                        span_start: s,
                        span_end: e,
                    });
                }
                self.hard_span = Some((s.min(start), e.max(end)));
            }
        }
        Ok(())
    }

    fn emit_rotate(&mut self, idx: usize) -> Result<(), CompileError> {
        let anim = self.anim(idx)?;
        let count = anim.keyframes.len();
        if !(2..=MAX_KEYFRAMES).contains(&count) {
            return Err(CompileError::MalformedKeyframes {
                anim: idx,
                count,
                expected: "2..=255",
            });
        }
        self.cmds.put_u8(CMD_ROTATE)?;
        for a in anim.axis {
            self.cmds.put_f32(a)?;
        }
        self.cmds.put_u8(count as u8)?;
        for k in &anim.keyframes {
            self.cmds.put_f32(k.key)?;
            self.cmds.put_f32(k.value[0])?;
        }
        let dref = self.strings.intern(&anim.dataref)?;
        self.cmds.put_u8(dref)
    }

    fn emit_translate(&mut self, idx: usize) -> Result<(), CompileError> {
        let anim = self.anim(idx)?;
        let kf = &anim.keyframes;
        let scale = self.scales.vertex;

        // A two-key translation that never moves is just an offset; the
        // static form drops the keys and the dataref.
        if kf.len() == 2 && kf[0].value == kf[1].value {
            self.cmds.put_u8(CMD_TRANSLATE_STATIC)?;
            for c in kf[0].value {
                self.cmds.put_f32(c * scale)?;
            }
            return Ok(());
        }

        if !(2..=MAX_KEYFRAMES).contains(&kf.len()) {
            return Err(CompileError::MalformedKeyframes {
                anim: idx,
                count: kf.len(),
                expected: "2..=255",
            });
        }
        self.cmds.put_u8(CMD_TRANSLATE)?;
        self.cmds.put_u8(kf.len() as u8)?;
        for k in kf {
            self.cmds.put_f32(k.key)?;
            for c in k.value {
                self.cmds.put_f32(c * scale)?;
            }
        }
        let dref = self.strings.intern(&anim.dataref)?;
        self.cmds.put_u8(dref)
    }

    fn emit_show_hide(&mut self, tag: u8, idx: usize) -> Result<(), CompileError> {
        let anim = self.anim(idx)?;
        if anim.keyframes.len() != 2 {
            return Err(CompileError::MalformedKeyframes {
                anim: idx,
                count: anim.keyframes.len(),
                expected: "exactly 2",
            });
        }
        self.cmds.put_u8(tag)?;
        self.cmds.put_f32(anim.keyframes[0].key)?;
        self.cmds.put_f32(anim.keyframes[1].key)?;
        let dref = self.strings.intern(&anim.dataref)?;
        self.cmds.put_u8(dref)
    }

    /// Emit the light placement(s) starting at `cmds[start]`; returns the
    /// index one past what was consumed. Custom lights go out one at a
    /// time; contiguous same-name bulk lights coalesce into one aligned
    /// run.
    fn emit_lights(
        &mut self,
        cmds: &[Command],
        start: usize,
        name: &str,
        position: [f32; 3],
    ) -> Result<usize, CompileError> {
        let info = light_info(name)?;
        let scale = self.scales.vertex;

        if info.custom {
            self.cmds.put_u8(CMD_LIGHT_NAMED)?;
            let dref = self.strings.intern(info.dataref)?;
            self.cmds.put_u8(dref)?;
            for c in position {
                self.cmds.put_f32(c * scale)?;
            }
            return Ok(start + 1);
        }

        let mut end = start;
        while let Some(Command::LightNamed { name: n, .. }) = cmds.get(end) {
            if n != name {
                break;
            }
            end += 1;
        }
        let count = u16::try_from(end - start)
            .map_err(|_| CompileError::BulkLightOverflow(end - start))?;

        self.cmds.align4()?;
        self.cmds.put_u8(CMD_LIGHT_BULK)?;
        let dref = self.strings.intern(info.dataref)?;
        self.cmds.put_u8(dref)?;
        self.cmds.put_u16(count)?;
        for cmd in &cmds[start..end] {
            if let Command::LightNamed { position, .. } = cmd {
                for c in position {
                    self.cmds.put_f32(c * scale)?;
                }
            }
        }
        Ok(end)
    }
}

/// Derived default for a last LOD with no stated far distance: the range
/// at which the object subtends about one pixel at a nominal 45-degree
/// field of view, plus a 50% margin against LOD popping. Degenerate
/// extents yield zero.
fn default_lod_distance(min: Vec3, max: Vec3) -> f32 {
    let d = max - min;
    if d.x <= 0.0 && d.y <= 0.0 && d.z <= 0.0 {
        return 0.0;
    }

    // From each viewing side the smaller dimension vanishes first; the
    // top view is damped because buildings read mostly by footprint.
    let lesser_front = d.y.min(d.z);
    let lesser_top = d.x.min(d.z) / 7.0;
    let lesser_side = d.x.min(d.y);

    let radius = 0.5 * lesser_front.max(lesser_top).max(lesser_side);
    let tan_semi_width = (45.0f32 * 0.5).to_radians().tan();
    480.0 * 0.5 * radius / tan_semi_width * 1.5
}

/// Reduce a texture path to the player's resource name: base name with
/// the compressed-container extension.
fn resource_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    format!("{stem}.pvr")
}

/// Compile one object into its blob sections. Pure; nothing touches the
/// filesystem.
pub fn compile_object(obj: &ObjectModel) -> Result<CompiledObject, CompileError> {
    if obj.tri_vertices.is_empty() {
        return Err(CompileError::EmptyObject);
    }
    if obj.lods.is_empty() {
        return Err(CompileError::NoLods);
    }

    let scales = derive_scales(obj);

    // Fold triangles, lines and light positions into one culling sphere;
    // extents feed the default-LOD heuristic.
    let tri_bounds = bounding_sphere(cast_slice(&obj.tri_vertices), TRI_VERTEX_LANES)
        .ok_or(CompileError::EmptyObject)?;
    let mut min = tri_bounds.min;
    let mut max = tri_bounds.max;
    let mut cull = tri_bounds.sphere;

    if let Some(line_bounds) = bounding_sphere(cast_slice(&obj.line_vertices), LINE_VERTEX_LANES) {
        min = min.min(line_bounds.min);
        max = max.max(line_bounds.max);
        cull = grow_sphere(cull, line_bounds.sphere)?;
    }
    for lod in &obj.lods {
        for cmd in &lod.commands {
            if let Command::LightNamed { position, .. } = cmd {
                cull = grow_sphere(cull, Sphere::point(Vec3::from(*position)))?;
            }
        }
    }

    let last_far = obj.lods.last().map(|l| l.far).unwrap_or(0.0);
    let max_lod = if last_far > 0.0 {
        last_far
    } else {
        default_lod_distance(min, max)
    };

    // Day texture is always entry 0; a lit index of 0 means absent.
    let mut strings = StringTable::new();
    let tex_day = strings.intern(&resource_path(&obj.texture_day))? as i32;
    let tex_lit = if obj.texture_lit.is_empty() {
        0
    } else {
        strings.intern(&resource_path(&obj.texture_lit))? as i32
    };

    let mut indices = Vec::with_capacity(obj.indices.len());
    for &i in &obj.indices {
        if i > u16::MAX as u32 {
            return Err(CompileError::IndexValueOverflow(i));
        }
        indices.push(i as u16);
    }

    let vertices = pack_vertices(&obj.tri_vertices, &scales);

    let mut emitter = Emitter {
        obj,
        scales,
        max_lod,
        cmds: CmdBuffer::new(),
        strings,
        layer_group: DEFAULT_LAYER_GROUP,
        hard_span: None,
        light_off: 0,
    };
    emitter.run_pass(Pass::Opaque)?;
    let hard_verts = match emitter.hard_span {
        Some((_, end)) => {
            u16::try_from(end).map_err(|_| CompileError::IndexValueOverflow(end))?
        }
        None => 0,
    };
    emitter.run_pass(Pass::Lights)?;

    let props = EmbedProps {
        ref_count: 0,
        layer_group: emitter.layer_group,
        tex_day,
        tex_lit,
        cull_xyzr: [cull.center.x, cull.center.y, cull.center.z, cull.radius],
        max_lod,
        scale_vert: 1.0 / scales.vertex,
        hard_verts,
        light_off: emitter.light_off,
        vbo_geo: 0,
        vbo_idx: 0,
        light_info: 0,
        dref_info: 0,
    };

    tracing::debug!(
        lods = obj.lods.len(),
        commands = emitter.cmds.len(),
        vertices = obj.tri_vertices.len(),
        strings = emitter.strings.len(),
        "compiled object"
    );

    Ok(CompiledObject {
        props,
        commands: emitter.cmds.into_bytes(),
        vertices,
        indices,
        strings: emitter.strings,
    })
}
