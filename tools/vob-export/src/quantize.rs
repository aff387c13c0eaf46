//! Geometry quantizer
//!
//! Derives the per-object scale factors from observed extrema and
//! rewrites the floating triangle pool into the player's fixed-stride
//! 16-bit vertex records.

use crate::object::{Command, ObjectModel, TriVertex};
use vob_common::packing::{
    quantize_i16, SCALE_NORMAL, SCALE_TEX, VERTEX_QUANT_MAX, VERTEX_STRIDE_UNITS,
};

/// Scale factors applied uniformly across one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantScales {
    /// Position multiplier; the largest observed |coordinate| maps to
    /// [`VERTEX_QUANT_MAX`]
    pub vertex: f32,
    pub normal: f32,
    pub texture: f32,
}

/// Observed coordinate/texture extrema over everything that ends up in
/// the blob: triangle vertices, line vertices, and light placements.
pub fn derive_scales(obj: &ObjectModel) -> QuantScales {
    let mut max_c = 0.0f32;
    let mut max_t = 0.0f32;

    for v in &obj.tri_vertices {
        for c in v.position {
            max_c = max_c.max(c.abs());
        }
        for t in v.uv {
            max_t = max_t.max(t.abs());
        }
    }
    for v in &obj.line_vertices {
        for c in v.position {
            max_c = max_c.max(c.abs());
        }
    }
    for lod in &obj.lods {
        for cmd in &lod.commands {
            if let Command::LightNamed { position, .. } = cmd {
                for c in position {
                    max_c = max_c.max(c.abs());
                }
            }
        }
    }

    // UVs use a fixed scale; past +-32 they saturate in the i16 lanes.
    if max_t.ceil() * SCALE_TEX > i16::MAX as f32 {
        tracing::warn!(
            "texture coordinates reach {:.1}; the fixed UV scale will clamp them",
            max_t
        );
    }

    // A zero-size object must not divide by zero.
    let vertex = if max_c > 0.0 {
        VERTEX_QUANT_MAX / max_c
    } else {
        1.0
    };

    QuantScales {
        vertex,
        normal: SCALE_NORMAL,
        texture: SCALE_TEX,
    }
}

/// Rewrite the triangle pool as 10-lane i16 records:
/// x, y, z, 1, nx, ny, nz, 0, s, t.
pub fn pack_vertices(vertices: &[TriVertex], scales: &QuantScales) -> Vec<i16> {
    let mut out = Vec::with_capacity(vertices.len() * VERTEX_STRIDE_UNITS);
    for v in vertices {
        out.push(quantize_i16(v.position[0], scales.vertex));
        out.push(quantize_i16(v.position[1], scales.vertex));
        out.push(quantize_i16(v.position[2], scales.vertex));
        out.push(1);
        out.push(quantize_i16(v.normal[0], scales.normal));
        out.push(quantize_i16(v.normal[1], scales.normal));
        out.push(quantize_i16(v.normal[2], scales.normal));
        out.push(0);
        out.push(quantize_i16(v.uv[0], scales.texture));
        out.push(quantize_i16(v.uv[1], scales.texture));
    }
    out
}
