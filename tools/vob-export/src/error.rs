//! Compile-error taxonomy
//!
//! Every detected format violation is fatal: the player has no tolerance
//! for malformed input, so there is no recoverable category and no output
//! file is left behind on failure.

use crate::object::UnsupportedAttr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("string table overflow: the format addresses at most 255 unique strings")]
    StringTableOverflow,

    #[error("hard-surface regions are discontiguous: [{start}, {end}) does not touch [{span_start}, {span_end})")]
    DiscontiguousHardRegion {
        start: u32,
        end: u32,
        span_start: u32,
        span_end: u32,
    },

    #[error("unsupported command: {}", .0.describe())]
    UnsupportedCommand(UnsupportedAttr),

    #[error("unknown named light {0:?}")]
    UnknownLight(String),

    #[error("draw range exceeds the 16-bit index domain: start {start}, count {count}")]
    IndexOverflow { start: u32, count: u32 },

    #[error("index value {0} exceeds 65535")]
    IndexValueOverflow(u32),

    #[error("animation block never closed: ran off the end of the command list")]
    UnterminatedAnimation,

    #[error("state-changing command inside an animation block")]
    StateChangeInAnimation,

    #[error("animation {anim} has {count} keyframes, expected {expected}")]
    MalformedKeyframes {
        anim: usize,
        count: usize,
        expected: &'static str,
    },

    #[error("command references animation {0} but the table has {1} entries")]
    BadAnimReference(usize, usize),

    #[error("LOD {0} has no far distance but is not the last LOD")]
    UnboundedLod(usize),

    #[error("LOD command block spans {0} bytes, past the 16-bit skip field")]
    LodSpanOverflow(usize),

    #[error("object has no triangle geometry")]
    EmptyObject,

    #[error("object has no LOD levels")]
    NoLods,

    #[error("bulk light run of {0} placements exceeds the 16-bit count field")]
    BulkLightOverflow(usize),

    #[error("light pass begins at byte {0}, past the 16-bit light_off field")]
    LightSectionOverflow(usize),

    #[error("merged culling sphere failed to contain its inputs; margin too small")]
    SphereMergeFailed,

    #[error("command stream exceeds the {0}-byte ceiling")]
    CommandBufferFull(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
