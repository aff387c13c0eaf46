//! Shared definitions for the VOB embedded-object format
//!
//! This crate is the single source of truth for the binary layout shared
//! between `vob-export` (the compiler) and the on-device player:
//!
//! - [`format`] - Instruction tags, master header and properties block
//! - [`packing`] - Fixed-point quantization helpers and vertex strides

pub mod format;
pub mod packing;

// Re-export commonly used format items
pub use format::{
    EmbedProps, MasterHeader, CMD_ANIM_BEGIN, CMD_ANIM_END, CMD_DRAW_TRIS, CMD_HIDE, CMD_LIGHT_BULK,
    CMD_LIGHT_NAMED, CMD_LOD, CMD_NOP, CMD_POLY_OFFSET, CMD_ROTATE, CMD_SHOW, CMD_STOP,
    CMD_TRANSLATE, CMD_TRANSLATE_STATIC, VOB_EXT, VOB_MAGIC,
};

// Re-export commonly used packing items
pub use packing::{
    dequantize, indices_as_bytes, quantize_i16, vertices_as_bytes, SCALE_NORMAL, SCALE_TEX,
    VERTEX_QUANT_MAX, VERTEX_STRIDE_BYTES, VERTEX_STRIDE_UNITS,
};
