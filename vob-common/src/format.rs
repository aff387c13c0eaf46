//! VOB binary format (.vob)
//!
//! Compiled embedded-object blob for the fixed-function mobile renderer.
//! Must be kept in sync with the player. All integers little-endian.
//!
//! # Layout
//! ```text
//! 0x00: MasterHeader (36 bytes: magic + four offset/length pairs)
//! 0x24: EmbedProps (60 bytes)
//! 0x60: command stream (tag-prefixed instructions, part of the
//!       properties section)
//! var:  vertex buffer (i16 records, 10 lanes per vertex)
//! var:  index buffer (u16)
//! var:  string table (back-to-back NUL-terminated strings)
//! ```

// =============================================================================
// Instruction Tags
// =============================================================================

/// Pads alignment, never executed as a command
pub const CMD_NOP: u8 = 0;
/// u16 index offset, u16 index count
pub const CMD_DRAW_TRIS: u8 = 1;
/// f32 near, f32 far, u16 bytes to skip to the next LOD header
pub const CMD_LOD: u8 = 2;
/// u8 offset level
pub const CMD_POLY_OFFSET: u8 = 3;
pub const CMD_ANIM_BEGIN: u8 = 4;
pub const CMD_ANIM_END: u8 = 5;
/// f32 x, y, z (vertex-scaled)
pub const CMD_TRANSLATE_STATIC: u8 = 6;
/// u8 count, (f32 key, f32 x, y, z) x count, u8 dataref index
pub const CMD_TRANSLATE: u8 = 7;
/// f32 axis x, y, z, u8 count, (f32 key, f32 angle) x count, u8 dataref index
pub const CMD_ROTATE: u8 = 8;
/// f32 v1, f32 v2, u8 dataref index
pub const CMD_SHOW: u8 = 9;
/// f32 v1, f32 v2, u8 dataref index
pub const CMD_HIDE: u8 = 10;
/// u8 dataref index, f32 x, y, z (vertex-scaled)
pub const CMD_LIGHT_NAMED: u8 = 11;
/// u8 dataref index, u16 count, f32 [xyz] x count; tag is 4-byte aligned
pub const CMD_LIGHT_BULK: u8 = 12;
/// End of a pass; also the back-patch target of the final LOD header
pub const CMD_STOP: u8 = 13;

// =============================================================================
// File Identity
// =============================================================================

/// Magic bytes at the start of a VOB blob.
///
/// The fourth byte carries the revision: `2` is the 10-lane-stride format.
pub const VOB_MAGIC: &[u8; 4] = b"VOB2";

/// VOB file extension without dot
pub const VOB_EXT: &str = "vob";

// =============================================================================
// Master Header
// =============================================================================

/// Fixed-size file header (36 bytes).
///
/// Four (offset, length) pairs locate the sections relative to the start of
/// the blob. The properties section includes the command stream, so
/// `prp_len` is `EmbedProps::SIZE` plus the command-stream length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterHeader {
    pub prp_off: i32,
    pub prp_len: i32,
    pub geo_off: i32,
    pub geo_len: i32,
    pub idx_off: i32,
    pub idx_len: i32,
    pub str_off: i32,
    pub str_len: i32,
}

impl MasterHeader {
    pub const SIZE: usize = 36;

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(VOB_MAGIC);
        let fields = [
            self.prp_off,
            self.prp_len,
            self.geo_off,
            self.geo_len,
            self.idx_off,
            self.idx_len,
            self.str_off,
            self.str_len,
        ];
        for (i, f) in fields.iter().enumerate() {
            bytes[4 + i * 4..8 + i * 4].copy_from_slice(&f.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes; `None` if truncated or the magic is wrong
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE || &bytes[0..4] != VOB_MAGIC {
            return None;
        }
        let field = |i: usize| {
            i32::from_le_bytes([
                bytes[4 + i * 4],
                bytes[5 + i * 4],
                bytes[6 + i * 4],
                bytes[7 + i * 4],
            ])
        };
        Some(Self {
            prp_off: field(0),
            prp_len: field(1),
            geo_off: field(2),
            geo_len: field(3),
            idx_off: field(4),
            idx_len: field(5),
            str_off: field(6),
            str_len: field(7),
        })
    }
}

// =============================================================================
// Properties Block
// =============================================================================

/// Object-level properties (60 bytes).
///
/// Matches the player's in-memory struct on its 32-bit target: the two
/// buffer handles and two pointer slots exist so the player can patch the
/// block in place after upload. They are always zero in a compiled file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbedProps {
    /// Player-side reference count, zero at write time
    pub ref_count: i32,
    /// Draw-order layer index
    pub layer_group: i32,
    /// String-table index of the day texture
    pub tex_day: i32,
    /// String-table index of the lit texture, 0 when absent
    pub tex_lit: i32,
    /// Culling sphere: center x, y, z and radius
    pub cull_xyzr: [f32; 4],
    /// Far distance of the coarsest LOD
    pub max_lod: f32,
    /// Multiplier that de-quantizes vertex positions (1 / vertex scale)
    pub scale_vert: f32,
    /// One past the last hard-surface vertex index
    pub hard_verts: u16,
    /// Byte offset of the light pass within the command stream
    pub light_off: u16,
    /// GPU vertex-buffer handle, zero at write time
    pub vbo_geo: u32,
    /// GPU index-buffer handle, zero at write time
    pub vbo_idx: u32,
    /// Player light-table pointer, zero at write time
    pub light_info: u32,
    /// Player dataref-table pointer, zero at write time
    pub dref_info: u32,
}

impl EmbedProps {
    pub const SIZE: usize = 60;

    /// Write the block to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.ref_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.layer_group.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.tex_day.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.tex_lit.to_le_bytes());
        for (i, f) in self.cull_xyzr.iter().enumerate() {
            bytes[16 + i * 4..20 + i * 4].copy_from_slice(&f.to_le_bytes());
        }
        bytes[32..36].copy_from_slice(&self.max_lod.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.scale_vert.to_le_bytes());
        bytes[40..42].copy_from_slice(&self.hard_verts.to_le_bytes());
        bytes[42..44].copy_from_slice(&self.light_off.to_le_bytes());
        bytes[44..48].copy_from_slice(&self.vbo_geo.to_le_bytes());
        bytes[48..52].copy_from_slice(&self.vbo_idx.to_le_bytes());
        bytes[52..56].copy_from_slice(&self.light_info.to_le_bytes());
        bytes[56..60].copy_from_slice(&self.dref_info.to_le_bytes());
        bytes
    }

    /// Read the block from bytes; `None` if truncated
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let i32_at = |o: usize| i32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        let u32_at = |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        let f32_at = |o: usize| f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        let u16_at = |o: usize| u16::from_le_bytes([bytes[o], bytes[o + 1]]);
        Some(Self {
            ref_count: i32_at(0),
            layer_group: i32_at(4),
            tex_day: i32_at(8),
            tex_lit: i32_at(12),
            cull_xyzr: [f32_at(16), f32_at(20), f32_at(24), f32_at(28)],
            max_lod: f32_at(32),
            scale_vert: f32_at(36),
            hard_verts: u16_at(40),
            light_off: u16_at(42),
            vbo_geo: u32_at(44),
            vbo_idx: u32_at(48),
            light_info: u32_at(52),
            dref_info: u32_at(56),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_props() -> EmbedProps {
        EmbedProps {
            ref_count: 0,
            layer_group: 1950,
            tex_day: 0,
            tex_lit: 1,
            cull_xyzr: [1.0, 2.0, 3.0, 4.5],
            max_lod: 3000.0,
            scale_vert: 1.0 / 32.766,
            hard_verts: 36,
            light_off: 128,
            vbo_geo: 0,
            vbo_idx: 0,
            light_info: 0,
            dref_info: 0,
        }
    }

    #[test]
    fn test_master_header_roundtrip() {
        let header = MasterHeader {
            prp_off: 36,
            prp_len: 60 + 17,
            geo_off: 113,
            geo_len: 60,
            idx_off: 173,
            idx_len: 6,
            str_off: 179,
            str_len: 9,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"VOB2");
        assert_eq!(MasterHeader::from_bytes(&bytes), Some(header));
    }

    #[test]
    fn test_master_header_rejects_bad_magic() {
        let mut bytes = MasterHeader {
            prp_off: 0,
            prp_len: 0,
            geo_off: 0,
            geo_len: 0,
            idx_off: 0,
            idx_len: 0,
            str_off: 0,
            str_len: 0,
        }
        .to_bytes();
        bytes[3] = b'1';
        assert!(MasterHeader::from_bytes(&bytes).is_none());
    }

    #[test]
    fn test_props_roundtrip() {
        let props = sample_props();
        let bytes = props.to_bytes();
        assert_eq!(bytes.len(), EmbedProps::SIZE);
        assert_eq!(EmbedProps::from_bytes(&bytes), Some(props));
    }

    #[test]
    fn test_props_field_offsets() {
        let bytes = sample_props().to_bytes();
        // layer_group at 0x04, hard_verts at 0x28, light_off at 0x2A
        assert_eq!(i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 1950);
        assert_eq!(u16::from_le_bytes([bytes[40], bytes[41]]), 36);
        assert_eq!(u16::from_le_bytes([bytes[42], bytes[43]]), 128);
    }
}
