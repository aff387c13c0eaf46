//! Fixed-point quantization helpers
//!
//! The player's GPU class takes 16-bit vertex attributes; positions,
//! normals and texture coordinates are all stored as i16 lanes scaled by
//! per-object (positions) or fixed (normals, UVs) factors. Used by both
//! the compiler and by tests that check round trips.

use bytemuck::cast_slice;

// =============================================================================
// Quantization Constants
// =============================================================================

/// Largest quantized magnitude for vertex positions.
///
/// One unit below the i16 ceiling so that round-up after scaling can never
/// overflow the representable range.
pub const VERTEX_QUANT_MAX: f32 = 32766.0;

/// Fixed texture-coordinate scale (UVs are stored in 5.10-ish fixed point)
pub const SCALE_TEX: f32 = 1024.0;

/// Fixed normal scale (unit normals fill a signed 16-bit lane at 1.14)
pub const SCALE_NORMAL: f32 = 16384.0;

// =============================================================================
// Vertex Record Layout
// =============================================================================

/// Lanes per vertex record: x, y, z, 1, nx, ny, nz, 0, s, t.
///
/// The constant fourth and eighth lanes are required by the GPU: every
/// attribute must start on a 4-byte boundary, and the position fetch runs
/// fastest as a full vec4. Two of the ten lanes carry no data.
pub const VERTEX_STRIDE_UNITS: usize = 10;

/// Bytes per vertex record
pub const VERTEX_STRIDE_BYTES: usize = VERTEX_STRIDE_UNITS * 2;

// =============================================================================
// Scalar Conversion
// =============================================================================

/// Quantize a float to an i16 lane with the given scale
#[inline]
pub fn quantize_i16(value: f32, scale: f32) -> i16 {
    (value * scale) as i16
}

/// Undo [`quantize_i16`] (lossy; exact to within one quantization step)
#[inline]
pub fn dequantize(value: i16, scale: f32) -> f32 {
    value as f32 / scale
}

// =============================================================================
// Byte Views
// =============================================================================

/// View a quantized vertex buffer as little-endian bytes
#[inline]
pub fn vertices_as_bytes(vertices: &[i16]) -> &[u8] {
    cast_slice(vertices)
}

/// View a 16-bit index buffer as little-endian bytes
#[inline]
pub fn indices_as_bytes(indices: &[u16]) -> &[u8] {
    cast_slice(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_roundtrip_within_one_step() {
        let scale = VERTEX_QUANT_MAX / 250.0;
        for v in [-250.0f32, -31.25, 0.0, 0.015, 124.99, 250.0] {
            let q = quantize_i16(v, scale);
            let back = dequantize(q, scale);
            assert!(
                (back - v).abs() <= 1.0 / scale,
                "{} -> {} -> {}",
                v,
                q,
                back
            );
        }
    }

    #[test]
    fn test_quantize_max_magnitude_fits() {
        let scale = VERTEX_QUANT_MAX / 800_000.0;
        assert_eq!(quantize_i16(800_000.0, scale), 32766);
        assert_eq!(quantize_i16(-800_000.0, scale), -32766);
    }

    #[test]
    fn test_fixed_scales() {
        assert_eq!(quantize_i16(1.0, SCALE_TEX), 1024);
        assert_eq!(quantize_i16(1.0, SCALE_NORMAL), 16384);
        assert_eq!(quantize_i16(-1.0, SCALE_NORMAL), -16384);
    }

    #[test]
    fn test_stride() {
        assert_eq!(VERTEX_STRIDE_UNITS, 10);
        assert_eq!(VERTEX_STRIDE_BYTES, 20);
    }

    #[test]
    fn test_byte_views_are_little_endian() {
        assert_eq!(vertices_as_bytes(&[0x0102i16]), &[0x02, 0x01]);
        assert_eq!(indices_as_bytes(&[0x0304u16]), &[0x04, 0x03]);
    }
}
