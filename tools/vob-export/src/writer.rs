//! Binary layout writer
//!
//! Takes a compiled object and lays it out as one relocatable blob:
//! master header, properties block, command stream, vertex buffer,
//! index buffer, string table. Sections are back to back; every offset
//! in the header is relative to byte zero of the blob so the player can
//! load it anywhere.

use std::fs;
use std::path::Path;

use crate::compiler::{compile_object, CompiledObject};
use crate::error::CompileError;
use crate::object::ObjectModel;
use vob_common::format::{EmbedProps, MasterHeader};
use vob_common::packing::{indices_as_bytes, vertices_as_bytes};

/// Lay a compiled object out as a single blob.
///
/// The command stream is part of the properties section, so `prp_len`
/// covers the fixed block plus every instruction byte.
pub fn serialize_blob(compiled: &CompiledObject) -> Vec<u8> {
    let prp_off = MasterHeader::SIZE;
    let prp_len = EmbedProps::SIZE + compiled.commands.len();
    let geo_off = prp_off + prp_len;
    let geo_len = compiled.vertices.len() * 2;
    let idx_off = geo_off + geo_len;
    let idx_len = compiled.indices.len() * 2;
    let str_off = idx_off + idx_len;
    let str_len = compiled.strings.blob_len();

    let header = MasterHeader {
        prp_off: prp_off as i32,
        prp_len: prp_len as i32,
        geo_off: geo_off as i32,
        geo_len: geo_len as i32,
        idx_off: idx_off as i32,
        idx_len: idx_len as i32,
        str_off: str_off as i32,
        str_len: str_len as i32,
    };

    let mut blob = Vec::with_capacity(str_off + str_len);
    blob.extend_from_slice(&header.to_bytes());
    blob.extend_from_slice(&compiled.props.to_bytes());
    blob.extend_from_slice(&compiled.commands);
    blob.extend_from_slice(vertices_as_bytes(&compiled.vertices));
    blob.extend_from_slice(indices_as_bytes(&compiled.indices));
    for s in compiled.strings.iter() {
        blob.extend_from_slice(s.as_bytes());
        blob.push(0);
    }
    blob
}

/// Compile `obj` and write the blob to `path`.
///
/// The blob goes to a sibling temp file first and is renamed into place,
/// so a failed compile or a torn write never leaves a partial file under
/// the final name.
pub fn compile_embedded_object(path: &Path, obj: &ObjectModel) -> Result<(), CompileError> {
    let compiled = compile_object(obj)?;
    let blob = serialize_blob(&compiled);

    let tmp = path.with_extension("vob.tmp");
    if let Err(err) = fs::write(&tmp, &blob) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }

    tracing::info!(
        path = %path.display(),
        bytes = blob.len(),
        commands = compiled.commands.len(),
        vertices = compiled.vertices.len() / 10,
        indices = compiled.indices.len(),
        strings = compiled.strings.len(),
        "wrote embedded object"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Command, LodLevel, TriVertex};
    use vob_common::format::VOB_MAGIC;
    use vob_common::packing::VERTEX_STRIDE_BYTES;

    fn tri_model() -> ObjectModel {
        let v = |x: f32, z: f32| TriVertex {
            position: [x, 0.0, z],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        };
        ObjectModel {
            texture_day: "hangar.png".into(),
            texture_lit: String::new(),
            tri_vertices: vec![v(0.0, 0.0), v(4.0, 0.0), v(0.0, 4.0)],
            line_vertices: vec![],
            indices: vec![0, 1, 2],
            animations: vec![],
            lods: vec![LodLevel {
                near: 0.0,
                far: 0.0,
                commands: vec![Command::DrawTris { start: 0, count: 3 }],
            }],
        }
    }

    #[test]
    fn test_sections_are_contiguous() {
        let compiled = compile_object(&tri_model()).unwrap();
        let blob = serialize_blob(&compiled);

        let header = MasterHeader::from_bytes(&blob).unwrap();
        assert_eq!(&blob[0..4], VOB_MAGIC);
        assert_eq!(header.prp_off as usize, MasterHeader::SIZE);
        assert_eq!(
            header.prp_len as usize,
            EmbedProps::SIZE + compiled.commands.len()
        );
        assert_eq!(header.geo_off, header.prp_off + header.prp_len);
        assert_eq!(header.geo_len as usize, 3 * VERTEX_STRIDE_BYTES);
        assert_eq!(header.idx_off, header.geo_off + header.geo_len);
        assert_eq!(header.idx_len, 6);
        assert_eq!(header.str_off, header.idx_off + header.idx_len);
        assert_eq!((header.str_off + header.str_len) as usize, blob.len());
    }

    #[test]
    fn test_string_section_is_nul_terminated() {
        let compiled = compile_object(&tri_model()).unwrap();
        let blob = serialize_blob(&compiled);
        let header = MasterHeader::from_bytes(&blob).unwrap();

        let strings = &blob[header.str_off as usize..(header.str_off + header.str_len) as usize];
        assert_eq!(strings, b"hangar.pvr\0");
    }

    #[test]
    fn test_props_parse_back_from_blob() {
        let compiled = compile_object(&tri_model()).unwrap();
        let blob = serialize_blob(&compiled);
        let header = MasterHeader::from_bytes(&blob).unwrap();

        let props = EmbedProps::from_bytes(&blob[header.prp_off as usize..]).unwrap();
        assert_eq!(props, compiled.props);
        assert_eq!(props.ref_count, 0);
        assert_eq!(props.vbo_geo, 0);
        assert_eq!(props.vbo_idx, 0);
    }

    #[test]
    fn test_write_and_rename() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("hangar.vob");
        compile_embedded_object(&out, &tri_model()).unwrap();

        let blob = fs::read(&out).unwrap();
        assert!(MasterHeader::from_bytes(&blob).is_some());
        assert!(!dir.path().join("hangar.vob.tmp").exists());
    }

    #[test]
    fn test_failed_compile_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.vob");
        let mut model = tri_model();
        model.tri_vertices.clear();
        model.indices.clear();

        assert!(matches!(
            compile_embedded_object(&out, &model),
            Err(CompileError::EmptyObject)
        ));
        assert!(!out.exists());
        assert!(!dir.path().join("empty.vob.tmp").exists());
    }
}
