//! End-to-end compile tests: build an object in memory, write the blob,
//! read it back and check the layout the player would see.

use std::fs;

use vob_common::format::{EmbedProps, MasterHeader, CMD_LOD, VOB_MAGIC};
use vob_common::packing::{dequantize, VERTEX_STRIDE_BYTES, VERTEX_STRIDE_UNITS};
use vob_export::object::{AnimData, Command, Keyframe, LodLevel, ObjectModel, TriVertex};
use vob_export::{compile_embedded_object, CompileError};

/// Sphere containment is only exact to floating-point epsilon; the grow
/// pass can leave the last-absorbed point a ULP past the radius.
const EPS: f32 = 1e-3;

fn vertex(x: f32, y: f32, z: f32) -> TriVertex {
    TriVertex {
        position: [x, y, z],
        normal: [0.0, 1.0, 0.0],
        uv: [0.5, 0.5],
    }
}

/// A barn: two quads, a spinning rooftop beacon, two LODs.
fn barn() -> ObjectModel {
    ObjectModel {
        texture_day: "textures/barn.png".into(),
        texture_lit: "textures/barn_lit.png".into(),
        tri_vertices: vec![
            vertex(-8.0, 0.0, -8.0),
            vertex(8.0, 0.0, -8.0),
            vertex(8.0, 0.0, 8.0),
            vertex(-8.0, 0.0, 8.0),
            vertex(-8.0, 6.0, -8.0),
            vertex(8.0, 6.0, -8.0),
            vertex(8.0, 6.0, 8.0),
            vertex(-8.0, 6.0, 8.0),
        ],
        line_vertices: vec![],
        indices: vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7],
        animations: vec![AnimData {
            dataref: "anim/barn/beacon_spin".into(),
            axis: [0.0, 1.0, 0.0],
            keyframes: vec![
                Keyframe {
                    key: 0.0,
                    value: [0.0, 0.0, 0.0],
                },
                Keyframe {
                    key: 1.0,
                    value: [360.0, 0.0, 0.0],
                },
            ],
        }],
        lods: vec![
            LodLevel {
                near: 0.0,
                far: 2000.0,
                commands: vec![
                    Command::LayerGroup {
                        name: "objects".into(),
                        offset: 2,
                    },
                    Command::HardSurface { hard: true },
                    Command::DrawTris { start: 0, count: 6 },
                    Command::HardSurface { hard: false },
                    Command::DrawTris { start: 6, count: 6 },
                    Command::AnimBegin,
                    Command::Rotate { anim: 0 },
                    Command::LightNamed {
                        name: "airplane_beacon".into(),
                        position: [0.0, 7.0, 0.0],
                    },
                    Command::AnimEnd,
                ],
            },
            LodLevel {
                near: 2000.0,
                far: 4000.0,
                commands: vec![Command::DrawTris { start: 0, count: 6 }],
            },
        ],
    }
}

#[test]
fn test_compiled_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("barn.vob");
    compile_embedded_object(&out, &barn()).unwrap();

    let blob = fs::read(&out).unwrap();
    assert_eq!(&blob[0..4], VOB_MAGIC);
    let header = MasterHeader::from_bytes(&blob).unwrap();

    // Sections are back to back and cover the whole file.
    assert_eq!(header.prp_off as usize, MasterHeader::SIZE);
    assert_eq!(header.geo_off, header.prp_off + header.prp_len);
    assert_eq!(header.idx_off, header.geo_off + header.geo_len);
    assert_eq!(header.str_off, header.idx_off + header.idx_len);
    assert_eq!((header.str_off + header.str_len) as usize, blob.len());

    assert_eq!(header.geo_len as usize, 8 * VERTEX_STRIDE_BYTES);
    assert_eq!(header.idx_len, 24);
}

#[test]
fn test_compiled_properties() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("barn.vob");
    compile_embedded_object(&out, &barn()).unwrap();

    let blob = fs::read(&out).unwrap();
    let header = MasterHeader::from_bytes(&blob).unwrap();
    let props = EmbedProps::from_bytes(&blob[header.prp_off as usize..]).unwrap();

    assert_eq!(props.layer_group, 1952);
    assert_eq!(props.tex_day, 0);
    assert!(props.tex_lit > 0);
    assert_eq!(props.max_lod, 4000.0);
    assert_eq!(props.hard_verts, 6);
    assert_eq!(props.ref_count, 0);
    assert_eq!(props.vbo_geo, 0);
    assert_eq!(props.light_info, 0);

    // Both passes start on a LOD header.
    let stream = &blob[header.prp_off as usize + EmbedProps::SIZE..];
    assert_eq!(stream[0], CMD_LOD);
    assert_eq!(stream[props.light_off as usize], CMD_LOD);

    // Culling sphere covers every vertex and the beacon.
    let [cx, cy, cz, r] = props.cull_xyzr;
    for v in barn().tri_vertices {
        let d = (v.position[0] - cx).powi(2)
            + (v.position[1] - cy).powi(2)
            + (v.position[2] - cz).powi(2);
        assert!(d.sqrt() <= r + EPS, "vertex {:?} outside sphere", v.position);
    }
    let beacon = (0.0 - cx).powi(2) + (7.0 - cy).powi(2) + (0.0 - cz).powi(2);
    assert!(beacon.sqrt() <= r + EPS);
}

#[test]
fn test_vertex_positions_survive_quantization() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("barn.vob");
    let model = barn();
    compile_embedded_object(&out, &model).unwrap();

    let blob = fs::read(&out).unwrap();
    let header = MasterHeader::from_bytes(&blob).unwrap();
    let props = EmbedProps::from_bytes(&blob[header.prp_off as usize..]).unwrap();

    let geo = &blob[header.geo_off as usize..(header.geo_off + header.geo_len) as usize];
    let scale = 1.0 / props.scale_vert;
    let step = props.scale_vert;
    for (n, v) in model.tri_vertices.iter().enumerate() {
        for axis in 0..3 {
            let o = n * VERTEX_STRIDE_UNITS * 2 + axis * 2;
            let lane = i16::from_le_bytes([geo[o], geo[o + 1]]);
            let back = dequantize(lane, scale);
            assert!(
                (back - v.position[axis]).abs() <= step,
                "vertex {} axis {}: {} vs {}",
                n,
                axis,
                back,
                v.position[axis]
            );
        }
    }
}

#[test]
fn test_string_table_contents() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("barn.vob");
    compile_embedded_object(&out, &barn()).unwrap();

    let blob = fs::read(&out).unwrap();
    let header = MasterHeader::from_bytes(&blob).unwrap();
    let section = &blob[header.str_off as usize..(header.str_off + header.str_len) as usize];

    assert_eq!(*section.last().unwrap(), 0);
    let strings: Vec<&str> = section[..section.len() - 1]
        .split(|b| *b == 0)
        .map(|s| std::str::from_utf8(s).unwrap())
        .collect();

    // Day texture is always the first entry; paths are stripped to the
    // on-device resource name.
    assert_eq!(strings[0], "barn.pvr");
    assert!(strings.contains(&"barn_lit.pvr"));
    assert!(strings.contains(&"anim/barn/beacon_spin"));
    assert!(strings.contains(&"anim/lights/airplane_beacon"));
}

#[test]
fn test_model_json_roundtrip() {
    let model = barn();
    let text = serde_json::to_string(&model).unwrap();
    let back: ObjectModel = serde_json::from_str(&text).unwrap();
    assert_eq!(back, model);
}

#[test]
fn test_unknown_light_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bad.vob");
    let mut model = barn();
    model.lods[0].commands.push(Command::LightNamed {
        name: "lava_lamp".into(),
        position: [0.0, 0.0, 0.0],
    });

    let err = compile_embedded_object(&out, &model).unwrap_err();
    assert!(matches!(err, CompileError::UnknownLight(name) if name == "lava_lamp"));
    assert!(!out.exists());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
