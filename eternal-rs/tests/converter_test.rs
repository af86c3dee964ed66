//! End-to-end conversion tests
//!
//! A throwaway game install is laid out in a temporary directory with a
//! synthetic archive whose model entry is compressed by the test codec.

use eternal_lwo::{LodLayout, LodRecord, LwoHeader, LwoMesh, LwoModel, decode_strict};
use eternal_resources::test_utils::{ResourceArchiveBuilder, TEST_CODEC_TAG, TestCodec};
use eternal_resources::{Codec, MODEL_VERSION, StreamDbPayload, streamdb_index};
use eternal_rs::{ConversionRequest, ConvertError, ConverterOptions, ModelConverter};
use pretty_assertions::assert_eq;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TARGET: &str = "models/props/crate.lwo";
const TARGET_HASH: u64 = 0x0123_4567_89AB_CDEF;

const QUAD: &str = "\
# exported by a modelling tool
mtllib panel.mtl
o Panel
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 1.0 0.0
usemtl Panel
s 1
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

struct Install {
    dir: TempDir,
    archive: PathBuf,
}

impl Install {
    fn game_dir(&self) -> PathBuf {
        self.dir.path().join("game")
    }

    fn imports(&self) -> PathBuf {
        self.dir.path().join("imports")
    }

    fn write_obj(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn converter(&self) -> ModelConverter {
        ModelConverter::new(ConverterOptions {
            imports_root: self.imports(),
            ..Default::default()
        })
        .with_codec(Box::new(TestCodec))
    }

    fn request(&self, obj: &Path) -> ConversionRequest {
        ConversionRequest {
            game_dir: self.game_dir(),
            obj_path: obj.to_path_buf(),
            target_name: TARGET.to_string(),
            archive_path: self.archive.clone(),
            material: "models/custom/panel".to_string(),
            y_up: false,
        }
    }
}

/// A header that stops after its mesh records, like shipped files
fn shipped_header(materials: &[&str]) -> Vec<u8> {
    let model = LwoModel {
        header: LwoHeader {
            file_type: 2,
            num_meshes: materials.len() as u32,
            selector_hash: 0x5EED,
            ..Default::default()
        },
        layout: LodLayout::Standard,
        meshes: materials
            .iter()
            .map(|material| LwoMesh {
                material: material.to_string(),
                lods: vec![
                    LodRecord {
                        unk_floats: [0.5, 0.25, 0.125],
                        signature: *b"BMLr",
                        ..Default::default()
                    };
                    3
                ],
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    let mut bytes = Vec::new();
    model.header.write(&mut bytes).unwrap();
    for mesh in &model.meshes {
        mesh.write(&mut bytes, model.layout).unwrap();
    }
    bytes
}

fn install() -> Install {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("game").join("base");
    std::fs::create_dir_all(&base).unwrap();
    let archive = base.join("gameresources.resources");

    ResourceArchiveBuilder::new()
        .add_entry("generated/decls/material2/panel.decl", "material2", 1, 0x42, b"{}")
        .add_compressed_entry(
            TARGET,
            "model",
            MODEL_VERSION,
            TARGET_HASH,
            &shipped_header(&["models/props/crate_a", "models/props/crate_b"]),
            &TestCodec,
        )
        .unwrap()
        .write_to(&archive)
        .unwrap();

    Install { dir, archive }
}

#[test]
fn test_load_and_browse() {
    let install = install();
    let mut converter = install.converter();

    assert!(converter.load_archive(&install.archive));
    assert!(!converter.has_load_error());
    let names: Vec<&str> = converter
        .resources()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["generated/decls/material2/panel.decl", TARGET]);
    assert!(converter.resources()[1].is_convertible_model());
}

#[test]
fn test_inspect_lwo_lists_materials() {
    let install = install();
    let mut converter = install.converter();

    assert_eq!(
        converter.inspect_lwo(TARGET, &install.archive),
        vec!["models/props/crate_a", "models/props/crate_b"]
    );
}

#[test]
fn test_inspect_lwo_rejects_corrupt_header() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base");
    std::fs::create_dir_all(&base).unwrap();
    let archive = base.join("broken.resources");

    let mut header = shipped_header(&["models/props/crate_a"]);
    // a second mesh whose material length is far out of range
    header[16..20].copy_from_slice(&2u32.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&2000u32.to_le_bytes());

    ResourceArchiveBuilder::new()
        .add_model(TARGET, TARGET_HASH, &header)
        .write_to(&archive)
        .unwrap();

    let mut converter = ModelConverter::default().with_codec(Box::new(TestCodec));
    assert!(converter.inspect_lwo(TARGET, &archive).is_empty());
    assert_eq!(converter.last_error_message(), "Unsupported LWO file.");
    assert!(!converter.has_fatal_error());
}

#[test]
fn test_convert_writes_import_layout() {
    let install = install();
    let obj = install.write_obj("panel.obj", QUAD);
    let mut converter = install.converter();

    let report = converter.try_convert(&install.request(&obj)).unwrap();

    let index = streamdb_index(TARGET_HASH, -6);
    assert_eq!(report.stream_index, index);
    assert_eq!(report.vertex_count, 4);
    assert_eq!(report.face_count, 2);
    assert_eq!(report.decompressed_size, 4 * 24 + 2 * 6);
    assert_eq!(report.compressed_size, report.decompressed_size + TEST_CODEC_TAG.len());

    let key = format!("crate_id#{index}");
    let root = install.imports().join(&key);
    assert_eq!(
        report.payload_path,
        root.join("streamdb")
            .join("models")
            .join("props")
            .join(format!("{key}.lwo"))
    );
    assert_eq!(
        report.header_path,
        root.join("gameresources")
            .join("models")
            .join("props")
            .join("crate.lwo")
    );

    // payload: STREAMDB framing around the compressed streams
    let payload = StreamDbPayload::parse(&std::fs::read(&report.payload_path).unwrap()).unwrap();
    assert_eq!(payload.lods.len(), 3);
    for lod in &payload.lods {
        assert_eq!(lod.offset, 36);
        assert_eq!(lod.length as usize, report.compressed_size);
    }
    let raw = TestCodec
        .decompress(&payload.data, report.decompressed_size)
        .unwrap();
    assert_eq!(raw.len(), 108);

    // header: one mesh, three LODs describing the new geometry
    let header = decode_strict(&std::fs::read(&report.header_path).unwrap()).unwrap();
    assert_eq!(header.header.num_meshes, 1);
    assert_eq!(header.material_names(), vec!["models/custom/panel"]);
    let lods = &header.meshes[0].lods;
    assert_eq!(lods.len(), 3);
    for lod in lods {
        assert_eq!(lod.num_vertices, 4);
        assert_eq!(lod.num_faces_x3, 6);
        assert_eq!(lod.vertex_scale, 2.0);
        assert_eq!(lod.neg_bounds, [-1.0, 0.0, -1.0]);
        assert_eq!(lod.pos_bounds, [1.0, 0.0, 1.0]);
    }
    let compressed = report.compressed_size as u32;
    let cumulative: Vec<u32> = header
        .stream_slots
        .iter()
        .map(|s| s.layout.cumulative_compressed_size)
        .collect();
    assert_eq!(
        cumulative,
        vec![0, compressed, 2 * compressed, 3 * compressed, 3 * compressed]
    );
    assert_eq!(header.stream_slots[0].data.faces_offset, 96);

    // temporaries are gone
    assert!(!install.dir.path().join("panel.obj.tmp").exists());
    assert!(!install.dir.path().join("panel.mtl.tmp").exists());
}

#[test]
fn test_convert_keeps_temporaries_on_request() {
    let install = install();
    let obj = install.write_obj("panel.obj", QUAD);
    let mut converter = ModelConverter::new(ConverterOptions {
        imports_root: install.imports(),
        keep_temporaries: true,
        ..Default::default()
    })
    .with_codec(Box::new(TestCodec));

    assert!(converter.try_convert(&install.request(&obj)).is_ok());

    let reindexed = std::fs::read_to_string(install.dir.path().join("panel.obj.tmp")).unwrap();
    assert!(reindexed.contains("o Panel"));
    assert!(!reindexed.contains("\ns "));
    assert!(install.dir.path().join("panel.mtl.tmp").exists());
}

#[test]
fn test_convert_reports_vertex_count_over_limit() {
    let install = install();

    let vertices = 65_538;
    let mut text = String::from("o Dense\n");
    for i in 0..vertices {
        writeln!(text, "v {} {} 0", i % 256, i / 256).unwrap();
    }
    for face in 0..vertices / 3 {
        let a = face * 3 + 1;
        writeln!(text, "f {} {} {}", a, a + 1, a + 2).unwrap();
    }
    let obj = install.write_obj("dense.obj", &text);

    let mut converter = install.converter();
    let err = converter.try_convert(&install.request(&obj)).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Capacity {
            vertex_count: 65_538
        }
    ));
    assert_eq!(converter.vertex_count(), 65_538);

    // the facade reports the same failure
    let ok = converter.convert(
        install.game_dir(),
        &obj,
        TARGET,
        &install.archive,
        "models/custom/dense",
        false,
    );
    assert!(!ok);
    assert_eq!(converter.last_error_message(), "Too many vertices.");
    assert!(converter.last_error_detail().contains("65538"));
    assert!(!converter.has_fatal_error());

    assert!(!install.dir.path().join("dense.obj.tmp").exists());
    assert!(!install.imports().exists());
}

#[test]
fn test_convert_missing_obj_is_recoverable() {
    let install = install();
    let mut converter = install.converter();

    let err = converter
        .try_convert(&install.request(&install.dir.path().join("absent.obj")))
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.message(), "Failed to read OBJ file.");
    assert!(!install.imports().exists());
}

#[test]
fn test_convert_against_truncated_archive() {
    let install = install();
    let obj = install.write_obj("panel.obj", QUAD);
    let bytes = std::fs::read(&install.archive).unwrap();
    std::fs::write(&install.archive, &bytes[..6]).unwrap();

    let mut converter = install.converter();
    assert!(!converter.convert(
        install.game_dir(),
        &obj,
        TARGET,
        &install.archive,
        "models/custom/panel",
        false,
    ));
    assert_eq!(converter.last_error_message(), "Failed to read .resources file.");
    assert!(!converter.has_fatal_error());
    assert!(!install.dir.path().join("panel.obj.tmp").exists());
}

#[test]
fn test_convert_without_codec_is_fatal() {
    let install = install();
    let obj = install.write_obj("panel.obj", QUAD);

    if std::env::var_os(eternal_resources::OODLE_ENV_VAR).is_some() {
        return;
    }

    // no injected codec and no Oodle runtime in the fake install
    let mut converter = ModelConverter::new(ConverterOptions {
        imports_root: install.imports(),
        ..Default::default()
    });

    assert!(!converter.convert(
        install.game_dir(),
        &obj,
        TARGET,
        &install.archive,
        "models/custom/panel",
        false,
    ));
    assert!(converter.has_fatal_error());
    assert_eq!(
        converter.last_error_message(),
        "Failed to load the oodle library."
    );
}
