// PRM mesh files: decode scenarios, diagnostics and byte-exact round trips

use std::io::{Cursor, Seek, SeekFrom};

use rvlevel_lib::error::{DecodeError, Diagnostic, EncodeError, IndexSite};
use rvlevel_lib::world::{decode_prm, encode_prm, read_prm, write_prm, Mesh, POLY_QUAD};

#[path = "common/mod.rs"]
mod common;

use common::Bytes;

#[test]
fn single_vertex_no_polygons() {
    common::init_tracing();
    let bytes = Bytes::new()
        .i16(0)
        .i16(1)
        .vertex([0.0, 0.0, 0.0], [0.0, 1.0, 0.0])
        .build();

    let decoded = decode_prm(&bytes).expect("Failed to decode PRM");
    assert!(decoded.is_clean());
    let mesh = decoded.value;
    assert!(mesh.polygons.is_empty());
    assert_eq!(mesh.vertices.len(), 1);
    assert_eq!(mesh.vertices[0].position.to_slice(), [0.0, 0.0, 0.0]);
    assert_eq!(mesh.vertices[0].normal.to_slice(), [0.0, 1.0, 0.0]);
}

#[test]
fn empty_mesh_decodes() {
    let decoded = decode_prm(&[0, 0, 0, 0]).expect("Failed to decode empty PRM");
    assert_eq!(decoded.value, Mesh::default());
    assert_eq!(encode_prm(&decoded.value).unwrap(), vec![0, 0, 0, 0]);
}

#[test]
fn hand_built_prm_round_trips_exactly() {
    let bytes = Bytes::new()
        .i16(2)
        .i16(4)
        .polygon(POLY_QUAD, [0, 1, 2, 3])
        .polygon(0, [3, 2, 1, 0x7FFF])
        .vertex([0.0, 0.0, 0.0], [0.0, -1.0, 0.0])
        .vertex([100.0, 0.0, 0.0], [0.0, -1.0, 0.0])
        .vertex([100.0, 0.0, 100.0], [0.0, -1.0, 0.0])
        .vertex([0.0, -0.0, 100.0], [0.0, -1.0, 0.0])
        .build();
    assert_eq!(bytes.len(), 4 + 2 * 60 + 4 * 24);

    let decoded = decode_prm(&bytes).expect("Failed to decode PRM");
    // triangle's fourth index is not a reference
    assert!(decoded.is_clean(), "{:?}", decoded.diagnostics);
    assert_eq!(decoded.value.polygons[1].vertex_indices[3], 0x7FFF);

    let encoded = encode_prm(&decoded.value).expect("Failed to encode PRM");
    assert_eq!(encoded, bytes);
}

#[test]
fn out_of_range_vertex_is_a_diagnostic() {
    let bytes = Bytes::new()
        .i16(1)
        .i16(3)
        .polygon(0, [0, 1, 3, 0])
        .vertex([0.0; 3], [0.0, 1.0, 0.0])
        .vertex([1.0, 0.0, 0.0], [0.0, 1.0, 0.0])
        .vertex([0.0, 0.0, 1.0], [0.0, 1.0, 0.0])
        .build();

    let decoded = decode_prm(&bytes).expect("bad index must not abort the decode");
    assert_eq!(
        decoded.diagnostics,
        vec![Diagnostic::IndexOutOfRange {
            site: IndexSite::PolygonVertex {
                mesh: 0,
                polygon: 0,
                corner: 2,
            },
            index: 3,
            len: 3,
        }]
    );
    assert_eq!(decoded.value.vertices.len(), 3);
}

#[test]
fn missing_vertices_are_truncation() {
    let bytes = Bytes::new()
        .i16(0)
        .i16(2)
        .vertex([0.0; 3], [0.0; 3])
        .build();
    match decode_prm(&bytes) {
        Err(DecodeError::TruncatedStream { stream_len }) => assert_eq!(stream_len, 28),
        other => panic!("expected TruncatedStream, got {other:?}"),
    }
}

#[test]
fn negative_polygon_count_is_malformed() {
    let bytes = Bytes::new().i16(-5).i16(0).build();
    match decode_prm(&bytes) {
        Err(DecodeError::MalformedCount { position, detail }) => {
            assert_eq!(position, 0);
            assert_eq!(detail.count, -5);
        }
        other => panic!("expected MalformedCount, got {other:?}"),
    }
}

#[test]
fn too_many_polygons_fail_to_encode() {
    let mesh = Mesh {
        polygons: vec![Default::default(); i16::MAX as usize + 1],
        vertices: vec![],
    };
    assert!(matches!(
        encode_prm(&mesh),
        Err(EncodeError::CountOverflow { position: 0, .. })
    ));
}

#[test]
fn stream_and_file_entry_points() {
    let mesh = Mesh {
        polygons: vec![common::quad([0, 1, 2, 3], false)],
        vertices: vec![
            common::vertex(0.0, 0.0, 0.0),
            common::vertex(1.0, 0.0, 0.0),
            common::vertex(1.0, 0.0, 1.0),
            common::vertex(0.0, 0.0, 1.0),
        ],
    };

    let mut cursor = Cursor::new(Vec::new());
    write_prm(&mesh, &mut cursor).unwrap();
    cursor.set_position(0);
    assert_eq!(read_prm(&mut cursor).unwrap().value, mesh);

    let mut file = tempfile::tempfile().expect("Failed to create temp file");
    write_prm(&mesh, &mut file).expect("Failed to write PRM");
    file.seek(SeekFrom::Start(0)).unwrap();
    let back = read_prm(&mut file).expect("Failed to read PRM back");
    println!(
        "  ✓ {} polygons, {} vertices",
        back.value.polygons.len(),
        back.value.vertices.len()
    );
    assert_eq!(back.value, mesh);
}
