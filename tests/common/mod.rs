// Common test utilities: little-endian stream builders and sample records
#![allow(dead_code)]

use rvlevel_lib::math::{BoundingBox, Plane, Uv, Vector};
use rvlevel_lib::world::{Mesh, Polygon, Vertex, WorldMesh, POLY_ENV, POLY_QUAD};
use rvlevel_lib::Polyhedron;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Hand-assembled little-endian byte stream.
#[derive(Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn floats(self, values: &[f32]) -> Self {
        values.iter().fold(self, |b, &v| b.f32(v))
    }

    pub fn vector(self, x: f32, y: f32, z: f32) -> Self {
        self.floats(&[x, y, z])
    }

    /// A 60-byte polygon record.
    pub fn polygon(self, poly_type: i16, indices: [i16; 4]) -> Self {
        let mut b = self.i16(poly_type).i16(-1);
        for i in indices {
            b = b.i16(i);
        }
        b.u32(0xFFFFFFFF)
            .u32(0xFF808080)
            .u32(0xFF000000)
            .u32(0x00FFFFFF)
            .floats(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
    }

    pub fn vertex(self, position: [f32; 3], normal: [f32; 3]) -> Self {
        self.floats(&position).floats(&normal)
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

pub fn vertex(x: f32, y: f32, z: f32) -> Vertex {
    Vertex {
        position: Vector::new(x, y, z),
        normal: Vector::new(0.0, 1.0, 0.0),
    }
}

pub fn quad(indices: [i16; 4], env: bool) -> Polygon {
    Polygon {
        poly_type: if env { POLY_QUAD | POLY_ENV } else { POLY_QUAD },
        texture: 2,
        vertex_indices: indices,
        colors: [0xFF112233, 0xFF445566, 0xFF778899, 0xFFAABBCC],
        texcoords: [
            Uv { u: 0.0, v: 0.0 },
            Uv { u: 1.0, v: 0.0 },
            Uv { u: 1.0, v: 1.0 },
            Uv { u: 0.0, v: 1.0 },
        ],
    }
}

/// Flat unit square tile at `(x, z)` with one quad.
pub fn tile(x: f32, z: f32, env: bool) -> WorldMesh {
    WorldMesh::from_mesh(Mesh {
        polygons: vec![quad([0, 1, 2, 3], env)],
        vertices: vec![
            vertex(x, 0.0, z),
            vertex(x + 1.0, 0.0, z),
            vertex(x + 1.0, 0.0, z + 1.0),
            vertex(x, 0.0, z + 1.0),
        ],
    })
}

/// Collision polyhedron with only its bounding box filled in.
pub fn polyhedron(xlo: f32, xhi: f32, zlo: f32, zhi: f32) -> Polyhedron {
    Polyhedron {
        poly_type: 1,
        surface: 0,
        planes: [Plane::default(); 5],
        bbox: BoundingBox {
            xlo,
            xhi,
            ylo: -1.0,
            yhi: 1.0,
            zlo,
            zhi,
        },
    }
}

/// Seeded generator so property tests replay the same layouts.
pub fn rng(seed: u64) -> rand::rngs::StdRng {
    rand::SeedableRng::seed_from_u64(seed)
}
