//! Mesh bodies shared by `.prm` models and `.w` world meshes.
//!
//! Binary layout of a mesh body:
//! ```text
//! [2 bytes]  polygon_count (i16)
//! [2 bytes]  vertex_count (i16)
//! [polygon_count × 60 bytes]  Polygon
//! [vertex_count × 24 bytes]   Vertex
//! ```
//! A world mesh prefixes the body with a bounding sphere (16 bytes) and a
//! bounding box (24 bytes).

use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite};
use cgmath::Vector3;
use serde::Serialize;

use crate::codec::{self, read_count, read_elements, write_count, write_elements, MinSize};
use crate::error::{Decoded, DecodeError, Diagnostic, EncodeError, IndexSite};
use crate::math::{BoundingBox, Uv, Vector};
use crate::visibility::bsphere::ritter_bounding_sphere;

/// Polygon has four corners; triangles otherwise.
pub const POLY_QUAD: i16 = 0x001;
/// Polygon is environment-mapped and owns one entry of the world's env list.
pub const POLY_ENV: i16 = 0x800;

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Polygon {
    // render flag bits; only POLY_QUAD and POLY_ENV mean anything to the codec
    pub poly_type: i16,
    pub texture: i16,
    // fourth index is carried through untouched for triangles
    pub vertex_indices: [i16; 4],
    // packed 0xAARRGGBB per corner
    pub colors: [u32; 4],
    pub texcoords: [Uv; 4],
}

impl MinSize for Polygon {
    const MIN_SIZE: usize = 60;
}

impl Polygon {
    pub fn is_quad(&self) -> bool {
        self.poly_type & POLY_QUAD != 0
    }

    pub fn is_env_mapped(&self) -> bool {
        self.poly_type & POLY_ENV != 0
    }

    pub fn corner_count(&self) -> usize {
        if self.is_quad() {
            4
        } else {
            3
        }
    }

    /// Vertex indices the polygon actually draws with.
    pub fn active_indices(&self) -> &[i16] {
        &self.vertex_indices[..self.corner_count()]
    }

    /// `[r, g, b, a]` of one corner colour, or `None` past the fourth corner.
    pub fn color_rgba(&self, corner: usize) -> Option<[u8; 4]> {
        let c = *self.colors.get(corner)?;
        Some([(c >> 16) as u8, (c >> 8) as u8, c as u8, (c >> 24) as u8])
    }
}

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vertex {
    pub position: Vector,
    pub normal: Vector,
}

impl MinSize for Vertex {
    const MIN_SIZE: usize = 24;
}

/// Polygons plus the vertices they index. Also the whole of a `.prm` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mesh {
    pub polygons: Vec<Polygon>,
    pub vertices: Vec<Vertex>,
}

impl BinRead for Mesh {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        // both counts precede both arrays
        let polygon_count = read_count::<i16, _>(reader, endian)?;
        let vertex_count = read_count::<i16, _>(reader, endian)?;
        let polygons = read_elements(reader, endian, polygon_count)?;
        let vertices = read_elements(reader, endian, vertex_count)?;
        Ok(Mesh { polygons, vertices })
    }
}

impl BinWrite for Mesh {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        write_count::<i16, _>(self.polygons.len(), writer, endian)?;
        write_count::<i16, _>(self.vertices.len(), writer, endian)?;
        write_elements(&self.polygons, writer, endian)?;
        write_elements(&self.vertices, writer, endian)
    }
}

impl Mesh {
    /// Out-of-range vertex references, tagged with `mesh` for the report.
    pub fn index_diagnostics(&self, mesh: usize) -> Vec<Diagnostic> {
        let len = self.vertices.len();
        let mut out = vec![];
        for (polygon, poly) in self.polygons.iter().enumerate() {
            for (corner, &index) in poly.active_indices().iter().enumerate() {
                if index < 0 || index as usize >= len {
                    out.push(Diagnostic::IndexOutOfRange {
                        site: IndexSite::PolygonVertex {
                            mesh,
                            polygon,
                            corner,
                        },
                        index: index as i64,
                        len,
                    });
                }
            }
        }
        out
    }

    pub fn positions(&self) -> impl Iterator<Item = &Vector3<f32>> {
        self.vertices.iter().map(|v| &v.position.0)
    }

    pub fn env_polygon_count(&self) -> usize {
        self.polygons.iter().filter(|p| p.is_env_mapped()).count()
    }
}

/// A mesh as stored in a `.w` world, with its culling volumes.
#[binrw]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldMesh {
    pub bound_ball_center: Vector,
    pub bound_ball_radius: f32,
    pub bbox: BoundingBox,
    pub mesh: Mesh,
}

impl MinSize for WorldMesh {
    const MIN_SIZE: usize = 44;
}

impl WorldMesh {
    /// Wrap `mesh` with a bounding sphere and box fitted to its vertices.
    pub fn from_mesh(mesh: Mesh) -> Self {
        let points: Vec<Vector3<f32>> = mesh.positions().copied().collect();
        let (center, radius) = ritter_bounding_sphere(&points);
        let bbox = BoundingBox::from_points(points.iter()).unwrap_or_default();
        WorldMesh {
            bound_ball_center: Vector(center),
            bound_ball_radius: radius,
            bbox,
            mesh,
        }
    }

    /// Whether the stored sphere and box both enclose every vertex.
    pub fn bounds_contain_vertices(&self) -> bool {
        let tolerance = 1e-4 * self.bound_ball_radius.abs().max(1.0);
        self.mesh.positions().all(|p| {
            self.bbox.contains(p, tolerance)
                && Vector(*p).distance(&self.bound_ball_center)
                    <= self.bound_ball_radius + tolerance
        })
    }
}

// ============================================================================
// .prm entry points
// ============================================================================

fn finish_prm(mesh: Mesh) -> Decoded<Mesh> {
    let diagnostics = mesh.index_diagnostics(0);
    crate::error::report(&diagnostics);
    tracing::debug!(
        polygons = mesh.polygons.len(),
        vertices = mesh.vertices.len(),
        "decoded prm mesh"
    );
    Decoded {
        value: mesh,
        diagnostics,
    }
}

pub fn decode_prm(bytes: &[u8]) -> Result<Decoded<Mesh>, DecodeError> {
    codec::decode_record(bytes).map(finish_prm)
}

pub fn read_prm<R: Read + Seek>(reader: &mut R) -> Result<Decoded<Mesh>, DecodeError> {
    codec::read_record(reader).map(finish_prm)
}

pub fn encode_prm(mesh: &Mesh) -> Result<Vec<u8>, EncodeError> {
    codec::encode_record(mesh)
}

pub fn write_prm<W: Write + Seek>(mesh: &Mesh, writer: &mut W) -> Result<(), EncodeError> {
    codec::write_record(mesh, writer)
}
