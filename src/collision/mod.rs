//! `.ncp` collision files: convex polyhedra plus the lookup grid over them.
//!
//! Binary layout:
//! ```text
//! [2 bytes]  polyhedron_count (i16)
//! [polyhedron_count × 112 bytes]  Polyhedron
//! [..]       LookupGrid, running to the end of the file
//! ```
//! The file stores no cell count, so every byte after the grid parameters
//! is read as lookup lists. Bytes past the last complete list do not form
//! one and fail the decode as a truncated stream.

pub mod grid;

use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite};
use cgmath::{InnerSpace, Vector3};
use serde::Serialize;

use crate::codec::{self, read_counted, write_counted, MinSize};
use crate::error::{Decoded, DecodeError, Diagnostic, EncodeError, GridError};
use crate::math::{BoundingBox, Plane};
use crate::world::{Polygon, Vertex};

pub use grid::{
    build_lookup_grid, validate_lookup_grid, GridParams, LookupGrid, LookupList, MissingEntry,
    MAX_GRID_CELLS,
};

/// Polyhedron is a quad (four cutting planes); triangles otherwise.
pub const POLYHEDRON_QUAD: i32 = 0x1;

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Polyhedron {
    pub poly_type: i32,
    // surface material id
    pub surface: i32,
    // floor plane first, then one cutting plane per edge; spare slots are zero
    pub planes: [Plane; 5],
    pub bbox: BoundingBox,
}

impl MinSize for Polyhedron {
    const MIN_SIZE: usize = 112;
}

impl Polyhedron {
    pub fn is_quad(&self) -> bool {
        self.poly_type & POLYHEDRON_QUAD != 0
    }

    /// Floor plane plus one per edge.
    pub fn plane_count(&self) -> usize {
        if self.is_quad() {
            5
        } else {
            4
        }
    }

    pub fn active_planes(&self) -> &[Plane] {
        &self.planes[..self.plane_count()]
    }

    /// Whether `point` lies inside every used half-space.
    pub fn contains(&self, point: &Vector3<f32>) -> bool {
        self.active_planes()
            .iter()
            .filter(|plane| !plane.is_unused())
            .all(|plane| plane.contains(point))
    }

    /// Collision volume for one face of a mesh.
    ///
    /// The face plane becomes the floor and each edge gets a cutting plane
    /// facing away from the face, written from the closing edge backwards.
    /// The normal follows the corner winding. `None` when a corner index
    /// misses `vertices` or the face or one of its edges has no extent.
    pub fn from_polygon(polygon: &Polygon, vertices: &[Vertex], surface: i32) -> Option<Self> {
        let corners = polygon
            .active_indices()
            .iter()
            .map(|&i| {
                let v = vertices.get(usize::try_from(i).ok()?)?;
                Some(v.position.0)
            })
            .collect::<Option<Vec<Vector3<f32>>>>()?;
        let normal = unit(face_normal(&corners))?;

        let mut planes = [Plane::default(); 5];
        planes[0] = Plane::through(normal, &corners[0]);
        let n = corners.len();
        for (slot, i) in (0..n).rev().enumerate() {
            let a = corners[i];
            let b = corners[(i + 1) % n];
            planes[slot + 1] = Plane::through(unit(normal.cross(a - b))?, &a);
        }

        Some(Polyhedron {
            poly_type: if polygon.is_quad() { POLYHEDRON_QUAD } else { 0 },
            surface,
            planes,
            bbox: BoundingBox::from_points(corners.iter())?,
        })
    }

    /// Corners of the floor face, where it meets each pair of neighbouring
    /// cutting planes. Same order as the polygon it was built from.
    pub fn corners(&self) -> Vec<Vector3<f32>> {
        let edges = self.plane_count() - 1;
        let floor = &self.planes[0];
        let mut out: Vec<Vector3<f32>> = (0..edges)
            .filter_map(|k| {
                Plane::intersection(floor, &self.planes[k + 1], &self.planes[(k + 1) % edges + 1])
            })
            .collect();
        out.reverse();
        out
    }
}

/// Newell normal of a closed loop, unnormalised.
fn face_normal(corners: &[Vector3<f32>]) -> Vector3<f32> {
    let mut sum = Vector3::new(0.0, 0.0, 0.0);
    for (i, a) in corners.iter().enumerate() {
        let b = corners[(i + 1) % corners.len()];
        sum += Vector3::new(
            (a.y - b.y) * (a.z + b.z),
            (a.z - b.z) * (a.x + b.x),
            (a.x - b.x) * (a.y + b.y),
        );
    }
    sum
}

fn unit(v: Vector3<f32>) -> Option<Vector3<f32>> {
    let len = v.magnitude();
    (len.is_finite() && len > 0.0).then(|| v / len)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldNcp {
    pub polyhedra: Vec<Polyhedron>,
    pub lookup: LookupGrid,
}

impl WorldNcp {
    /// Grid dimension mismatch first, then bad polyhedron references.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self.lookup.dimension_diagnostic().into_iter().collect();
        out.extend(self.lookup.index_diagnostics(self.polyhedra.len()));
        out
    }

    /// Replace the stored grid with one built from the polyhedra, keeping its params.
    pub fn rebuild_lookup(&mut self) -> Result<(), GridError> {
        self.lookup = build_lookup_grid(&self.polyhedra, self.lookup.params)?;
        Ok(())
    }
}

impl BinRead for WorldNcp {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let polyhedra = read_counted::<i16, _, _>(reader, endian)?;
        let lookup = LookupGrid::read_options(reader, endian, ())?;
        Ok(WorldNcp { polyhedra, lookup })
    }
}

impl BinWrite for WorldNcp {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        write_counted::<i16, _, _>(&self.polyhedra, writer, endian)?;
        self.lookup.write_options(writer, endian, ())
    }
}

fn finish_ncp(ncp: WorldNcp) -> Decoded<WorldNcp> {
    let diagnostics = ncp.diagnostics();
    crate::error::report(&diagnostics);
    tracing::debug!(
        polyhedra = ncp.polyhedra.len(),
        rows = ncp.lookup.rows(),
        cols = ncp.lookup.cols(),
        cells = ncp.lookup.lists().len(),
        "decoded ncp"
    );
    Decoded {
        value: ncp,
        diagnostics,
    }
}

pub fn decode_ncp(bytes: &[u8]) -> Result<Decoded<WorldNcp>, DecodeError> {
    codec::decode_record(bytes).map(finish_ncp)
}

pub fn read_ncp<R: Read + Seek>(reader: &mut R) -> Result<Decoded<WorldNcp>, DecodeError> {
    codec::read_record(reader).map(finish_ncp)
}

pub fn encode_ncp(ncp: &WorldNcp) -> Result<Vec<u8>, EncodeError> {
    codec::encode_record(ncp)
}

pub fn write_ncp<W: Write + Seek>(ncp: &WorldNcp, writer: &mut W) -> Result<(), EncodeError> {
    codec::write_record(ncp, writer)
}
