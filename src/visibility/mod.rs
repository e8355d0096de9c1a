//! Big cubes: coarse bounding spheres over groups of world meshes, used to
//! cull whole groups before any per-mesh work.

pub mod bsphere;
pub mod config;
pub mod partition;

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite};
use serde::Serialize;

use crate::codec::{read_counted, write_counted, MinSize};
use crate::error::{Diagnostic, IndexSite};
use crate::math::Vector;

pub use config::BigCubeConfig;
pub use partition::build_bigcubes;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BigCube {
    pub center: Vector,
    pub radius: f32,
    // indices into the owning world's mesh list
    pub mesh_indices: Vec<i32>,
}

impl MinSize for BigCube {
    const MIN_SIZE: usize = 20;
}

impl BigCube {
    pub fn index_diagnostics(&self, cube: usize, mesh_count: usize) -> Vec<Diagnostic> {
        self.mesh_indices
            .iter()
            .enumerate()
            .filter(|(_, &index)| index < 0 || index as usize >= mesh_count)
            .map(|(slot, &index)| Diagnostic::IndexOutOfRange {
                site: IndexSite::BigCubeMesh { cube, slot },
                index: index as i64,
                len: mesh_count,
            })
            .collect()
    }
}

impl BinRead for BigCube {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let center = Vector::read_options(reader, endian, ())?;
        let radius = f32::read_options(reader, endian, ())?;
        let mesh_indices = read_counted::<i32, _, _>(reader, endian)?;
        Ok(BigCube {
            center,
            radius,
            mesh_indices,
        })
    }
}

impl BinWrite for BigCube {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.center.write_options(writer, endian, ())?;
        self.radius.write_options(writer, endian, ())?;
        write_counted::<i32, _, _>(&self.mesh_indices, writer, endian)
    }
}
