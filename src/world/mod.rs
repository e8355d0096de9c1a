//! `.w` world file: meshes, big cubes, texture animations and env colours.
//!
//! Binary layout:
//! ```text
//! [4 bytes]  mesh_count (i32)
//! [mesh_count × WorldMesh]
//! [4 bytes]  bigcube_count (i32)
//! [bigcube_count × BigCube]
//! [4 bytes]  animation_count (i32)
//! [animation_count × TexAnimation]
//! [n × 4 bytes]  env colours, n = number of POLY_ENV polygons in all meshes
//! ```
//! The env list has no stored count; its length is only known once every
//! mesh has been decoded.

pub mod animation;
pub mod mesh;

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite};
use serde::Serialize;

use crate::codec::{
    self, read_counted, read_elements, write_counted, write_elements, DeclaredCount,
};
use crate::error::{Decoded, DecodeError, Diagnostic, EncodeError, EnvListMismatch};
use crate::visibility::{build_bigcubes, BigCube, BigCubeConfig};

pub use animation::{Frame, TexAnimation};
pub use mesh::{
    decode_prm, encode_prm, read_prm, write_prm, Mesh, Polygon, Vertex, WorldMesh, POLY_ENV,
    POLY_QUAD,
};

/// One packed colour per env-mapped polygon, in mesh then polygon order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvList {
    pub colors: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct World {
    pub meshes: Vec<WorldMesh>,
    pub bigcubes: Vec<BigCube>,
    pub animations: Vec<TexAnimation>,
    pub env_list: EnvList,
}

impl World {
    /// How many env colours the file must carry.
    pub fn env_polygon_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.env_polygon_count()).sum()
    }

    /// Every cross-reference that points outside its target array.
    pub fn index_diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = vec![];
        for (i, mesh) in self.meshes.iter().enumerate() {
            out.extend(mesh.mesh.index_diagnostics(i));
        }
        for (i, cube) in self.bigcubes.iter().enumerate() {
            out.extend(cube.index_diagnostics(i, self.meshes.len()));
        }
        out
    }

    /// Replace the stored big cubes with freshly built ones.
    pub fn rebuild_bigcubes(&mut self, config: &BigCubeConfig) {
        self.bigcubes = build_bigcubes(&self.meshes, config);
    }
}

impl BinRead for World {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let meshes: Vec<WorldMesh> = read_counted::<i32, _, _>(reader, endian)?;
        let bigcubes = read_counted::<i32, _, _>(reader, endian)?;
        let animations = read_counted::<i32, _, _>(reader, endian)?;

        // second pass over what is already decoded
        let env_count = DeclaredCount {
            value: meshes.iter().map(|m| m.mesh.env_polygon_count()).sum::<usize>() as i64,
            position: reader.stream_position()?,
        };
        let colors = read_elements(reader, endian, env_count)?;

        Ok(World {
            meshes,
            bigcubes,
            animations,
            env_list: EnvList { colors },
        })
    }
}

impl BinWrite for World {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let env_polygons = self.env_polygon_count();
        if env_polygons != self.env_list.colors.len() {
            return Err(binrw::Error::Custom {
                pos: writer.stream_position()?,
                err: Box::new(EnvListMismatch {
                    colors: self.env_list.colors.len(),
                    env_polygons,
                }),
            });
        }

        write_counted::<i32, _, _>(&self.meshes, writer, endian)?;
        write_counted::<i32, _, _>(&self.bigcubes, writer, endian)?;
        write_counted::<i32, _, _>(&self.animations, writer, endian)?;
        write_elements(&self.env_list.colors, writer, endian)
    }
}

fn finish_world(world: World) -> Decoded<World> {
    let diagnostics = world.index_diagnostics();
    crate::error::report(&diagnostics);
    tracing::debug!(
        meshes = world.meshes.len(),
        bigcubes = world.bigcubes.len(),
        animations = world.animations.len(),
        env_colors = world.env_list.colors.len(),
        "decoded world"
    );
    Decoded {
        value: world,
        diagnostics,
    }
}

pub fn decode_world(bytes: &[u8]) -> Result<Decoded<World>, DecodeError> {
    codec::decode_record(bytes).map(finish_world)
}

pub fn read_world<R: Read + Seek>(reader: &mut R) -> Result<Decoded<World>, DecodeError> {
    codec::read_record(reader).map(finish_world)
}

pub fn encode_world(world: &World) -> Result<Vec<u8>, EncodeError> {
    codec::encode_record(world)
}

pub fn write_world<W: Write + Seek>(world: &World, writer: &mut W) -> Result<(), EncodeError> {
    codec::write_record(world, writer)
}
