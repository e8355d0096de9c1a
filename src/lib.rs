//! Readers, writers and spatial index builders for Re-Volt level files.
//!
//! | File   | Decode                      | Encode                      |
//! |--------|-----------------------------|-----------------------------|
//! | `.prm` | [`world::decode_prm`]       | [`world::encode_prm`]       |
//! | `.w`   | [`world::decode_world`]     | [`world::encode_world`]     |
//! | `.ncp` | [`collision::decode_ncp`]   | [`collision::encode_ncp`]   |
//! | `.por` | [`placement::decode_por`]   | [`placement::encode_por`]   |
//! | `.rim` | [`placement::decode_rim`]   | [`placement::encode_rim`]   |
//!
//! Builders: [`collision::build_lookup_grid`] and
//! [`visibility::build_bigcubes`].

pub mod codec;
pub mod collision;
pub mod error;
pub mod math;
pub mod placement;
pub mod visibility;
pub mod world;

pub use collision::{
    build_lookup_grid, decode_ncp, encode_ncp, read_ncp, validate_lookup_grid, write_ncp,
    GridParams, LookupGrid, LookupList, Polyhedron, WorldNcp,
};
pub use error::{Decoded, DecodeError, Diagnostic, EncodeError, GridError, IndexSite};
pub use math::{BoundingBox, Plane, Uv, Vector};
pub use placement::{
    decode_por, decode_rim, encode_por, encode_rim, read_por, read_rim, write_por, write_rim,
    PorEntry, PorFile, RimEntry, RimFile,
};
pub use visibility::{build_bigcubes, BigCube, BigCubeConfig};
pub use world::{
    decode_prm, decode_world, encode_prm, encode_world, read_prm, read_world, write_prm,
    write_world, EnvList, Frame, Mesh, Polygon, TexAnimation, Vertex, World, WorldMesh,
};
