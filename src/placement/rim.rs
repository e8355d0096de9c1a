//! Binary layout:
//! ```text
//! [2 bytes]  entry_count (i16)
//! [entry_count × 92 bytes]  RimEntry
//! ```

use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite};
use serde::Serialize;

use crate::codec::{self, read_counted, write_counted, MinSize};
use crate::error::{DecodeError, EncodeError};
use crate::math::{BoundingBox, Plane, Vector};

/// One mirror quad.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RimEntry {
    pub flags: u32,
    pub plane_normal: Vector,
    pub plane_distance: f32,
    pub bbox: BoundingBox,
    pub vertices: [Vector; 4],
}

impl MinSize for RimEntry {
    const MIN_SIZE: usize = 92;
}

impl RimEntry {
    pub fn plane(&self) -> Plane {
        Plane {
            normal: self.plane_normal,
            distance: self.plane_distance,
        }
    }

    pub fn bbox_contains_vertices(&self) -> bool {
        self.vertices.iter().all(|v| self.bbox.contains(&v.0, 0.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RimFile {
    pub entries: Vec<RimEntry>,
}

impl BinRead for RimFile {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        Ok(RimFile {
            entries: read_counted::<i16, _, _>(reader, endian)?,
        })
    }
}

impl BinWrite for RimFile {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        write_counted::<i16, _, _>(&self.entries, writer, endian)
    }
}

fn finish_rim(rim: RimFile) -> RimFile {
    tracing::debug!(entries = rim.entries.len(), "decoded rim");
    rim
}

pub fn decode_rim(bytes: &[u8]) -> Result<RimFile, DecodeError> {
    codec::decode_record(bytes).map(finish_rim)
}

pub fn read_rim<R: Read + Seek>(reader: &mut R) -> Result<RimFile, DecodeError> {
    codec::read_record(reader).map(finish_rim)
}

pub fn encode_rim(rim: &RimFile) -> Result<Vec<u8>, EncodeError> {
    codec::encode_record(rim)
}

pub fn write_rim<W: Write + Seek>(rim: &RimFile, writer: &mut W) -> Result<(), EncodeError> {
    codec::write_record(rim, writer)
}
