//! Binary layout:
//! ```text
//! [4 bytes]  entry_count (i32)
//! [entry_count × 88 bytes]  PorEntry
//! ```

use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite};
use serde::Serialize;

use crate::codec::{self, read_counted, write_counted, MinSize};
use crate::error::{DecodeError, EncodeError};
use crate::math::Vector;

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PorEntry {
    pub entry_type: u32,
    pub ids: [u32; 2],
    pub center: Vector,
    pub rotation: [[f32; 3]; 3],
    // half extents along the rotated axes
    pub size: Vector,
    // zero in shipped files, kept as found
    pub reserved: [f32; 4],
}

impl MinSize for PorEntry {
    const MIN_SIZE: usize = 88;
}

impl PorEntry {
    pub fn reserved_is_zero(&self) -> bool {
        self.reserved.iter().all(|f| f.to_bits() == 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PorFile {
    pub entries: Vec<PorEntry>,
}

impl BinRead for PorFile {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        Ok(PorFile {
            entries: read_counted::<i32, _, _>(reader, endian)?,
        })
    }
}

impl BinWrite for PorFile {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        write_counted::<i32, _, _>(&self.entries, writer, endian)
    }
}

fn finish_por(por: PorFile) -> PorFile {
    tracing::debug!(entries = por.entries.len(), "decoded por");
    por
}

pub fn decode_por(bytes: &[u8]) -> Result<PorFile, DecodeError> {
    codec::decode_record(bytes).map(finish_por)
}

pub fn read_por<R: Read + Seek>(reader: &mut R) -> Result<PorFile, DecodeError> {
    codec::read_record(reader).map(finish_por)
}

pub fn encode_por(por: &PorFile) -> Result<Vec<u8>, EncodeError> {
    codec::encode_record(por)
}

pub fn write_por<W: Write + Seek>(por: &PorFile, writer: &mut W) -> Result<(), EncodeError> {
    codec::write_record(por, writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_layout() {
        let entry = PorEntry {
            entry_type: 1,
            ids: [7, 8],
            center: Vector::new(1.0, 2.0, 3.0),
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            size: Vector::new(10.0, 20.0, 30.0),
            reserved: [0.0; 4],
        };
        let bytes = encode_por(&PorFile {
            entries: vec![entry],
        })
        .unwrap();
        assert_eq!(bytes.len(), 4 + PorEntry::MIN_SIZE);
        assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[7, 0, 0, 0]);
        // size.x follows center and the 3x3 rotation
        assert_eq!(&bytes[4 + 12 + 12 + 36..4 + 12 + 12 + 40], &10.0f32.to_le_bytes());
        assert!(entry.reserved_is_zero());
    }

    #[test]
    fn test_nonzero_reserved_survives() {
        let entry = PorEntry {
            reserved: [0.0, -0.0, f32::from_bits(0x7FC0_0001), 5.5],
            ..Default::default()
        };
        assert!(!entry.reserved_is_zero());
        let por = PorFile {
            entries: vec![entry],
        };
        let back = decode_por(&encode_por(&por).unwrap()).unwrap();
        let bits: Vec<u32> = back.entries[0].reserved.iter().map(|f| f.to_bits()).collect();
        assert_eq!(bits, vec![0, 0x8000_0000, 0x7FC0_0001, 5.5f32.to_bits()]);
    }

    #[test]
    fn test_empty_file() {
        let por = decode_por(&[0, 0, 0, 0]).unwrap();
        assert!(por.entries.is_empty());
    }
}
