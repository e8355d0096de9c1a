//! Byte-order policy and the shared read/write plumbing for every format.
//!
//! All Re-Volt level files are little-endian. [`ENDIAN`] is the only place
//! that fact lives: the whole-file entry points hand it to the top-level
//! record and every record passes the byte order it was given down to its
//! fields.

pub mod array;

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};

use crate::error::{DecodeError, EncodeError};

pub use array::{
    read_array_with, read_count, read_counted, read_elements, write_count, write_counted,
    write_elements, CountField, DeclaredCount, MinSize, MAX_TRUNCATED_COUNT,
};

pub const ENDIAN: Endian = Endian::Little;

// ============================================================================
// Fixed-width field helpers
// ============================================================================

pub fn read_i16<R: Read + Seek>(reader: &mut R) -> BinResult<i16> {
    i16::read_options(reader, ENDIAN, ())
}

pub fn read_u16<R: Read + Seek>(reader: &mut R) -> BinResult<u16> {
    u16::read_options(reader, ENDIAN, ())
}

pub fn read_i32<R: Read + Seek>(reader: &mut R) -> BinResult<i32> {
    i32::read_options(reader, ENDIAN, ())
}

pub fn read_u32<R: Read + Seek>(reader: &mut R) -> BinResult<u32> {
    u32::read_options(reader, ENDIAN, ())
}

/// Floats move by bit pattern so NaN payloads and -0.0 survive a round trip.
pub fn read_f32<R: Read + Seek>(reader: &mut R) -> BinResult<f32> {
    read_u32(reader).map(f32::from_bits)
}

pub fn write_i16<W: Write + Seek>(value: i16, writer: &mut W) -> BinResult<()> {
    value.write_options(writer, ENDIAN, ())
}

pub fn write_u16<W: Write + Seek>(value: u16, writer: &mut W) -> BinResult<()> {
    value.write_options(writer, ENDIAN, ())
}

pub fn write_i32<W: Write + Seek>(value: i32, writer: &mut W) -> BinResult<()> {
    value.write_options(writer, ENDIAN, ())
}

pub fn write_u32<W: Write + Seek>(value: u32, writer: &mut W) -> BinResult<()> {
    value.write_options(writer, ENDIAN, ())
}

pub fn write_f32<W: Write + Seek>(value: f32, writer: &mut W) -> BinResult<()> {
    write_u32(value.to_bits(), writer)
}

/// Bytes left between the current position and the end of the stream.
pub fn remaining<R: Seek>(reader: &mut R) -> std::io::Result<u64> {
    let here = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(here))?;
    Ok(end.saturating_sub(here))
}

// ============================================================================
// Whole-file entry points
// ============================================================================

/// Read one top-level record from a caller-owned stream.
pub fn read_record<T, R>(reader: &mut R) -> Result<T, DecodeError>
where
    T: for<'a> BinRead<Args<'a> = ()>,
    R: Read + Seek,
{
    let start = reader.stream_position()?;
    let stream_len = start + remaining(reader)?;
    T::read_options(reader, ENDIAN, ()).map_err(|e| DecodeError::from_binrw(e, stream_len))
}

pub fn decode_record<T>(bytes: &[u8]) -> Result<T, DecodeError>
where
    T: for<'a> BinRead<Args<'a> = ()>,
{
    let mut cursor = Cursor::new(bytes);
    let value = read_record(&mut cursor)?;
    let trailing = bytes.len() as u64 - cursor.position();
    if trailing > 0 {
        tracing::debug!(trailing, "ignoring bytes after the last record");
    }
    Ok(value)
}

/// Write one top-level record to a caller-owned stream.
pub fn write_record<T, W>(value: &T, writer: &mut W) -> Result<(), EncodeError>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
    W: Write + Seek,
{
    value.write_options(writer, ENDIAN, ())?;
    Ok(())
}

pub fn encode_record<T>(value: &T) -> Result<Vec<u8>, EncodeError>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    let mut cursor = Cursor::new(Vec::new());
    write_record(value, &mut cursor)?;
    Ok(cursor.into_inner())
}
