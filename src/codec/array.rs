use std::io::{self, Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};

use super::remaining;
use crate::error::{CountOverflow, MalformedCount};

/// Largest count still treated as an honest declaration in a cut-off file.
///
/// A count that cannot fit in the remaining bytes is reported as a
/// truncated stream up to this size and as a malformed count above it.
pub const MAX_TRUNCATED_COUNT: i64 = 65_536;

/// Smallest encoded size of one element, used to bound declared counts.
pub trait MinSize {
    const MIN_SIZE: usize;
}

impl MinSize for i32 {
    const MIN_SIZE: usize = 4;
}

impl MinSize for u32 {
    const MIN_SIZE: usize = 4;
}

/// The integer type a count is stored as.
pub trait CountField {
    const MAX: usize;

    fn read_raw<R: Read + Seek>(reader: &mut R, endian: Endian) -> BinResult<i64>;
    fn write_raw<W: Write + Seek>(len: usize, writer: &mut W, endian: Endian) -> BinResult<()>;
}

impl CountField for i16 {
    const MAX: usize = i16::MAX as usize;

    fn read_raw<R: Read + Seek>(reader: &mut R, endian: Endian) -> BinResult<i64> {
        i16::read_options(reader, endian, ()).map(i64::from)
    }

    fn write_raw<W: Write + Seek>(len: usize, writer: &mut W, endian: Endian) -> BinResult<()> {
        (len as i16).write_options(writer, endian, ())
    }
}

impl CountField for i32 {
    const MAX: usize = i32::MAX as usize;

    fn read_raw<R: Read + Seek>(reader: &mut R, endian: Endian) -> BinResult<i64> {
        i32::read_options(reader, endian, ()).map(i64::from)
    }

    fn write_raw<W: Write + Seek>(len: usize, writer: &mut W, endian: Endian) -> BinResult<()> {
        (len as i32).write_options(writer, endian, ())
    }
}

/// A count as read from the stream, remembering where it sat.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredCount {
    pub value: i64,
    pub position: u64,
}

pub fn read_count<C: CountField, R: Read + Seek>(
    reader: &mut R,
    endian: Endian,
) -> BinResult<DeclaredCount> {
    let position = reader.stream_position()?;
    let value = C::read_raw(reader, endian)?;
    Ok(DeclaredCount { value, position })
}

pub fn write_count<C: CountField, W: Write + Seek>(
    len: usize,
    writer: &mut W,
    endian: Endian,
) -> BinResult<()> {
    if len > C::MAX {
        return Err(binrw::Error::Custom {
            pos: writer.stream_position()?,
            err: Box::new(CountOverflow { len, max: C::MAX }),
        });
    }
    C::write_raw(len, writer, endian)
}

/// Check a declared count against the bytes left and return it as a length.
fn admit<R: Seek>(reader: &mut R, count: DeclaredCount, min_size: usize) -> BinResult<usize> {
    let left = remaining(reader)?;
    let malformed = || binrw::Error::Custom {
        pos: count.position,
        err: Box::new(MalformedCount {
            count: count.value,
            remaining: left,
            min_element_size: min_size,
        }),
    };

    if count.value < 0 {
        return Err(malformed());
    }

    let capacity = left / min_size.max(1) as u64;
    if count.value as u64 > capacity {
        if count.value > MAX_TRUNCATED_COUNT {
            return Err(malformed());
        }
        return Err(binrw::Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "{} elements of at least {} bytes need more than the {} bytes left",
                count.value, min_size, left
            ),
        )));
    }

    Ok(count.value as usize)
}

/// Decode `count` elements with `element`, which may itself read nested arrays.
///
/// Fails before reading any element when the count is implausible, so a
/// short stream never yields a partially populated array.
pub fn read_array_with<T, R, F>(
    reader: &mut R,
    count: DeclaredCount,
    min_size: usize,
    mut element: F,
) -> BinResult<Vec<T>>
where
    R: Read + Seek,
    F: FnMut(&mut R) -> BinResult<T>,
{
    let len = admit(reader, count, min_size)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(element(reader)?);
    }
    Ok(out)
}

pub fn read_elements<T, R>(
    reader: &mut R,
    endian: Endian,
    count: DeclaredCount,
) -> BinResult<Vec<T>>
where
    T: for<'a> BinRead<Args<'a> = ()> + MinSize,
    R: Read + Seek,
{
    read_array_with(reader, count, T::MIN_SIZE, |r| T::read_options(r, endian, ()))
}

/// Count field immediately followed by its elements.
pub fn read_counted<C, T, R>(reader: &mut R, endian: Endian) -> BinResult<Vec<T>>
where
    C: CountField,
    T: for<'a> BinRead<Args<'a> = ()> + MinSize,
    R: Read + Seek,
{
    let count = read_count::<C, _>(reader, endian)?;
    read_elements(reader, endian, count)
}

pub fn write_elements<T, W>(items: &[T], writer: &mut W, endian: Endian) -> BinResult<()>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
    W: Write + Seek,
{
    for item in items {
        item.write_options(writer, endian, ())?;
    }
    Ok(())
}

pub fn write_counted<C, T, W>(items: &[T], writer: &mut W, endian: Endian) -> BinResult<()>
where
    C: CountField,
    T: for<'a> BinWrite<Args<'a> = ()>,
    W: Write + Seek,
{
    write_count::<C, _>(items.len(), writer, endian)?;
    write_elements(items, writer, endian)
}
