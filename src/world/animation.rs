use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite};
use serde::Serialize;

use crate::codec::{read_counted, write_counted, MinSize};
use crate::math::Uv;

/// One step of a texture animation.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Frame {
    pub texture: i32,
    // time the frame stays up
    pub delay: f32,
    pub uv: [Uv; 4],
}

impl MinSize for Frame {
    const MIN_SIZE: usize = 40;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TexAnimation {
    pub frames: Vec<Frame>,
}

impl MinSize for TexAnimation {
    const MIN_SIZE: usize = 4;
}

impl TexAnimation {
    /// Total playback time of one loop.
    pub fn duration(&self) -> f32 {
        self.frames.iter().map(|f| f.delay).sum()
    }
}

impl BinRead for TexAnimation {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let frames = read_counted::<i32, _, _>(reader, endian)?;
        Ok(TexAnimation { frames })
    }
}

impl BinWrite for TexAnimation {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        write_counted::<i32, _, _>(&self.frames, writer, endian)
    }
}
