//! Flat placement files: `.por` portals and `.rim` mirrors.
//!
//! Both are a count followed by fixed-size entries; nothing in them refers
//! to any other record.

pub mod por;
pub mod rim;

pub use por::{decode_por, encode_por, read_por, write_por, PorEntry, PorFile};
pub use rim::{decode_rim, encode_rim, read_rim, write_rim, RimEntry, RimFile};
