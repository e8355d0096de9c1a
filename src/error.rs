use std::io;

use serde::Serialize;
use thiserror::Error;

/// A declared element count that no honest stream could back up.
///
/// Raised inside binrw readers as a custom error and lifted into
/// [`DecodeError::MalformedCount`] at the public boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedCount {
    pub count: i64,
    pub remaining: u64,
    pub min_element_size: usize,
}

impl std::fmt::Display for MalformedCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "count {} cannot fit in {} remaining bytes ({} bytes per element)",
            self.count, self.remaining, self.min_element_size
        )
    }
}

/// A length that does not fit the count field it is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountOverflow {
    pub len: usize,
    pub max: usize,
}

impl std::fmt::Display for CountOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} elements exceed the count field maximum of {}", self.len, self.max)
    }
}

/// Env colour list length disagrees with the env-mapped polygon count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvListMismatch {
    pub colors: usize,
    pub env_polygons: usize,
}

impl std::fmt::Display for EnvListMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "env list holds {} colours but {} polygons are env-mapped",
            self.colors, self.env_polygons
        )
    }
}

/// Fatal decode failures. Any of these aborts the whole decode call.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("stream ended after {stream_len} bytes before the record was complete")]
    TruncatedStream { stream_len: u64 },

    #[error("malformed count at byte {position}: {detail}")]
    MalformedCount { position: u64, detail: MalformedCount },

    #[error("decode failed: {0}")]
    Io(#[from] io::Error),

    #[error("decode failed: {0}")]
    Other(String),
}

/// Fatal encode failures.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("count overflow at byte {position}: {detail}")]
    CountOverflow { position: u64, detail: CountOverflow },

    #[error("{0}")]
    EnvListMismatch(EnvListMismatch),

    #[error("encode failed: {0}")]
    Io(#[from] io::Error),

    #[error("encode failed: {0}")]
    Other(String),
}

/// Failures of the lookup grid builder and validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("lookup grid of {rows} x {cols} cells is larger than the {max} cell limit")]
    TooManyCells { rows: usize, cols: usize, max: usize },
}

/// Peel binrw backtrace frames down to the error that actually fired.
fn root_cause(err: binrw::Error) -> binrw::Error {
    match err {
        binrw::Error::Backtrace(bt) => root_cause(*bt.error),
        other => other,
    }
}

impl DecodeError {
    /// Lift a binrw failure from a stream of `stream_len` bytes.
    pub(crate) fn from_binrw(err: binrw::Error, stream_len: u64) -> Self {
        match root_cause(err) {
            binrw::Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                DecodeError::TruncatedStream { stream_len }
            }
            binrw::Error::Io(e) => DecodeError::Io(e),
            binrw::Error::Custom { pos, err } => match err.downcast_ref::<MalformedCount>() {
                Some(detail) => DecodeError::MalformedCount {
                    position: pos,
                    detail: *detail,
                },
                None => DecodeError::Other(err.to_string()),
            },
            other => DecodeError::Other(other.to_string()),
        }
    }
}

impl From<binrw::Error> for EncodeError {
    fn from(err: binrw::Error) -> Self {
        match root_cause(err) {
            binrw::Error::Io(e) => EncodeError::Io(e),
            binrw::Error::Custom { pos, err } => {
                if let Some(detail) = err.downcast_ref::<CountOverflow>() {
                    EncodeError::CountOverflow {
                        position: pos,
                        detail: *detail,
                    }
                } else if let Some(detail) = err.downcast_ref::<EnvListMismatch>() {
                    EncodeError::EnvListMismatch(*detail)
                } else {
                    EncodeError::Other(err.to_string())
                }
            }
            other => EncodeError::Other(other.to_string()),
        }
    }
}

/// Which cross-reference an out-of-range index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexSite {
    /// `polygons[polygon].vertex_indices[corner]` of mesh `mesh`.
    PolygonVertex {
        mesh: usize,
        polygon: usize,
        corner: usize,
    },
    /// `bigcubes[cube].mesh_indices[slot]`.
    BigCubeMesh { cube: usize, slot: usize },
    /// `lookup.lists[cell].polyhedron_indices[slot]`.
    LookupPolyhedron { cell: usize, slot: usize },
}

/// Recoverable structural findings, collected while decoding continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "diagnostic", rename_all = "snake_case")]
pub enum Diagnostic {
    IndexOutOfRange {
        site: IndexSite,
        index: i64,
        len: usize,
    },
    InconsistentGridDimensions {
        expected_rows: usize,
        expected_cols: usize,
        stored_cells: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::IndexOutOfRange { site, index, len } => {
                write!(f, "index {} out of range 0..{} at {:?}", index, len, site)
            }
            Diagnostic::InconsistentGridDimensions {
                expected_rows,
                expected_cols,
                stored_cells,
            } => write!(
                f,
                "lookup grid stores {} cells, header implies {}x{}",
                stored_cells, expected_rows, expected_cols
            ),
        }
    }
}

/// A best-effort decoded value plus everything found wrong with it.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

pub(crate) fn report(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        tracing::warn!(%d, "structural diagnostic");
    }
}

