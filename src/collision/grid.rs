//! Lookup grid: a uniform x–z raster over the collision polyhedra.
//!
//! Binary layout:
//! ```text
//! [20 bytes]  GridParams (x0, z0, x_size, z_size, raster_size; f32 each)
//! [rows × cols × LookupList]   row-major, z selects the row
//! LookupList = [4 bytes] length (i32), [length × 4 bytes] polyhedron index (i32)
//! ```

use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite};
use rayon::prelude::*;
use serde::Serialize;

use super::Polyhedron;
use crate::codec::{self, read_counted, write_counted, MinSize};
use crate::error::{Diagnostic, GridError, IndexSite};
use crate::math::BoundingBox;

/// Below this many polyhedra, footprints are computed on the calling thread
const PARALLEL_POLYHEDRON_THRESHOLD: usize = 256;

/// Most cells the builder and validator will work on.
///
/// Decoded parameters can describe grids far past anything a track uses;
/// those are refused instead of allocated.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Origin, extents and cell edge of a lookup grid.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GridParams {
    pub x0: f32,
    pub z0: f32,
    pub x_size: f32,
    pub z_size: f32,
    pub raster_size: f32,
}

fn axis_cells(extent: f32, raster: f32) -> usize {
    if !(raster.is_finite() && raster > 0.0 && extent.is_finite() && extent > 0.0) {
        return 0;
    }
    (extent / raster).ceil() as usize
}

impl GridParams {
    /// `(rows, cols)`; zero on either axis when the raster is unusable.
    pub fn dimensions(&self) -> (usize, usize) {
        (
            axis_cells(self.z_size, self.raster_size),
            axis_cells(self.x_size, self.raster_size),
        )
    }

    /// Lower edge of cell `n` along an axis starting at `origin`.
    fn edge(&self, origin: f32, n: usize) -> f32 {
        origin + n as f32 * self.raster_size
    }

    /// Inclusive range of cells `[lo, hi]` touches on one axis.
    fn axis_span(&self, lo: f32, hi: f32, origin: f32, n: usize) -> Option<(usize, usize)> {
        if n == 0 || !(lo <= hi) {
            return None;
        }
        if hi < origin || lo >= self.edge(origin, n) {
            return None;
        }
        let r = self.raster_size;
        let mut first = (((lo - origin) / r).floor().max(0.0) as usize).min(n - 1);
        let mut last = (((hi - origin) / r).floor() as usize).min(n - 1);

        // agree with the cell edges exactly where the division rounded
        if first > 0 && lo < self.edge(origin, first) {
            first -= 1;
        }
        if last + 1 < n && self.edge(origin, last + 1) <= hi {
            last += 1;
        }
        Some((first, last))
    }
}

/// Polyhedron indices stored in one cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupList {
    pub polyhedron_indices: Vec<i32>,
}

impl MinSize for LookupList {
    const MIN_SIZE: usize = 4;
}

impl BinRead for LookupList {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        Ok(LookupList {
            polyhedron_indices: read_counted::<i32, _, _>(reader, endian)?,
        })
    }
}

impl BinWrite for LookupList {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        write_counted::<i32, _, _>(&self.polyhedron_indices, writer, endian)
    }
}

/// Cells in one flat row-major buffer; cell `(row, col)` is `lists[row * cols + col]`.
///
/// `rows` and `cols` always come from the params. A decoded grid keeps
/// whatever number of lists the file stored, so `lists.len()` may differ
/// from `rows * cols`; see [`LookupGrid::is_consistent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupGrid {
    pub params: GridParams,
    rows: usize,
    cols: usize,
    lists: Vec<LookupList>,
}

impl LookupGrid {
    pub fn from_parts(params: GridParams, lists: Vec<LookupList>) -> Self {
        let (rows, cols) = params.dimensions();
        LookupGrid {
            params,
            rows,
            cols,
            lists,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn lists(&self) -> &[LookupList] {
        &self.lists
    }

    pub fn into_lists(self) -> Vec<LookupList> {
        self.lists
    }

    /// Flat buffer index of `(row, col)`, if that cell exists and was stored.
    pub fn cell_index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let index = row * self.cols + col;
        (index < self.lists.len()).then_some(index)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&LookupList> {
        self.cell_index(row, col).map(|i| &self.lists[i])
    }

    /// Candidate polyhedra for the point `(x, z)`; `None` outside the grid.
    pub fn cell_at(&self, x: f32, z: f32) -> Option<&[i32]> {
        let p = &self.params;
        let col = p.axis_span(x, x, p.x0, self.cols)?.0;
        let row = p.axis_span(z, z, p.z0, self.rows)?.0;
        self.cell(row, col)
            .map(|list| list.polyhedron_indices.as_slice())
    }

    pub fn is_consistent(&self) -> bool {
        self.rows.checked_mul(self.cols) == Some(self.lists.len())
    }

    pub fn dimension_diagnostic(&self) -> Option<Diagnostic> {
        (!self.is_consistent()).then(|| Diagnostic::InconsistentGridDimensions {
            expected_rows: self.rows,
            expected_cols: self.cols,
            stored_cells: self.lists.len(),
        })
    }

    /// Stored indices that do not name one of `polyhedron_count` polyhedra.
    pub fn index_diagnostics(&self, polyhedron_count: usize) -> Vec<Diagnostic> {
        let mut out = vec![];
        for (cell, list) in self.lists.iter().enumerate() {
            for (slot, &index) in list.polyhedron_indices.iter().enumerate() {
                if index < 0 || index as usize >= polyhedron_count {
                    out.push(Diagnostic::IndexOutOfRange {
                        site: IndexSite::LookupPolyhedron { cell, slot },
                        index: index as i64,
                        len: polyhedron_count,
                    });
                }
            }
        }
        out
    }
}

impl BinRead for LookupGrid {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let params = GridParams::read_options(reader, endian, ())?;

        // no stored cell count: lists run to the end of the stream
        let mut lists = vec![];
        while codec::remaining(reader)? > 0 {
            lists.push(LookupList::read_options(reader, endian, ())?);
        }
        Ok(LookupGrid::from_parts(params, lists))
    }
}

impl BinWrite for LookupGrid {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.params.write_options(writer, endian, ())?;
        codec::write_elements(&self.lists, writer, endian)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Rows and columns a bounding box touches, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Footprint {
    rows: (usize, usize),
    cols: (usize, usize),
}

impl Footprint {
    fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (first, last) = self.cols;
        (self.rows.0..=self.rows.1).flat_map(move |row| (first..=last).map(move |col| (row, col)))
    }
}

fn footprint(
    bbox: &BoundingBox,
    params: &GridParams,
    rows: usize,
    cols: usize,
) -> Option<Footprint> {
    Some(Footprint {
        rows: params.axis_span(bbox.zlo, bbox.zhi, params.z0, rows)?,
        cols: params.axis_span(bbox.xlo, bbox.xhi, params.x0, cols)?,
    })
}

/// Cell count of a `rows` by `cols` grid, refused past [`MAX_GRID_CELLS`].
fn checked_cells(rows: usize, cols: usize) -> Result<usize, GridError> {
    rows.checked_mul(cols)
        .filter(|&cells| cells <= MAX_GRID_CELLS)
        .ok_or(GridError::TooManyCells {
            rows,
            cols,
            max: MAX_GRID_CELLS,
        })
}

fn footprints(
    polyhedra: &[Polyhedron],
    params: &GridParams,
    rows: usize,
    cols: usize,
) -> Vec<Option<Footprint>> {
    if polyhedra.len() >= PARALLEL_POLYHEDRON_THRESHOLD {
        polyhedra
            .par_iter()
            .map(|p| footprint(&p.bbox, params, rows, cols))
            .collect()
    } else {
        polyhedra
            .iter()
            .map(|p| footprint(&p.bbox, params, rows, cols))
            .collect()
    }
}

/// Bucket every polyhedron into each cell its x–z bounding box overlaps.
///
/// Broad phase only: a polyhedron is listed in every cell its box touches,
/// never missed. Boxes entirely outside the grid appear nowhere. Within a
/// cell, indices are ascending regardless of thread count.
pub fn build_lookup_grid(
    polyhedra: &[Polyhedron],
    params: GridParams,
) -> Result<LookupGrid, GridError> {
    let (rows, cols) = params.dimensions();
    let cells = checked_cells(rows, cols)?;

    let mut lists = vec![LookupList::default(); cells];
    for (index, fp) in footprints(polyhedra, &params, rows, cols).iter().enumerate() {
        let Some(fp) = fp else {
            tracing::trace!(index, "polyhedron outside the grid");
            continue;
        };
        tracing::trace!(index, ?fp, "polyhedron footprint");
        for (row, col) in fp.cells() {
            lists[row * cols + col].polyhedron_indices.push(index as i32);
        }
    }

    tracing::debug!(
        polyhedra = polyhedra.len(),
        rows,
        cols,
        "built lookup grid"
    );
    Ok(LookupGrid::from_parts(params, lists))
}

/// A polyhedron the builder would place in a cell that does not list it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MissingEntry {
    pub row: usize,
    pub col: usize,
    pub polyhedron: usize,
}

/// Every overlap `grid` fails to record, ordered by cell then polyhedron.
/// Extra entries are not reported.
///
/// Footprints are checked against the stored lists in place, so nothing the
/// size of the grid is allocated.
pub fn validate_lookup_grid(
    grid: &LookupGrid,
    polyhedra: &[Polyhedron],
) -> Result<Vec<MissingEntry>, GridError> {
    let (rows, cols) = (grid.rows(), grid.cols());
    checked_cells(rows, cols)?;

    let mut missing = vec![];
    for (index, fp) in footprints(polyhedra, &grid.params, rows, cols).iter().enumerate() {
        let Some(fp) = fp else {
            continue;
        };
        for (row, col) in fp.cells() {
            let listed = grid
                .cell(row, col)
                .is_some_and(|l| l.polyhedron_indices.contains(&(index as i32)));
            if !listed {
                missing.push(MissingEntry {
                    row,
                    col,
                    polyhedron: index,
                });
            }
        }
    }
    missing.sort_unstable();
    Ok(missing)
}
