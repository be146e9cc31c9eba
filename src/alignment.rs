use crate::consts::GAP_SYMBOL;
use crate::error::{MsaError, MsaResult};
use std::fmt;

/// Side on which short rows receive their padding gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadSide {
    Left,
    Right,
}

impl PadSide {
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        if rng.bool() {
            PadSide::Left
        } else {
            PadSide::Right
        }
    }
}

/// A rectangular matrix of aligned symbol codes, stored row-major.
///
/// Row `i` always corresponds to input sequence `i`. Identifiers live with
/// the caller. Equality and hashing cover the shape and the exact bytes,
/// which makes an `Alignment` usable directly as a whole-alignment cache key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Alignment {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Alignment {
    /// Builds an alignment from equal-length rows. No trimming is applied.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> MsaResult<Self> {
        let row_count = rows.len();
        if row_count == 0 {
            return Err(MsaError::Invariant("alignment has no rows".into()));
        }
        let cols = rows[0].len();
        if cols == 0 {
            return Err(MsaError::Invariant("alignment rows are empty".into()));
        }

        let mut cells = Vec::with_capacity(row_count * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(MsaError::Invariant(format!(
                    "row {} has length {}, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            cells.extend_from_slice(&row);
        }

        Ok(Self {
            rows: row_count,
            cols,
            cells,
        })
    }

    /// Pads raw sequences to the longest length on `side`, then trims
    /// all-gap border columns.
    pub fn from_sequences<S: AsRef<[u8]>>(sequences: &[S], side: PadSide) -> MsaResult<Self> {
        if let Some(i) = sequences
            .iter()
            .position(|s| s.as_ref().iter().all(|&c| c == GAP_SYMBOL))
        {
            return Err(MsaError::Invariant(format!(
                "sequence {} has no residues",
                i
            )));
        }

        let max_len = sequences
            .iter()
            .map(|s| s.as_ref().len())
            .max()
            .unwrap_or(0);

        let rows = sequences
            .iter()
            .map(|s| {
                let s = s.as_ref();
                let pad = max_len - s.len();
                let mut row = Vec::with_capacity(max_len);
                if side == PadSide::Left {
                    row.resize(pad, GAP_SYMBOL);
                }
                row.extend_from_slice(s);
                row.resize(max_len, GAP_SYMBOL);
                row
            })
            .collect();

        Self::from_rows(rows)?.trimmed()
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, cells: Vec<u8>) -> Self {
        debug_assert_eq!(rows * cols, cells.len());
        Self { rows, cols, cells }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major cell content.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[u8] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.cols)
    }

    /// Copies column `j` (top to bottom) into `buf`, replacing its content.
    pub fn copy_column(&self, j: usize, buf: &mut Vec<u8>) {
        buf.clear();
        buf.extend((0..self.rows).map(|i| self.cells[i * self.cols + j]));
    }

    pub fn column(&self, j: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.rows);
        self.copy_column(j, &mut buf);
        buf
    }

    pub fn is_gap_column(&self, j: usize) -> bool {
        (0..self.rows).all(|i| self.cells[i * self.cols + j] == GAP_SYMBOL)
    }

    pub fn gap_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == GAP_SYMBOL).count()
    }

    /// Row `i` with gaps removed.
    pub fn residues(&self, i: usize) -> Vec<u8> {
        self.row(i)
            .iter()
            .copied()
            .filter(|&c| c != GAP_SYMBOL)
            .collect()
    }

    /// Drops all-gap columns from both borders.
    pub fn trimmed(self) -> MsaResult<Self> {
        let first = (0..self.cols).find(|&j| !self.is_gap_column(j));
        let Some(first) = first else {
            return Err(MsaError::Invariant(
                "every column of the alignment is a gap column".into(),
            ));
        };
        // `first` exists, so a last non-gap column exists too.
        let last = (first..self.cols)
            .rev()
            .find(|&j| !self.is_gap_column(j))
            .unwrap_or(first);

        if first == 0 && last == self.cols - 1 {
            return Ok(self);
        }

        let new_cols = last - first + 1;
        let mut cells = Vec::with_capacity(self.rows * new_cols);
        for row in self.rows_iter() {
            cells.extend_from_slice(&row[first..=last]);
        }
        Ok(Self::from_parts(self.rows, new_cols, cells))
    }

    /// Checks the shape invariants every reachable state must hold.
    pub fn validate(&self) -> MsaResult<()> {
        if self.rows == 0 {
            return Err(MsaError::Invariant("alignment has no rows".into()));
        }
        if self.cols == 0 {
            return Err(MsaError::Invariant("alignment has no columns".into()));
        }
        if self.cells.len() != self.rows * self.cols {
            return Err(MsaError::Invariant(format!(
                "{} cells do not form a {}x{} matrix",
                self.cells.len(),
                self.rows,
                self.cols
            )));
        }
        if self.is_gap_column(0) {
            return Err(MsaError::Invariant("first column is all gaps".into()));
        }
        if self.is_gap_column(self.cols - 1) {
            return Err(MsaError::Invariant("last column is all gaps".into()));
        }
        Ok(())
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.rows_iter()
            .map(|r| String::from_utf8_lossy(r).into_owned())
            .collect()
    }
}

impl fmt::Debug for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alignment")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("content", &self.to_strings())
            .finish()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows_iter() {
            writeln!(f, "{}", String::from_utf8_lossy(row))?;
        }
        Ok(())
    }
}
