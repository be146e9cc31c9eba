use crate::alignment::{Alignment, PadSide};
use crate::consts::GAP_SYMBOL;
use crate::error::{MsaError, MsaResult};
use fastrand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapAction {
    Insert,
    Delete,
}

/// A single applied edit, reported for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    pub action: GapAction,
    pub side: PadSide,
    pub row: usize,
    pub col: usize,
}

/// Generates a random neighbor by inserting or deleting one gap.
///
/// Rows not edited by an insertion receive one compensating gap on `side`.
/// A deletion re-pads only the edited row. All-gap border columns are then
/// trimmed, so every returned state satisfies `Alignment::validate`.
pub fn generate_neighbor(state: &Alignment, rng: &mut Rng) -> MsaResult<Alignment> {
    apply_random(state, rng).map(|(next, _)| next)
}

/// Same as `generate_neighbor`, also returning the edit that was applied.
pub fn apply_random(state: &Alignment, rng: &mut Rng) -> MsaResult<(Alignment, Mutation)> {
    let gaps = state.gap_count();
    let wants_insert = rng.bool();
    let action = if gaps == 0 || wants_insert {
        GapAction::Insert
    } else {
        GapAction::Delete
    };
    let side = PadSide::random(rng);

    let (row, col) = match action {
        GapAction::Insert => (rng.usize(0..state.rows()), rng.usize(0..=state.cols())),
        GapAction::Delete => nth_gap(state, rng.usize(0..gaps))?,
    };

    let mutation = Mutation {
        action,
        side,
        row,
        col,
    };
    let next = apply(state, &mutation)?;
    Ok((next, mutation))
}

/// Applies a fully specified edit, then trims and validates the result.
pub fn apply(state: &Alignment, m: &Mutation) -> MsaResult<Alignment> {
    if m.row >= state.rows() {
        return Err(MsaError::Invariant(format!(
            "mutation row {} out of range for {} rows",
            m.row,
            state.rows()
        )));
    }

    let next = match m.action {
        GapAction::Insert => insert_gap(state, m.row, m.col, m.side)?,
        GapAction::Delete => delete_gap(state, m.row, m.col, m.side)?,
    };

    let next = next.trimmed()?;
    next.validate()?;
    Ok(next)
}

fn insert_gap(state: &Alignment, row: usize, col: usize, side: PadSide) -> MsaResult<Alignment> {
    let cols = state.cols();
    if col > cols {
        return Err(MsaError::Invariant(format!(
            "insertion column {} beyond row length {}",
            col, cols
        )));
    }

    let new_cols = cols + 1;
    let mut cells = Vec::with_capacity(state.rows() * new_cols);
    for (i, r) in state.rows_iter().enumerate() {
        if i == row {
            cells.extend_from_slice(&r[..col]);
            cells.push(GAP_SYMBOL);
            cells.extend_from_slice(&r[col..]);
        } else {
            push_padded(&mut cells, r, side);
        }
    }
    Ok(Alignment::from_parts(state.rows(), new_cols, cells))
}

fn delete_gap(state: &Alignment, row: usize, col: usize, side: PadSide) -> MsaResult<Alignment> {
    let cols = state.cols();
    if col >= cols || state.get(row, col) != GAP_SYMBOL {
        return Err(MsaError::Invariant(format!(
            "no gap to delete at ({}, {})",
            row, col
        )));
    }
    if cols == 1 {
        return Err(MsaError::Invariant(format!(
            "deleting ({}, {}) would leave an empty row",
            row, col
        )));
    }

    let mut cells = Vec::with_capacity(state.rows() * cols);
    let mut shortened = Vec::with_capacity(cols - 1);
    for (i, r) in state.rows_iter().enumerate() {
        if i == row {
            shortened.clear();
            shortened.extend_from_slice(&r[..col]);
            shortened.extend_from_slice(&r[col + 1..]);
            push_padded(&mut cells, &shortened, side);
        } else {
            cells.extend_from_slice(r);
        }
    }
    Ok(Alignment::from_parts(state.rows(), cols, cells))
}

/// Appends `row` plus one gap on `side`.
fn push_padded(cells: &mut Vec<u8>, row: &[u8], side: PadSide) {
    match side {
        PadSide::Left => {
            cells.push(GAP_SYMBOL);
            cells.extend_from_slice(row);
        }
        PadSide::Right => {
            cells.extend_from_slice(row);
            cells.push(GAP_SYMBOL);
        }
    }
}

/// Position of the `n`-th gap in row-major order.
fn nth_gap(state: &Alignment, n: usize) -> MsaResult<(usize, usize)> {
    state
        .as_bytes()
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == GAP_SYMBOL)
        .nth(n)
        .map(|(idx, _)| (idx / state.cols(), idx % state.cols()))
        .ok_or_else(|| MsaError::Invariant(format!("gap #{} does not exist", n)))
}
