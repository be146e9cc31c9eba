use crate::consts::{CLUSTAL_BLOCK_WIDTH, CLUSTAL_MAX_ID, CLUSTAL_NAME_COLUMN, GAP_SYMBOL};
use crate::error::{MsaError, MsaResult};
use crate::fasta::FastaRecord;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const HEADER: &str = "CLUSTAL X (1.81) multiple sequence alignment";

/// `out/aligned.fasta` becomes `out/aligned.fasta.clustal`.
pub fn clustal_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".clustal");
    PathBuf::from(name)
}

pub fn write_clustal<P: AsRef<Path>>(path: P, records: &[FastaRecord]) -> MsaResult<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    write_clustal_to(&mut out, records)?;
    out.flush()?;
    Ok(())
}

/// Writes aligned records as Clustal blocks with a conservation line
/// marking fully identical residue columns with `*`.
pub fn write_clustal_to<W: Write>(out: &mut W, records: &[FastaRecord]) -> MsaResult<()> {
    let width = records.first().map_or(0, |r| r.sequence.len());
    if let Some(r) = records.iter().find(|r| r.sequence.len() != width) {
        return Err(MsaError::Validation(format!(
            "row '{}' has length {}, expected {}",
            r.id,
            r.sequence.len(),
            width
        )));
    }

    let names: Vec<String> = records
        .iter()
        .map(|r| {
            let id: String = r.id.chars().take(CLUSTAL_MAX_ID).collect();
            format!("{:<w$}", id.replace(' ', "_"), w = CLUSTAL_NAME_COLUMN)
        })
        .collect();

    write!(out, "{}\n\n\n", HEADER)?;
    for start in (0..width).step_by(CLUSTAL_BLOCK_WIDTH) {
        let end = (start + CLUSTAL_BLOCK_WIDTH).min(width);
        for (name, r) in names.iter().zip(records) {
            out.write_all(name.as_bytes())?;
            out.write_all(&r.sequence[start..end])?;
            out.write_all(b"\n")?;
        }
        let marks: String = (start..end)
            .map(|col| if conserved(records, col) { '*' } else { ' ' })
            .collect();
        writeln!(out, "{:w$}{}", "", marks, w = CLUSTAL_NAME_COLUMN)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn conserved(records: &[FastaRecord], col: usize) -> bool {
    let first = records[0].sequence[col].to_ascii_uppercase();
    first != GAP_SYMBOL
        && records
            .iter()
            .all(|r| r.sequence[col].to_ascii_uppercase() == first)
}
