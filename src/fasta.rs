use crate::alignment::Alignment;
use crate::consts::{FASTA_LINE_WIDTH, GAP_SYMBOL};
use crate::error::{MsaError, MsaResult};
use bio::io::fasta;
use fnv::FnvHashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub sequence: Vec<u8>,
}

impl FastaRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }
}

/// Parses FASTA text. The id is the header up to the first whitespace;
/// whitespace inside sequence lines is dropped.
pub fn parse_fasta(content: &str) -> MsaResult<Vec<FastaRecord>> {
    read_records(content.as_bytes())
}

pub fn read_fasta<P: AsRef<Path>>(path: P) -> MsaResult<Vec<FastaRecord>> {
    read_records(File::open(path.as_ref())?)
}

fn read_records<R: Read>(source: R) -> MsaResult<Vec<FastaRecord>> {
    let mut records = Vec::new();

    for (index, result) in fasta::Reader::new(source).records().enumerate() {
        let record =
            result.map_err(|e| MsaError::Parse(format!("record {}: {}", index + 1, e)))?;
        if record.id().is_empty() {
            return Err(MsaError::Parse(format!(
                "record {}: header without an id",
                index + 1
            )));
        }
        let sequence: Vec<u8> = record
            .seq()
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        if sequence.is_empty() {
            return Err(MsaError::Parse(format!(
                "record '{}' is empty",
                record.id()
            )));
        }
        records.push(FastaRecord::new(record.id(), sequence));
    }

    if records.is_empty() {
        return Err(MsaError::Parse("no FASTA records found".into()));
    }
    Ok(records)
}

pub fn write_fasta<P: AsRef<Path>>(path: P, records: &[FastaRecord]) -> MsaResult<()> {
    let mut writer = fasta::Writer::new(File::create(path.as_ref())?);
    for r in records {
        // bio writes the sequence as given, so wrap it beforehand.
        let wrapped = r
            .sequence
            .chunks(FASTA_LINE_WIDTH)
            .collect::<Vec<_>>()
            .join(&b'\n');
        writer.write(&r.id, None, &wrapped)?;
    }
    writer.flush()?;
    Ok(())
}

/// Pairs alignment rows with the ids of the records they came from.
pub fn alignment_records(ids: &[String], alignment: &Alignment) -> MsaResult<Vec<FastaRecord>> {
    if ids.len() != alignment.rows() {
        return Err(MsaError::Validation(format!(
            "{} ids for an alignment of {} rows",
            ids.len(),
            alignment.rows()
        )));
    }
    Ok(ids
        .iter()
        .zip(alignment.rows_iter())
        .map(|(id, row)| FastaRecord::new(id.clone(), row))
        .collect())
}

/// Checks that `aligned` is a faithful alignment of `original`: every
/// original id is present, aligned rows share one length, and removing
/// gaps from each row gives back the original residues.
pub fn verify_alignment(original: &[FastaRecord], aligned: &[FastaRecord]) -> MsaResult<()> {
    let by_id: FnvHashMap<&str, &[u8]> = aligned
        .iter()
        .map(|r| (r.id.as_str(), r.sequence.as_slice()))
        .collect();

    if let Some(first) = aligned.first() {
        let width = first.sequence.len();
        if let Some(r) = aligned.iter().find(|r| r.sequence.len() != width) {
            return Err(MsaError::Validation(format!(
                "row '{}' has length {}, expected {}",
                r.id,
                r.sequence.len(),
                width
            )));
        }
    }

    for record in original {
        let Some(row) = by_id.get(record.id.as_str()) else {
            return Err(MsaError::Validation(format!(
                "sequence '{}' is missing from the alignment",
                record.id
            )));
        };
        let residues: Vec<u8> = row.iter().copied().filter(|&c| c != GAP_SYMBOL).collect();
        let expected: Vec<u8> = record
            .sequence
            .iter()
            .copied()
            .filter(|&c| c != GAP_SYMBOL)
            .collect();
        if residues != expected {
            return Err(MsaError::Validation(format!(
                "residues of '{}' changed during alignment",
                record.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiline_records() {
        let text = ">s1 first sequence\nACGT\nAC\n\n>s2\nGG T\n";
        let recs = parse_fasta(text).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0], FastaRecord::new("s1", b"ACGTAC".to_vec()));
        assert_eq!(recs[1].sequence, b"GGT");
    }

    #[test]
    fn test_parse_rejects_orphan_sequence() {
        assert!(matches!(parse_fasta("ACGT\n>s1\nA"), Err(MsaError::Parse(_))));
        assert!(matches!(parse_fasta(""), Err(MsaError::Parse(_))));
        assert!(matches!(parse_fasta(">s1\n>s2\nA"), Err(MsaError::Parse(_))));
        assert!(matches!(parse_fasta("> desc only\nA"), Err(MsaError::Parse(_))));
    }

    #[test]
    fn test_verify_detects_changed_residues() {
        let original = vec![FastaRecord::new("a", b"ACG".to_vec())];
        let ok = vec![FastaRecord::new("a", b"A-CG".to_vec())];
        let bad = vec![FastaRecord::new("a", b"A-CC".to_vec())];
        verify_alignment(&original, &ok).unwrap();
        assert!(matches!(
            verify_alignment(&original, &bad),
            Err(MsaError::Validation(_))
        ));
    }
}
