/// The placeholder symbol for an insertion/deletion.
pub const GAP_SYMBOL: u8 = b'-';

/// Residue alphabet covered by the built-in substitution tables (NCBI order).
pub const RESIDUE_ALPHABET: &[u8] = b"ARNDCQEGHILKMFPSTWYVBZX*";

/// Full symbol alphabet of a pair table: gap first, then residues.
pub const SYMBOL_ALPHABET: &[u8] = b"-ARNDCQEGHILKMFPSTWYVBZX*";

/// Residue used for any byte outside the alphabet.
pub const UNKNOWN_RESIDUE: u8 = b'X';

/// Default bound on distinct columns kept by the column-energy cache.
pub const DEFAULT_COLUMN_CACHE_CAPACITY: usize = 800_000;

/// Default bound on distinct alignments kept by the alignment-energy cache.
pub const DEFAULT_ALIGNMENT_CACHE_CAPACITY: usize = 204_800;

/// Residues per line when writing FASTA.
pub const FASTA_LINE_WIDTH: usize = 60;

/// Residues per line in Clustal blocks.
pub const CLUSTAL_BLOCK_WIDTH: usize = 50;

/// Clustal ids are cut to this length and padded to `CLUSTAL_NAME_COLUMN`.
pub const CLUSTAL_MAX_ID: usize = 30;
pub const CLUSTAL_NAME_COLUMN: usize = 36;

/// Records the progress worker buffers before forcing them to disk.
pub const PROGRESS_FLUSH_INTERVAL: usize = 256;
