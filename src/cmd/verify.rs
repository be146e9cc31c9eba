use clap::Args;
use msasa::error::MsaResult;
use msasa::fasta::{read_fasta, verify_alignment};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Unaligned input FASTA
    pub original: PathBuf,
    /// Aligned FASTA to check against it
    pub aligned: PathBuf,
}

pub fn run(args: VerifyArgs) -> MsaResult<()> {
    let original = read_fasta(&args.original)?;
    let aligned = read_fasta(&args.aligned)?;
    verify_alignment(&original, &aligned)?;

    info!(
        "✅ {} preserves all {} sequences of {}",
        args.aligned.display(),
        original.len(),
        args.original.display()
    );
    println!("OK: {} sequences verified", original.len());
    Ok(())
}
