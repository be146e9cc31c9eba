pub mod alignment;
pub mod clustal;
pub mod config;
pub mod consts;
pub mod error;
pub mod fasta;
pub mod optimizer;
pub mod scorer;
