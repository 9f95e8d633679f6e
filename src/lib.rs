pub mod about;
pub mod amplicon;
pub mod anneal;
pub mod dna_sequence;
pub mod error;
pub mod iupac_code;
pub mod melting_temp;
pub mod nn_tables;
pub mod parameters;
pub mod pcr_program;
pub mod primer;
pub mod primer_design;
pub mod salt_correction;
pub mod sequence_parser;
pub mod session;
