/// FDI tooth numbering and per-tooth entity keys.
pub mod tooth;
