//! Input and output formats around the core: CSV files and the settlement voucher.

pub mod csv;
pub mod voucher;
