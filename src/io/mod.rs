//! Input/output helpers.
//!
//! - merged-table CSV write/read (`table`)
//! - temp-file-then-rename staging shared by the CSV and PNG writers (`atomic`)

pub mod atomic;
pub mod table;

pub use atomic::*;
pub use table::*;
