//! CLI command implementations

pub mod acquire;
pub mod clean;
pub mod generate;
pub mod status;

pub use acquire::execute as acquire;
pub use clean::{clean_all, clean_archives, clean_test_files};
pub use generate::execute as generate;
pub use status::execute as status;
