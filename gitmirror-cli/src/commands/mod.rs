//! CLI command implementations

pub mod list;
pub mod run;
pub mod status;

pub use list::ListArgs;
pub use run::RunArgs;
pub use status::StatusArgs;
