//! Built-in checkers.
//!
//! - **Basic checks** (`basic`): structural sanity of the document that domain
//!   rules depend on through [`basic_preconditions`]

pub mod basic;

pub use basic::{
    FileHeaderIsPresent, RootTagIsOpenDrive, VersionIsDefined, basic_checkers,
    basic_preconditions,
};
