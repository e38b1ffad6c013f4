pub mod aggregate;
pub mod cli;
pub mod collect;
pub mod error;
pub mod git;
pub mod html;
pub mod model;
pub mod parsers;
pub mod report;
pub mod rollup;
pub mod snapshot;
pub mod source;
pub mod stats;
