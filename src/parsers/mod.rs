pub mod gcov;

use crate::error::Result;
use crate::model::DumpData;

/// Every dump format parser implements this trait.
pub trait Parser {
    /// Parse one translation unit's dump into per-file records.
    fn parse(&self, input: &[u8]) -> Result<DumpData>;
}
