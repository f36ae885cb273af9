use timeguard_core::LowerBound;

use crate::error::ConfigResult;

/// Port for the provisioned lower-bound timestamp
///
/// Implementations are pure reads: loading never mutates the storage.
pub trait LowerBoundSource: Send + Sync {
    fn load(&self) -> ConfigResult<LowerBound>;

    /// Where the bound comes from, for logging
    fn describe(&self) -> String {
        "lower bound".to_string()
    }
}
