use crate::error::BootResult;

/// Port for handing control back to the surrounding boot system
pub trait BootFlow: Send + Sync {
    /// Restart the boot sequence
    ///
    /// On real hardware a successful call does not return.
    fn request_reboot(&self, reason: &str) -> BootResult<()>;

    fn name(&self) -> &str {
        "BootFlow"
    }
}
