use thiserror::Error;

/// Errors that can occur during NVS operations. Marked as non-exhaustive to allow for future
/// additions without breaking the API. A checksum mismatch is not an error: block reads report
/// it as `Ok(false)` and leave the recovery policy to the caller.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The device did not acknowledge its address during the probe. No storage is available.
    #[error("device absent")]
    DeviceAbsent,

    /// A driver has already been installed into the storage slot.
    #[error("storage already installed")]
    AlreadyInstalled,

    /// The bus reported an error. Its kind is logged where the transfer failed.
    #[error("bus transfer failed")]
    Transfer,

    /// The requested range, including a checksum trailer if any, exceeds the chip size.
    #[error("address out of bounds")]
    OutOfBounds,
}
