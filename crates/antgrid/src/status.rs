use serde::{Deserialize, Serialize};

/// The canonical state of a device indicator light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizedStatus {
    /// The light is on.
    On,
    /// The light is off.
    Off,
    /// The device reply could not be classified.
    ///
    /// This is a valid outcome, not an error.
    Unknown,
}

impl NormalizedStatus {
    /// Converts the status into its API representation: `Some(true)` for
    /// [`Self::On`], `Some(false)` for [`Self::Off`], and [`None`] for
    /// [`Self::Unknown`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::On => Some(true),
            Self::Off => Some(false),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for NormalizedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::Unknown => "Unknown",
        }
        .fmt(f)
    }
}
