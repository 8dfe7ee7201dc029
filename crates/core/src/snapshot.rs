use thiserror::Error;

use crate::state::ControllerState;

/// An independent copy of a controller's state.
///
/// Snapshots support checkpoint and rollback: take one with
/// [`Controller::snapshot`], refresh it with [`Controller::update_snapshot`],
/// and roll back with [`Controller::restore`].
/// Dropping a snapshot releases it.
///
/// [`Controller::snapshot`]: crate::Controller::snapshot
/// [`Controller::update_snapshot`]: crate::Controller::update_snapshot
/// [`Controller::restore`]: crate::Controller::restore
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    state: ControllerState,
}

impl Snapshot {
    /// Returns the captured state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub(crate) fn overwrite(&mut self, state: ControllerState) {
        self.state = state;
    }
}

impl From<ControllerState> for Snapshot {
    fn from(state: ControllerState) -> Self {
        Self { state }
    }
}

/// Host request codes for snapshot handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SnapshotMode {
    /// Allocate a new snapshot of the live state.
    Create = 1,
    /// Overwrite an existing snapshot with the live state.
    Update = 2,
    /// Overwrite the live state with a snapshot.
    Load = 3,
    /// Release a snapshot.
    Delete = 4,
}

/// Returned when a host passes a mode code outside `1..=4`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unknown snapshot mode {0}")]
pub struct SnapshotModeError(pub i32);

impl TryFrom<i32> for SnapshotMode {
    type Error = SnapshotModeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Create),
            2 => Ok(Self::Update),
            3 => Ok(Self::Load),
            4 => Ok(Self::Delete),
            other => Err(SnapshotModeError(other)),
        }
    }
}
