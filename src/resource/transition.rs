//! # Enabled-State Transitions
//!
//! imgix refuses attribute changes on a disabled source. An update is therefore
//! planned from the prior and desired `enabled` values:
//!
//! | was disabled | wants enabled | calls |
//! |---|---|---|
//! | no  | yes | update |
//! | no  | no  | update carrying `enabled = false` |
//! | yes | no  | rejected, no call |
//! | yes | yes | enable-only update, then update |

use super::error::ResourceError;

/// A single API call of an update sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// PATCH carrying only `enabled = true`
    Enable,
    /// PATCH carrying every desired attribute, `enabled` included
    UpdateAttributes,
}

/// Planned update sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Update,
    UpdateAndDisable,
    EnableThenUpdate,
}

impl Transition {
    /// Plan the calls for a prior and desired `enabled` value
    ///
    /// A prior value of `None` counts as enabled. A desired value of `None`
    /// leaves the current state unchanged.
    ///
    /// # Errors
    /// [`ResourceError::IllegalStateTransition`] when the source is disabled
    /// and stays disabled
    pub fn plan(prior_enabled: Option<bool>, desired_enabled: Option<bool>) -> Result<Self, ResourceError> {
        let was_disabled = prior_enabled == Some(false);
        let wants_enabled = desired_enabled.unwrap_or(!was_disabled);

        match (was_disabled, wants_enabled) {
            (false, true) => Ok(Self::Update),
            (false, false) => Ok(Self::UpdateAndDisable),
            (true, false) => Err(ResourceError::IllegalStateTransition),
            (true, true) => Ok(Self::EnableThenUpdate),
        }
    }

    /// Calls to issue, in order
    #[must_use]
    pub fn steps(self) -> &'static [Step] {
        match self {
            Self::Update | Self::UpdateAndDisable => &[Step::UpdateAttributes],
            Self::EnableThenUpdate => &[Step::Enable, Step::UpdateAttributes],
        }
    }
}
