//! # Plan Modifiers
//!
//! Adjustments applied to a proposed plan before the host shows it to the
//! operator:
//! - `id` keeps its prior value while the plan leaves it unknown
//! - `deployment.s3_secret_key` keeps its prior value once it has been set,
//!   since the API never echoes it back and a diff would never converge

use super::model::SourceModel;
use tracing::debug;

/// Apply every plan modifier of the source resource
#[must_use]
pub fn modify_plan(prior: Option<&SourceModel>, mut proposed: SourceModel) -> SourceModel {
    let Some(prior) = prior else {
        // Nothing to carry over on create
        return proposed;
    };

    use_state_for_unknown_id(prior, &mut proposed);
    use_state_after_set_secret(prior, &mut proposed);
    proposed
}

fn use_state_for_unknown_id(prior: &SourceModel, proposed: &mut SourceModel) {
    if proposed.id.is_none() && prior.id.is_some() {
        proposed.id.clone_from(&prior.id);
    }
}

fn use_state_after_set_secret(prior: &SourceModel, proposed: &mut SourceModel) {
    let prior_secret = prior.secret_key();
    if prior_secret.is_empty() {
        return;
    }
    if let Some(deployment) = proposed.deployment.as_mut() {
        if deployment.s3_secret_key != prior_secret {
            debug!("keeping s3_secret_key from state in the plan");
            deployment.s3_secret_key = prior_secret.to_string();
        }
    }
}
