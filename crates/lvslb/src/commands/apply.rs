//! `apply`: create when nothing is tracked, otherwise move the remote entity
//! from the last applied record to the new definition.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use lvslb_core::{CoreError, Endpoint, IdentityKey, UpdatePlan};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;
use crate::state;

use super::util;

#[derive(Debug, Serialize)]
struct ApplyReport {
    identity: String,
    outcome: &'static str,
    actions: Vec<String>,
    state: String,
}

pub async fn handle(
    endpoint: &Endpoint,
    args: ApplyArgs,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let desired = util::load_definition(&args.file)?;
    let state_path = util::state_file(Some(&args.file), &args.state)?;
    let mut st = state::load(&state_path)?;
    let before = st.clone();

    let reconciler = endpoint.connect(cancel).await?;

    let prior = st.applied.clone().filter(|_| st.tracked.is_tracked());
    let result: Result<(&'static str, Vec<String>), CoreError> = match prior {
        None => {
            debug!(state = %state_path.display(), "nothing tracked, creating");
            reconciler
                .create(&mut st.tracked, &desired)
                .await
                .map(|()| ("created", vec!["CREATE".to_owned()]))
        }
        Some(prior) => reconciler
            .update(&mut st.tracked, &prior, &desired)
            .await
            .map(|plan| {
                let outcome = match plan {
                    UpdatePlan::Modify => "modified",
                    UpdatePlan::Replace(_) => "replaced",
                };
                (outcome, plan.actions().iter().map(ToString::to_string).collect())
            }),
    };

    // A replacement can fail after its REMOVE; tracking must still reach disk.
    if result.is_ok() {
        st.applied = Some(desired.clone());
    }
    st.settle();
    if result.is_ok() || st != before {
        state::save(&state_path, &st)?;
    }
    let (outcome, actions) = result?;

    let report = ApplyReport {
        identity: IdentityKey::of(&desired).to_string(),
        outcome,
        actions,
        state: state_path.display().to_string(),
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            format!(
                "{} {}\n  actions: {}\n  state:   {}",
                r.identity,
                r.outcome,
                r.actions.join(" -> "),
                r.state
            )
        },
        |r| r.identity.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
