//! `plan`: show what `apply` would send, without touching the endpoint.

use serde::Serialize;

use lvslb_core::{Action, IdentityKey, UpdatePlan, VirtualServer, plan_update, validate};

use crate::cli::{GlobalOpts, PlanArgs};
use crate::error::CliError;
use crate::output;
use crate::state;

use super::util;

#[derive(Debug, PartialEq, Eq, Serialize)]
struct PlanReport {
    identity: String,
    actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

const CREATE: &[Action] = &[Action::Create];

fn plan_for(prior: Option<&VirtualServer>, desired: &VirtualServer) -> PlanReport {
    let (actions, reason) = match prior {
        None => (CREATE, None),
        Some(prior) => {
            let plan = plan_update(prior, desired);
            let reason = match plan {
                UpdatePlan::Modify => None,
                UpdatePlan::Replace(reason) => Some(reason.to_string()),
            };
            (plan.actions(), reason)
        }
    };
    PlanReport {
        identity: IdentityKey::of(desired).to_string(),
        actions: actions.iter().map(ToString::to_string).collect(),
        reason,
    }
}

pub fn handle(args: &PlanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let desired = util::load_definition(&args.file)?;
    validate(&desired)?;

    let state_path = util::state_file(Some(&args.file), &args.state)?;
    let st = state::load(&state_path)?;
    let prior = st.applied.as_ref().filter(|_| st.tracked.is_tracked());

    let report = plan_for(prior, &desired);
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let mut line = format!("{}: {}", r.identity, r.actions.join(" -> "));
            if let Some(reason) = &r.reason {
                line.push_str(&format!(" ({reason})"));
            }
            line
        },
        |r| r.actions.join("\n"),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvslb_core::Protocol;

    #[test]
    fn untracked_plans_a_create() {
        let desired = VirtualServer::new("10.0.0.1", 80);
        let report = plan_for(None, &desired);
        assert_eq!(report.actions, vec!["CREATE"]);
        assert_eq!(report.identity, "10.0.0.1_TCP_80");
    }

    #[test]
    fn port_change_plans_remove_then_create() {
        let prior = VirtualServer::new("10.0.0.1", 80);
        let desired = VirtualServer::new("10.0.0.1", 8080);
        let report = plan_for(Some(&prior), &desired);
        assert_eq!(report.actions, vec!["REMOVE", "CREATE"]);
        assert!(report.reason.is_some());
    }

    #[test]
    fn same_identity_plans_a_modify() {
        let prior = VirtualServer::new("10.0.0.1", 80).with_protocol(Protocol::Tcp);
        let mut desired = prior.clone();
        desired.check_interval = 10;
        let report = plan_for(Some(&prior), &desired);
        assert_eq!(report.actions, vec!["MODIFY"]);
        assert_eq!(report.reason, None);
    }
}
