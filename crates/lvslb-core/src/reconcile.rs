// ── Lifecycle reconciliation ──
//
// Maps create/read/update/delete onto ordered control actions. Every
// multi-action sequence runs strictly in order; each result gates the next.
// Nothing is retried and acknowledged actions are never rolled back.

use std::fmt;

use lvslb_api::{Action, IpvsApi, IpvsRecord};
use tracing::{info, warn};

use crate::convert::{assemble, observe, retarget};
use crate::error::CoreError;
use crate::model::{ObservedBackend, ObservedVirtualServer, TrackedState, VirtualServer};
use crate::validate::validate;

// ── Update planning ────────────────────────────────────────────────

/// Why an update cannot be applied in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceReason {
    AddressOrPortChanged,
    ProtocolChanged,
}

impl fmt::Display for ReplaceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AddressOrPortChanged => "address or port changed",
            Self::ProtocolChanged => "protocol changed",
        })
    }
}

/// How an update will be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePlan {
    /// Identity unchanged: a single MODIFY.
    Modify,
    /// Identity changed: REMOVE the prior entity, then CREATE the new one.
    Replace(ReplaceReason),
}

impl UpdatePlan {
    /// Control actions the plan issues, in order.
    pub fn actions(self) -> &'static [Action] {
        match self {
            Self::Modify => &[Action::Modify],
            Self::Replace(_) => &[Action::Remove, Action::Create],
        }
    }
}

/// Decide between in-place modification and replacement.
///
/// Protocols compare as parsed values, so a change in letter case alone
/// is not an identity change.
pub fn plan_update(prior: &VirtualServer, desired: &VirtualServer) -> UpdatePlan {
    if prior.address != desired.address || prior.port != desired.port {
        UpdatePlan::Replace(ReplaceReason::AddressOrPortChanged)
    } else if prior.protocol != desired.protocol {
        UpdatePlan::Replace(ReplaceReason::ProtocolChanged)
    } else {
        UpdatePlan::Modify
    }
}

// ── Replacement state machine ──────────────────────────────────────

/// Progress of a REMOVE-then-CREATE replacement.
///
/// `Removed` is the committed boundary: past it the prior entity is gone
/// remotely and no longer tracked, whether or not CREATE succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceStep {
    Pending,
    Removed,
    Created,
}

impl ReplaceStep {
    pub fn is_committed(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReplaceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Removed => "removed",
            Self::Created => "created",
        })
    }
}

/// One replacement in flight. Callers that drive [`Reconciler::replace`]
/// directly can inspect the step reached after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    reason: ReplaceReason,
    step: ReplaceStep,
}

impl Replacement {
    pub fn new(reason: ReplaceReason) -> Self {
        Self {
            reason,
            step: ReplaceStep::Pending,
        }
    }

    pub fn reason(self) -> ReplaceReason {
        self.reason
    }

    pub fn step(self) -> ReplaceStep {
        self.step
    }
}

// ── Reconciler ─────────────────────────────────────────────────────

/// Result of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The endpoint no longer knows the virtual server; tracking was dropped.
    Absent,
    Present(ObservedVirtualServer),
}

/// Drives lifecycle events against any [`IpvsApi`].
pub struct Reconciler<A> {
    api: A,
}

impl<A: IpvsApi> Reconciler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    async fn send(&self, action: Action, record: &IpvsRecord) -> Result<IpvsRecord, CoreError> {
        info!(
            %action,
            address = %record.ip,
            protocol = %record.protocol,
            port = %record.port,
            "sending control action"
        );
        Ok(self.api.execute(action, record).await?)
    }

    /// CREATE the desired server and start tracking it.
    pub async fn create(
        &self,
        state: &mut TrackedState,
        desired: &VirtualServer,
    ) -> Result<(), CoreError> {
        validate(desired)?;
        self.send(Action::Create, &assemble(desired)).await?;
        state.track(desired);
        Ok(())
    }

    /// CHECK the server described by `current`.
    ///
    /// An absent server drops tracking. A server with no backends reports a
    /// single placeholder backend.
    pub async fn read(
        &self,
        state: &mut TrackedState,
        current: &VirtualServer,
    ) -> Result<ReadOutcome, CoreError> {
        let record = self.send(Action::Check, &assemble(current)).await?;
        if record.is_absent() {
            info!(address = %current.address, port = current.port, "virtual server is gone");
            state.forget();
            return Ok(ReadOutcome::Absent);
        }

        let mut observed = observe(&record)?;
        if observed.backends.is_empty() {
            observed.backends.push(ObservedBackend::placeholder());
        }
        Ok(ReadOutcome::Present(observed))
    }

    /// Move the remote entity from `prior` to `desired`.
    pub async fn update(
        &self,
        state: &mut TrackedState,
        prior: &VirtualServer,
        desired: &VirtualServer,
    ) -> Result<UpdatePlan, CoreError> {
        validate(desired)?;

        let plan = plan_update(prior, desired);
        match plan {
            UpdatePlan::Modify => {
                self.send(Action::Modify, &assemble(desired)).await?;
            }
            UpdatePlan::Replace(reason) => {
                let mut replacement = Replacement::new(reason);
                self.replace(state, prior, desired, &mut replacement)
                    .await?;
            }
        }
        Ok(plan)
    }

    /// Run a replacement to completion, advancing `replacement` as it goes.
    ///
    /// A failed REMOVE stops before CREATE with tracking untouched. A failed
    /// CREATE leaves the entity absent remotely and untracked locally.
    /// Either way the failing action's error is returned unchanged.
    pub async fn replace(
        &self,
        state: &mut TrackedState,
        prior: &VirtualServer,
        desired: &VirtualServer,
        replacement: &mut Replacement,
    ) -> Result<(), CoreError> {
        info!(reason = %replacement.reason, "replacing virtual server");
        loop {
            match replacement.step {
                ReplaceStep::Pending => {
                    let record = retarget(assemble(desired), prior);
                    self.send(Action::Remove, &record).await.inspect_err(|e| {
                        warn!(step = %replacement.step, error = %e, "remove failed, nothing changed");
                    })?;
                    state.forget();
                    replacement.step = ReplaceStep::Removed;
                }
                ReplaceStep::Removed => {
                    self.send(Action::Create, &assemble(desired))
                        .await
                        .inspect_err(|e| {
                            warn!(
                                step = %replacement.step,
                                error = %e,
                                "create failed after remove, virtual server is absent and untracked"
                            );
                        })?;
                    state.track(desired);
                    replacement.step = ReplaceStep::Created;
                }
                ReplaceStep::Created => return Ok(()),
            }
        }
    }

    /// REMOVE the server described by `current` and stop tracking it.
    pub async fn delete(
        &self,
        state: &mut TrackedState,
        current: &VirtualServer,
    ) -> Result<(), CoreError> {
        self.send(Action::Remove, &assemble(current)).await?;
        state.forget();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{BackendGroup, IdentityKey, Protocol};

    // ── Scripted fake ───────────────────────────────────────────────

    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<(Action, IpvsRecord)>>,
        replies: Mutex<VecDeque<Result<IpvsRecord, lvslb_api::Error>>>,
    }

    impl FakeApi {
        fn replying(replies: impl IntoIterator<Item = Result<IpvsRecord, lvslb_api::Error>>) -> Self {
            Self {
                calls: Mutex::default(),
                replies: Mutex::new(replies.into_iter().collect()),
            }
        }

        fn calls(&self) -> Vec<(Action, IpvsRecord)> {
            self.calls.lock().unwrap().clone()
        }

        fn actions(&self) -> Vec<Action> {
            self.calls().into_iter().map(|(action, _)| action).collect()
        }
    }

    impl IpvsApi for FakeApi {
        async fn execute(
            &self,
            action: Action,
            record: &IpvsRecord,
        ) -> Result<IpvsRecord, lvslb_api::Error> {
            self.calls.lock().unwrap().push((action, record.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(IpvsRecord::default()))
        }
    }

    fn ok() -> Result<IpvsRecord, lvslb_api::Error> {
        Ok(IpvsRecord::default())
    }

    fn rejected(action: Action, message: &str) -> Result<IpvsRecord, lvslb_api::Error> {
        Err(lvslb_api::Error::Rejected {
            action,
            status: 500,
            message: message.into(),
        })
    }

    fn server(port: u16) -> VirtualServer {
        VirtualServer::new("10.0.0.1", port).with_backend(BackendGroup::new(["10.0.1.1"]))
    }

    // ── Planning ────────────────────────────────────────────────────

    #[test]
    fn plan_modify_when_identity_unchanged() {
        let prior = server(80);
        let mut desired = server(80);
        desired.backends[0].weight = 50;
        assert_eq!(plan_update(&prior, &desired), UpdatePlan::Modify);
        assert_eq!(UpdatePlan::Modify.actions(), &[Action::Modify]);
    }

    #[test]
    fn plan_replace_on_port_or_address_change() {
        assert_eq!(
            plan_update(&server(80), &server(8080)),
            UpdatePlan::Replace(ReplaceReason::AddressOrPortChanged)
        );

        let mut moved = server(80);
        moved.address = "10.0.0.2".into();
        assert_eq!(
            plan_update(&server(80), &moved),
            UpdatePlan::Replace(ReplaceReason::AddressOrPortChanged)
        );
    }

    #[test]
    fn plan_ignores_protocol_case() {
        let prior = server(80).with_protocol("tcp".parse().unwrap());
        let desired = server(80).with_protocol("TCP".parse().unwrap());
        assert_eq!(plan_update(&prior, &desired), UpdatePlan::Modify);
    }

    #[test]
    fn plan_replace_on_protocol_change() {
        let desired = server(80).with_protocol(Protocol::Udp);
        let plan = plan_update(&server(80), &desired);
        assert_eq!(plan, UpdatePlan::Replace(ReplaceReason::ProtocolChanged));
        assert_eq!(plan.actions(), &[Action::Remove, Action::Create]);
    }

    // ── Create / read / delete ──────────────────────────────────────

    #[tokio::test]
    async fn create_sends_assembled_record_and_tracks() {
        let reconciler = Reconciler::new(FakeApi::default());
        let mut state = TrackedState::default();
        let desired = server(80);

        reconciler.create(&mut state, &desired).await.unwrap();

        let calls = reconciler.api().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Action::Create);
        assert_eq!(calls[0].1, assemble(&desired));
        assert_eq!(state.id, Some(IdentityKey::new("10.0.0.1", "TCP", 80)));
    }

    #[tokio::test]
    async fn create_validates_before_sending() {
        let reconciler = Reconciler::new(FakeApi::default());
        let mut state = TrackedState::default();
        let desired = VirtualServer::new("10.0.0.1", 80)
            .with_backend(BackendGroup::new(["10.0.1.1", "2001:db8::10"]));

        let err = reconciler.create(&mut state, &desired).await.unwrap_err();

        assert!(err.is_validation());
        assert!(reconciler.api().calls().is_empty());
        assert!(!state.is_tracked());
    }

    #[tokio::test]
    async fn create_rejection_leaves_untracked() {
        let reconciler = Reconciler::new(FakeApi::replying([rejected(Action::Create, "exists")]));
        let mut state = TrackedState::default();

        let err = reconciler.create(&mut state, &server(80)).await.unwrap_err();

        assert_eq!(err.to_string(), "exists");
        assert!(!state.is_tracked());
    }

    #[tokio::test]
    async fn read_absent_drops_tracking() {
        let reconciler = Reconciler::new(FakeApi::replying([Ok(IpvsRecord::absent())]));
        let mut state = TrackedState::tracking(&server(80));

        let outcome = reconciler.read(&mut state, &server(80)).await.unwrap();

        assert_eq!(outcome, ReadOutcome::Absent);
        assert!(!state.is_tracked());
        assert_eq!(reconciler.api().actions(), [Action::Check]);
    }

    #[tokio::test]
    async fn read_without_backends_reports_placeholder() {
        let mut remote = assemble(&server(80));
        remote.backends.clear();
        let reconciler = Reconciler::new(FakeApi::replying([Ok(remote)]));
        let mut state = TrackedState::tracking(&server(80));

        let outcome = reconciler.read(&mut state, &server(80)).await.unwrap();

        let ReadOutcome::Present(observed) = outcome else {
            panic!("expected a present virtual server");
        };
        assert_eq!(observed.backends, vec![ObservedBackend::placeholder()]);
        assert!(observed.pool_emptied());
        assert!(state.is_tracked());
    }

    #[tokio::test]
    async fn read_present_keeps_tracking() {
        let reconciler = Reconciler::new(FakeApi::replying([Ok(assemble(&server(80)))]));
        let mut state = TrackedState::tracking(&server(80));

        let outcome = reconciler.read(&mut state, &server(80)).await.unwrap();

        let ReadOutcome::Present(observed) = outcome else {
            panic!("expected a present virtual server");
        };
        assert_eq!(observed.port, 80);
        assert_eq!(observed.backends[0].address, "10.0.1.1");
        assert!(state.is_tracked());
    }

    #[tokio::test]
    async fn delete_removes_and_forgets() {
        let reconciler = Reconciler::new(FakeApi::default());
        let mut state = TrackedState::tracking(&server(80));

        reconciler.delete(&mut state, &server(80)).await.unwrap();

        assert_eq!(reconciler.api().actions(), [Action::Remove]);
        assert!(!state.is_tracked());
    }

    #[tokio::test]
    async fn delete_failure_keeps_tracking() {
        let reconciler = Reconciler::new(FakeApi::replying([rejected(Action::Remove, "busy")]));
        let mut state = TrackedState::tracking(&server(80));

        assert!(reconciler.delete(&mut state, &server(80)).await.is_err());
        assert!(state.is_tracked());
    }

    // ── Update ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn port_change_removes_old_then_creates_new() {
        let reconciler = Reconciler::new(FakeApi::default());
        let mut state = TrackedState::tracking(&server(80));

        let plan = reconciler
            .update(&mut state, &server(80), &server(8080))
            .await
            .unwrap();

        assert_eq!(plan, UpdatePlan::Replace(ReplaceReason::AddressOrPortChanged));
        let calls = reconciler.api().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, Action::Remove);
        assert_eq!(calls[0].1.port, "80");
        assert_eq!(calls[1].0, Action::Create);
        assert_eq!(calls[1].1.port, "8080");
        assert_eq!(state.id, Some(IdentityKey::new("10.0.0.1", "TCP", 8080)));
    }

    #[tokio::test]
    async fn failed_remove_prevents_create() {
        let reconciler = Reconciler::new(FakeApi::replying([rejected(
            Action::Remove,
            "no such virtual server",
        )]));
        let mut state = TrackedState::tracking(&server(80));

        let err = reconciler
            .update(&mut state, &server(80), &server(8080))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no such virtual server");
        assert_eq!(reconciler.api().actions(), [Action::Remove]);
        assert_eq!(state.id, Some(IdentityKey::new("10.0.0.1", "TCP", 80)));
    }

    #[tokio::test]
    async fn failed_create_after_remove_leaves_untracked() {
        let reconciler = Reconciler::new(FakeApi::replying([
            ok(),
            rejected(Action::Create, "port in use"),
        ]));
        let mut state = TrackedState::tracking(&server(80));

        let err = reconciler
            .update(&mut state, &server(80), &server(8080))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Rejected { action: Action::Create, .. }));
        assert_eq!(err.to_string(), "port in use");
        assert_eq!(reconciler.api().actions(), [Action::Remove, Action::Create]);
        assert!(!state.is_tracked());
    }

    #[tokio::test]
    async fn replacement_exposes_step_reached() {
        let prior = server(80);
        let desired = server(8080);

        let reconciler = Reconciler::new(FakeApi::replying([rejected(Action::Remove, "no")]));
        let mut state = TrackedState::tracking(&prior);
        let mut replacement = Replacement::new(ReplaceReason::AddressOrPortChanged);
        assert!(
            reconciler
                .replace(&mut state, &prior, &desired, &mut replacement)
                .await
                .is_err()
        );
        assert_eq!(replacement.step(), ReplaceStep::Pending);
        assert!(!replacement.step().is_committed());

        let reconciler = Reconciler::new(FakeApi::replying([ok(), rejected(Action::Create, "no")]));
        let mut state = TrackedState::tracking(&prior);
        let mut replacement = Replacement::new(ReplaceReason::AddressOrPortChanged);
        assert!(
            reconciler
                .replace(&mut state, &prior, &desired, &mut replacement)
                .await
                .is_err()
        );
        assert_eq!(replacement.step(), ReplaceStep::Removed);
        assert!(replacement.step().is_committed());

        let reconciler = Reconciler::new(FakeApi::default());
        let mut state = TrackedState::tracking(&prior);
        let mut replacement = Replacement::new(ReplaceReason::AddressOrPortChanged);
        reconciler
            .replace(&mut state, &prior, &desired, &mut replacement)
            .await
            .unwrap();
        assert_eq!(replacement.step(), ReplaceStep::Created);
    }

    #[tokio::test]
    async fn protocol_case_change_is_single_modify() {
        let reconciler = Reconciler::new(FakeApi::default());
        let prior = server(80).with_protocol("tcp".parse().unwrap());
        let desired = server(80).with_protocol("TCP".parse().unwrap());
        let mut state = TrackedState::tracking(&prior);

        let plan = reconciler.update(&mut state, &prior, &desired).await.unwrap();

        assert_eq!(plan, UpdatePlan::Modify);
        let calls = reconciler.api().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Action::Modify);
        assert_eq!(calls[0].1.protocol, "TCP");
    }

    #[tokio::test]
    async fn protocol_change_removes_under_old_protocol() {
        let reconciler = Reconciler::new(FakeApi::default());
        let prior = server(80);
        let desired = server(80).with_protocol(Protocol::Udp);
        let mut state = TrackedState::tracking(&prior);

        reconciler.update(&mut state, &prior, &desired).await.unwrap();

        let calls = reconciler.api().calls();
        assert_eq!(calls[0].0, Action::Remove);
        assert_eq!(calls[0].1.protocol, "TCP");
        assert_eq!(calls[1].0, Action::Create);
        assert_eq!(calls[1].1.protocol, "UDP");
        assert_eq!(state.id, Some(IdentityKey::new("10.0.0.1", "UDP", 80)));
    }

    #[tokio::test]
    async fn address_and_protocol_change_removes_full_old_identity() {
        let reconciler = Reconciler::new(FakeApi::default());
        let prior = server(80);
        let mut desired = server(80).with_protocol(Protocol::Sctp);
        desired.address = "10.0.0.9".into();
        let mut state = TrackedState::tracking(&prior);

        reconciler.update(&mut state, &prior, &desired).await.unwrap();

        let calls = reconciler.api().calls();
        assert_eq!(calls[0].1.ip, "10.0.0.1");
        assert_eq!(calls[0].1.protocol, "TCP");
        assert_eq!(calls[1].1.ip, "10.0.0.9");
        assert_eq!(calls[1].1.protocol, "SCTP");
    }

    #[tokio::test]
    async fn update_validates_before_sending() {
        let reconciler = Reconciler::new(FakeApi::default());
        let mut desired = server(8080);
        desired.check_interval = 0;
        let mut state = TrackedState::tracking(&server(80));

        let err = reconciler
            .update(&mut state, &server(80), &desired)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(reconciler.api().calls().is_empty());
        assert!(state.is_tracked());
    }
}
