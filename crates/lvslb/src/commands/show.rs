//! `show`: read a virtual server back from the endpoint.

use std::fmt::Write as _;

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use lvslb_core::{
    Endpoint, IdentityKey, ObservedBackend, ObservedVirtualServer, ReadOutcome,
};

use crate::cli::{GlobalOpts, ShowArgs};
use crate::error::CliError;
use crate::output;
use crate::state;

use super::util;

#[derive(Tabled)]
struct BackendRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Weight")]
    weight: u32,
    #[tabled(rename = "Check")]
    check: String,
    #[tabled(rename = "Check Port")]
    check_port: u16,
    #[tabled(rename = "Timeout")]
    timeout: u32,
    #[tabled(rename = "Retries")]
    retries: u32,
}

impl From<&ObservedBackend> for BackendRow {
    fn from(b: &ObservedBackend) -> Self {
        Self {
            address: b.address.clone(),
            port: b.port,
            weight: b.weight,
            check: b.check_type.clone(),
            check_port: b.check_port,
            timeout: b.check_timeout,
            retries: b.retries,
        }
    }
}

fn identity(vs: &ObservedVirtualServer) -> String {
    IdentityKey::new(&vs.address, &vs.protocol, vs.port).to_string()
}

fn detail(vs: &ObservedVirtualServer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Virtual server  {}", identity(vs));
    let _ = writeln!(out, "  kind:        {}", vs.kind);
    let _ = writeln!(out, "  algorithm:   {}", vs.algorithm);
    let _ = writeln!(out, "  persistence: {}s", vs.persistence_timeout);
    let _ = writeln!(out, "  check every: {}s", vs.check_interval);
    if !vs.sorry_address.is_empty() {
        let _ = writeln!(out, "  sorry:       {}:{}", vs.sorry_address, vs.sorry_port);
    }
    if !vs.virtual_host.is_empty() {
        let _ = writeln!(out, "  vhost:       {}", vs.virtual_host);
    }
    let _ = writeln!(out, "  monitoring:  {}", vs.monitoring_period);

    if vs.pool_emptied() {
        out.push_str("  backends:    none (pool emptied on the endpoint)");
    } else {
        let rows: Vec<BackendRow> = vs.backends.iter().map(BackendRow::from).collect();
        out.push_str(&output::render_table(&rows));
    }
    out
}

pub async fn handle(
    endpoint: &Endpoint,
    args: ShowArgs,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let state_path = util::state_file(args.file.as_deref(), &args.state)?;
    let mut st = state::load(&state_path)?;

    // The tracked record names the live entity; an edited FILE may not.
    let tracked = st.applied.clone().filter(|_| st.tracked.is_tracked());
    let current = match (tracked, &args.file) {
        (Some(applied), _) => applied,
        (None, Some(file)) => util::load_definition(file)?,
        (None, None) => {
            return Err(CliError::NotTracked {
                path: state_path.display().to_string(),
            });
        }
    };

    let reconciler = endpoint.connect(cancel).await?;
    match reconciler.read(&mut st.tracked, &current).await? {
        ReadOutcome::Absent => {
            if st.applied.is_some() {
                st.settle();
                state::save(&state_path, &st)?;
            }
            Err(CliError::NotFound {
                identity: IdentityKey::of(&current).to_string(),
            })
        }
        ReadOutcome::Present(observed) => {
            if observed.pool_emptied() {
                output::note("warning: the endpoint reports no backends", global.quiet);
            }
            let out = output::render_single(&global.output, &observed, detail, identity);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
