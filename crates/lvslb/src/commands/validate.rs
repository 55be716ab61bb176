//! `validate`: local checks only, no endpoint involved.

use serde::Serialize;

use lvslb_core::{IdentityKey, validate};

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
struct ValidateReport {
    identity: String,
    backends: usize,
}

pub fn handle(args: &ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let desired = util::load_definition(&args.file)?;
    validate(&desired)?;

    let report = ValidateReport {
        identity: IdentityKey::of(&desired).to_string(),
        backends: desired.backend_addresses().count(),
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| format!("{} is valid ({} backends)", r.identity, r.backends),
        |r| r.identity.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
