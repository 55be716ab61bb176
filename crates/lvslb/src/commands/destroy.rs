//! `destroy`: REMOVE the tracked virtual server and clear the state file.

use tokio_util::sync::CancellationToken;

use lvslb_core::{Endpoint, IdentityKey};

use crate::cli::{DestroyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;
use crate::state;

use super::util;

pub async fn handle(
    endpoint: &Endpoint,
    args: DestroyArgs,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let state_path = util::state_file(args.file.as_deref(), &args.state)?;
    let mut st = state::load(&state_path)?;

    let Some(applied) = st.applied.clone().filter(|_| st.tracked.is_tracked()) else {
        return Err(CliError::NotTracked {
            path: state_path.display().to_string(),
        });
    };
    let identity = IdentityKey::of(&applied);

    if !util::confirm(
        &format!("Remove virtual server {identity}?"),
        "destroy",
        global.yes,
    )? {
        output::note("aborted", global.quiet);
        return Ok(());
    }

    let reconciler = endpoint.connect(cancel).await?;
    reconciler.delete(&mut st.tracked, &applied).await?;

    st.settle();
    state::save(&state_path, &st)?;
    output::note(&format!("removed {identity}"), global.quiet);
    Ok(())
}
