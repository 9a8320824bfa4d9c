use std::path::Path;

use anyhow::bail;
use basehealth_core::pipeline::Phase;
use basehealth_node::api::SessionView;
use basehealth_node::controller::{IntentOutcome, StagedFile};

use super::SessionArgs;
use crate::render;

/// Hashes `path` locally and stores the fingerprint for the account.
pub async fn run(args: &SessionArgs, path: &Path) -> anyhow::Result<SessionView> {
    let ctrl = args.connect().await?;
    ctrl.select_file(StagedFile::from_path(path));

    match ctrl.submit()? {
        IntentOutcome::Started(ticket) => {
            println!("Submitting {} ({})...", path.display(), ticket.id);
            ticket.settled().await;
        }
        IntentOutcome::Ignored(reason) => bail!("Submission not started: {:?}", reason),
    }

    let view = ctrl.snapshot();
    render::print_session(&view);
    if let Phase::Failed { failure } = &view.submit.phase {
        bail!("{}", failure);
    }
    Ok(view)
}
