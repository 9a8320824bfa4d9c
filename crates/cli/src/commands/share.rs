use anyhow::bail;
use basehealth_core::pipeline::Phase;
use basehealth_node::api::SessionView;
use basehealth_node::controller::IntentOutcome;

use super::SessionArgs;
use crate::render;

pub async fn run(args: &SessionArgs, grantee: &str) -> anyhow::Result<SessionView> {
    let ctrl = args.connect().await?;

    match ctrl.share(grantee)? {
        IntentOutcome::Started(ticket) => {
            println!("Granting {} access ({})...", grantee, ticket.id);
            ticket.settled().await;
        }
        IntentOutcome::Ignored(reason) => bail!("Share not started: {:?}", reason),
    }

    let view = ctrl.snapshot();
    render::print_session(&view);
    if let Phase::Failed { failure } = &view.share.phase {
        bail!("{}", failure);
    }
    Ok(view)
}
