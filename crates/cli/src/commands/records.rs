use basehealth_node::api::SessionView;

use super::SessionArgs;
use crate::render;

pub async fn run(args: &SessionArgs, json: bool) -> anyhow::Result<SessionView> {
    let ctrl = args.connect().await?;
    let view = ctrl.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        render::print_session(&view);
    }
    Ok(view)
}
