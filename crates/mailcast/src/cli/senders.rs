use std::sync::Arc;

use mailcast_client::{OptionsCache, OptionsClient};

use crate::context::Context;

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    let client = OptionsClient::new(ctx.transport()?, ctx.endpoint()?, Arc::new(OptionsCache::new()));
    let senders = client.tenant_emails().await?;

    if senders.is_empty() {
        println!("no sender addresses configured");
    }
    for sender in senders {
        println!("{}\t{}", sender.value, sender.label);
    }
    Ok(())
}
