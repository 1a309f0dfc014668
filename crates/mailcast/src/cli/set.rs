use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, bail};
use clap::{ArgGroup, Args};
use mailcast_client::{OptionsCache, OptionsClient, SelectOption};
use mailcast_note::{BroadcastStatus, Note};

use crate::context::Context;

#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("change").required(true).multiple(true).args(["sender", "status"])))]
pub struct SetArg {
    /// Markdown note to update
    pub note: PathBuf,

    /// Sender address id, as listed by `mailcast senders`
    #[arg(long, value_name = "ID")]
    pub sender: Option<u64>,

    /// `draft` or `send`
    #[arg(long)]
    pub status: Option<BroadcastStatus>,
}

pub async fn run(arg: SetArg, ctx: &Context) -> anyhow::Result<()> {
    let mut note = Note::read(&arg.note).await?;

    if let Some(id) = arg.sender {
        // always ask the server; a picker must not offer stale senders
        let client = OptionsClient::new(ctx.transport()?, ctx.endpoint()?, Arc::new(OptionsCache::new()));
        let senders = client.refresh_tenant_emails().await?;
        let sender = find_sender(id, &senders)?;
        note.set("tenant_email_id", id);
        println!("sender: {}", sender.label);
    }
    if let Some(status) = arg.status {
        note.set_status(status);
        println!("status: {status}");
    }

    note.write(&arg.note)
        .await
        .with_context(|| format!("updating {}", arg.note.display()))
}

fn find_sender(id: u64, senders: &[SelectOption]) -> anyhow::Result<&SelectOption> {
    let value = id.to_string();
    if let Some(sender) = senders.iter().find(|s| s.value == value) {
        return Ok(sender);
    }
    let known: Vec<&str> = senders.iter().map(|s| s.value.as_str()).collect();
    bail!("unknown sender id {id}; known ids: {}", if known.is_empty() { "none".to_string() } else { known.join(", ") })
}
