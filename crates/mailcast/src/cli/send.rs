use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::Args;
use mailcast_client::{BroadcastDraft, Operation, SubmissionResult, SubmissionService, image_attachment};
use mailcast_note::{Note, Receipt, VaultResolver, parse_image_references};
use tracing::{info, warn};

use crate::context::Context;

/// Marks a vault root, as created by the desktop editor.
const VAULT_MARKER: &str = ".obsidian";

#[derive(Clone, Debug, Args)]
pub struct SendArg {
    /// Markdown note with broadcast frontmatter
    pub note: PathBuf,

    /// Directory searched for images; defaults to the enclosing vault
    #[arg(long, value_name = "DIR")]
    pub vault: Option<PathBuf>,

    /// Validate and resolve images without contacting the server
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(arg: SendArg, ctx: &Context) -> anyhow::Result<()> {
    let note_path = arg
        .note
        .canonicalize()
        .with_context(|| format!("cannot open note {}", arg.note.display()))?;
    let mut note = Note::read(&note_path).await?;
    let fm = note.frontmatter()?.validate()?;

    let references = parse_image_references(note.body());
    let vault = match arg.vault {
        Some(dir) => dir,
        None => vault_root(&note_path),
    };
    let resolution = VaultResolver::new(vault)
        .resolve(&references, &note_path)
        .await?;
    if !resolution.is_complete() {
        for name in &resolution.missing {
            eprintln!("image not found: {name}");
        }
        bail!("{} image(s) could not be resolved", resolution.missing.len());
    }

    let draft = BroadcastDraft::new(fm.subject, note.body())
        .tenant_email_id(fm.tenant_email_id)
        .scheduled_at(fm.scheduled_at)
        .tag_ids(fm.tag_ids);
    let images: Vec<_> = resolution
        .images
        .into_iter()
        .map(|image| image_attachment(image.filename, image.data))
        .collect();
    let operation = Operation::for_existing(fm.id);

    if arg.dry_run {
        println!("{operation:?}: \"{}\" with {} image(s), status {}", draft.subject, images.len(), fm.status);
        return Ok(());
    }

    let service = SubmissionService::new(ctx.transport()?, ctx.endpoint()?);
    let result = match service.submit(operation, &draft, &images).await {
        Ok(result) => result,
        Err(err) => {
            for line in err.messages() {
                eprintln!("send failed: {line}");
            }
            bail!("broadcast was not saved");
        },
    };
    info!(id = ?result.id, status = %result.status, "broadcast saved");

    let Some(receipt) = receipt(&result) else {
        warn!("server returned no id; the note was left unchanged");
        println!("broadcast saved, but the server returned no id");
        return Ok(());
    };
    let id = receipt.id;
    note.record(&receipt);
    note.write(&note_path)
        .await
        .context("broadcast saved but the note could not be updated")?;

    match operation {
        Operation::Create => println!("created broadcast {id}"),
        Operation::Update(_) => println!("updated broadcast {id}"),
    }
    if let Some(url) = &result.url {
        println!("{url}");
    }
    Ok(())
}

/// What to write back into the note; `None` when the server sent no id.
fn receipt(result: &SubmissionResult) -> Option<Receipt<'_>> {
    Some(Receipt {
        id:         result.id?,
        url:        result.url.as_deref(),
        created_at: result.created_at.as_deref(),
        updated_at: result.updated_at.as_deref(),
    })
}

/// Nearest ancestor holding a vault marker, else the note's directory.
fn vault_root(note: &Path) -> PathBuf {
    let dir = note.parent().unwrap_or(note);
    dir.ancestors()
        .find(|d| d.join(VAULT_MARKER).is_dir())
        .unwrap_or(dir)
        .to_path_buf()
}
