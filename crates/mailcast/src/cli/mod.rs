use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::context::Context;

mod config;
mod send;
mod senders;
mod set;

#[derive(Clone, Debug, Parser)]
#[command(name = "mailcast", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Settings file, defaults to ~/.config/mailcast/config.toml
    #[arg(long = "config", id = "config_file", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output; repeat for debug
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create or update the broadcast described by a note
    #[command(alias = "s", name = "send")]
    Send(send::SendArg),
    /// Choose the sender address or status of a note
    #[command(name = "set")]
    Set(set::SetArg),
    /// List sender addresses usable as `tenant_email_id`
    #[command(name = "senders")]
    Senders,
    #[command(alias = "cfg", name = "config")]
    Config(config::ConfigArg),
}

pub async fn run(app: App) -> anyhow::Result<()> {
    let ctx = Context::load(app.config.as_deref())?;

    match app.cmd {
        Commands::Send(arg) => send::run(arg, &ctx).await,
        Commands::Set(arg) => set::run(arg, &ctx).await,
        Commands::Senders => senders::run(&ctx).await,
        Commands::Config(arg) => config::run(arg, &ctx),
    }
}
