use clap::{Args, Subcommand};

use crate::context::Context;

#[derive(Clone, Debug, Args)]
pub struct ConfigArg {
    #[command(subcommand)]
    pub cmd: ConfigCommands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print where settings are read from
    Path,
    /// Print the effective settings, token redacted
    Show,
}

pub fn run(arg: ConfigArg, ctx: &Context) -> anyhow::Result<()> {
    match arg.cmd {
        ConfigCommands::Path => match &ctx.config_path {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("no home directory; pass --config"),
        },
        ConfigCommands::Show => {
            let settings = &ctx.settings;
            println!("base_url  = {}", settings.host.base_url());
            println!("transport = {:?}", settings.transport);
            println!("api_token = {}", if settings.api_token.is_empty() { "(unset)" } else { "(set)" });
        },
    }
    Ok(())
}
