use std::path::{Path, PathBuf};

use anyhow::Context as _;
use mailcast_client::{
    Endpoint, HostTransport, ReqwestPrimitive, Request, Response, Settings, SocketTransport, Transport,
    TransportKind,
};
use tracing::debug;

/// Settings resolved from the file and the environment.
#[derive(Debug)]
pub struct Context {
    pub settings:    Settings,
    pub config_path: Option<PathBuf>,
}

impl Context {
    pub fn load(config: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = config.map(Path::to_path_buf).or_else(Settings::default_path);
        let settings = match &config_path {
            Some(path) => Settings::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => Settings::default(),
        };
        let settings = settings.with_env();
        debug!(?settings, "settings loaded");

        Ok(Self {
            settings,
            config_path,
        })
    }

    pub fn endpoint(&self) -> anyhow::Result<Endpoint> { Ok(self.settings.endpoint()?) }

    pub fn transport(&self) -> anyhow::Result<AnyTransport> {
        Ok(match self.settings.transport {
            TransportKind::Socket => AnyTransport::Socket(SocketTransport::new()),
            TransportKind::Reqwest => {
                let primitive = ReqwestPrimitive::new().context("building HTTP client")?;
                AnyTransport::Host(HostTransport::new(primitive))
            },
        })
    }
}

/// The strategy picked by [`TransportKind`].
pub enum AnyTransport {
    Socket(SocketTransport),
    Host(HostTransport<ReqwestPrimitive>),
}

impl Transport for AnyTransport {
    async fn send(&self, request: Request) -> mailcast_client::Result<Response> {
        match self {
            AnyTransport::Socket(t) => t.send(request).await,
            AnyTransport::Host(t) => t.send(request).await,
        }
    }
}
