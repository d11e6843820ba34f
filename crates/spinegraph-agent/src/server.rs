use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use glam::Vec2;
use spinegraph_core::ambient::AmbientParams;
use spinegraph_core::{Msg, Viewport};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::bytes::Bytes;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::actor::Command;

type Conn = Framed<UnixStream, LengthDelimitedCodec>;

pub async fn run(
    sock_path: &str,
    ambient: AmbientParams,
    commands: mpsc::Sender<Command>,
    bus_tx: broadcast::Sender<Msg>,
) -> Result<()> {
    let listener = UnixListener::bind(sock_path)
        .with_context(|| format!("failed to bind {sock_path}"))?;
    tracing::info!(socket = sock_path, "spinegraph-agent listening");
    serve(listener, ambient, commands, bus_tx).await
}

async fn serve(
    listener: UnixListener,
    ambient: AmbientParams,
    commands: mpsc::Sender<Command>,
    bus_tx: broadcast::Sender<Msg>,
) -> Result<()> {
    loop {
        let (stream, _addr) = listener.accept().await.context("accept failed")?;
        tracing::info!("viewer connected");

        let commands = commands.clone();
        let bus_rx = bus_tx.subscribe();
        tokio::spawn(async move {
            match serve_viewer(stream, ambient, commands, bus_rx).await {
                Ok(()) => tracing::info!("viewer disconnected"),
                Err(err) => tracing::warn!(error = ?err, "viewer connection failed"),
            }
        });
    }
}

async fn serve_viewer(
    stream: UnixStream,
    ambient: AmbientParams,
    commands: mpsc::Sender<Command>,
    mut bus_rx: broadcast::Receiver<Msg>,
) -> Result<()> {
    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
    send(&mut framed, &Msg::hello()).await?;
    send(&mut framed, &Msg::Ambient { params: ambient }).await?;

    loop {
        tokio::select! {
            frame = framed.next() => {
                let Some(frame) = frame else { return Ok(()) };
                let bytes = frame.context("failed to read frame")?;
                let msg = match Msg::decode(&bytes) {
                    Ok(msg) => msg,
                    Err(err) => {
                        tracing::warn!(error = %err, "dropping undecodable frame");
                        continue;
                    }
                };
                if let Some(reply) = dispatch(msg, &commands).await? {
                    send(&mut framed, &reply).await?;
                }
            }
            event = bus_rx.recv() => match event {
                Ok(msg) => send(&mut framed, &msg).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // ignore lagging viewers
                    tracing::debug!(skipped, "viewer lagging behind bus");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            },
        }
    }
}

/// Routes one viewer message; returns a direct reply if there is one.
async fn dispatch(msg: Msg, commands: &mpsc::Sender<Command>) -> Result<Option<Msg>> {
    let cmd = match msg {
        Msg::Hello { version } => {
            tracing::info!(%version, "viewer hello");
            return Ok(None);
        }
        Msg::Ping => return Ok(Some(Msg::Pong)),
        Msg::RequestPayload => {
            let (tx, rx) = oneshot::channel();
            forward(commands, Command::RequestPayload(tx)).await?;
            let payload = rx.await.context("session actor dropped payload request")?;
            return Ok(Some(payload));
        }
        Msg::PointerRay { origin, dir } => Command::PointerRay { origin, dir },
        Msg::PointerScreen { x, y } => Command::PointerScreen(Vec2::new(x, y)),
        Msg::PointerLeave => Command::PointerLeave,
        Msg::Viewport { width, height } => Command::Viewport(Viewport { width, height }),
        Msg::Camera { eye, target } => Command::Camera { eye, target },
        Msg::SetStrategy { strategy } => Command::SetStrategy(strategy),
        Msg::Reload => Command::Reload,
        other => {
            tracing::debug!(msg = ?std::mem::discriminant(&other), "ignoring agent-bound message");
            return Ok(None);
        }
    };
    forward(commands, cmd).await?;
    Ok(None)
}

async fn forward(commands: &mpsc::Sender<Command>, cmd: Command) -> Result<()> {
    commands
        .send(cmd)
        .await
        .map_err(|_| anyhow::anyhow!("session actor stopped"))
}

async fn send(framed: &mut Conn, msg: &Msg) -> Result<()> {
    let bytes = msg.encode().context("failed to encode message")?;
    framed.send(Bytes::from(bytes)).await.context("failed to write frame")
}
