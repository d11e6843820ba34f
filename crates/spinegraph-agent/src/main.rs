mod actor;
mod config;
mod fallback;
mod guide;
mod ingest;
mod server;

use actor::{Command, SessionActor, Sources};
use anyhow::Result;
use config::parse_args;
use spinegraph_core::Msg;
use tokio::sync::{broadcast, mpsc};

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

fn runtime_sock_path() -> String {
    // Wayland-friendly: prefer XDG_RUNTIME_DIR
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        format!("{dir}/spinegraph.sock")
    } else {
        "/tmp/spinegraph.sock".to_string()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = parse_args()?;

    let mut layout_cfg = config::load_or_default(config.config.as_deref());
    if let Some(kind) = config.strategy {
        layout_cfg.layout.strategy = kind;
    }

    if config.init_config {
        let path = config::save(&layout_cfg, config.config.as_deref())?;
        tracing::info!(path = %path.display(), "layout config written");
        return Ok(());
    }

    let sock_path = config.socket.clone().unwrap_or_else(runtime_sock_path);
    tracing::info!(
        data = ?config.data,
        guide = ?config.guide,
        strategy = layout_cfg.layout.strategy.as_str(),
        tick_hz = config.tick_hz,
        "agent configured"
    );

    // Clean stale socket
    let _ = std::fs::remove_file(&sock_path);

    // Event bus (broadcast so multiple viewers can subscribe)
    let (bus_tx, _bus_rx) = broadcast::channel::<Msg>(1024);
    let (out_tx, out_rx) = mpsc::channel::<Msg>(1024);
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(256);

    let actor = SessionActor::new(
        layout_cfg.layout,
        layout_cfg.pick_tolerance,
        Sources {
            records: config.data,
            guide: config.guide,
        },
        cmd_tx.clone(),
        out_tx,
    );
    tokio::spawn(actor.run(cmd_rx, config.tick_hz));

    // Forward session output → broadcast bus
    {
        let bus_tx = bus_tx.clone();
        tokio::spawn(async move {
            forward_to_bus(out_rx, bus_tx).await;
        });
    }

    server::run(&sock_path, layout_cfg.ambient, cmd_tx, bus_tx).await
}

async fn forward_to_bus(mut rx: mpsc::Receiver<Msg>, bus_tx: broadcast::Sender<Msg>) {
    while let Some(msg) = rx.recv().await {
        // no subscribers is fine
        let _ = bus_tx.send(msg);
    }
}
