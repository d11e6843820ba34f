use crossbeam_channel::Receiver;
use glam::{Vec2, Vec3};
use spinegraph_core::ambient::{camera_distance, Fog, FogTracker};
use spinegraph_core::{
    Guide, LayoutParams, LoadTicket, Msg, Ordinal, Ray, ReadyGate, Record, StrategyKind, Viewport,
    VisualizationSession,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

use crate::guide::load_guide;
use crate::ingest::load_records;

#[derive(Debug)]
pub enum Command {
    PointerRay { origin: Vec3, dir: Vec3 },
    PointerScreen(Vec2),
    PointerLeave,
    Viewport(Viewport),
    Camera { eye: Vec3, target: Vec3 },
    SetStrategy(StrategyKind),
    RequestPayload(oneshot::Sender<Msg>),
    Reload,
    RecordsLoaded { ticket: LoadTicket, records: Vec<Record> },
    GuideLoaded { ticket: LoadTicket, guide: Guide },
}

#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub records: Option<PathBuf>,
    pub guide: Option<PathBuf>,
}

/// A load in flight: records and guide resolve independently.
struct PendingLoad {
    ticket: LoadTicket,
    gate: ReadyGate<Vec<Record>, Guide>,
}

/// Single owner of the session. Everything that touches it goes through
/// the command channel, in order.
pub struct SessionActor {
    session: VisualizationSession,
    sources: Sources,
    commands: mpsc::Sender<Command>,
    out: mpsc::Sender<Msg>,
    active_rx: Receiver<Option<Ordinal>>,
    previous: Option<Ordinal>,
    pending: Option<PendingLoad>,
    fog: FogTracker,
    fog_changed: Option<Fog>,
    started: Instant,
}

impl SessionActor {
    pub fn new(
        params: LayoutParams,
        tolerance: f32,
        sources: Sources,
        commands: mpsc::Sender<Command>,
        out: mpsc::Sender<Msg>,
    ) -> Self {
        let (active_tx, active_rx) = crossbeam_channel::unbounded();
        let mut session = VisualizationSession::new(params).with_tolerance(tolerance);
        session.on_active_change(move |active| {
            let _ = active_tx.send(active);
        });

        Self {
            session,
            sources,
            commands,
            out,
            active_rx,
            previous: None,
            pending: None,
            fog: FogTracker::new(Fog::default()),
            fog_changed: None,
            started: Instant::now(),
        }
    }

    pub async fn run(mut self, mut rx: mpsc::Receiver<Command>, tick_hz: u32) {
        self.start_load();
        let mut tick = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(tick_hz.max(1))));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle(cmd).await;
                }
                _ = tick.tick() => self.tick().await,
            }
        }
        tracing::info!("session actor stopped");
    }

    /// Issues a new ticket and loads records and guide concurrently. Each
    /// side reports back as soon as it resolves.
    fn start_load(&mut self) {
        let ticket = self.session.begin_load();
        self.pending = Some(PendingLoad {
            ticket,
            gate: ReadyGate::new(),
        });
        tracing::debug!(ticket = ticket.0, "load started");

        let sources = self.sources.clone();
        let records_tx = self.commands.clone();
        let guide_tx = self.commands.clone();
        tokio::spawn(async move {
            let records = async {
                let (records, source) = load_records(sources.records.as_deref()).await;
                tracing::debug!(?source, records = records.len(), "record load finished");
                let _ = records_tx.send(Command::RecordsLoaded { ticket, records }).await;
            };
            let guide = async {
                let guide = load_guide(sources.guide.as_deref()).await;
                let _ = guide_tx.send(Command::GuideLoaded { ticket, guide }).await;
            };
            tokio::join!(records, guide);
        });
    }

    pub async fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::PointerRay { origin, dir } => {
                let Some(ray) = Ray::new(origin, dir) else {
                    tracing::debug!(?origin, ?dir, "ignoring degenerate pointer ray");
                    return;
                };
                if self.session.pointer_ray(&ray).is_some() {
                    self.flush_active().await;
                    self.publish_payload().await;
                }
            }
            Command::PointerScreen(cursor) => {
                if self.session.pointer_viewport(cursor).is_some() {
                    self.flush_active().await;
                    self.publish_payload().await;
                }
            }
            Command::PointerLeave => {
                if self.session.pointer_leave().is_some() {
                    self.flush_active().await;
                    self.publish_payload().await;
                }
            }
            Command::Viewport(viewport) => {
                let mut params = *self.session.params();
                if params.viewport == viewport {
                    return;
                }
                params.viewport = viewport;
                self.session.set_params(params);
                self.after_rebuild().await;
            }
            Command::Camera { eye, target } => {
                if let Some(fog) = self.fog.update(camera_distance(eye, target)) {
                    self.fog_changed = Some(fog);
                }
            }
            Command::SetStrategy(kind) => {
                if self.session.params().strategy == kind {
                    return;
                }
                tracing::info!(strategy = kind.as_str(), "strategy changed");
                self.session.set_strategy(kind);
                self.after_rebuild().await;
            }
            Command::RequestPayload(reply) => {
                let _ = reply.send(Msg::payload(self.session.payload()));
            }
            Command::Reload => self.start_load(),
            Command::RecordsLoaded { ticket, records } => {
                if let Some(pending) = self.pending_for(ticket) {
                    pending.gate.resolve_first(records);
                }
                self.try_complete().await;
            }
            Command::GuideLoaded { ticket, guide } => {
                if let Some(pending) = self.pending_for(ticket) {
                    pending.gate.resolve_second(guide);
                }
                self.try_complete().await;
            }
        }
    }

    fn pending_for(&mut self, ticket: LoadTicket) -> Option<&mut PendingLoad> {
        match self.pending.as_mut() {
            Some(p) if p.ticket == ticket => Some(p),
            _ => {
                tracing::debug!(ticket = ticket.0, "discarding stale load result");
                None
            }
        }
    }

    async fn try_complete(&mut self) {
        if !self.pending.as_ref().is_some_and(|p| p.gate.is_ready()) {
            return;
        }
        let Some(PendingLoad { ticket, gate }) = self.pending.take() else {
            return;
        };
        let Ok((records, guide)) = gate.take() else {
            return;
        };

        match self.session.apply_load(ticket, guide, records) {
            Some(rebuild) => {
                for err in &rebuild.dropped {
                    tracing::debug!(error = %err, "dropped record");
                }
                tracing::info!(
                    ticket = ticket.0,
                    entities = self.session.entities().len(),
                    edges = self.session.edges().total(),
                    "layout ready"
                );
                self.after_rebuild().await;
            }
            None => tracing::debug!(ticket = ticket.0, "load superseded"),
        }
    }

    async fn after_rebuild(&mut self) {
        self.flush_active().await;
        self.publish_payload().await;
    }

    /// Turns observer notifications into one `ActiveChanged` each.
    async fn flush_active(&mut self) {
        let changes: Vec<Option<Ordinal>> = self.active_rx.try_iter().collect();
        for active in changes {
            let previous = std::mem::replace(&mut self.previous, active);
            tracing::debug!(?previous, ?active, "active entity changed");
            self.emit(Msg::ActiveChanged { previous, active }).await;
        }
    }

    async fn publish_payload(&mut self) {
        self.emit(Msg::payload(self.session.payload())).await;
    }

    async fn tick(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f32();
        let fog = self.fog_changed.take();
        self.emit(Msg::Tick { elapsed, fog }).await;
    }

    async fn emit(&mut self, msg: Msg) {
        if self.out.send(msg).await.is_err() {
            tracing::debug!("outbound channel closed");
        }
    }
}
