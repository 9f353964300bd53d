//! Main Coordinator task implementation

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::CoordinatorConfig;
use super::handle::CoordinatorHandle;
use super::messages::{CoordRequest, CoordinatorMetrics};
use super::timer::GraceTimer;
use crate::audit::AuditStore;
use crate::config::TimelineSettings;
use crate::events::{BoothEvent, EventBus, ResetReason};
use crate::services::BoothServices;
use crate::timeline::{BoothController, Completion, Effect};

/// The Coordinator owns the timeline and serialises every input through it
///
/// Clock signals, operator commands, busy reports, timer firings and load
/// completions all arrive on one channel and are applied one at a time.
pub struct Coordinator {
    tx: mpsc::Sender<CoordRequest>,
    rx: mpsc::Receiver<CoordRequest>,
    controller: BoothController,
    services: Arc<dyn BoothServices>,
    bus: Arc<EventBus>,
    /// Optional sink for override audit entries
    audit_store: Option<AuditStore>,
}

impl Coordinator {
    /// Create a new Coordinator with the given configuration
    pub fn new(
        config: CoordinatorConfig,
        settings: TimelineSettings,
        services: Arc<dyn BoothServices>,
        bus: Arc<EventBus>,
    ) -> Self {
        debug!(?config, "Coordinator::new: called");
        let (tx, rx) = mpsc::channel(config.channel_buffer);
        Self {
            tx,
            rx,
            controller: BoothController::new(settings),
            services,
            bus,
            audit_store: None,
        }
    }

    /// Persist override entries to the given store
    pub fn with_audit_store(mut self, store: AuditStore) -> Self {
        debug!(path = %store.audit_file().display(), "Coordinator::with_audit_store: called");
        self.audit_store = Some(store);
        self
    }

    /// Get a handle for feeding inputs
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle::new(self.tx.clone())
    }

    /// Run the Coordinator task
    ///
    /// This consumes the Coordinator and runs until shutdown is requested.
    pub async fn run(mut self) {
        let mut timer = GraceTimer::new();
        let mut metrics = CoordinatorMetrics::default();

        info!("Coordinator started");

        while let Some(req) = self.rx.recv().await {
            match req {
                CoordRequest::Input(input) => {
                    metrics.inputs_received += 1;
                    let command = input.name();

                    match self.controller.handle(input) {
                        Ok(effects) => self.execute(effects, &mut timer, &mut metrics).await,
                        Err(e) => {
                            warn!(%command, error = %e, "Command rejected");
                            metrics.rejected_inputs += 1;
                            self.emit(
                                BoothEvent::CommandRejected {
                                    command: command.to_string(),
                                    reason: e.to_string(),
                                },
                                &mut metrics,
                            );
                        }
                    }
                }

                CoordRequest::Complete(completion) => {
                    let effects = self.controller.complete(completion);
                    self.execute(effects, &mut timer, &mut metrics).await;
                }

                CoordRequest::GetSnapshot { reply_tx } => {
                    let _ = reply_tx.send(self.controller.snapshot());
                }

                CoordRequest::GetMetrics { reply_tx } => {
                    let _ = reply_tx.send(metrics.clone());
                }

                CoordRequest::Shutdown => {
                    info!("Coordinator shutting down");
                    break;
                }
            }
        }

        timer.abort();
        info!("Coordinator stopped");
    }

    /// Execute effects in order
    ///
    /// Audit entries are written before the next input is taken. Content loads
    /// and busy-work cancels are spawned.
    async fn execute(&self, effects: Vec<Effect>, timer: &mut GraceTimer, metrics: &mut CoordinatorMetrics) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.emit(event, metrics),

                Effect::StartGraceTimer { attempt, grace } => {
                    timer.start(attempt, grace, self.tx.clone());
                }

                Effect::CancelGraceTimer { attempt } => timer.cancel(attempt),

                Effect::CancelBusyWork => {
                    let services = Arc::clone(&self.services);
                    tokio::spawn(async move {
                        if let Err(e) = services.cancel_busy_work().await {
                            warn!("Failed to cancel busy work: {}", e);
                        }
                    });
                }

                Effect::LogAudit(entry) => {
                    if let Some(store) = &self.audit_store
                        && let Err(e) = store.persist(&entry).await
                    {
                        warn!("Failed to persist override entry: {}", e);
                    }
                }

                Effect::LoadContent { generation, path } => {
                    let services = Arc::clone(&self.services);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = services
                            .load_session_content(&path)
                            .await
                            .map_err(|e| format!("{:#}", e));
                        let _ = tx
                            .send(CoordRequest::Complete(Completion::ContentLoaded {
                                generation,
                                path,
                                result,
                            }))
                            .await;
                    });
                }
            }
        }
    }

    fn emit(&self, event: BoothEvent, metrics: &mut CoordinatorMetrics) {
        match &event {
            BoothEvent::ResetCompleted { reason } => {
                metrics.resets_completed += 1;
                if *reason == ResetReason::GraceExpired {
                    metrics.grace_expiries += 1;
                }
            }
            BoothEvent::OverrideRecorded { .. } => metrics.overrides_recorded += 1,
            _ => {}
        }
        metrics.events_emitted += 1;
        self.bus.emit(event);
    }
}
