//! Collection pipeline
//!
//! One run per manager:
//!
//! ```text
//! QueryManager → ParseManagerStatus ─┬─ status == 1 → QueryQueues → ParseQueues → RenderAll → Done
//!                                    └─ otherwise   → Abort
//! ```
//!
//! An aborted run still carries the manager status metric so the collector
//! can alert on a stopped manager. Queue commands are never issued for it.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, instrument, warn};

use crate::collector::{
    build_manager_record, build_queue_records, discover_managers, CommandRunner, DiscoverError,
    MqTask, Record,
};
use crate::error::{EntityError, TransportError};
use crate::transformer::{
    MetricRenderer, RenderOutput, MANAGER_FAMILIES, QUEUE_DEPTH_FAMILIES, QUEUE_MONITOR_FAMILIES,
};

/// Pipeline states, as reported on [`CollectOutcome::state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    QueryManager,
    ParseManagerStatus,
    QueryQueues,
    ParseQueues,
    RenderAll,
    Done,
    Abort,
}

/// Health of the manager derived from its STATUS field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerHealth {
    /// STATUS(Running)
    Running,
    /// Any other status; queue collection skipped
    NotRunning,
    /// Status record could not be parsed or rendered
    Unknown,
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOutcome {
    pub manager: String,
    /// Manager metric followed by queue metrics
    pub text: String,
    pub health: ManagerHealth,
    /// Per-entity parse failures
    pub errors: Vec<EntityError>,
    /// [`PipelineState::Done`] or [`PipelineState::Abort`]
    pub state: PipelineState,
    pub samples: usize,
}

impl CollectOutcome {
    fn new(manager: &str) -> Self {
        Self {
            manager: manager.to_string(),
            text: String::new(),
            health: ManagerHealth::Unknown,
            errors: Vec::new(),
            state: PipelineState::QueryManager,
            samples: 0,
        }
    }

    fn absorb(&mut self, rendered: RenderOutput) {
        self.text.push_str(&rendered.text);
        self.samples += rendered.samples;
        self.errors.extend(rendered.errors);
    }

    pub fn is_aborted(&self) -> bool {
        self.state == PipelineState::Abort
    }
}

enum Stage {
    QueryManager,
    ParseManagerStatus(String),
    QueryQueues,
    ParseQueues {
        depth: String,
        monitor: String,
    },
    RenderAll {
        depth: Vec<(String, Record)>,
        monitor: Vec<(String, Record)>,
    },
    Done,
    Abort,
}

impl Stage {
    fn state(&self) -> PipelineState {
        match self {
            Stage::QueryManager => PipelineState::QueryManager,
            Stage::ParseManagerStatus(_) => PipelineState::ParseManagerStatus,
            Stage::QueryQueues => PipelineState::QueryQueues,
            Stage::ParseQueues { .. } => PipelineState::ParseQueues,
            Stage::RenderAll { .. } => PipelineState::RenderAll,
            Stage::Done => PipelineState::Done,
            Stage::Abort => PipelineState::Abort,
        }
    }
}

/// Runs the collection pipeline against a [`CommandRunner`]
#[derive(Clone)]
pub struct Pipeline {
    runner: Arc<dyn CommandRunner>,
}

impl Pipeline {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Configured managers, or every manager `dspmq` reports when none are configured
    pub async fn managers(&self, configured: &[String]) -> Result<Vec<String>, DiscoverError> {
        if !configured.is_empty() {
            return Ok(configured.to_vec());
        }
        let managers = discover_managers(self.runner.as_ref()).await?;
        debug!(count = managers.len(), "Discovered managers");
        Ok(managers)
    }

    /// Collect one manager and its queues
    ///
    /// # Errors
    /// Only command failures are returned as errors; parse failures are
    /// collected on the outcome.
    #[instrument(skip(self), fields(manager = %manager))]
    pub async fn collect(&self, manager: &str) -> Result<CollectOutcome, TransportError> {
        let mut outcome = CollectOutcome::new(manager);
        let mut stage = Stage::QueryManager;

        loop {
            debug!(state = ?stage.state(), "Pipeline step");
            outcome.state = stage.state();

            stage = match stage {
                Stage::QueryManager => {
                    let raw = self.query(MqTask::ManagerStatus, manager).await?;
                    Stage::ParseManagerStatus(raw)
                }
                Stage::ParseManagerStatus(raw) => Self::parse_manager(manager, &raw, &mut outcome),
                Stage::QueryQueues => {
                    let depth = self.query(MqTask::QueueDepth, manager).await?;
                    let monitor = self.query(MqTask::QueueMonitor, manager).await?;
                    Stage::ParseQueues { depth, monitor }
                }
                Stage::ParseQueues { depth, monitor } => {
                    let (depth, depth_errors) = build_queue_records(&depth);
                    let (monitor, monitor_errors) = build_queue_records(&monitor);
                    outcome.errors.extend(depth_errors);
                    outcome.errors.extend(monitor_errors);
                    Stage::RenderAll { depth, monitor }
                }
                Stage::RenderAll { depth, monitor } => {
                    outcome.absorb(MetricRenderer::new(QUEUE_DEPTH_FAMILIES).render(manager, &depth));
                    outcome.absorb(
                        MetricRenderer::new(QUEUE_MONITOR_FAMILIES).render(manager, &monitor),
                    );
                    Stage::Done
                }
                Stage::Done | Stage::Abort => {
                    debug!(
                        samples = outcome.samples,
                        errors = outcome.errors.len(),
                        "Pipeline finished"
                    );
                    return Ok(outcome);
                }
            };
        }
    }

    /// Collect several managers concurrently; results keep input order
    pub async fn collect_all(
        &self,
        managers: &[String],
    ) -> Vec<(String, Result<CollectOutcome, TransportError>)> {
        let mut set = JoinSet::new();

        for (index, manager) in managers.iter().enumerate() {
            let pipeline = self.clone();
            let manager = manager.clone();
            set.spawn(async move {
                (index, pipeline.collect(&manager).await)
            });
        }

        let mut slots: Vec<Option<Result<CollectOutcome, TransportError>>> =
            managers.iter().map(|_| None).collect();
        let mut reason = String::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => {
                    error!(error = %e, "Collection task failed");
                    reason = e.to_string();
                }
            }
        }

        // a task that never reported back is still listed, as a failure
        managers
            .iter()
            .zip(slots)
            .map(|(manager, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(TransportError::TaskFailed {
                        manager: manager.clone(),
                        reason: reason.clone(),
                    })
                });
                (manager.clone(), result)
            })
            .collect()
    }

    async fn query(&self, task: MqTask, manager: &str) -> Result<String, TransportError> {
        self.runner.run(task, manager).await.map_err(|e| {
            error!(task = %task, manager = %manager, error = %e, "MQ command failed");
            e
        })
    }

    fn parse_manager(manager: &str, raw: &str, outcome: &mut CollectOutcome) -> Stage {
        let record = match build_manager_record(raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(manager = %manager, error = %e, fragment = %raw.trim(), "Unparseable manager status");
                outcome.errors.push(EntityError::new(manager, e));
                return Stage::Abort;
            }
        };

        let status = record.status();
        let rendered =
            MetricRenderer::new(MANAGER_FAMILIES).render(manager, &[(manager.to_string(), record)]);
        let rendered_ok = rendered.errors.is_empty();
        outcome.absorb(rendered);

        if !rendered_ok {
            return Stage::Abort;
        }

        match status {
            Some(1) => {
                outcome.health = ManagerHealth::Running;
                Stage::QueryQueues
            }
            other => {
                warn!(
                    manager = %manager,
                    status = ?other,
                    "MQ manager is not running, queue metrics will not be collected"
                );
                outcome.health = ManagerHealth::NotRunning;
                Stage::Abort
            }
        }
    }
}
