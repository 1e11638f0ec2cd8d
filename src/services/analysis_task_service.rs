use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::models::{AnalysisReport, AnalysisStatus, AnalysisTask, PoseFrame};
use crate::services::frame_scoring::analyze_video;
use crate::services::frame_source::PoseFrameSource;
use crate::services::metrics_sink::RowCollector;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const ABANDONED_MESSAGE: &str = "Analysis abandoned";

/// Boxed frame source handed to a worker thread
pub type BoxedFrameSource = Box<dyn PoseFrameSource + Send>;

/// Stops feeding frames once its task is abandoned
struct AbandonableSource {
    inner: BoxedFrameSource,
    abandoned: Arc<AtomicBool>,
}

impl PoseFrameSource for AbandonableSource {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, AnalysisError> {
        if self.abandoned.load(Ordering::Relaxed) {
            return Err(AnalysisError::UpstreamDecodeFailure(ABANDONED_MESSAGE.to_string()));
        }
        self.inner.next_frame()
    }
}

/// Service running one analysis task per submitted video
#[derive(Clone)]
pub struct AnalysisTaskService {
    config: AnalysisConfig,
    tasks: Arc<RwLock<HashMap<Uuid, AnalysisTask>>>,
    abandon_flags: Arc<RwLock<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl AnalysisTaskService {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate().context("Invalid analysis configuration")?;

        Ok(Self {
            config,
            tasks: Arc::new(RwLock::new(HashMap::new())),
            abandon_flags: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Queue a video for analysis, returning its task id
    pub async fn submit(&self, source_name: impl Into<String>, source: BoxedFrameSource) -> Uuid {
        let task = AnalysisTask::new(source_name);
        let task_id = task.id;
        info!("Queued analysis task {} for {}", task_id, task.source_name);

        let abandoned = Arc::new(AtomicBool::new(false));
        self.tasks.write().await.insert(task_id, task);
        self.abandon_flags
            .write()
            .await
            .insert(task_id, Arc::clone(&abandoned));

        let tasks_ref = Arc::clone(&self.tasks);
        let flags_ref = Arc::clone(&self.abandon_flags);
        let config = self.config.clone();

        tokio::spawn(async move {
            Self::run_task(task_id, source, config, abandoned, tasks_ref, flags_ref).await;
        });

        task_id
    }

    async fn run_task(
        task_id: Uuid,
        source: BoxedFrameSource,
        config: AnalysisConfig,
        abandoned: Arc<AtomicBool>,
        tasks_ref: Arc<RwLock<HashMap<Uuid, AnalysisTask>>>,
        flags_ref: Arc<RwLock<HashMap<Uuid, Arc<AtomicBool>>>>,
    ) {
        Self::update_task_status(&tasks_ref, task_id, AnalysisStatus::Processing, None, None).await;

        let result = tokio::task::spawn_blocking(move || {
            let mut source = AbandonableSource {
                inner: source,
                abandoned,
            };
            let mut collector = RowCollector::new();
            let outcome = analyze_video(&mut source, config, &mut collector)?;

            Ok::<_, AnalysisError>(AnalysisReport {
                rows: collector.into_rows(),
                summary: outcome.summary,
                frames_seen: outcome.frames_seen,
                frames_skipped: outcome.frames_skipped,
            })
        })
        .await
        .map_err(|e| anyhow!("Analysis worker panicked: {}", e))
        .and_then(|result| result.map_err(anyhow::Error::from));

        // The worker is gone; nothing left to stop
        flags_ref.write().await.remove(&task_id);

        match result {
            Ok(report) => {
                if !report.has_summary() {
                    warn!("Task {} finished without analyzable frames", task_id);
                }
                Self::update_task_status(
                    &tasks_ref,
                    task_id,
                    AnalysisStatus::Completed,
                    None,
                    Some(report),
                )
                .await;
                info!("Completed analysis task {}", task_id);
            }
            Err(e) => {
                let error_msg = format!("Video analysis failed: {}", e);
                Self::update_task_status(
                    &tasks_ref,
                    task_id,
                    AnalysisStatus::Failed,
                    Some(error_msg.clone()),
                    None,
                )
                .await;
                error!("Failed analysis task {}: {}", task_id, error_msg);
            }
        }
    }

    /// Snapshot of a task
    pub async fn get(&self, task_id: Uuid) -> Option<AnalysisTask> {
        self.tasks.read().await.get(&task_id).cloned()
    }

    /// Poll a task until it completes or fails
    pub async fn wait(&self, task_id: Uuid, timeout: Duration) -> Result<AnalysisTask> {
        let poll = async {
            loop {
                match self.get(task_id).await {
                    Some(task) if task.status.is_finished() => return Ok(task),
                    Some(_) => tokio::time::sleep(POLL_INTERVAL).await,
                    None => return Err(anyhow!("Analysis task {} not found", task_id)),
                }
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| anyhow!("Timed out waiting for analysis task {}", task_id))?
    }

    /// Stop a running task; its result is never published
    pub async fn abandon(&self, task_id: Uuid) -> Result<()> {
        let task = self
            .get(task_id)
            .await
            .ok_or_else(|| anyhow!("Analysis task {} not found", task_id))?;
        if task.status.is_finished() {
            return Err(anyhow!(
                "Analysis task {} already finished as {}",
                task_id,
                task.status
            ));
        }

        if let Some(flag) = self.abandon_flags.read().await.get(&task_id) {
            flag.store(true, Ordering::Relaxed);
        }

        Self::update_task_status(
            &self.tasks,
            task_id,
            AnalysisStatus::Failed,
            Some(ABANDONED_MESSAGE.to_string()),
            None,
        )
        .await;
        info!("Abandoned analysis task {}", task_id);
        Ok(())
    }

    /// Forget tasks that finished more than `older_than` ago
    pub async fn cleanup_finished(&self, older_than: chrono::Duration) -> usize {
        let cutoff = chrono::Utc::now() - older_than;

        let mut tasks = self.tasks.write().await;
        let initial_count = tasks.len();

        tasks.retain(|_, task| {
            !task.status.is_finished() || task.completed_at.map_or(true, |done| done > cutoff)
        });

        let cleaned_count = initial_count - tasks.len();
        if cleaned_count > 0 {
            info!("Cleaned up {} finished analysis tasks", cleaned_count);
        }
        cleaned_count
    }

    /// All tasks, oldest first
    pub async fn list(&self) -> Vec<AnalysisTask> {
        let mut tasks: Vec<AnalysisTask> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by_key(|task| task.created_at);
        tasks
    }

    async fn update_task_status(
        tasks_ref: &Arc<RwLock<HashMap<Uuid, AnalysisTask>>>,
        task_id: Uuid,
        status: AnalysisStatus,
        error_message: Option<String>,
        report: Option<AnalysisReport>,
    ) {
        let mut tasks = tasks_ref.write().await;

        if let Some(task) = tasks.get_mut(&task_id) {
            // Finished tasks are frozen, including abandoned ones
            if task.status.is_finished() {
                return;
            }

            task.status = status;
            task.error_message = error_message;
            task.report = report;

            match status {
                AnalysisStatus::Processing => {
                    task.started_at = Some(chrono::Utc::now());
                }
                AnalysisStatus::Completed | AnalysisStatus::Failed => {
                    task.completed_at = Some(chrono::Utc::now());
                }
                AnalysisStatus::Queued => {}
            }
        }
    }
}
