use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::dashboard_service::DashboardService;

pub const WATCHLIST_TICK_JOB: &str = "watchlist_tick";
pub const CHART_ADVANCE_JOB: &str = "chart_advance";

// Context passed to job functions
#[derive(Clone)]
pub struct JobContext {
    pub dashboard: Arc<DashboardService>,
}

#[derive(Debug)]
pub struct JobResult {
    pub items_processed: usize,
}

/// Owns the named periodic simulation jobs. Jobs only compute and store the
/// next dashboard snapshot; stopping the scheduler cancels all of them.
pub struct SimulationScheduler {
    scheduler: JobScheduler,
    context: JobContext,
    jobs: Vec<(&'static str, Uuid)>,
}

impl SimulationScheduler {
    pub async fn new(dashboard: Arc<DashboardService>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::External(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            context: JobContext { dashboard },
            jobs: Vec::new(),
        })
    }

    /// Start all simulation jobs
    pub async fn start(&mut self) -> Result<(), AppError> {
        info!("🚀 Starting simulation scheduler...");

        let config = self.context.dashboard.config().clone();

        self.schedule_job(WATCHLIST_TICK_JOB, config.watchlist_tick, tick_watchlist)
            .await?;
        self.schedule_job(CHART_ADVANCE_JOB, config.chart_tick, advance_chart)
            .await?;

        self.scheduler.start()
            .await
            .map_err(|e| AppError::External(format!("Failed to start scheduler: {}", e)))?;

        info!("✅ Simulation scheduler started with {} jobs", self.jobs.len());
        Ok(())
    }

    /// Cancel every job and stop the scheduler
    pub async fn stop(&mut self) -> Result<(), AppError> {
        info!("🛑 Stopping simulation scheduler...");
        for (name, id) in self.jobs.drain(..) {
            self.scheduler.remove(&id)
                .await
                .map_err(|e| AppError::External(format!("Failed to remove job {}: {}", name, e)))?;
            debug!("Removed job {}", name);
        }

        self.scheduler.shutdown()
            .await
            .map_err(|e| AppError::External(format!("Failed to stop scheduler: {}", e)))?;
        info!("✅ Simulation scheduler stopped");
        Ok(())
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|(name, _)| *name).collect()
    }

    async fn schedule_job<F>(
        &mut self,
        job_name: &'static str,
        period: Duration,
        job_fn: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&JobContext) -> JobResult + Send + Sync + 'static,
    {
        let context = self.context.clone();
        let job_fn = Arc::new(job_fn);

        let job = Job::new_repeated(period, move |_uuid, _l| {
            execute_job_with_tracking(job_name, &context, job_fn.as_ref());
        })
        .map_err(|e| AppError::External(format!("Failed to create job {}: {}", job_name, e)))?;

        let id = self.scheduler.add(job)
            .await
            .map_err(|e| AppError::External(format!("Failed to add job {}: {}", job_name, e)))?;

        self.jobs.push((job_name, id));
        info!("📅 Scheduled: {} every {}ms", job_name, period.as_millis());
        Ok(())
    }
}

// Job tracking wrapper
fn execute_job_with_tracking<F>(job_name: &str, context: &JobContext, job_fn: &F) -> JobResult
where
    F: Fn(&JobContext) -> JobResult,
{
    let started_at = Instant::now();
    let result = job_fn(context);
    debug!(
        "Job {} processed {} items in {}µs",
        job_name,
        result.items_processed,
        started_at.elapsed().as_micros()
    );
    result
}

// Job implementation functions
fn tick_watchlist(ctx: &JobContext) -> JobResult {
    JobResult { items_processed: ctx.dashboard.tick_watchlist() }
}

fn advance_chart(ctx: &JobContext) -> JobResult {
    JobResult { items_processed: ctx.dashboard.advance_chart() }
}
