use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting dashboard build...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("📥 Loading dataset...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!("📥 Loaded {} rows", dataset.len());
        self.monitor.log_stats("Load");

        // Transform
        tracing::info!("🔄 Building pages...");
        let output = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "🔄 Built {} pages ({} of {} rows selected)",
            output.pages.len(),
            output.selection.rows_selected,
            output.selection.rows_in_date_range
        );
        self.monitor.log_stats("Build pages");

        // Load
        tracing::info!("💾 Rendering outputs...");
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Render");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::Dataset;
    use crate::domain::model::{parse_datetime, DashboardOutput, OrderRecord};
    use crate::domain::report::{PageKind, PageReport};
    use crate::utils::error::DashboardError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<Dataset> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Dataset::new(vec![OrderRecord {
                order_id: Some("o1".to_string()),
                order_purchase_timestamp: parse_datetime("2018-01-01 00:00:00"),
                ..Default::default()
            }]))
        }

        async fn transform(&self, dataset: Dataset) -> Result<DashboardOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(DashboardError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            let range = dataset.full_range()?;
            Ok(DashboardOutput {
                selection: crate::domain::model::SelectionSummary {
                    date_range: range,
                    city: "All".to_string(),
                    state: "All".to_string(),
                    rows_in_date_range: dataset.len(),
                    rows_selected: dataset.len(),
                },
                pages: vec![PageReport::new(PageKind::Home)],
            })
        }

        async fn load(&self, _output: DashboardOutput) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("out".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_executes_all_phases() {
        let engine = DashboardEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: false,
        });

        let path = engine.run().await.unwrap();
        assert_eq!(path, "out");
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_run_stops_at_failing_phase() {
        let engine = DashboardEngine::new_with_monitoring(
            CountingPipeline {
                calls: AtomicUsize::new(0),
                fail_transform: true,
            },
            false,
        );

        let result = tokio_test::block_on(engine.run());
        assert!(matches!(result, Err(DashboardError::ProcessingError { .. })));
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 2);
    }
}
