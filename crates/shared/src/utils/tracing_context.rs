use super::{Method, Metrics, Status};
use tokio::time::Instant;
use tracing::{Span, error, info};

/// The span and start time of one service operation.
pub struct TracingContext {
    pub span: Span,
    pub start_time: Instant,
}

impl TracingContext {
    pub fn start(span: Span, operation_name: &str) -> Self {
        span.in_scope(|| info!("Starting operation: {operation_name}"));

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    /// Logs the outcome inside the operation span and records it in `metrics`.
    pub fn complete(&self, metrics: &Metrics, method: Method, is_success: bool, message: &str) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let status = if is_success {
            Status::Success
        } else {
            Status::Error
        };

        self.span.in_scope(|| {
            if is_success {
                info!(duration_secs = elapsed, "✅ Operation completed successfully: {message}");
            } else {
                error!(duration_secs = elapsed, "❌ Operation failed: {message}");
            }
        });

        metrics.record(method, status, elapsed);
    }
}
