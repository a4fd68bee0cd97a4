use crate::core::{ExportSummary, Pipeline};
use crate::utils::error::Result;
use std::time::Instant;

pub struct ExportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ExportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ExportSummary> {
        let started = Instant::now();

        let listing = self.pipeline.extract().await?;
        tracing::info!("Fetched thread {}", listing.post_id);

        let document = self.pipeline.transform(listing).await?;
        tracing::info!(
            "Rendered {} ({} top-level, {} total comments)",
            document.filename,
            document.top_level_count,
            document.total_count
        );

        let summary = self.pipeline.load(document).await?;
        tracing::debug!("Export finished in {:?}", started.elapsed());

        Ok(summary)
    }
}
