use crate::domain::model::{ExportDocument, ExportSummary, ThreadListing};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human-readable location of `path`, used in progress output.
    fn display_path(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn thread_url(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn api_base(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ThreadListing>;
    async fn transform(&self, listing: ThreadListing) -> Result<ExportDocument>;
    async fn load(&self, document: ExportDocument) -> Result<ExportSummary>;
}
