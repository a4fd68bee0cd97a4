pub mod comments;
pub mod engine;
pub mod markdown;
pub mod pipeline;
pub mod reddit;

pub use crate::domain::model::{Comment, ExportDocument, ExportSummary, Post, ThreadListing};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
