//! Vidquiz Core Library
//!
//! Downloads videos, has Gemini analyze them, and extracts a summary plus
//! question/answer/context triples from the reply.

pub mod batch;
pub mod cache;
pub mod descriptors;
pub mod error;
pub mod format;
pub mod gemini;
pub mod parser;
pub mod processor;
pub mod prompt;
pub mod provider;
pub mod remote;
pub mod source;
pub mod types;

// Re-export commonly used items at crate root
pub use batch::{BatchOptions, BatchStats, run_batch};
pub use cache::get_root_cache_dir;
pub use descriptors::{load_descriptors, save_descriptors};
pub use error::{RemoteError, Result, VidquizError};
pub use format::{format_analysis_readable, format_duration, format_stats};
pub use gemini::GeminiClient;
pub use parser::parse_analysis;
pub use processor::{DOWNLOAD_FAILED, ProcessorConfig, VideoProcessor};
pub use provider::GeminiConfig;
pub use remote::{AnalysisService, FileState, RemoteFile};
pub use source::{VideoSource, YtDlp};
pub use types::{Analysis, AnalysisError, AnalysisResult, QaEntry, VideoDescriptor};
