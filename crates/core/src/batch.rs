use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::{processor::VideoProcessor, types::VideoDescriptor};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// How many videos may be in flight at once.
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub succeeded: usize,
    pub failed: usize,
    /// Descriptors without a URL; these are left out of the output.
    pub skipped: usize,
}

impl BatchStats {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Annotate every descriptor that has a URL with its analysis.
///
/// Output keeps input order regardless of `jobs`. `on_done` is called once per
/// annotated descriptor, in output order.
pub async fn run_batch(
    processor: &VideoProcessor,
    descriptors: Vec<VideoDescriptor>,
    options: BatchOptions,
    mut on_done: impl FnMut(&VideoDescriptor),
) -> (Vec<VideoDescriptor>, BatchStats) {
    let mut stats = BatchStats::default();

    let runnable: Vec<(String, VideoDescriptor)> = descriptors
        .into_iter()
        .enumerate()
        .filter_map(|(index, descriptor)| match descriptor.url() {
            Some(url) => Some((url.to_string(), descriptor)),
            None => {
                warn!(index, "no URL found for video object, skipping");
                stats.skipped += 1;
                None
            }
        })
        .collect();

    let mut annotated = stream::iter(runnable)
        .map(|(url, mut descriptor)| async move {
            info!(
                title = descriptor.title().unwrap_or("Unknown Title"),
                url = %url,
                "processing video"
            );
            let analysis = processor.process(&url).await;
            descriptor.set_analysis(&analysis);
            (descriptor, analysis.is_failed())
        })
        .buffered(options.jobs.max(1));

    let mut output = Vec::new();
    while let Some((descriptor, failed)) = annotated.next().await {
        if failed {
            stats.failed += 1;
        } else {
            stats.succeeded += 1;
        }
        on_done(&descriptor);
        output.push(descriptor);
    }

    (output, stats)
}
