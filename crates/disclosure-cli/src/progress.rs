//! Terminal progress for the extraction loop.

use disclosure_core::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

/// One tick per document, drawn on stderr. Hidden unless verbose.
pub struct ExtractProgress {
    bar: ProgressBar,
}

impl ExtractProgress {
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix:.bold} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .expect("template is compile-time constant")
                    .progress_chars("█▓▒░  "),
            );
            pb.set_prefix("Extracting");
            pb
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }
}

impl ProgressSink for ExtractProgress {
    fn start(&mut self, total: usize) {
        self.bar.set_length(u64::try_from(total).unwrap_or(u64::MAX));
    }

    fn advance(&mut self, document: &str) {
        self.bar.set_message(document.to_string());
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}
