//! Progress reporting for long-running commands

use cookcompass_core::ingest::ProgressCallback;
use cookcompass_core::IngestProgress;
use std::io::{self, Write};

/// Single-line embedding progress on stderr
pub fn ingest_reporter() -> ProgressCallback {
    Box::new(|progress: IngestProgress| {
        let pct = if progress.total_documents > 0 {
            progress.embedded_documents * 100 / progress.total_documents
        } else {
            100
        };
        eprint!(
            "\rEmbedding recipes: {}/{} ({}%)   ",
            progress.embedded_documents, progress.total_documents, pct
        );
        if progress.embedded_documents >= progress.total_documents {
            eprintln!();
        }
        io::stderr().flush().ok();
    })
}
