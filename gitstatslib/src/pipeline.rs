//! Parallel aggregation of per-line facts.
//!
//! Files are pushed into a shared queue; each worker pops one file at a time,
//! blames and classifies it, and increments its own private table. Once all
//! workers have joined, the private tables are merged on the calling thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::DateTime;
use crossbeam_channel::Receiver;
use log::{debug, info};

use crate::blame::{BlameLine, BlameProvider};
use crate::error::GitStatsError;
use crate::languages::LanguageTable;
use crate::progress::Progress;
use crate::table::MemoryTable;
use crate::Result;

/// Default number of workers: one per CPU, leaving one free on machines
/// with four or more.
pub fn default_threads() -> usize {
    let cpus = num_cpus::get();
    let threads = if cpus >= 4 { cpus - 1 } else { cpus };
    threads.max(1)
}

/// `YYYY-MM` of a committer time, in UTC.
pub fn month_of(time: i64) -> String {
    DateTime::from_timestamp(time, 0)
        .map(|t| t.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Runs blame and classification over a set of files.
pub struct Pipeline<'a, B: BlameProvider> {
    blame: &'a B,
    languages: &'a LanguageTable,
    threads: usize,
}

impl<'a, B: BlameProvider> Pipeline<'a, B> {
    pub fn new(blame: &'a B, languages: &'a LanguageTable) -> Self {
        Self {
            blame,
            languages,
            threads: default_threads(),
        }
    }

    /// Number of workers; `0` selects the default.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = if threads == 0 {
            default_threads()
        } else {
            threads
        };
        self
    }

    /// Process `files` and return the merged table.
    ///
    /// The first blame failure stops all workers; no partial table is
    /// returned.
    pub fn run(&self, files: &[String], progress: &Progress) -> Result<MemoryTable> {
        let threads = self.threads.min(files.len()).max(1);
        info!("processing {} files with {} workers", files.len(), threads);

        let (sender, receiver) = crossbeam_channel::unbounded();
        for file in files {
            // The receiver is alive, so sending can't fail
            let _ = sender.send(file.as_str());
        }
        drop(sender);

        let abort = AtomicBool::new(false);
        let (queue, abort) = (&receiver, &abort);

        let results: Vec<Result<MemoryTable>> = if threads == 1 {
            // Inline, but a panic still surfaces as a worker error
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| self.worker(queue, abort, progress)));
            vec![result.unwrap_or_else(|_| Err(GitStatsError::WorkerPanicked(0)))]
        } else {
            thread::scope(|s| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| s.spawn(move || self.worker(queue, abort, progress)))
                    .collect();
                handles
                    .into_iter()
                    .enumerate()
                    .map(|(i, handle)| {
                        handle.join().unwrap_or_else(|_| {
                            abort.store(true, Ordering::Relaxed);
                            Err(GitStatsError::WorkerPanicked(i))
                        })
                    })
                    .collect()
            })
        };

        let mut merged = MemoryTable::new();
        for result in results {
            merged.inc_table(&result?)?;
        }
        progress.finish();
        Ok(merged)
    }

    fn worker(
        &self,
        queue: &Receiver<&str>,
        abort: &AtomicBool,
        progress: &Progress,
    ) -> Result<MemoryTable> {
        let mut table = MemoryTable::new();
        while !abort.load(Ordering::Relaxed) {
            let Ok(file) = queue.try_recv() else {
                break;
            };
            if let Err(e) = self.process_file(file, &mut table) {
                abort.store(true, Ordering::Relaxed);
                return Err(e);
            }
            progress.step();
        }
        Ok(table)
    }

    fn process_file(&self, file: &str, table: &mut MemoryTable) -> Result<()> {
        let language = self.languages.detect(file).unwrap_or_default();
        let lines = self.blame.blame(file)?;
        debug!("{}: {} lines ({})", file, lines.len(), language);

        let mut classifier = self.languages.classifier(language);
        for BlameLine {
            text,
            revision,
            author,
            time,
        } in lines
        {
            let line_type = classifier.classify(&text);
            let key = match revision {
                Some(id) => [
                    language.to_string(),
                    line_type.name().to_string(),
                    month_of(time),
                    id.to_string(),
                    author,
                    file.to_string(),
                ],
                None => [
                    language.to_string(),
                    line_type.name().to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    file.to_string(),
                ],
            };
            table.inc(1.0, key)?;
        }
        Ok(())
    }
}
