//! Frame capture to disk and capture directory listing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use glob::Pattern;
use net::{ConnectionId, NetEvent, NetResult};
use scene::SyncTransport;
use tracing::{debug, warn};

/// Writes frames as numbered files under one directory.
#[derive(Debug)]
pub struct FrameCapture {
    dir: PathBuf,
    next_index: u32,
}

impl FrameCapture {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("create capture dir {}", dir.display()))?;
        Ok(Self { dir, next_index: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames written so far.
    pub const fn frames(&self) -> u32 {
        self.next_index
    }

    /// Writes `frame` to `frame-NNNNNN.bin` and returns its path.
    pub fn record(&mut self, frame: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(format!("frame-{:06}.bin", self.next_index));
        fs::write(&path, frame).with_context(|| format!("write frame {}", path.display()))?;
        self.next_index += 1;
        Ok(path)
    }
}

/// Transport wrapper that records every received frame before handing it on.
pub struct RecordingTransport<T> {
    inner: T,
    capture: FrameCapture,
}

impl<T> RecordingTransport<T> {
    pub const fn new(inner: T, capture: FrameCapture) -> Self {
        Self { inner, capture }
    }

    pub const fn capture(&self) -> &FrameCapture {
        &self.capture
    }

    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: SyncTransport> SyncTransport for RecordingTransport<T> {
    fn send_to(&mut self, connection: ConnectionId, frame: &[u8]) -> NetResult<()> {
        self.inner.send_to(connection, frame)
    }

    fn output_bytes_queued(&self, connection: ConnectionId) -> usize {
        self.inner.output_bytes_queued(connection)
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        self.inner.disconnect(connection);
    }

    fn max_frame_bytes(&self) -> usize {
        self.inner.max_frame_bytes()
    }

    fn try_recv_event(&mut self) -> Option<NetEvent> {
        let event = self.inner.try_recv_event()?;
        if let NetEvent::Received { id, frame } = &event {
            match self.capture.record(frame) {
                Ok(path) => debug!(connection = %id, path = %path.display(), "captured frame"),
                Err(err) => warn!(connection = %id, "frame capture failed: {err:#}"),
            }
        }
        Some(event)
    }
}

/// Ordering applied to listed capture files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntrySort {
    /// Largest first.
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Lists the files in `dir`, optionally filtered by a glob on path or name.
///
/// Entries come back in path order, which is capture order for
/// [`FrameCapture`] output.
pub fn collect_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<FrameEntry>> {
    let pattern = glob
        .map(|value| Pattern::new(value).context("invalid glob pattern"))
        .transpose()?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(FrameEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

pub fn sort_entries(mut entries: Vec<FrameEntry>, sort: Option<EntrySort>) -> Vec<FrameEntry> {
    if sort == Some(EntrySort::Size) {
        entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    }
    entries
}
