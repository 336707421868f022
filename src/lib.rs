use directories::ProjectDirs;

pub mod args;
pub mod config;
pub mod error;
pub mod log;
pub mod mcp;
pub mod time;
pub mod timers;

pub fn dirs() -> Result<ProjectDirs, error::TimerError> {
    ProjectDirs::from("de", "maxicarlos", "tasktimer").ok_or(error::TimerError::NoProjectDirs)
}

/// Fresh, empty directory for a single test, removed again on drop
#[cfg(test)]
pub(crate) struct ScratchDir(std::path::PathBuf);

#[cfg(test)]
impl ScratchDir {
    pub(crate) fn path(&self) -> &std::path::Path {
        &self.0
    }
}

#[cfg(test)]
impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
        let _ = std::fs::remove_file(&self.0);
    }
}

#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> ScratchDir {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let dir = std::env::temp_dir().join(format!(
        "tasktimer-{label}-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    ScratchDir(dir)
}
