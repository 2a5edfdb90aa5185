//! Common utilities for the command line interface.
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

pub mod args;
pub mod config;
pub mod fix;
pub mod inspect;
pub mod output;
pub mod rules;
pub mod ui;

/// Initialises the log subscriber for one command invocation.
///
/// Logs go to stderr so machine-readable output on stdout stays clean.
pub fn init_tracing(quiet: bool, debug: bool) {
    let level = if quiet {
        LevelFilter::OFF
    } else if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolves the directory fix reports are written to.
/// Relative directories are taken against the project root.
///
/// # Example
///
/// ```
/// use remedium::resolve_fixes_dir;
/// use std::path::{Path, PathBuf};
/// let dir = resolve_fixes_dir(Path::new("/srv/app"), Path::new("fixes"));
/// assert_eq!(dir, PathBuf::from("/srv/app/fixes"));
/// ```
pub fn resolve_fixes_dir(project: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        project.join(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_fixes_dir_is_kept() {
        assert_eq!(
            resolve_fixes_dir(Path::new("/srv/app"), Path::new("/var/reports")),
            PathBuf::from("/var/reports")
        );
    }
}
