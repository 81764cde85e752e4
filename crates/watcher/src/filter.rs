//! Exclude pattern matching for change events
//!
//! The same pattern list that is forwarded to rsync as `--exclude` is applied
//! to incoming filesystem events, so churn inside an excluded directory (a
//! `.git/` or a build tree) never triggers a transfer. Include patterns act
//! as whitelist entries that punch holes in the excludes, mirroring how rsync
//! evaluates `--include` before `--exclude`.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

/// Pattern matcher over paths inside the watched tree
pub struct EventFilter {
    root: PathBuf,
    matcher: Gitignore,
}

impl EventFilter {
    /// Build a filter rooted at the watched directory
    pub fn new(
        root: &Path,
        excludes: &[String],
        includes: &[String],
    ) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in excludes {
            builder.add_line(None, pattern)?;
        }
        // Whitelist lines come last so they override the excludes
        for pattern in includes {
            builder.add_line(None, &format!("!{pattern}"))?;
        }

        Ok(Self {
            root: root.to_path_buf(),
            matcher: builder.build()?,
        })
    }

    /// Whether events for this path should be dropped
    ///
    /// Paths outside the watched tree are never excluded; they can only show
    /// up as the far side of a rename and should keep the event alive.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) => rel,
            Err(_) => return false,
        };
        if rel.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(rel, false)
            .is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(excludes: &[&str], includes: &[&str]) -> EventFilter {
        let excludes: Vec<String> = excludes.iter().map(|s| s.to_string()).collect();
        let includes: Vec<String> = includes.iter().map(|s| s.to_string()).collect();
        EventFilter::new(Path::new("/tree"), &excludes, &includes).unwrap()
    }

    #[test]
    fn test_no_patterns_excludes_nothing() {
        let f = filter(&[], &[]);
        assert!(!f.is_excluded(Path::new("/tree/src/main.rs")));
    }

    #[test]
    fn test_directory_pattern_covers_children() {
        let f = filter(&[".git"], &[]);
        assert!(f.is_excluded(Path::new("/tree/.git")));
        assert!(f.is_excluded(Path::new("/tree/.git/objects/ab/cd")));
        assert!(!f.is_excluded(Path::new("/tree/src/main.rs")));
    }

    #[test]
    fn test_glob_pattern() {
        let f = filter(&["*.tmp"], &[]);
        assert!(f.is_excluded(Path::new("/tree/upload.tmp")));
        assert!(f.is_excluded(Path::new("/tree/deep/nested/upload.tmp")));
        assert!(!f.is_excluded(Path::new("/tree/upload.bin")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let f = filter(&["*.log"], &["important.log"]);
        assert!(f.is_excluded(Path::new("/tree/debug.log")));
        assert!(!f.is_excluded(Path::new("/tree/important.log")));
    }

    #[test]
    fn test_path_outside_root_never_excluded() {
        let f = filter(&["*"], &[]);
        assert!(!f.is_excluded(Path::new("/elsewhere/file")));
    }
}
