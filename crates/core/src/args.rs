//! rsync command line construction
//!
//! The argument vector is built once from settings and reused for every run.
//! Mirroring is always one-way with `--delete`, so the destination ends up an
//! exact copy of the watched tree modulo the exclude patterns.

use crate::config::Config;
use std::path::Path;

/// Build the full argument vector for one rsync invocation
pub fn build_rsync_args(config: &Config) -> Vec<String> {
    let mut args = Vec::new();

    args.push("-e".to_string());
    args.push(format!(
        "ssh -p {} -i {}",
        config.ssh_port,
        config.key_file.display()
    ));

    // Files removed locally are removed at the destination too
    args.push("--delete".to_string());

    // Includes must precede excludes so they can punch holes in them
    for pattern in &config.includes {
        args.push(format!("--include={pattern}"));
    }
    for pattern in &config.excludes {
        args.push(format!("--exclude={pattern}"));
    }

    args.push(if config.compress { "-az" } else { "-a" }.to_string());

    args.push(to_rsync_path(&config.local_path));
    args.push(format!(
        "{}@{}:{}",
        config.remote_user, config.remote_host, config.remote_path
    ));

    args
}

/// Convert a native path to the syntax rsync expects
///
/// Windows drive paths like `C:\data\site` become `/C/data/site`; paths that
/// are already POSIX-shaped pass through unchanged.
pub fn to_rsync_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let bytes = s.as_bytes();

    let converted = if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && bytes[2] == b'\\'
    {
        format!("/{}/{}", &s[..1], &s[3..])
    } else {
        s.into_owned()
    };

    converted.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config() -> Config {
        Config {
            local_path: PathBuf::from("/data/site"),
            remote_user: "deploy".to_string(),
            remote_host: "mirror.example.com".to_string(),
            remote_path: "/srv/site".to_string(),
            ssh_port: 2222,
            key_file: PathBuf::from("/home/deploy/.ssh/id_ed25519"),
            interval_secs: 0,
            compress: true,
            excludes: vec![".git".to_string(), "*.tmp".to_string()],
            includes: vec!["*.html".to_string()],
            verbose_notifications: false,
            rsync_path: PathBuf::from("rsync"),
        }
    }

    #[test]
    fn test_full_argument_vector() {
        let args = build_rsync_args(&test_config());
        assert_eq!(
            args,
            vec![
                "-e",
                "ssh -p 2222 -i /home/deploy/.ssh/id_ed25519",
                "--delete",
                "--include=*.html",
                "--exclude=.git",
                "--exclude=*.tmp",
                "-az",
                "/data/site",
                "deploy@mirror.example.com:/srv/site",
            ]
        );
    }

    #[test]
    fn test_compression_toggle() {
        let mut config = test_config();
        config.compress = false;
        let args = build_rsync_args(&config);
        assert!(args.contains(&"-a".to_string()));
        assert!(!args.contains(&"-az".to_string()));
    }

    #[test]
    fn test_delete_always_present() {
        let mut config = test_config();
        config.excludes.clear();
        config.includes.clear();
        let args = build_rsync_args(&config);
        assert!(args.contains(&"--delete".to_string()));
    }

    #[test]
    fn test_posix_path_untouched() {
        assert_eq!(to_rsync_path(Path::new("/data/site")), "/data/site");
    }

    #[test]
    fn test_windows_drive_path_converted() {
        assert_eq!(
            to_rsync_path(Path::new(r"C:\data\my site")),
            "/C/data/my site"
        );
        assert_eq!(to_rsync_path(Path::new(r"d:\srv")), "/d/srv");
    }

    #[test]
    fn test_backslashes_become_slashes() {
        assert_eq!(to_rsync_path(Path::new(r"data\site")), "data/site");
    }
}
