//! Safety Module
//!
//! Refuses batch runs rooted at system directories or a bare home directory.

use std::path::Path;

const DANGEROUS_DIRS: &[&str] = &[
    "/",
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/var",
    "/private",
    "/Library",
    "/Applications",
    "/Users",
    "/home",
    "/root",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/opt",
];

pub fn check_dangerous_directory(path: &Path) -> Result<(), String> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    for candidate in [path, canonical.as_path()] {
        let path_str = candidate.to_string_lossy();
        if let Some(dangerous) = DANGEROUS_DIRS.iter().find(|d| path_str == **d) {
            return Err(format!(
                "🚨 DANGEROUS OPERATION BLOCKED!\n\
                 ❌ Target directory '{}' is a protected system directory.\n\
                 💡 Please specify a subdirectory that only holds the images to convert.",
                dangerous
            ));
        }
    }

    let path_str = canonical.to_string_lossy();
    let is_home_root = (path_str.starts_with("/Users/") || path_str.starts_with("/home/"))
        && canonical.components().count() <= 3;

    if is_home_root {
        return Err(format!(
            "🚨 DANGEROUS OPERATION BLOCKED!\n\
             ❌ Target '{}' is a home directory root.\n\
             💡 Please specify a subdirectory like ~/Pictures/export instead.",
            path.display()
        ));
    }

    Ok(())
}
