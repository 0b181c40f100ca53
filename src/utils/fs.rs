// ============================================================================
// File system utilities
// ============================================================================

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Check if file has secure permissions (600 on Unix)
#[cfg(unix)]
pub fn has_secure_permissions(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode();
        (mode & 0o077) == 0 // Only owner has permissions
    } else {
        false
    }
}

#[cfg(not(unix))]
pub fn has_secure_permissions(_path: &Path) -> bool {
    true // Not applicable on non-Unix systems
}

/// Set secure permissions (600 on Unix)
#[cfg(unix)]
pub fn set_secure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_secure_permissions(_path: &Path) -> Result<()> {
    Ok(()) // Not applicable on non-Unix systems
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_and_check_secure_permissions() {
        let file = NamedTempFile::new().unwrap();
        set_secure_permissions(file.path()).unwrap();
        assert!(has_secure_permissions(file.path()));
    }
}
