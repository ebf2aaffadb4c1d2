//! RouterOS address-list script generation.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::providers::provider_list;

/// Address-list replaced by the script
pub const LIST_NAME: &str = "CloudAll";

/// Comment attached to every entry the script adds
pub const ENTRY_COMMENT: &str = "cloud-ipv4";

/// Render the script that replaces [`LIST_NAME`] with `prefixes`.
///
/// Lines are `\n`-terminated on every platform.
pub fn render_script(prefixes: &[String], timestamp: i64) -> String {
    let mut script = String::with_capacity(128 + prefixes.len() * 96);

    script.push_str(&format!(
        "# cloud-ipv4 export at {}; providers={}; count={}\n",
        timestamp,
        provider_list(),
        prefixes.len()
    ));
    script.push_str(&format!(
        "/ip/firewall/address-list/remove [find list=\"{}\"]\n",
        LIST_NAME
    ));
    for prefix in prefixes {
        script.push_str(&format!(
            "/ip/firewall/address-list/add list=\"{}\" address={} comment=\"{}\"\n",
            LIST_NAME, prefix, ENTRY_COMMENT
        ));
    }

    script
}

/// Write `content` to `path`, creating parent directories.
///
/// Uses tempfile + rename so readers never see a half-written script.
pub fn write_script(path: &Path, content: &str) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("Failed to create output directory {:?}", parent_dir))?;

    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // 0666 minus umask, the mode a plain create gets (tempfile defaults to 0600)
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut temp_file = builder
        .tempfile_in(parent_dir)
        .context("Failed to create temporary file for script")?;

    // Replacing an existing script keeps its mode
    if let Ok(metadata) = std::fs::metadata(path) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .with_context(|| format!("Failed to copy permissions of {:?}", path))?;
    }
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist script file: {:?}", path))?;

    debug!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

/// Render the merged list with the current time and write it to `path`
pub fn emit(prefixes: &[String], path: &Path) -> Result<()> {
    let script = render_script(prefixes, chrono::Utc::now().timestamp());
    write_script(path, &script)
}
