// Artifact status display: which files are present, their sizes, and
// whether any missing ones can be assembled from shards.

use std::path::Path;

use colored::Colorize;

use crate::artifacts::{missing_artifacts, required_artifacts, shard_paths};

/// Display artifact status to the terminal.
pub fn show(artifact_dir: &Path, threshold: f64) {
    println!("Artifact directory: {}", artifact_dir.display());
    println!("Threshold: {threshold}");

    if !artifact_dir.exists() {
        println!("\n{}", "Directory does not exist.".yellow());
        println!("Set YOUTOXIC_ARTIFACT_DIR to the directory holding the model files.");
        return;
    }

    println!();
    for file in required_artifacts() {
        let path = artifact_dir.join(file);
        match std::fs::metadata(&path) {
            Ok(meta) => println!(
                "  {} {:<26} {}",
                "✓".green(),
                file,
                format_bytes(meta.len()).dimmed()
            ),
            Err(_) => {
                let shards = shard_paths(artifact_dir, file).len();
                if shards > 0 {
                    println!(
                        "  {} {:<26} {}",
                        "~".yellow(),
                        file,
                        format!("{shards} shards, not assembled").yellow()
                    );
                } else {
                    println!("  {} {:<26} {}", "✗".red(), file, "missing".red());
                }
            }
        }
    }

    let missing = missing_artifacts(artifact_dir);
    if missing.is_empty() {
        println!("\n{}", "All artifacts present.".bold());
    } else {
        println!(
            "\n{} missing. Run `youtoxic assemble-artifacts` to join any shards.",
            missing.len()
        );
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 / 2), "1.5 GB");
    }
}
