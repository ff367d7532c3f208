// Artifact directory layout and the shard assembly build step.
//
// The pipeline reads eight files from one directory:
//   tokenizer.json            vocabulary for the sequence classifiers
//   scaler.json               feature standardization parameters
//   {toxicity,identity,obscenity,insult}_model.onnx
//   mappings.json             ULM vocabulary (itos list)
//   ulm_toxicity_model.onnx   ULM classifier
//
// Large models are sometimes shipped split into `<file>.part1`,
// `<file>.part2`, ... (repository hosts cap file sizes). Joining them is a
// deployment step run via `youtoxic assemble-artifacts`; loading never
// does it implicitly.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::classify::Category;

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const ULM_MAPPINGS_FILE: &str = "mappings.json";
pub const ULM_MODEL_FILE: &str = "ulm_toxicity_model.onnx";

/// Returns the default directory for artifact files.
/// Uses the platform data directory: ~/.local/share/youtoxic/models/ on Linux.
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("youtoxic")
        .join("models")
}

/// Every file `Pipeline::load` needs, in load order.
pub fn required_artifacts() -> Vec<&'static str> {
    let mut files = vec![TOKENIZER_FILE, SCALER_FILE];
    files.extend(Category::ALL.iter().map(|c| c.model_file()));
    files.push(ULM_MAPPINGS_FILE);
    files.push(ULM_MODEL_FILE);
    files
}

/// Required files that do not exist in `dir`.
pub fn missing_artifacts(dir: &Path) -> Vec<&'static str> {
    required_artifacts()
        .into_iter()
        .filter(|f| !dir.join(f).exists())
        .collect()
}

/// Check whether every required artifact exists.
pub fn artifacts_present(dir: &Path) -> bool {
    missing_artifacts(dir).is_empty()
}

/// Shards for `file`: `file.part1`, `file.part2`, ... up to the first gap.
pub fn shard_paths(dir: &Path, file: &str) -> Vec<PathBuf> {
    (1..)
        .map(|i| dir.join(format!("{file}.part{i}")))
        .take_while(|p| p.exists())
        .collect()
}

/// What `assemble_shards` did for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleOutcome {
    /// The file already existed; nothing was written.
    AlreadyPresent,
    /// The file was built from `shards` pieces totalling `bytes`.
    Assembled { shards: usize, bytes: u64 },
}

/// Concatenate the shards of `file` byte-for-byte, in order, into `file`.
///
/// Writes to `<file>.tmp` first and renames it into place. On failure the
/// temporary file is removed, so no truncated artifact is left behind.
pub fn assemble_shards(dir: &Path, file: &str, show_progress: bool) -> Result<AssembleOutcome> {
    let dest = dir.join(file);
    if dest.exists() {
        return Ok(AssembleOutcome::AlreadyPresent);
    }

    let shards = shard_paths(dir, file);
    if shards.is_empty() {
        anyhow::bail!(
            "{} is missing and no shards ({}.part1, ...) were found in {}",
            file,
            file,
            dir.display()
        );
    }

    let total: u64 = shards
        .iter()
        .map(|p| std::fs::metadata(p).map(|m| m.len()))
        .sum::<std::io::Result<u64>>()
        .with_context(|| format!("Failed to stat shards for {file}"))?;

    let pb = if show_progress {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .expect("valid template")
                .progress_chars("=> "),
        );
        Some(pb)
    } else {
        None
    };

    let tmp = dir.join(format!("{file}.tmp"));
    let written = concat_shards(&shards, &tmp, pb.as_ref()).and_then(|()| {
        std::fs::rename(&tmp, &dest)
            .with_context(|| format!("Failed to move {} into place", dest.display()))
    });

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    info!(
        file,
        shards = shards.len(),
        bytes = total,
        "Assembled artifact from shards"
    );
    Ok(AssembleOutcome::Assembled {
        shards: shards.len(),
        bytes: total,
    })
}

fn concat_shards(shards: &[PathBuf], out_path: &Path, pb: Option<&ProgressBar>) -> Result<()> {
    let out = File::create(out_path)
        .with_context(|| format!("Failed to create {}", out_path.display()))?;
    let mut writer = BufWriter::new(out);

    for shard in shards {
        let mut reader = File::open(shard)
            .with_context(|| format!("Failed to open shard {}", shard.display()))?;
        let copied = std::io::copy(&mut reader, &mut writer)
            .with_context(|| format!("Failed to copy shard {}", shard.display()))?;
        if let Some(pb) = pb {
            pb.inc(copied);
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", out_path.display()))
}

/// Assemble every missing artifact that has shards on disk.
///
/// Returns the files that were assembled. Missing files without shards are
/// left for `missing_artifacts` to report.
pub fn assemble_all(
    dir: &Path,
    show_progress: bool,
) -> Result<Vec<(&'static str, AssembleOutcome)>> {
    let mut assembled = Vec::new();
    for file in missing_artifacts(dir) {
        if shard_paths(dir, file).is_empty() {
            continue;
        }
        let outcome = assemble_shards(dir, file, show_progress)?;
        assembled.push((file, outcome));
    }
    Ok(assembled)
}
