use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::{BankError, Result};

#[derive(Clone, Debug)]
pub struct CopyOutcome {
    pub bytes: u64,
    /// Set when a pre-existing target was preserved first.
    pub backup: Option<PathBuf>,
    pub blake3: [u8; 32],
}

/// Copy `source` over `target`, first preserving any existing target as
/// `<target>.bak<N>` (smallest free N, starting at 1). The parent directory of
/// `target` must already exist.
pub fn copy_with_backup(source: &Path, target: &Path, max_probe: u32) -> Result<CopyOutcome> {
    let file = display_name(source);
    let copy_err = |source: io::Error| BankError::Copy {
        file: file.clone(),
        source,
    };

    if !source.is_file() {
        return Err(copy_err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source missing: {}", source.display()),
        )));
    }

    let backup = if target.exists() {
        let bak = next_backup_path(target, max_probe)?;
        copy_preserving_mtime(target, &bak).map_err(&copy_err)?;
        tracing::info!(file = %file, backup = %bak.display(), "backed up existing target");
        Some(bak)
    } else {
        None
    };

    let bytes = copy_preserving_mtime(source, target).map_err(&copy_err)?;

    let want = digest(source).map_err(&copy_err)?;
    let got = digest(target).map_err(&copy_err)?;
    if want != got {
        return Err(copy_err(io::Error::other("copied contents differ from source")));
    }

    Ok(CopyOutcome {
        bytes,
        backup,
        blake3: got,
    })
}

/// First `<target>.bak<N>` that does not exist, probing N = 1..=max_probe.
pub fn next_backup_path(target: &Path, max_probe: u32) -> Result<PathBuf> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for n in 1..=max_probe {
        let candidate = target.with_file_name(format!("{name}.bak{n}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(BankError::BackupExhausted {
        file: name,
        limit: max_probe,
    })
}

/// Bytes, then mtime through the still-open write handle, then permission
/// bits last so a read-only source never blocks the mtime update.
fn copy_preserving_mtime(from: &Path, to: &Path) -> io::Result<u64> {
    let mut src = File::open(from)?;
    let meta = src.metadata()?;
    let mut dst = File::create(to)?;
    let n = io::copy(&mut src, &mut dst)?;
    dst.set_modified(meta.modified()?)?;
    drop(dst);
    fs::set_permissions(to, meta.permissions())?;
    Ok(n)
}

fn digest(path: &Path) -> io::Result<[u8; 32]> {
    let mut f = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(*hasher.finalize().as_bytes())
}

fn display_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}
