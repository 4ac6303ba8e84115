use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::bank::{BankDocument, signature};

#[derive(Error, Debug)]
pub enum ResignFailure {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("no signature and no closing root tag to insert before")]
    NoAnchor,

    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

/// Result of a best-effort resign. Failures leave the file byte-identical.
#[derive(Debug)]
pub enum ResignOutcome {
    Replaced { signature: String },
    Inserted { signature: String },
    /// Embedded signature already matched; file not rewritten.
    Unchanged { signature: String },
    Failed(ResignFailure),
}

impl ResignOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ResignOutcome::Failed(_))
    }

    pub fn signature(&self) -> Option<&str> {
        match self {
            ResignOutcome::Replaced { signature }
            | ResignOutcome::Inserted { signature }
            | ResignOutcome::Unchanged { signature } => Some(signature),
            ResignOutcome::Failed(_) => None,
        }
    }
}

/// Bank name a file signs under: its base name without extension.
pub fn bank_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Recompute the embedded signature of `path` for a new owner. Never returns
/// an error; see [`ResignOutcome`].
pub fn resign(path: &Path, new_owner_id: &str, user_id: &str) -> ResignOutcome {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => return ResignOutcome::Failed(ResignFailure::Read(e)),
    };
    let doc = BankDocument::parse(&text);
    let sig = signature::compute(new_owner_id, user_id, &bank_name(path), &doc.payload());

    let (rewritten, outcome) = match (&doc.signature, doc.root_close) {
        (Some(old), _) if old.value == sig => {
            return ResignOutcome::Unchanged { signature: sig };
        }
        (Some(old), _) => {
            let mut s = String::with_capacity(text.len());
            s.push_str(&text[..old.span.start]);
            s.push_str(&sig);
            s.push_str(&text[old.span.end..]);
            (s, ResignOutcome::Replaced { signature: sig })
        }
        (None, Some(at)) => {
            let mut s = String::with_capacity(text.len() + sig.len() + 32);
            s.push_str(&text[..at]);
            s.push_str(&format!("<Signature value=\"{sig}\"/>\n"));
            s.push_str(&text[at..]);
            (s, ResignOutcome::Inserted { signature: sig })
        }
        (None, None) => return ResignOutcome::Failed(ResignFailure::NoAnchor),
    };

    match replace_contents(path, rewritten.as_bytes()) {
        Ok(()) => outcome,
        Err(e) => ResignOutcome::Failed(ResignFailure::Write(e)),
    }
}

/// Whole-file replace: write a sibling temp file, then rename over `path`.
fn replace_contents(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let perms = std::fs::metadata(path)?.permissions();
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.as_file().set_permissions(perms)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Check a file's embedded signature against `owner_id` and `user_id`.
pub fn verify(path: &Path, owner_id: &str, user_id: &str) -> io::Result<bool> {
    let text = std::fs::read_to_string(path)?;
    Ok(BankDocument::parse(&text).verify(owner_id, user_id, &bank_name(path)))
}
