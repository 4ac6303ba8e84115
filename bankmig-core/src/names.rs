use std::fs;
use std::path::Path;

use crate::account::Account;

/// Optional capability that guesses a human name for an account.
/// Purely cosmetic: a `None` never changes what gets migrated.
pub trait DisplayNameResolver: Send + Sync {
    fn display_name(&self, root: &Path, account: &Account) -> Option<String>;
}

pub struct NoDisplayNames;

impl DisplayNameResolver for NoDisplayNames {
    fn display_name(&self, _root: &Path, _account: &Account) -> Option<String> {
        None
    }
}

/// The game launcher drops `<name>.lnk` shortcuts in the storage root whose
/// target path contains the account handle. We match on the raw bytes rather
/// than resolving the shortcut.
pub struct ShortcutNameResolver;

impl DisplayNameResolver for ShortcutNameResolver {
    fn display_name(&self, root: &Path, account: &Account) -> Option<String> {
        let mut shortcuts: Vec<_> = fs::read_dir(root)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|x| x.to_str())
                        .is_some_and(|x| x.eq_ignore_ascii_case("lnk"))
            })
            .collect();
        shortcuts.sort();

        let ascii = account.handle.as_bytes().to_vec();
        let wide: Vec<u8> = account
            .handle
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();

        for p in shortcuts {
            let Ok(bytes) = fs::read(&p) else {
                tracing::debug!(path = %p.display(), "unreadable shortcut skipped");
                continue;
            };
            if contains(&bytes, &ascii) || contains(&bytes, &wide) {
                return p.file_stem().map(|s| s.to_string_lossy().into_owned());
            }
        }
        None
    }
}

fn contains(hay: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && hay.windows(needle.len()).any(|w| w == needle)
}
