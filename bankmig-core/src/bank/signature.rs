use sha1::{Digest, Sha1};

/// Uppercase hex SHA-1 over owner, user, bank name and the canonical payload,
/// concatenated in that order.
pub fn compute(owner_id: &str, user_id: &str, bank_name: &str, payload: &str) -> String {
    let mut h = Sha1::new();
    h.update(owner_id.as_bytes());
    h.update(user_id.as_bytes());
    h.update(bank_name.as_bytes());
    h.update(payload.as_bytes());
    hex::encode_upper(h.finalize())
}
