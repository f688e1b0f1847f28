use crate::constants;
use rand::Rng;

const NONCE_LEN: usize = 6;
const NONCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Builds a fresh `DS` header value: `<t>,<r>,<digest>` where the digest is
/// the salted MD5 of the timestamp and nonce. Tokens are single-use; the
/// validity window is enforced server-side.
pub fn generate() -> String {
    let t = chrono::Utc::now().timestamp();
    let r = nonce();
    sign(t, &r)
}

pub(crate) fn sign(t: i64, r: &str) -> String {
    let digest = md5::compute(format!("salt={}&t={t}&r={r}", constants::DS_SALT));
    format!("{t},{r},{digest:x}")
}

fn nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LEN)
        .map(|_| NONCE_ALPHABET[rng.gen_range(0..NONCE_ALPHABET.len())] as char)
        .collect()
}
