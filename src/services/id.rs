use uuid::Uuid;

pub const ID_LEN: usize = 9;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short random base-36 id, e.g. `k3v9x0q2a`.
///
/// Draws from a v4 UUID and keeps the lowest `ID_LEN` base-36 digits. There
/// is no collision check; 36^9 values is plenty for a single course.
pub fn generate_id() -> String {
    let mut n = Uuid::new_v4().as_u128();
    (0..ID_LEN)
        .map(|_| {
            let digit = (n % 36) as usize;
            n /= 36;
            ALPHABET[digit] as char
        })
        .collect()
}
