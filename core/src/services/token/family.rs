//! Token family id generation

use rand::Rng;

/// Characters allowed in a family id
const FAMILY_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of a generated family id
const FAMILY_ID_LENGTH: usize = 32;

/// Generates a new token family id
///
/// Family ids group every refresh token descended from one login, so they
/// must be unguessable: 32 characters drawn from a 64-symbol alphabet via
/// the thread-local CSPRNG gives 192 bits of entropy.
pub fn generate_token_family() -> String {
    let mut rng = rand::thread_rng();
    (0..FAMILY_ID_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..FAMILY_ID_ALPHABET.len());
            FAMILY_ID_ALPHABET[idx] as char
        })
        .collect()
}
