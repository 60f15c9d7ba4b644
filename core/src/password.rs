//! Random password generation based on platform (OS) CSRNG.
//!
//! Generated passwords are plaintext only until the handler has encrypted
//! them through the gateway, so they are returned in `Zeroizing` wrappers
//! and wiped when dropped.

use crate::error::{Error, Result};
use getrandom;
use zeroize::Zeroizing;

/// Alphabet for generated passwords. 64 characters, so reducing a random
/// byte mod 64 selects each character with probability exactly 1/64
/// (256 % 64 == 0 - no modulo bias, no rejection sampling needed).
pub const PASSWORD_CHARS: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_!";

/// Length of every generated password
pub const PASSWORD_LENGTH: usize = 15;

/// Fill the buffer with random bytes
/// Currently implemented using `getrandom` crate, which uses
/// native OS/platform implementations.
pub fn fill_buf(buf: &mut [u8]) -> Result<(), Error> {
    getrandom::getrandom(buf)?;
    Ok(())
}

/// Generate one random password: [`PASSWORD_LENGTH`] characters drawn
/// independently and uniformly from [`PASSWORD_CHARS`].
/// Fails only if the platform random source fails.
pub fn generate_password() -> Result<Zeroizing<String>, Error> {
    let mut raw = Zeroizing::new([0u8; PASSWORD_LENGTH]);
    fill_buf(raw.as_mut_slice())?;
    let mut password = Zeroizing::new(String::with_capacity(PASSWORD_LENGTH));
    for b in raw.iter() {
        password.push(PASSWORD_CHARS[(b % 64) as usize] as char);
    }
    Ok(password)
}
