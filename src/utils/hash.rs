//! Hashing helpers.
//!
//! - `compute()`: FxHash of a string, used as the in-memory cache key
//! - `md5_hex()`: MD5 hex digest, used for merged asset file names
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let key = hash::compute("/static/a.css");          // -> u64
//! let name = hash::md5_hex("/static/a.css/static/b.css"); // -> 32 hex chars
//! ```

use md5::{Digest, Md5};
use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

/// Lowercase hex MD5 digest.
pub fn md5_hex<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex::encode(Md5::digest(data.as_ref()))
}
