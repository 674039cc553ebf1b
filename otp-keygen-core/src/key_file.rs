// File:    key_file.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Derives key file names, measures input files and writes key files in a single complete step.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::error::KeyGenError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use uuid::Uuid;

/// Prefix placed in front of the input's stem.
pub const KEY_FILE_PREFIX: &str = "key_";
/// Extension of every key file.
pub const KEY_FILE_EXTENSION: &str = "txt";

/// What to do when the derived key file already exists.
///
/// Inputs sharing a stem (`a.txt`, `a.bin`, `dir/a.txt`) all map to `key_a.txt`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Replace the existing key file with the new key.
    #[default]
    Overwrite,
    /// Refuse the request and leave the existing key file untouched.
    Fail,
}

/// Derives the key file name for a request.
///
/// The directory and the last extension are stripped from the request, then
/// the result is wrapped as `key_<stem>.txt`. Leading dots belong to the stem,
/// so `..hidden` keeps its whole name.
#[must_use]
pub fn key_file_name(request: &str) -> String {
    let base = request.rsplit('/').next().unwrap_or(request);
    let leading_dots = base.len() - base.trim_start_matches('.').len();
    let stem = match base[leading_dots..].rfind('.') {
        Some(dot) => &base[..leading_dots + dot],
        None => base,
    };
    format!("{KEY_FILE_PREFIX}{stem}.{KEY_FILE_EXTENSION}")
}

/// Measures an input file in characters.
///
/// The file is decoded as UTF-8 and read as text: `\r\n` and a lone `\r`
/// each count as one line break, then Unicode scalar values are counted.
///
/// # Errors
///
/// Returns [`KeyGenError::InputNotFound`] if the file does not exist, and
/// [`KeyGenError::Io`] if it cannot be read or is not valid UTF-8.
pub fn measure_input(path: &Path) -> Result<usize, KeyGenError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text.replace("\r\n", "\n").chars().count()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(KeyGenError::InputNotFound),
        Err(e) => Err(e.into()),
    }
}

/// Writes a key into `dir/name` as one complete replacement of the file.
///
/// The key goes to a uniquely named temporary file in the same directory,
/// which is then renamed over the destination.
///
/// # Errors
///
/// Returns [`KeyGenError::Io`] if the temporary file cannot be written or renamed.
pub fn write_key(dir: &Path, name: &str, key: &str) -> Result<(), KeyGenError> {
    let temp_path = dir.join(format!(".{name}.{}.tmp", Uuid::new_v4()));

    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(key.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&temp_path, dir.join(name))) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Checks the collision policy against the key directory.
///
/// # Errors
///
/// Returns [`KeyGenError::KeyExists`] if the policy is [`CollisionPolicy::Fail`]
/// and `dir/name` already exists.
pub fn check_collision(dir: &Path, name: &str, policy: CollisionPolicy) -> Result<(), KeyGenError> {
    match policy {
        CollisionPolicy::Overwrite => Ok(()),
        CollisionPolicy::Fail if dir.join(name).exists() => {
            Err(KeyGenError::KeyExists(name.to_owned()))
        }
        CollisionPolicy::Fail => Ok(()),
    }
}
