// SPDX-License-Identifier: GPL-3.0-or-later

//! Streaming serialization of JSON arrays.
//!
//! The format is a pretty printed JSON array of objects, not JSON lines.

use serde::Serializer;
use serde::ser::{Serialize, SerializeSeq};
use std::io;

/// Serialize entries from an iterator into a JSON array.
///
/// The iterator yields `Result<T, E>`; the first error stops the serialization
/// and is returned as is.
pub fn serialize_result_seq<W, T, E>(writer: W, entries: impl Iterator<Item = Result<T, E>>) -> Result<(), E>
where
    W: io::Write,
    T: Serialize,
    E: std::error::Error + From<serde_json::Error>,
{
    let mut ser = serde_json::Serializer::pretty(writer);
    let mut seq = ser.serialize_seq(None)?;
    for entry in entries {
        seq.serialize_element(&entry?)?;
    }
    seq.end()?;

    Ok(())
}
