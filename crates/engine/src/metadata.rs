// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metadata extraction (§4.3 "`ClassMetadataExtracted` ... treats bytecode
//! strictly as data; no execution"): turns a class file's raw bytes into the
//! structural `ClassMetadata` the validator compares.
//!
//! Parsing the real JVM constant-pool format is out of scope for this
//! engine (§1 non-goals: no AST diffing, no source-level patching); a
//! class's structural shape is instead carried as a JSON-encoded
//! `ClassMetadata` alongside the method bodies in the `.class` file's bytes.
//! The VM capability is the one that understands the real on-disk format.

use crate::error::ValidationError;
use bh_core::ClassMetadata;

/// Extract `ClassMetadata` from a class file's raw bytes.
pub fn extract(class_name: &str, bytecode: &[u8]) -> Result<ClassMetadata, ValidationError> {
    if bytecode.is_empty() {
        return Err(ValidationError::BytecodeMalformed(format!(
            "{class_name}: empty class file"
        )));
    }
    serde_json::from_slice(bytecode)
        .map_err(|e| ValidationError::BytecodeMalformed(format!("{class_name}: {e}")))
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
