// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural class metadata used by the validator (§4.3) and carried in
//! `ClassMetadataExtracted` / `BytecodeValidated` events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A declared field: name plus JVM-style type descriptor (e.g. `"count:I"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_descriptor: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_descriptor: type_descriptor.into(),
        }
    }

    pub fn member(&self) -> String {
        format!("field {}:{}", self.name, self.type_descriptor)
    }
}

/// A declared method: name plus descriptor and a subset of access flags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub access_flags: BTreeSet<AccessFlag>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access_flags: BTreeSet::new(),
        }
    }

    pub fn with_flags(mut self, flags: impl IntoIterator<Item = AccessFlag>) -> Self {
        self.access_flags = flags.into_iter().collect();
        self
    }

    pub fn member(&self) -> String {
        format!("method {}{}", self.name, self.descriptor)
    }
}

/// Method/field access flags the validator cares about. Only a subset of the
/// real JVM access-flag space is modeled: the set this engine must reason
/// about to enforce the "no access-flag changes" default policy (§4.3, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessFlag {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Synchronized,
    Native,
    Abstract,
}

/// Structural shape of a loaded or candidate class image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    pub class_name: String,
    pub super_class: Option<String>,
    pub interfaces: BTreeSet<String>,
    pub fields: BTreeSet<FieldDescriptor>,
    pub methods: BTreeSet<MethodDescriptor>,
}

/// The kind of incompatibility a rejected change falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectedChangeKind {
    Added,
    Removed,
    TypeChanged,
    Hierarchy,
    Interface,
    AccessChanged,
    Malformed,
}

/// One structural incompatibility found by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedChange {
    pub kind: RejectedChangeKind,
    pub member: String,
    pub details: String,
}

impl RejectedChange {
    pub fn new(
        kind: RejectedChangeKind,
        member: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            member: member.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
#[path = "bytecode_tests.rs"]
mod tests;
