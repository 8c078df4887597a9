// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bytecode validator (§4.3): pure structural comparison between a
//! previously-loaded class image and a candidate new one.
//!
//! Deliberately has no I/O and does not depend on `bh-store` or
//! `bh-adapters` — the coordinator reads files and calls this; the function
//! itself stays unit-testable without a VM or filesystem.

use bh_core::{AccessFlag, ClassMetadata, RejectedChange, RejectedChangeKind};
use std::collections::BTreeSet;

/// Whether access-flag changes are permitted at all (§4.3, §9 resolved Open
/// Question: "no access-flag changes" unless the VM capability declares
/// extended support — decided in DESIGN.md, not guessed at call sites).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFlagPolicy {
    Forbidden,
    Permitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Rejected {
        reason: String,
        rejected_changes: Vec<RejectedChange>,
        recovery_action: String,
    },
}

/// Compare `old` (currently loaded) against `new` (candidate) per the §4.3
/// rule set. Same fully-qualified name, same superclass, same interfaces,
/// same field set, same method set (bodies may differ freely); access-flag
/// changes are governed by `policy`.
pub fn validate(old: &ClassMetadata, new: &ClassMetadata, policy: AccessFlagPolicy) -> ValidationOutcome {
    let mut rejected = Vec::new();

    if old.class_name != new.class_name {
        rejected.push(RejectedChange::new(
            RejectedChangeKind::Hierarchy,
            format!("class {}", old.class_name),
            format!("class name changed from {} to {}", old.class_name, new.class_name),
        ));
    }

    if old.super_class != new.super_class {
        rejected.push(RejectedChange::new(
            RejectedChangeKind::Hierarchy,
            format!("class {}", old.class_name),
            format!("super class changed from {:?} to {:?}", old.super_class, new.super_class),
        ));
    }

    if old.interfaces != new.interfaces {
        for added in new.interfaces.difference(&old.interfaces) {
            rejected.push(RejectedChange::new(
                RejectedChangeKind::Interface,
                format!("interface {added}"),
                "interface added".to_string(),
            ));
        }
        for removed in old.interfaces.difference(&new.interfaces) {
            rejected.push(RejectedChange::new(
                RejectedChangeKind::Interface,
                format!("interface {removed}"),
                "interface removed".to_string(),
            ));
        }
    }

    rejected.extend(diff_fields(old, new));
    rejected.extend(diff_methods(old, new, policy));

    if rejected.is_empty() {
        return ValidationOutcome::Valid;
    }

    ValidationOutcome::Rejected {
        reason: format!("{} incompatible structural change(s) detected", rejected.len()),
        recovery_action: "Restart application to load new class definition".to_string(),
        rejected_changes: rejected,
    }
}

fn diff_fields(old: &ClassMetadata, new: &ClassMetadata) -> Vec<RejectedChange> {
    let mut rejected = Vec::new();
    let old_by_name: std::collections::BTreeMap<_, _> =
        old.fields.iter().map(|f| (f.name.as_str(), f)).collect();
    let new_by_name: std::collections::BTreeMap<_, _> =
        new.fields.iter().map(|f| (f.name.as_str(), f)).collect();

    for (name, field) in &new_by_name {
        if !old_by_name.contains_key(name) {
            rejected.push(RejectedChange::new(RejectedChangeKind::Added, field.member(), "field added".to_string()));
        }
    }
    for (name, field) in &old_by_name {
        if !new_by_name.contains_key(name) {
            rejected.push(RejectedChange::new(RejectedChangeKind::Removed, field.member(), "field removed".to_string()));
        }
    }
    for (name, old_field) in &old_by_name {
        if let Some(new_field) = new_by_name.get(name) {
            if old_field.type_descriptor != new_field.type_descriptor {
                rejected.push(RejectedChange::new(
                    RejectedChangeKind::TypeChanged,
                    old_field.member(),
                    format!("type changed from {} to {}", old_field.type_descriptor, new_field.type_descriptor),
                ));
            }
        }
    }
    rejected
}

fn diff_methods(old: &ClassMetadata, new: &ClassMetadata, policy: AccessFlagPolicy) -> Vec<RejectedChange> {
    let mut rejected = Vec::new();
    let key = |m: &bh_core::MethodDescriptor| (m.name.clone(), m.descriptor.clone());
    let old_by_key: std::collections::BTreeMap<_, _> = old.methods.iter().map(|m| (key(m), m)).collect();
    let new_by_key: std::collections::BTreeMap<_, _> = new.methods.iter().map(|m| (key(m), m)).collect();

    for (k, method) in &new_by_key {
        if !old_by_key.contains_key(k) {
            rejected.push(RejectedChange::new(RejectedChangeKind::Added, method.member(), "method added".to_string()));
        }
    }
    for (k, method) in &old_by_key {
        if !new_by_key.contains_key(k) {
            rejected.push(RejectedChange::new(RejectedChangeKind::Removed, method.member(), "method removed".to_string()));
        }
    }
    if policy == AccessFlagPolicy::Forbidden {
        for (k, old_method) in &old_by_key {
            if let Some(new_method) = new_by_key.get(k) {
                if old_method.access_flags != new_method.access_flags {
                    rejected.push(RejectedChange::new(
                        RejectedChangeKind::AccessChanged,
                        old_method.member(),
                        format!(
                            "access flags changed from {:?} to {:?}",
                            flags_sorted(&old_method.access_flags),
                            flags_sorted(&new_method.access_flags)
                        ),
                    ));
                }
            }
        }
    }
    rejected
}

fn flags_sorted(flags: &BTreeSet<AccessFlag>) -> Vec<AccessFlag> {
    flags.iter().copied().collect()
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
