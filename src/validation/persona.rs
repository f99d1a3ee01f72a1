//! Persona candidate validation.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::types::check_module_id;

use super::{index, join, section, type_name, Collector, ValidationResult};

/// Validate a persona candidate. Never fails.
pub fn validate_persona(candidate: &Value) -> ValidationResult {
    let mut v = Collector::default();

    let Some(obj) = candidate.as_object() else {
        v.error("", format!("persona must be an object, got {}", type_name(candidate)));
        return v.finish();
    };

    v.require_text(obj, "", "name");
    v.check_version(obj, "");
    v.check_schema_version(obj, "");
    v.require_string(obj, "", "description");
    v.require_string(obj, "", "semantic");
    // May be empty; the renderer skips a blank identity.
    v.require_string(obj, "", "identity");
    v.optional_bool(obj, "", "attribution");

    match obj.get("moduleGroups") {
        None | Some(Value::Null) => v.error_ref(
            "moduleGroups",
            "'moduleGroups' is required",
            section::PERSONA,
        ),
        Some(Value::Array(entries)) => check_entries(&mut v, entries),
        Some(other) => v.error(
            "moduleGroups",
            format!("'moduleGroups' must be an array, got {}", type_name(other)),
        ),
    }

    v.finish()
}

fn check_entries(v: &mut Collector, entries: &[Value]) {
    if entries.is_empty() {
        v.warn("moduleGroups", "persona references no modules");
        return;
    }

    let mut group_names = HashSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let path = index("moduleGroups", i);
        match entry {
            Value::String(id) => check_reference(v, id, &path),
            Value::Object(group) => check_group(v, group, &path, &mut group_names),
            other => v.error(
                path,
                format!(
                    "entry must be a module id or a group object, got {}",
                    type_name(other)
                ),
            ),
        }
    }
}

fn check_group<'a>(
    v: &mut Collector,
    group: &'a Map<String, Value>,
    path: &str,
    names: &mut HashSet<&'a str>,
) {
    if let Some(name) = v.optional_string(group, path, "name") {
        if name.trim().is_empty() {
            v.error(join(path, "name"), "group name must not be empty");
        } else if !names.insert(name) {
            v.error_ref(
                join(path, "name"),
                format!("duplicate group name '{}'", name),
                section::PERSONA,
            );
        }
    }

    let ids_path = join(path, "ids");
    let ids = match group.get("ids") {
        None | Some(Value::Null) => {
            v.error(ids_path, "'ids' is required");
            return;
        }
        Some(Value::Array(ids)) => ids,
        Some(other) => {
            v.error(
                ids_path,
                format!("'ids' must be an array, got {}", type_name(other)),
            );
            return;
        }
    };

    if ids.is_empty() {
        v.warn(ids_path, "group references no modules");
        return;
    }

    let mut seen = HashSet::new();
    for (i, id) in ids.iter().enumerate() {
        let id_path = index(&ids_path, i);
        let Value::String(id) = id else {
            v.error(
                id_path,
                format!("module id must be a string, got {}", type_name(id)),
            );
            continue;
        };
        check_reference(v, id, &id_path);
        if !seen.insert(id.as_str()) {
            v.error_ref(
                id_path,
                format!("duplicate module id '{}' within group", id),
                section::PERSONA,
            );
        }
    }
}

fn check_reference(v: &mut Collector, id: &str, path: &str) {
    if let Err(violation) = check_module_id(id) {
        v.error_ref(
            path,
            format!("invalid module id '{}': {}", id, violation),
            section::MODULE_ID,
        );
    }
}
