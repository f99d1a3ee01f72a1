//! Module candidate validation.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::types::{check_module_id, ComponentKind, MAX_COGNITIVE_LEVEL};

use super::{index, join, section, type_name, Collector, ValidationResult};

/// Object form of each instruction list item: required key, optional string companion.
const INSTRUCTION_LISTS: &[(&str, &str, Option<&str>)] = &[
    ("process", "step", Some("detail")),
    ("constraints", "rule", None),
    ("principles", "principle", Some("rationale")),
    ("criteria", "item", Some("verification")),
];

const SEVERITIES: &[&str] = &["must", "should", "may"];

/// Validate a module candidate. Never fails.
pub fn validate_module(candidate: &Value) -> ValidationResult {
    let mut v = Collector::default();

    let Some(obj) = candidate.as_object() else {
        v.error("", format!("module must be an object, got {}", type_name(candidate)));
        return v.finish();
    };

    let id = check_id(&mut v, obj);
    v.check_version(obj, "");
    v.check_schema_version(obj, "");

    for (i, capability) in v.string_array(obj, "", "capabilities").into_iter().enumerate() {
        if capability.trim().is_empty() {
            v.error(index("capabilities", i), "capability must not be empty");
        }
    }

    if let Some(level) = obj.get("cognitiveLevel") {
        match level.as_u64() {
            Some(n) if n <= MAX_COGNITIVE_LEVEL as u64 => {}
            _ => v.error(
                "cognitiveLevel",
                format!(
                    "cognitiveLevel must be an integer between 0 and {}",
                    MAX_COGNITIVE_LEVEL
                ),
            ),
        }
    }

    match obj.get("metadata") {
        None => v.error_ref("metadata", "'metadata' is required", section::METADATA),
        Some(Value::Object(meta)) => check_metadata(&mut v, meta, id),
        Some(other) => v.error(
            "metadata",
            format!("'metadata' must be an object, got {}", type_name(other)),
        ),
    }

    check_components(&mut v, obj);

    v.finish()
}

fn check_id<'a>(v: &mut Collector, obj: &'a Map<String, Value>) -> Option<&'a str> {
    let id = v.require_string(obj, "", "id")?;
    if let Err(violation) = check_module_id(id) {
        v.error_ref(
            "id",
            format!("invalid module id '{}': {}", id, violation),
            section::MODULE_ID,
        );
    }
    Some(id)
}

// ─────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────

fn check_metadata(v: &mut Collector, meta: &Map<String, Value>, id: Option<&str>) {
    const P: &str = "metadata";

    v.require_text(meta, P, "name");
    v.require_text(meta, P, "description");
    v.require_text(meta, P, "semantic");
    v.optional_string(meta, P, "license");
    v.string_array(meta, P, "authors");

    for (i, tag) in v.string_array(meta, P, "tags").into_iter().enumerate() {
        if tag != tag.to_lowercase() {
            v.error_ref(
                index("metadata.tags", i),
                format!("tag '{}' must be lowercase", tag),
                section::METADATA,
            );
        }
    }

    let deprecated = v.optional_bool(meta, P, "deprecated").unwrap_or(false);
    let replaced_by = meta.get("replacedBy");

    if !deprecated {
        if replaced_by.is_some() {
            v.error_ref(
                "metadata.replacedBy",
                "'replacedBy' must only be present when 'deprecated' is true",
                section::DEPRECATION,
            );
        }
        return;
    }

    match replaced_by {
        None | Some(Value::Null) => v.error_ref(
            "metadata.replacedBy",
            "deprecated modules must name a replacement in 'replacedBy'",
            section::DEPRECATION,
        ),
        Some(Value::String(replacement)) => match check_module_id(replacement) {
            Err(violation) => v.error_ref(
                "metadata.replacedBy",
                format!("invalid replacement id '{}': {}", replacement, violation),
                section::DEPRECATION,
            ),
            Ok(_) if Some(replacement.as_str()) == id => v.error_ref(
                "metadata.replacedBy",
                "a module cannot be replaced by itself",
                section::DEPRECATION,
            ),
            Ok(_) => v.warn(
                "metadata.deprecated",
                format!("module is deprecated; use '{}' instead", replacement),
            ),
        },
        Some(other) => v.error(
            "metadata.replacedBy",
            format!("'replacedBy' must be a string, got {}", type_name(other)),
        ),
    }
}

// ─────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────

fn check_components(v: &mut Collector, obj: &Map<String, Value>) {
    let shorthand: Vec<ComponentKind> = ComponentKind::all()
        .iter()
        .copied()
        .filter(|kind| obj.contains_key(kind.key()))
        .collect();
    let has_list = obj.contains_key("components");
    let mut titles = HashSet::new();

    if shorthand.is_empty() && !has_list {
        v.error_ref(
            "",
            "module must define at least one component (instruction, knowledge, data or components)",
            section::COMPONENTS,
        );
        return;
    }

    if shorthand.len() + usize::from(has_list) > 1 {
        let mut names: Vec<&str> = shorthand.iter().map(|k| k.key()).collect();
        if has_list {
            names.push("components");
        }
        v.error_ref(
            "",
            format!(
                "{} are mutually exclusive; define exactly one component shape",
                names.join(", ")
            ),
            section::COMPONENTS,
        );
    }

    for kind in &shorthand {
        match obj.get(kind.key()) {
            Some(Value::Object(body)) => check_body(v, *kind, body, kind.key(), &mut titles),
            Some(other) => v.error(
                kind.key(),
                format!("'{}' must be an object, got {}", kind, type_name(other)),
            ),
            None => {}
        }
    }

    if !has_list {
        return;
    }

    let Some(items) = v.optional_array(obj, "", "components") else {
        return;
    };
    if items.is_empty() {
        v.error_ref(
            "components",
            "'components' must not be empty",
            section::COMPONENTS,
        );
    }

    for (i, item) in items.iter().enumerate() {
        let path = index("components", i);
        let Some(body) = item.as_object() else {
            v.error(
                path,
                format!("component must be an object, got {}", type_name(item)),
            );
            continue;
        };
        let Some(tag) = v.require_string(body, &path, "type") else {
            continue;
        };
        match ComponentKind::all().iter().find(|k| k.key() == tag) {
            Some(kind) => check_body(v, *kind, body, &path, &mut titles),
            None => v.error_ref(
                join(&path, "type"),
                format!(
                    "unknown component type '{}'; expected instruction, knowledge or data",
                    tag
                ),
                section::COMPONENTS,
            ),
        }
    }
}

fn check_body(
    v: &mut Collector,
    kind: ComponentKind,
    body: &Map<String, Value>,
    path: &str,
    titles: &mut HashSet<String>,
) {
    match kind {
        ComponentKind::Instruction => check_instruction(v, body, path),
        ComponentKind::Knowledge => check_knowledge(v, body, path, titles),
        ComponentKind::Data => check_data(v, body, path),
    }
}

fn check_instruction(v: &mut Collector, body: &Map<String, Value>, path: &str) {
    v.require_string(body, path, "purpose");

    for (list, key, companion) in INSTRUCTION_LISTS {
        let Some(items) = v.optional_array(body, path, list) else {
            continue;
        };
        let list_path = join(path, list);
        for (i, item) in items.iter().enumerate() {
            let item_path = index(&list_path, i);
            match item {
                Value::String(_) => {}
                Value::Object(entry) => {
                    v.require_string(entry, &item_path, key);
                    match companion {
                        Some(field) => {
                            v.optional_string(entry, &item_path, field);
                        }
                        None => check_severity(v, entry, &item_path),
                    }
                }
                other => v.error(
                    item_path,
                    format!(
                        "must be a string or an object with a '{}' string, got {}",
                        key,
                        type_name(other)
                    ),
                ),
            }
        }
    }
}

fn check_severity(v: &mut Collector, entry: &Map<String, Value>, path: &str) {
    if let Some(severity) = v.optional_string(entry, path, "severity") {
        if !SEVERITIES.contains(&severity) {
            v.error(
                join(path, "severity"),
                format!(
                    "unknown severity '{}'; expected one of {}",
                    severity,
                    SEVERITIES.join(", ")
                ),
            );
        }
    }
}

fn check_knowledge(
    v: &mut Collector,
    body: &Map<String, Value>,
    path: &str,
    titles: &mut HashSet<String>,
) {
    v.require_string(body, path, "explanation");

    for (i, concept) in objects(v, body, path, "concepts") {
        v.require_string(concept, &i, "name");
        v.require_string(concept, &i, "description");
        v.optional_string(concept, &i, "rationale");
        v.string_array(concept, &i, "examples");
    }

    for (i, example) in objects(v, body, path, "examples") {
        if let Some(title) = check_example(v, example, &i) {
            if !titles.insert(title.to_string()) {
                v.error_ref(
                    join(&i, "title"),
                    format!("duplicate example title '{}'", title),
                    section::COMPONENTS,
                );
            }
        }
    }

    for (i, pattern) in objects(v, body, path, "patterns") {
        v.require_string(pattern, &i, "name");
        v.require_string(pattern, &i, "useCase");
        v.require_string(pattern, &i, "description");
        v.string_array(pattern, &i, "advantages");
        v.string_array(pattern, &i, "disadvantages");
        match pattern.get("example") {
            None => {}
            Some(Value::Object(example)) => {
                check_example(v, example, &join(&i, "example"));
            }
            Some(other) => v.error(
                join(&i, "example"),
                format!("'example' must be an object, got {}", type_name(other)),
            ),
        }
    }
}

fn check_example<'a>(
    v: &mut Collector,
    example: &'a Map<String, Value>,
    path: &str,
) -> Option<&'a str> {
    let title = v.require_string(example, path, "title");
    v.require_string(example, path, "rationale");
    v.require_string(example, path, "snippet");
    v.optional_string(example, path, "language");
    title
}

fn check_data(v: &mut Collector, body: &Map<String, Value>, path: &str) {
    v.require_text(body, path, "format");
    match body.get("value") {
        None | Some(Value::Null) => {
            v.error(join(path, "value"), "'value' is required");
        }
        Some(_) => {}
    }
    v.optional_string(body, path, "description");
}

/// Object items of an optional array, paired with their paths.
fn objects<'a>(
    v: &mut Collector,
    body: &'a Map<String, Value>,
    path: &str,
    key: &str,
) -> Vec<(String, &'a Map<String, Value>)> {
    let Some(items) = v.optional_array(body, path, key) else {
        return Vec::new();
    };
    let list_path = join(path, key);
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::Object(obj) => out.push((index(&list_path, i), obj)),
            other => v.error(
                index(&list_path, i),
                format!("must be an object, got {}", type_name(other)),
            ),
        }
    }
    out
}
