//! End-to-end build pipeline tests
//!
//! Drives the library from loading through rendering and reporting.

mod common;

use ums_build::build::{BuildEngine, BuildOptions, ResolvedGroup};
use ums_build::error::Error;
use ums_build::loader::{load_sources, DefinitionLoader, FileLoader};
use ums_build::registry::{ConflictStrategy, ModuleRegistry, ModuleSource};
use ums_build::render::{render_markdown, SEPARATOR};
use ums_build::types::{
    check_module_id, is_valid_module_id, IdViolation, Instruction, Module, ModuleBuilder,
    ModuleGroup, ModuleReference, Persona,
};

use common::{local_source, persona_fixture, standard_source};

fn module(id: &str, purpose: &str) -> Module {
    ModuleBuilder::new(id, "1.0.0")
        .name("Test module")
        .description("Used by build tests")
        .semantic("test")
        .instruction(Instruction {
            purpose: purpose.to_string(),
            ..Default::default()
        })
        .build()
        .unwrap()
}

fn group(name: Option<&str>, ids: &[&str]) -> ModuleReference {
    ModuleReference::Group(ModuleGroup {
        name: name.map(str::to_string),
        ids: ids.iter().map(|s| s.to_string()).collect(),
    })
}

fn persona(module_groups: Vec<ModuleReference>) -> Persona {
    Persona {
        name: "Tester".into(),
        version: "1.0.0".into(),
        schema_version: "2.0".into(),
        description: "Test persona".into(),
        semantic: "test".into(),
        identity: String::new(),
        attribution: false,
        module_groups,
    }
}

fn build(persona: &Persona, registry: &ModuleRegistry, strategy: ConflictStrategy) -> Vec<ResolvedGroup> {
    BuildEngine::new(BuildOptions {
        strategy,
        ..Default::default()
    })
    .build(persona, registry)
    .unwrap()
    .groups
}

// ─────────────────────────────────────────────────────────────────
// Module Ids
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_id_grammar() {
    assert!(is_valid_module_id("foundation/logic/deductive-reasoning"));
    assert!(is_valid_module_id("technology/rust/async/cancellation-2"));

    assert_eq!(check_module_id(""), Err(IdViolation::Empty));
    assert_eq!(check_module_id("/foundation/a/b"), Err(IdViolation::LeadingSlash));
    assert_eq!(check_module_id("foundation/a/"), Err(IdViolation::TrailingSlash));
    assert_eq!(check_module_id("foundation//b"), Err(IdViolation::EmptySegment));
    assert_eq!(check_module_id("foundation/Logic/b"), Err(IdViolation::Uppercase));
    assert_eq!(check_module_id("foundation/logic"), Err(IdViolation::TooFewSegments));
    assert!(matches!(
        check_module_id("core/logic/b"),
        Err(IdViolation::InvalidTier(_))
    ));
    assert!(matches!(
        check_module_id("foundation/lo_gic/b"),
        Err(IdViolation::InvalidCharacters(_))
    ));
}

// ─────────────────────────────────────────────────────────────────
// Conflict Strategies
// ─────────────────────────────────────────────────────────────────

fn three_way_registry() -> (ModuleRegistry, Vec<ModuleSource>) {
    let sources = vec![
        ModuleSource::standard("std"),
        ModuleSource::local("team"),
        ModuleSource::local("project"),
    ];
    let mut registry = ModuleRegistry::new();
    for (i, source) in sources.iter().enumerate() {
        registry.add(module("foundation/logic/x", &format!("from {}", i)), source.clone());
    }
    (registry, sources)
}

#[test]
fn test_strategy_replace_takes_last() {
    let (registry, sources) = three_way_registry();
    let entry = registry
        .resolve_entry("foundation/logic/x", Some(ConflictStrategy::Replace))
        .unwrap()
        .unwrap();
    assert_eq!(entry.source, sources[2]);
}

#[test]
fn test_strategy_warn_takes_first() {
    let (registry, sources) = three_way_registry();
    let entry = registry
        .resolve_entry("foundation/logic/x", Some(ConflictStrategy::Warn))
        .unwrap()
        .unwrap();
    assert_eq!(entry.source, sources[0]);
}

#[test]
fn test_strategy_error_counts_entries() {
    let (registry, _) = three_way_registry();
    match registry.resolve("foundation/logic/x", None).unwrap_err() {
        Error::Conflict {
            module_id,
            conflict_count,
        } => {
            assert_eq!(module_id, "foundation/logic/x");
            assert_eq!(conflict_count, 3);
        }
        other => panic!("Expected conflict, got {:?}", other),
    }
}

#[test]
fn test_replace_winner_keeps_persona_position() {
    let (mut registry, _) = three_way_registry();
    registry.add(module("foundation/logic/y", "y"), ModuleSource::standard("std"));

    let p = persona(vec![group(None, &["foundation/logic/x", "foundation/logic/y"])]);
    let groups = build(&p, &registry, ConflictStrategy::Replace);
    let ids: Vec<_> = groups[0].modules.iter().map(|m| m.module.id.as_str()).collect();
    assert_eq!(ids, vec!["foundation/logic/x", "foundation/logic/y"]);
    assert_eq!(groups[0].modules[0].source, ModuleSource::local("project"));
}

// ─────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_end_to_end_example() {
    let mut registry = ModuleRegistry::new();
    registry.add(module("foundation/logic/x", "P"), ModuleSource::standard("std"));

    let mut p = persona(vec![group(Some("G"), &["foundation/logic/x"])]);
    p.attribution = true;

    let groups = build(&p, &registry, ConflictStrategy::Error);
    let output = render_markdown(&p, &groups);
    assert_eq!(
        output,
        "# G\n\n## Purpose\n\nP\n\n[Attribution: foundation/logic/x]\n"
    );
}

#[test]
fn test_two_groups_render_headings_and_separators() {
    let mut registry = ModuleRegistry::new();
    for id in ["foundation/a/one", "foundation/a/two", "principle/b/three"] {
        registry.add(module(id, id), ModuleSource::standard("std"));
    }
    let p = persona(vec![
        group(Some("First"), &["foundation/a/one", "foundation/a/two"]),
        group(Some("Second"), &["principle/b/three"]),
    ]);

    let groups = build(&p, &registry, ConflictStrategy::Error);
    let output = render_markdown(&p, &groups);

    assert_eq!(output.matches("# First\n").count(), 1);
    assert_eq!(output.matches("# Second\n").count(), 1);
    let separator = format!("\n\n{}\n\n", SEPARATOR);
    assert_eq!(output.matches(separator.as_str()).count(), 2);
    assert!(!output.trim_end().ends_with(SEPARATOR));
    assert!(output.find("# First").unwrap() < output.find("# Second").unwrap());
}

#[test]
fn test_render_is_idempotent() {
    let mut registry = ModuleRegistry::new();
    registry.add(module("foundation/logic/x", "Same every time"), ModuleSource::standard("std"));
    let p = persona(vec![ModuleReference::Id("foundation/logic/x".into())]);

    let groups = build(&p, &registry, ConflictStrategy::Error);
    assert_eq!(render_markdown(&p, &groups), render_markdown(&p, &groups));
}

#[test]
fn test_empty_persona_renders_nothing() {
    let registry = ModuleRegistry::new();
    let p = persona(Vec::new());
    let groups = build(&p, &registry, ConflictStrategy::Error);
    assert_eq!(render_markdown(&p, &groups), "");
}

// ─────────────────────────────────────────────────────────────────
// Diagnostics
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_three_missing_ids_one_error() {
    let registry = ModuleRegistry::new();
    let p = persona(vec![
        ModuleReference::Id("foundation/a/missing".into()),
        group(Some("G"), &["principle/b/missing", "execution/c/missing"]),
    ]);

    let err = BuildEngine::new(BuildOptions::default())
        .build(&p, &registry)
        .unwrap_err();
    match err {
        Error::Build { missing_ids, message } => {
            assert_eq!(
                missing_ids,
                vec![
                    "foundation/a/missing",
                    "principle/b/missing",
                    "execution/c/missing"
                ]
            );
            for id in &missing_ids {
                assert!(message.contains(id.as_str()));
            }
        }
        other => panic!("Expected build error, got {:?}", other),
    }
}

#[test]
fn test_deprecated_module_warns_once() {
    let deprecated = ModuleBuilder::new("foundation/logic/old", "1.0.0")
        .name("Old")
        .description("Superseded")
        .semantic("old")
        .deprecated_by("foundation/logic/new")
        .instruction(Instruction {
            purpose: "Old way".into(),
            ..Default::default()
        })
        .build()
        .unwrap();
    let mut registry = ModuleRegistry::new();
    registry.add(deprecated, ModuleSource::standard("std"));

    let p = persona(vec![ModuleReference::Id("foundation/logic/old".into())]);
    let output = BuildEngine::new(BuildOptions::default())
        .build(&p, &registry)
        .unwrap();

    assert_eq!(output.deprecation_warnings.len(), 1);
    let warning = &output.deprecation_warnings[0];
    assert_eq!(warning.module_id, "foundation/logic/old");
    assert_eq!(warning.replaced_by.as_deref(), Some("foundation/logic/new"));
    assert!(warning.message.contains("foundation/logic/old"));
    assert!(warning.message.contains("foundation/logic/new"));
    assert_eq!(output.module_count(), 1);
}

// ─────────────────────────────────────────────────────────────────
// Loading From Fixtures
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_fixture_sources_build() {
    tokio_test::block_on(async {
        let loader = FileLoader::new();
        let mut registry = ModuleRegistry::with_strategy(ConflictStrategy::Replace);
        let sources = vec![
            ModuleSource::standard(standard_source()),
            ModuleSource::local(local_source()),
        ];
        let summary = load_sources(&mut registry, &sources, &loader).await.unwrap();
        assert_eq!(summary.total(), 5);
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.conflicting_ids(),
            vec!["foundation/logic/deductive-reasoning".to_string()]
        );

        let p = loader
            .load_persona(&persona_fixture("reviewer"))
            .await
            .unwrap();
        let output = BuildEngine::new(BuildOptions {
            strategy: ConflictStrategy::Replace,
            ..Default::default()
        })
        .build(&p, &registry)
        .unwrap();

        assert_eq!(output.report.group_count, 2);
        assert_eq!(output.report.module_count, 3);
        assert_eq!(output.groups[0].modules[0].module.version, "1.1.0");

        let text = render_markdown(&p, &output.groups);
        assert!(text.starts_with("## Identity\n\nYou are a careful reviewer."));
        assert!(text.contains("### Red"));
        assert!(text.contains("**Use Case:** Generalising an implementation"));
    });
}

#[test]
fn test_tier_listing_order() {
    tokio_test::block_on(async {
        let mut registry = ModuleRegistry::new();
        let sources = vec![ModuleSource::standard(standard_source())];
        load_sources(&mut registry, &sources, &FileLoader::new())
            .await
            .unwrap();

        let tiers: Vec<_> = registry
            .resolve_by_tier(None)
            .unwrap()
            .into_iter()
            .map(|(tier, modules)| (tier.as_str(), modules.len()))
            .collect();
        assert_eq!(
            tiers,
            vec![("foundation", 1), ("principle", 2), ("technology", 1)]
        );
    });
}
