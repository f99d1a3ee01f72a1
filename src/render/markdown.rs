//! Markdown rendering of personas and modules.
//!
//! Output layout:
//!
//! ```text
//! ## Identity            (only when the persona has one)
//!
//! # Group name           (only for named groups, with their first module)
//!
//! <module block>
//!
//! [Attribution: <id>]    (only when persona.attribution is set)
//!
//! ---
//!
//! <module block>
//! ```

use crate::build::ResolvedGroup;
use crate::types::{
    Component, Concept, DataComponent, DataValue, Example, Instruction, Knowledge, Module,
    Pattern, Persona,
};

use super::language::infer_language;

/// Marker placed between consecutive module blocks.
pub const SEPARATOR: &str = "---";

/// Order in which component sections are emitted.
pub const DIRECTIVE_ORDER: &[&str] = &[
    "purpose",
    "process",
    "constraints",
    "principles",
    "criteria",
    "explanation",
    "concepts",
    "examples",
    "patterns",
    "data",
];

/// Literal text placed around the rendered body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub header: Option<String>,
    pub footer: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────

/// Render a persona and its resolved groups. Newline-terminated unless empty.
pub fn render_markdown(persona: &Persona, groups: &[ResolvedGroup]) -> String {
    let mut sections = Vec::new();

    let identity = persona.identity.trim();
    if !identity.is_empty() {
        sections.push(format!("## Identity\n\n{}", identity));
    }

    let mut blocks = Vec::new();
    for group in groups {
        for (i, resolved) in group.modules.iter().enumerate() {
            let mut block = String::new();
            if i == 0 {
                if let Some(name) = &group.name {
                    block.push_str(&format!("# {}\n\n", name));
                }
            }
            block.push_str(&render_module(&resolved.module));
            if persona.attribution {
                block.push_str(&format!("\n\n[Attribution: {}]", resolved.module.id));
            }
            blocks.push(block);
        }
    }
    if !blocks.is_empty() {
        sections.push(blocks.join(&format!("\n\n{}\n\n", SEPARATOR)));
    }

    terminate(sections.join("\n\n"))
}

/// Render with the configured header and footer around the body.
///
/// Header and footer are copied byte for byte; only the newlines needed for a
/// blank line between parts are added.
pub fn render_document(
    persona: &Persona,
    groups: &[ResolvedGroup],
    options: &RenderOptions,
) -> String {
    let body = render_markdown(persona, groups);
    let mut out = String::new();
    for part in [options.header.as_deref(), Some(body.as_str()), options.footer.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
    {
        if !out.is_empty() {
            while !out.ends_with("\n\n") {
                out.push('\n');
            }
        }
        out.push_str(part);
    }
    terminate(out)
}

fn terminate(mut text: String) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

// ─────────────────────────────────────────────────────────────────
// Modules
// ─────────────────────────────────────────────────────────────────

/// Render one module's components in order, without separator or attribution.
pub fn render_module(module: &Module) -> String {
    module
        .components()
        .iter()
        .map(render_component)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_component(component: &Component) -> String {
    let sections = match component {
        Component::Instruction(instruction) => instruction_sections(instruction),
        Component::Knowledge(knowledge) => knowledge_sections(knowledge),
        Component::Data(data) => data_sections(data),
    };
    sections.join("\n\n")
}

fn instruction_sections(instruction: &Instruction) -> Vec<String> {
    let mut sections = vec![format!("## Purpose\n\n{}", instruction.purpose.trim())];

    if !instruction.process.is_empty() {
        let items: Vec<String> = instruction
            .process
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let marker = format!("{}. ", i + 1);
                let mut item = format!("{}{}", marker, step.text());
                if let Some(detail) = step.detail() {
                    item.push('\n');
                    item.push_str(&indent(detail, marker.len()));
                }
                item
            })
            .collect();
        sections.push(format!("## Process\n\n{}", items.join("\n")));
    }

    if !instruction.constraints.is_empty() {
        let items: Vec<String> = instruction
            .constraints
            .iter()
            .map(|c| match c.severity() {
                Some(severity) => format!("- **{}**: {}", severity, c.rule()),
                None => format!("- {}", c.rule()),
            })
            .collect();
        sections.push(format!("## Constraints\n\n{}", items.join("\n")));
    }

    if !instruction.principles.is_empty() {
        let items: Vec<String> = instruction
            .principles
            .iter()
            .map(|p| continued(format!("- {}", p.text()), p.rationale()))
            .collect();
        sections.push(format!("## Principles\n\n{}", items.join("\n")));
    }

    if !instruction.criteria.is_empty() {
        let items: Vec<String> = instruction
            .criteria
            .iter()
            .map(|c| continued(format!("- [ ] {}", c.item()), c.verification()))
            .collect();
        sections.push(format!("## Criteria\n\n{}", items.join("\n")));
    }

    sections
}

fn knowledge_sections(knowledge: &Knowledge) -> Vec<String> {
    let mut sections = vec![format!("## Explanation\n\n{}", knowledge.explanation.trim())];

    if !knowledge.concepts.is_empty() {
        let entries: Vec<String> = knowledge.concepts.iter().map(concept).collect();
        sections.push(format!("## Concepts\n\n{}", entries.join("\n\n")));
    }

    if !knowledge.examples.is_empty() {
        let entries: Vec<String> = knowledge
            .examples
            .iter()
            .map(|e| format!("### {}\n\n{}", e.title, example_body(e)))
            .collect();
        sections.push(format!("## Examples\n\n{}", entries.join("\n\n")));
    }

    if !knowledge.patterns.is_empty() {
        let entries: Vec<String> = knowledge.patterns.iter().map(pattern).collect();
        sections.push(format!("## Patterns\n\n{}", entries.join("\n\n")));
    }

    sections
}

fn concept(concept: &Concept) -> String {
    let mut parts = vec![
        format!("### {}", concept.name),
        concept.description.trim().to_string(),
    ];
    if let Some(rationale) = &concept.rationale {
        parts.push(format!("**Rationale:** {}", rationale.trim()));
    }
    if !concept.examples.is_empty() {
        parts.push(bullets(&concept.examples));
    }
    parts.join("\n\n")
}

fn pattern(pattern: &Pattern) -> String {
    let mut parts = vec![
        format!("### {}", pattern.name),
        format!("**Use Case:** {}", pattern.use_case.trim()),
        pattern.description.trim().to_string(),
    ];
    if !pattern.advantages.is_empty() {
        parts.push(format!("**Advantages:**\n{}", bullets(&pattern.advantages)));
    }
    if !pattern.disadvantages.is_empty() {
        parts.push(format!("**Disadvantages:**\n{}", bullets(&pattern.disadvantages)));
    }
    if let Some(example) = &pattern.example {
        parts.push(format!("**Example:** {}\n\n{}", example.title, example_body(example)));
    }
    parts.join("\n\n")
}

fn example_body(example: &Example) -> String {
    format!(
        "{}\n\n{}",
        example.rationale.trim(),
        fenced(example.language.as_deref().unwrap_or(""), &example.snippet)
    )
}

fn data_sections(data: &DataComponent) -> Vec<String> {
    let mut sections = Vec::new();
    if let Some(description) = &data.description {
        if !description.trim().is_empty() {
            sections.push(description.trim().to_string());
        }
    }

    let body = match &data.value {
        DataValue::Text(text) => text.clone(),
        DataValue::Structured(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    };
    sections.push(fenced(infer_language(&data.format), &body));
    sections
}

// ─────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// List item with an optional continuation line under it.
fn continued(item: String, continuation: Option<&str>) -> String {
    match continuation {
        Some(text) => format!("{}\n{}", item, indent(text, 2)),
        None => item,
    }
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.trim()
        .lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fenced block, using a fence longer than any backtick run in the body.
fn fenced(language: &str, body: &str) -> String {
    let longest = body
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{}{}\n{}\n{}", fence, language, body.trim_end(), fence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::ResolvedModule;
    use crate::registry::ModuleSource;
    use crate::types::{
        Constraint, Criterion, ModuleBuilder, ModuleReference, Principle, ProcessStep, Severity,
    };
    use std::sync::Arc;

    fn persona(attribution: bool, identity: &str) -> Persona {
        Persona {
            name: "Tester".into(),
            version: "1.0.0".into(),
            schema_version: "2.0".into(),
            description: "D".into(),
            semantic: "S".into(),
            identity: identity.into(),
            attribution,
            module_groups: Vec::<ModuleReference>::new(),
        }
    }

    fn resolved(id: &str, purpose: &str) -> ResolvedModule {
        let module = ModuleBuilder::new(id, "1.0.0")
            .name("N")
            .description("D")
            .semantic("S")
            .instruction(Instruction {
                purpose: purpose.into(),
                ..Default::default()
            })
            .build()
            .unwrap();
        ResolvedModule {
            module: Arc::new(module),
            source: ModuleSource::standard("std"),
        }
    }

    fn group(name: Option<&str>, modules: Vec<ResolvedModule>) -> ResolvedGroup {
        ResolvedGroup {
            name: name.map(str::to_string),
            modules,
        }
    }

    #[test]
    fn test_single_group_with_attribution() {
        let groups = vec![group(Some("G"), vec![resolved("foundation/logic/x", "P")])];
        let out = render_markdown(&persona(true, ""), &groups);
        assert_eq!(
            out,
            "# G\n\n## Purpose\n\nP\n\n[Attribution: foundation/logic/x]\n"
        );
    }

    #[test]
    fn test_separators_between_blocks_only() {
        let groups = vec![
            group(
                Some("G1"),
                vec![resolved("foundation/logic/a", "A"), resolved("foundation/logic/b", "B")],
            ),
            group(Some("G2"), vec![resolved("foundation/logic/c", "C")]),
        ];
        let out = render_markdown(&persona(false, ""), &groups);

        assert_eq!(out.matches("\n---\n").count(), 2);
        assert_eq!(out.matches("# G").count(), 2);
        assert!(!out.trim_end().ends_with(SEPARATOR));
        let a = out.find("A\n").unwrap();
        let b = out.find("B\n").unwrap();
        let c = out.find("C\n").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_identity_and_unnamed_group() {
        let groups = vec![group(None, vec![resolved("foundation/logic/a", "A")])];
        let out = render_markdown(&persona(false, "  You are careful.  "), &groups);
        assert!(out.starts_with("## Identity\n\nYou are careful.\n\n## Purpose"));
        assert!(!out.contains("\n# "));

        let out = render_markdown(&persona(false, "   "), &groups);
        assert!(!out.contains("Identity"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let groups = vec![group(Some("G"), vec![resolved("foundation/logic/a", "A")])];
        let p = persona(true, "I");
        assert_eq!(render_markdown(&p, &groups), render_markdown(&p, &groups));
    }

    #[test]
    fn test_instruction_sections_in_order() {
        let instruction = Instruction {
            purpose: "Do it".into(),
            process: vec![
                ProcessStep::Text("First".into()),
                ProcessStep::Detailed {
                    step: "Second".into(),
                    detail: Some("Carefully".into()),
                },
            ],
            constraints: vec![
                Constraint::Text("Plain".into()),
                Constraint::Detailed {
                    rule: "Strict".into(),
                    severity: Some(Severity::Must),
                },
            ],
            principles: vec![Principle::Detailed {
                principle: "Clarity".into(),
                rationale: Some("Readers matter".into()),
            }],
            criteria: vec![Criterion::Text("Works".into())],
        };
        let out = render_component(&Component::Instruction(instruction));

        assert_eq!(
            out,
            "## Purpose\n\nDo it\n\n\
             ## Process\n\n1. First\n2. Second\n   Carefully\n\n\
             ## Constraints\n\n- Plain\n- **MUST**: Strict\n\n\
             ## Principles\n\n- Clarity\n  Readers matter\n\n\
             ## Criteria\n\n- [ ] Works"
        );
    }

    #[test]
    fn test_knowledge_sections() {
        let knowledge = Knowledge {
            explanation: "Why".into(),
            concepts: vec![Concept {
                name: "Ownership".into(),
                description: "One owner".into(),
                rationale: Some("Safety".into()),
                examples: vec!["let s = String::new();".into()],
            }],
            examples: vec![Example {
                title: "Move".into(),
                rationale: "Shows a move".into(),
                snippet: "let b = a;".into(),
                language: Some("rust".into()),
            }],
            patterns: vec![Pattern {
                name: "Newtype".into(),
                use_case: "Type safety".into(),
                description: "Wrap a type".into(),
                advantages: vec!["Cheap".into()],
                disadvantages: vec!["Boilerplate".into()],
                example: None,
            }],
        };
        let out = render_component(&Component::Knowledge(knowledge));

        assert!(out.starts_with("## Explanation\n\nWhy\n\n## Concepts\n\n### Ownership"));
        assert!(out.contains("**Rationale:** Safety"));
        assert!(out.contains("### Move\n\nShows a move\n\n```rust\nlet b = a;\n```"));
        assert!(out.contains("**Use Case:** Type safety"));
        assert!(out.contains("**Advantages:**\n- Cheap"));
        assert!(out.contains("**Disadvantages:**\n- Boilerplate"));
        let concepts = out.find("## Concepts").unwrap();
        let examples = out.find("## Examples").unwrap();
        let patterns = out.find("## Patterns").unwrap();
        assert!(concepts < examples && examples < patterns);
    }

    #[test]
    fn test_data_block() {
        let data = DataComponent {
            format: "application/json".into(),
            value: DataValue::Structured(serde_json::json!({"a": 1})),
            description: Some("Settings".into()),
        };
        let out = render_component(&Component::Data(data));
        assert_eq!(out, "Settings\n\n```json\n{\n  \"a\": 1\n}\n```");

        let data = DataComponent {
            format: "mystery".into(),
            value: DataValue::Text("raw".into()),
            description: None,
        };
        assert_eq!(render_component(&Component::Data(data)), "```\nraw\n```");
    }

    #[test]
    fn test_fence_grows_past_backticks() {
        assert_eq!(fenced("md", "```\nx\n```"), "````md\n```\nx\n```\n````");
    }

    #[test]
    fn test_document_header_footer() {
        let groups = vec![group(None, vec![resolved("foundation/logic/a", "A")])];
        let options = RenderOptions {
            header: Some("<!-- generated -->".into()),
            footer: Some("End.\n".into()),
        };
        let out = render_document(&persona(false, ""), &groups, &options);
        assert_eq!(out, "<!-- generated -->\n\n## Purpose\n\nA\n\nEnd.\n");
    }

    #[test]
    fn test_document_keeps_header_and_footer_newlines() {
        let groups = vec![group(None, vec![resolved("foundation/logic/a", "A")])];
        let options = RenderOptions {
            header: Some("---\ntitle: x\n---\n\n\n".into()),
            footer: Some("\n<!-- end -->\n\n".into()),
        };
        let out = render_document(&persona(false, ""), &groups, &options);
        assert_eq!(
            out,
            "---\ntitle: x\n---\n\n\n## Purpose\n\nA\n\n\n<!-- end -->\n\n"
        );
    }

    #[test]
    fn test_empty_groups_render_nothing() {
        let groups = vec![group(Some("Empty"), Vec::new())];
        assert_eq!(render_markdown(&persona(false, ""), &groups), "");
    }
}
