//! Pure rendering of resolved personas to Markdown.

mod language;
mod markdown;

pub use language::infer_language;
pub use markdown::{
    render_component, render_document, render_markdown, render_module, RenderOptions,
    DIRECTIVE_ORDER, SEPARATOR,
};
