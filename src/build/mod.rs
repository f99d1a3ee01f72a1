//! Build pipeline: resolve a persona against the registry and report on it.

mod engine;
mod report;

pub use engine::{
    BuildEngine, BuildOptions, BuildOutput, DeprecationWarning, ResolvedGroup, ResolvedModule,
    ToolMeta,
};
pub use report::{
    generate_build_report, BuildReport, ReportConfiguration, ReportGroup, ReportModule,
};
