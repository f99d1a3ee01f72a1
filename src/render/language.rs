//! Fence language tags for data formats and media types.

/// Format names and media types mapped to fence tags.
const LANGUAGES: &[(&str, &str)] = &[
    ("json", "json"),
    ("application/json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("application/yaml", "yaml"),
    ("application/x-yaml", "yaml"),
    ("text/yaml", "yaml"),
    ("xml", "xml"),
    ("application/xml", "xml"),
    ("text/xml", "xml"),
    ("html", "html"),
    ("text/html", "html"),
    ("css", "css"),
    ("text/css", "css"),
    ("javascript", "javascript"),
    ("js", "javascript"),
    ("application/javascript", "javascript"),
    ("text/javascript", "javascript"),
    ("typescript", "typescript"),
    ("ts", "typescript"),
    ("application/typescript", "typescript"),
    ("python", "python"),
    ("py", "python"),
    ("text/x-python", "python"),
    ("rust", "rust"),
    ("rs", "rust"),
    ("go", "go"),
    ("java", "java"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("c++", "cpp"),
    ("csharp", "csharp"),
    ("c#", "csharp"),
    ("ruby", "ruby"),
    ("rb", "ruby"),
    ("php", "php"),
    ("shell", "bash"),
    ("bash", "bash"),
    ("sh", "bash"),
    ("application/x-sh", "bash"),
    ("sql", "sql"),
    ("application/sql", "sql"),
    ("markdown", "markdown"),
    ("md", "markdown"),
    ("text/markdown", "markdown"),
    ("toml", "toml"),
    ("application/toml", "toml"),
    ("csv", "csv"),
    ("text/csv", "csv"),
    ("graphql", "graphql"),
    ("application/graphql", "graphql"),
    ("dockerfile", "dockerfile"),
];

/// Fence tag for a format name or media type; empty when unknown.
///
/// Case-insensitive. Media type parameters (`; charset=utf-8`) are ignored and
/// structured-syntax suffixes such as `application/ld+json` map to their base.
pub fn infer_language(format: &str) -> &'static str {
    let normalized = format
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some((_, tag)) = LANGUAGES.iter().find(|(key, _)| *key == normalized) {
        return tag;
    }

    match normalized.rsplit_once('+') {
        Some((_, "json")) => "json",
        Some((_, "xml")) => "xml",
        Some((_, "yaml")) => "yaml",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_formats() {
        assert_eq!(infer_language("json"), "json");
        assert_eq!(infer_language("YAML"), "yaml");
        assert_eq!(infer_language("yml"), "yaml");
        assert_eq!(infer_language("text/html"), "html");
        assert_eq!(infer_language("TypeScript"), "typescript");
    }

    #[test]
    fn test_media_type_parameters_and_suffixes() {
        assert_eq!(infer_language("application/json; charset=utf-8"), "json");
        assert_eq!(infer_language("application/ld+json"), "json");
        assert_eq!(infer_language("image/svg+xml"), "xml");
    }

    #[test]
    fn test_unknown_is_empty() {
        assert_eq!(infer_language(""), "");
        assert_eq!(infer_language("application/octet-stream"), "");
        assert_eq!(infer_language("klingon"), "");
    }
}
