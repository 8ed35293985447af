use anyhow::{Result, bail};
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_semantic::{Scoping, SemanticBuilder, SemanticBuilderReturn};
use oxc_span::SourceType;
use std::path::Path;

/// A parsed file together with its symbol table.
///
/// `scoping` resolves every identifier reference in `program` to the symbol
/// it denotes, which is what usage matching keys on.
pub struct ParsedSource<'a> {
    pub program: Program<'a>,
    pub scoping: Scoping,
}

/// Parses `src` and runs semantic analysis over it.
///
/// Any parser diagnostic fails the file: a recovered tree may contain bogus
/// nodes that would be counted as usages.
pub fn parse_source<'a>(
    allocator: &'a Allocator,
    path: &Path,
    src: &'a str,
) -> Result<ParsedSource<'a>> {
    trace!("Parsing {}", path.display());
    let st = source_type_for(path);
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(allocator, src, st).parse();

    if panicked || !errors.is_empty() {
        let detail = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
        bail!("Failed to parse {}: {}", path.display(), detail);
    }

    let SemanticBuilderReturn { semantic, errors } = SemanticBuilder::new().build(&program);
    if !errors.is_empty() {
        debug!("{} semantic diagnostics in {}", errors.len(), path.display());
    }
    let scoping = semantic.into_scoping();

    Ok(ParsedSource { program, scoping })
}

pub fn source_type_for(path: &Path) -> SourceType {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str());

    SourceType::default()
        .with_module(true)
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
        .with_typescript_definition(name.ends_with(".d.ts"))
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx")))
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            src.bytes().enumerate().filter(|(_, b)| *b == b'\n').map(|(i, _)| i as u32 + 1),
        );
        Self { line_starts }
    }

    pub fn line_of(&self, offset: u32) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(name: &str, src: &str) -> usize {
        let allocator = Allocator::default();
        let parsed = parse_source(&allocator, Path::new(name), src).unwrap();
        parsed.program.body.len()
    }

    #[test]
    fn test_parses_typescript() {
        assert_eq!(parse_ok("a.ts", "import { a } from 'dep';\nconst x: number = a();"), 2);
    }

    #[test]
    fn test_parses_tsx() {
        assert_eq!(parse_ok("a.tsx", "import B from 'dep';\nexport const v = <B.Item />;"), 2);
    }

    #[test]
    fn test_parses_declaration_file() {
        let src = "import { T } from 'dep';\nexport declare const t: T;";
        assert_eq!(parse_ok("types.d.ts", src), 2);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let allocator = Allocator::default();
        let err = parse_source(&allocator, Path::new("bad.ts"), "const = ;").err().unwrap();
        assert!(err.to_string().contains("bad.ts"));
    }

    #[test]
    fn test_source_type_for_extensions() {
        assert!(source_type_for(Path::new("a.ts")).is_typescript());
        assert!(source_type_for(Path::new("a.tsx")).is_jsx());
        assert!(!source_type_for(Path::new("a.ts")).is_jsx());
        assert!(source_type_for(Path::new("a.d.ts")).is_typescript_definition());
        assert!(source_type_for(Path::new("a.ts")).is_module());
    }

    #[test]
    fn test_line_index() {
        let idx = LineIndex::new("a\nbc\n\nd");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(1), 1);
        assert_eq!(idx.line_of(2), 2);
        assert_eq!(idx.line_of(5), 3);
        assert_eq!(idx.line_of(6), 4);
    }
}
