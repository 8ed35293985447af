use oxc_span::Span;
use oxc_syntax::symbol::SymbolId;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// A local name introduced by an import of the target dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local_name: String,
    /// Exported name for aliased imports, `*` for namespace imports
    pub origin: Option<String>,
    /// Symbol declared by the import; references resolving to it are usages
    pub symbol_id: SymbolId,
    pub declaration_span: Span,
    pub identifier_span: Span,
    pub line: usize,
}

impl ImportBinding {
    pub fn is_namespace(&self) -> bool {
        self.origin.as_deref() == Some("*")
    }
}

/// Per-file mapping of local name to binding.
pub type ImportCatalog = BTreeMap<String, ImportBinding>;

/// A file within a logical project, as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub project: String,
    pub path: String,
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}&{}", self.project, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportIndexEntry {
    pub call_origin: Option<String>,
    pub call_files: Vec<FileRef>,
}

/// Cross-file index of imported local names, kept for the whole run.
pub type ImportIndex = BTreeMap<String, ImportIndexEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallFile {
    pub project: String,
    pub path: String,
    pub lines: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStat {
    pub call_num: usize,
    pub call_origin: Option<String>,
    pub call_files: Vec<CallFile>,
    pub is_black: bool,
}

impl ApiStat {
    /// Counts one call. Consecutive calls from the same file share an entry,
    /// so `call_files` stays in scan order.
    pub fn record(&mut self, project: &str, path: &str, line: usize) {
        self.call_num += 1;
        match self.call_files.last_mut() {
            Some(last) if last.project == project && last.path == path => last.lines.push(line),
            _ => self.call_files.push(CallFile {
                project: project.to_string(),
                path: path.to_string(),
                lines: vec![line],
            }),
        }
    }
}

pub type ApiTable = BTreeMap<String, ApiStat>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginTable {
    pub name: String,
    pub apis: ApiTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisInfo {
    pub project_name: String,
    pub file: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub call_num: usize,
    pub call_source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    pub score: u32,
    pub messages: Vec<String>,
}

/// Everything a run accumulates.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub analysis_target: String,
    /// One table per plugin, in registration order
    pub tables: Vec<PluginTable>,
    pub import_item_map: ImportIndex,
    pub version_map: BTreeMap<String, VersionRecord>,
    pub score_map: Option<ScoreRecord>,
    pub parse_error_infos: Vec<DiagnosisInfo>,
    pub diagnosis_infos: Vec<DiagnosisInfo>,
    pub files_analyzed: usize,
    pub files_with_target: usize,
}

impl AnalysisReport {
    pub fn table(&self, name: &str) -> Option<&ApiTable> {
        self.tables.iter().find(|t| t.name == name).map(|t| &t.apis)
    }
}
