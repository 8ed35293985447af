use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use oxc_allocator::Allocator;
use rayon::prelude::*;
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path,
};

use oxiscan_core::{
    LineIndex, SourceFile, collect_source_files, dependency_version, parse_source, read_json,
};

use crate::{
    catalog::build_import_catalog,
    config::{AnalysisConfig, ScanSource, ScoreMode},
    dispatcher::PluginDispatcher,
    plugin::{AnalysisPlugin, FileContext},
    resolver::resolve_usages,
    score::ScorePlugin,
    types::{
        AnalysisReport, DiagnosisInfo, FileRef, ImportIndex, PluginTable, ScoreRecord,
        VersionRecord,
    },
};

/// Runs a full multi-project scan for one target dependency.
pub struct Analyzer {
    config: AnalysisConfig,
    plugins: Vec<Box<dyn AnalysisPlugin>>,
    score_plugin: Option<ScorePlugin>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config, plugins: Vec::new(), score_plugin: None }
    }

    /// Registers a custom plugin. Custom plugins are consulted before the
    /// built-in ones, in the order they were added.
    pub fn with_plugin<P: AnalysisPlugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Replaces the configured scorer with `score`.
    pub fn with_score_fn<F>(mut self, score: F) -> Self
    where
        F: Fn(&AnalysisReport) -> ScoreRecord + 'static,
    {
        self.score_plugin = Some(ScorePlugin::Custom(Box::new(score)));
        self
    }

    pub fn run(self) -> Result<AnalysisReport> {
        info!("Starting API usage analysis");
        let Analyzer { mut config, plugins, score_plugin } = self;

        config.initialize()?;
        let dispatcher = PluginDispatcher::new(plugins)?;
        let base = config.base_dir()?.clone();
        info!("Analysis target: '{}'", config.analysis_target);

        let projects = enumerate_projects(&base, &config.scan_source)?;
        let mut scan = Scan::new(&config.analysis_target, dispatcher);
        for (source, files) in config.scan_source.iter().zip(&projects) {
            info!("Analyzing project '{}' ({} files)", source.name, files.len());
            for (idx, file) in files.iter().enumerate() {
                scan.analyze_file(&source.name, file);
                debug!("{} progress: {}/{}", source.name, idx + 1, files.len());
            }
        }

        let Scan {
            dispatcher,
            import_index,
            parse_error_infos,
            diagnosis_infos,
            files_analyzed,
            files_with_target,
            ..
        } = scan;

        let mut tables = dispatcher.into_tables();
        let tagged = tag_black_list(&mut tables, &config.black_list);
        debug!("Tagged {} black-listed APIs", tagged);

        let version_map = collect_versions(&base, &config.scan_source, &config.analysis_target);

        let mut report = AnalysisReport {
            analysis_target: config.analysis_target.clone(),
            tables,
            import_item_map: import_index,
            version_map,
            score_map: None,
            parse_error_infos,
            diagnosis_infos,
            files_analyzed,
            files_with_target,
        };

        let score_plugin = score_plugin.unwrap_or(match config.score_plugin {
            ScoreMode::Disabled => ScorePlugin::Disabled,
            ScoreMode::Default => ScorePlugin::Default,
        });
        report.score_map = score_plugin.score(&report);

        info!(
            "Analysis complete: {} files, {} importing '{}', {} failed",
            report.files_analyzed,
            report.files_with_target,
            report.analysis_target,
            report.diagnosis_infos.len()
        );
        Ok(report)
    }
}

/// Lists every project's files. Projects are walked in parallel; the result
/// keeps configuration order.
fn enumerate_projects(base: &Path, sources: &[ScanSource]) -> Result<Vec<Vec<SourceFile>>> {
    sources
        .par_iter()
        .map(|source| -> Result<Vec<SourceFile>> {
            let mut files = Vec::new();
            for path in &source.path {
                files.extend(collect_source_files(base, path)?);
            }
            trace!("Project '{}' has {} source files", source.name, files.len());
            Ok(files)
        })
        .collect()
}

/// Per-run accumulated state, mutated one file at a time.
pub(crate) struct Scan {
    analysis_target: String,
    dispatcher: PluginDispatcher,
    import_index: ImportIndex,
    parse_error_infos: Vec<DiagnosisInfo>,
    diagnosis_infos: Vec<DiagnosisInfo>,
    files_analyzed: usize,
    files_with_target: usize,
}

impl Scan {
    pub(crate) fn new(analysis_target: &str, dispatcher: PluginDispatcher) -> Self {
        Self {
            analysis_target: analysis_target.to_string(),
            dispatcher,
            import_index: ImportIndex::new(),
            parse_error_infos: Vec::new(),
            diagnosis_infos: Vec::new(),
            files_analyzed: 0,
            files_with_target: 0,
        }
    }

    /// Analyzes one file. Failures are recorded and never propagate.
    pub(crate) fn analyze_file(&mut self, project: &str, file: &SourceFile) {
        self.files_analyzed += 1;
        if let Err(e) = self.read_and_analyze(project, file) {
            warn!("Failed to analyze {}&{}: {:#}", project, file.display, e);
            let info = DiagnosisInfo {
                project_name: project.to_string(),
                file: file.display.clone(),
                detail: format!("{e:#}"),
            };
            self.parse_error_infos.push(info.clone());
            self.add_diagnosis_info(info);
        }
    }

    pub(crate) fn add_diagnosis_info(&mut self, info: DiagnosisInfo) {
        self.diagnosis_infos.push(info);
    }

    fn read_and_analyze(&mut self, project: &str, file: &SourceFile) -> Result<Option<usize>> {
        let src = fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read {}", file.path.display()))?;
        self.analyze_source(project, &file.display, &file.path, &src)
    }

    /// Returns the number of usages found, or `None` when the file doesn't
    /// import the target.
    pub(crate) fn analyze_source(
        &mut self,
        project: &str,
        display: &str,
        path: &Path,
        src: &str,
    ) -> Result<Option<usize>> {
        let allocator = Allocator::default();
        let parsed = parse_source(&allocator, path, src)?;
        let lines = LineIndex::new(src);
        let file = FileRef { project: project.to_string(), path: display.to_string() };

        let catalog = build_import_catalog(
            &parsed.program,
            &self.analysis_target,
            &file,
            &lines,
            &mut self.import_index,
        );
        if catalog.is_empty() {
            trace!("{} does not import '{}'", file, self.analysis_target);
            return Ok(None);
        }
        self.files_with_target += 1;

        let found = resolve_usages(
            &parsed.program,
            &parsed.scoping,
            &catalog,
            &lines,
            &self.analysis_target,
            &file,
            &mut self.dispatcher,
        );
        self.dispatcher.run_after_hooks(&FileContext {
            catalog: &catalog,
            program: &parsed.program,
            scoping: &parsed.scoping,
            source: src,
            file: &file,
        });
        Ok(Some(found))
    }
}

/// Flags every API named in `black_list`, in every table. Returns how many
/// entries are flagged; running it again changes nothing.
pub fn tag_black_list(tables: &mut [PluginTable], black_list: &[String]) -> usize {
    if black_list.is_empty() {
        return 0;
    }
    let black: HashSet<&str> = black_list.iter().map(String::as_str).collect();
    let mut tagged = 0;
    for table in tables.iter_mut() {
        for (api_name, stat) in table.apis.iter_mut() {
            if black.contains(api_name.as_str()) {
                stat.is_black = true;
                tagged += 1;
            }
        }
    }
    tagged
}

/// Tallies the installed target version of every project that names a
/// package file. Unreadable manifests are skipped.
pub fn collect_versions(
    base: &Path,
    sources: &[ScanSource],
    analysis_target: &str,
) -> BTreeMap<String, VersionRecord> {
    let mut versions: BTreeMap<String, VersionRecord> = BTreeMap::new();
    for source in sources {
        let Some(package_file) = source.package_file.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let manifest = match read_json(&base.join(package_file)) {
            Ok(m) => m,
            Err(e) => {
                debug!("Skipping package file of '{}': {:#}", source.name, e);
                continue;
            }
        };
        let Some(version) = dependency_version(&manifest, analysis_target) else {
            debug!("'{}' does not depend on '{}'", source.name, analysis_target);
            continue;
        };
        let record = versions.entry(version).or_default();
        record.call_num += 1;
        record.call_source.push(source.name.clone());
    }
    versions
}
