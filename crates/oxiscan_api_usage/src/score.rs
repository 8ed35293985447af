use log::debug;

use crate::{
    constants::{BASE_SCORE, BLACK_API_PENALTY, MULTI_VERSION_PENALTY, PARSE_ERROR_PENALTY},
    types::{AnalysisReport, ScoreRecord},
};

/// A caller-supplied scorer, run over the final report.
pub type ScoreFn = dyn Fn(&AnalysisReport) -> ScoreRecord;

pub enum ScorePlugin {
    Disabled,
    Default,
    Custom(Box<ScoreFn>),
}

impl ScorePlugin {
    pub fn score(&self, report: &AnalysisReport) -> Option<ScoreRecord> {
        match self {
            ScorePlugin::Disabled => None,
            ScorePlugin::Default => Some(default_score(report)),
            ScorePlugin::Custom(f) => Some(f(report)),
        }
    }
}

/// Starts at 100 and deducts for black-listed APIs in use, more than one
/// installed version of the target, and files that failed to parse.
pub fn default_score(report: &AnalysisReport) -> ScoreRecord {
    let mut score = BASE_SCORE;
    let mut messages = Vec::new();

    for table in &report.tables {
        for (api_name, stat) in table.apis.iter().filter(|(_, s)| s.is_black) {
            score -= BLACK_API_PENALTY;
            messages.push(format!(
                "{} is black-listed but called {} times ({})",
                api_name, stat.call_num, table.name
            ));
        }
    }

    if report.version_map.len() > 1 {
        score -= MULTI_VERSION_PENALTY;
        let versions: Vec<&str> = report.version_map.keys().map(String::as_str).collect();
        messages.push(format!(
            "{} is installed in {} versions: {}",
            report.analysis_target,
            versions.len(),
            versions.join(", ")
        ));
    }

    if !report.parse_error_infos.is_empty() {
        score -= PARSE_ERROR_PENALTY * report.parse_error_infos.len() as i64;
        messages.push(format!("{} files could not be parsed", report.parse_error_infos.len()));
    }

    let score = score.max(0) as u32;
    debug!("Default score: {} ({} deductions)", score, messages.len());
    ScoreRecord { score, messages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApiStat, DiagnosisInfo, PluginTable, VersionRecord};

    fn black_table(names: &[&str]) -> PluginTable {
        let apis = names
            .iter()
            .map(|n| (n.to_string(), ApiStat { call_num: 2, is_black: true, ..Default::default() }))
            .collect();
        PluginTable { name: "methodMap".to_string(), apis }
    }

    fn diagnosis(file: &str) -> DiagnosisInfo {
        DiagnosisInfo { project_name: "app".into(), file: file.into(), detail: "bad".into() }
    }

    #[test]
    fn test_clean_report_scores_full() {
        let record = default_score(&AnalysisReport::default());
        assert_eq!(record.score, 100);
        assert!(record.messages.is_empty());
    }

    #[test]
    fn test_deductions() {
        let mut report = AnalysisReport { analysis_target: "dep".into(), ..Default::default() };
        report.tables.push(black_table(&["dep.old", "dep.older"]));
        report.version_map.insert("1.0.0".into(), VersionRecord::default());
        report.version_map.insert("2.0.0".into(), VersionRecord::default());
        report.parse_error_infos = vec![diagnosis("a.ts"), diagnosis("b.ts"), diagnosis("c.ts")];

        let record = default_score(&report);
        assert_eq!(record.score, 100 - 10 - 5 - 3);
        assert_eq!(record.messages.len(), 4);
        assert!(record.messages[0].contains("dep.old"));
    }

    #[test]
    fn test_score_floors_at_zero() {
        let mut report = AnalysisReport::default();
        let names: Vec<String> = (0..30).map(|i| format!("dep.api{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        report.tables.push(black_table(&refs));
        assert_eq!(default_score(&report).score, 0);
    }

    #[test]
    fn test_score_plugin_modes() {
        let report = AnalysisReport::default();
        assert!(ScorePlugin::Disabled.score(&report).is_none());
        assert_eq!(ScorePlugin::Default.score(&report).unwrap().score, 100);

        let custom = ScorePlugin::Custom(Box::new(|r: &AnalysisReport| ScoreRecord {
            score: r.files_analyzed as u32,
            messages: vec!["custom".into()],
        }));
        let report = AnalysisReport { files_analyzed: 7, ..Default::default() };
        assert_eq!(custom.score(&report).unwrap().score, 7);
    }
}
