use anyhow::Result;
use log::{debug, trace};
use std::collections::HashSet;

use crate::{
    config::ConfigError,
    plugin::{AnalysisPlugin, DefaultPlugin, FileContext, MethodPlugin, TypePlugin, Usage},
    types::{ApiTable, PluginTable},
};

/// Routes occurrences through an ordered plugin list, first claim wins.
pub struct PluginDispatcher {
    plugins: Vec<Box<dyn AnalysisPlugin>>,
}

impl PluginDispatcher {
    /// Custom plugins go first, in the given order, followed by the built-in
    /// method, type and default classifiers.
    pub fn new(custom: Vec<Box<dyn AnalysisPlugin>>) -> Result<Self> {
        let mut plugins = custom;
        plugins.push(Box::new(MethodPlugin::default()));
        plugins.push(Box::new(TypePlugin::default()));
        plugins.push(Box::new(DefaultPlugin::default()));

        let mut seen = HashSet::new();
        for plugin in &plugins {
            if !seen.insert(plugin.table_name().to_string()) {
                return Err(ConfigError::DuplicateTable(plugin.table_name().to_string()).into());
            }
        }

        debug!(
            "Registered plugins: {}",
            plugins.iter().map(|p| p.table_name()).collect::<Vec<_>>().join(", ")
        );
        Ok(Self { plugins })
    }

    /// Returns the table name of the plugin that claimed the usage.
    pub fn dispatch(&mut self, usage: &Usage<'_, '_>) -> Option<&str> {
        for plugin in &mut self.plugins {
            if plugin.claim(usage) {
                trace!("'{}' claimed by {}", usage.occurrence.api_name, plugin.table_name());
                return Some(plugin.table_name());
            }
        }
        None
    }

    pub fn run_after_hooks(&mut self, file: &FileContext<'_, '_>) {
        for plugin in &mut self.plugins {
            plugin.on_file_end(file);
        }
    }

    pub fn table(&self, name: &str) -> Option<&ApiTable> {
        self.plugins.iter().find(|p| p.table_name() == name).map(|p| p.table())
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.table_name()).collect()
    }

    /// Takes every plugin's table, in registration order.
    pub fn into_tables(self) -> Vec<PluginTable> {
        self.plugins
            .into_iter()
            .map(|mut p| PluginTable {
                name: p.table_name().to_string(),
                apis: std::mem::take(p.table_mut()),
            })
            .collect()
    }
}
