use anyhow::{Context, Result};
use log::trace;
use serde_json::Value;
use std::{fs, path::Path};

pub fn read_json(path: &Path) -> Result<Value> {
    trace!("Reading manifest at: {:?}", path);
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Looks up the declared or installed version of `name` in a package manifest
/// or lockfile.
///
/// `dependencies.<name>` may be a version string (package.json) or an object
/// with a `version` field (lockfile v1). Lockfiles v2/v3 are also checked
/// under `packages["node_modules/<name>"]`.
pub fn dependency_version(manifest: &Value, name: &str) -> Option<String> {
    if let Some(dep) = manifest.get("dependencies").and_then(|d| d.get(name)) {
        let version = match dep {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("version").and_then(|v| v.as_str()).map(str::to_string),
            _ => None,
        };
        if version.is_some() {
            return version;
        }
    }

    manifest
        .get("packages")
        .and_then(|p| p.get(format!("node_modules/{name}")))
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_package_json_string_version() {
        let manifest = json!({ "dependencies": { "dep": "^1.2.0", "other": "2.0.0" } });
        assert_eq!(dependency_version(&manifest, "dep").as_deref(), Some("^1.2.0"));
    }

    #[test]
    fn test_lockfile_v1_object_version() {
        let manifest =
            json!({ "dependencies": { "dep": { "version": "1.2.3", "resolved": "x" } } });
        assert_eq!(dependency_version(&manifest, "dep").as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_lockfile_v3_packages() {
        let manifest = json!({
            "packages": {
                "": { "dependencies": { "dep": "^1.0.0" } },
                "node_modules/dep": { "version": "1.4.0" }
            }
        });
        assert_eq!(dependency_version(&manifest, "dep").as_deref(), Some("1.4.0"));
    }

    #[test]
    fn test_scoped_package() {
        let manifest = json!({ "dependencies": { "@scope/ui": "3.0.0" } });
        assert_eq!(dependency_version(&manifest, "@scope/ui").as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_missing_dependency() {
        let manifest = json!({ "dependencies": { "other": "1.0.0" } });
        assert_eq!(dependency_version(&manifest, "dep"), None);
        assert_eq!(dependency_version(&json!({}), "dep"), None);
    }

    #[test]
    fn test_read_json_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("package.json");
        assert!(read_json(&missing).is_err());

        fs::write(&missing, "{ not json").unwrap();
        assert!(read_json(&missing).is_err());

        fs::write(&missing, r#"{ "dependencies": {} }"#).unwrap();
        assert!(read_json(&missing).unwrap().get("dependencies").is_some());
    }
}
