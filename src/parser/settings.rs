//! Parser für KiCad-Projektdateien (`.kicad_pro`, JSON).

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{file_stem, ProjectSettings};

#[derive(Debug, Default, Deserialize)]
struct RawProject {
    #[serde(default)]
    meta: RawMeta,
    #[serde(default)]
    text_variables: indexmap::IndexMap<String, String>,
    #[serde(default)]
    net_settings: RawNetSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNetSettings {
    #[serde(default)]
    classes: Vec<RawNetClass>,
}

#[derive(Debug, Deserialize)]
struct RawNetClass {
    name: String,
}

/// Parsed die Projekt-Einstellungen. Unbekannte Felder werden ignoriert.
pub fn parse_project_settings(filename: &str, text: &str) -> Result<ProjectSettings> {
    let raw: RawProject = serde_json::from_str(text)
        .with_context(|| format!("Projektdatei {filename} ist kein gültiges JSON"))?;

    let name = raw
        .meta
        .filename
        .as_deref()
        .map(file_stem)
        .unwrap_or_else(|| file_stem(filename))
        .to_string();

    Ok(ProjectSettings {
        filename: filename.to_string(),
        name,
        text_variables: raw.text_variables,
        net_classes: raw.net_settings.classes.into_iter().map(|c| c.name).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_meta_variables_and_net_classes() {
        let json = r#"{
            "meta": { "filename": "demo.kicad_pro", "version": 1 },
            "text_variables": { "REV": "C" },
            "net_settings": { "classes": [ { "name": "Default" }, { "name": "Power" } ] },
            "board": { "ignored": true }
        }"#;
        let settings = parse_project_settings("demo.kicad_pro", json).expect("gültige Projektdatei");
        assert_eq!(settings.name, "demo");
        assert_eq!(settings.text_variables.get("REV").map(String::as_str), Some("C"));
        assert_eq!(settings.net_classes, vec!["Default", "Power"]);
    }

    #[test]
    fn empty_object_uses_filename() {
        let settings = parse_project_settings("x/other.kicad_pro", "{}").expect("leeres Objekt ok");
        assert_eq!(settings.name, "other");
        assert!(parse_project_settings("bad.kicad_pro", "{").is_err());
    }
}
