//! Projekt-Einstellungen aus der `.kicad_pro`-Datei.

use indexmap::IndexMap;

/// Relevante Teile der Projekt-Einstellungen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectSettings {
    /// Dateiname der Settings-Datei
    pub filename: String,
    /// Projektname (`meta.filename` bzw. Dateiname ohne Endung)
    pub name: String,
    /// Textvariablen (`${VAR}`-Ersetzungen)
    pub text_variables: IndexMap<String, String>,
    /// Namen der Netzklassen
    pub net_classes: Vec<String>,
}

impl ProjectSettings {
    /// Ersetzt `${VAR}` im Text durch die Projektvariablen; unbekannte bleiben stehen.
    pub fn expand_text_variables(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match self.text_variables.get(key) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Entfernt die Dateiendung (`board.kicad_pcb` → `board`).
pub fn file_stem(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_variables_are_expanded() {
        let mut settings = ProjectSettings::default();
        settings
            .text_variables
            .insert("REV".to_string(), "B".to_string());
        assert_eq!(settings.expand_text_variables("Rev ${REV}"), "Rev B");
        assert_eq!(settings.expand_text_variables("${UNKNOWN}!"), "${UNKNOWN}!");
        assert_eq!(settings.expand_text_variables("offen ${REV"), "offen ${REV");
    }

    #[test]
    fn file_stem_strips_suffix_and_directories() {
        assert_eq!(file_stem("demo.kicad_pro"), "demo");
        assert_eq!(file_stem("dir/sub/board.kicad_pcb"), "board");
        assert_eq!(file_stem("noext"), "noext");
    }
}
