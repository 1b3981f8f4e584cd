//! Load-Anfragen, die bei eingeklapptem Viewer aufgeschoben werden.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};

use super::error::ViewerError;
use crate::parser::FileKind;
use crate::project::{LoadSources, SourceBlob, SourceFetcher};

/// Eine (ggf. aufgeschobene) Load-Anfrage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredLoad {
    /// Normale Quellen
    Sources(LoadSources),
    /// ZIP-Archiv per URL
    ZipUrl(String),
    /// ZIP-Archiv im Speicher
    ZipBlob {
        /// Archivname (für Meldungen)
        name: String,
        /// Archivinhalt
        bytes: Vec<u8>,
    },
}

impl DeferredLoad {
    /// Löst die Anfrage in ladbare Quellen auf (ZIP wird entpackt).
    pub fn into_sources(self, fetcher: &dyn SourceFetcher) -> Result<LoadSources> {
        match self {
            Self::Sources(sources) => Ok(sources),
            Self::ZipUrl(url) => {
                let bytes = fetcher
                    .fetch_bytes(&url)
                    .with_context(|| format!("ZIP-Archiv konnte nicht geladen werden: {url}"))?;
                Ok(LoadSources::from_blobs(extract_zip(&url, &bytes)?))
            }
            Self::ZipBlob { name, bytes } => Ok(LoadSources::from_blobs(extract_zip(&name, &bytes)?)),
        }
    }

    /// Kurzbeschreibung für Logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Sources(sources) => format!("{} Quellen", sources.len()),
            Self::ZipUrl(url) => format!("ZIP {url}"),
            Self::ZipBlob { name, bytes } => format!("ZIP {name} ({} Bytes)", bytes.len()),
        }
    }
}

/// Entpackt alle unterstützten Design-Dateien eines Archivs in Blobs.
///
/// Verzeichnispfade im Archiv werden verworfen; der Parser wählt anhand der
/// Endung. Nicht-UTF-8-Einträge werden übersprungen.
pub fn extract_zip(name: &str, bytes: &[u8]) -> Result<Vec<SourceBlob>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .with_context(|| format!("Ungültiges ZIP-Archiv: {name}"))?;

    let mut blobs = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Eintrag {i} in {name} nicht lesbar"))?;
        if entry.is_dir() {
            continue;
        }
        let entry_name = entry.name().to_string();
        let filename = entry_name
            .rsplit('/')
            .next()
            .unwrap_or(entry_name.as_str())
            .to_string();
        if !FileKind::from_filename(&filename).is_supported() {
            log::debug!("{name}: {entry_name} übersprungen");
            continue;
        }
        let mut content = String::with_capacity(entry.size() as usize);
        if let Err(e) = entry.read_to_string(&mut content) {
            log::warn!("{name}: {entry_name} nicht als Text lesbar: {e}");
            continue;
        }
        blobs.push(SourceBlob::new(filename, content));
    }

    if blobs.is_empty() {
        return Err(ViewerError::EmptyArchive {
            name: name.to_string(),
        }
        .into());
    }
    log::info!("{name}: {} Design-Dateien entpackt", blobs.len());
    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("Eintrag anlegen");
            writer.write_all(content.as_bytes()).expect("schreiben");
        }
        writer.finish().expect("abschließen").into_inner()
    }

    #[test]
    fn extracts_only_supported_files() {
        let bytes = archive(&[
            ("proj/board.kicad_pcb", "(kicad_pcb)"),
            ("proj/readme.txt", "hallo"),
            ("proj/main.kicad_sch", "(kicad_sch)"),
        ]);
        let blobs = extract_zip("proj.zip", &bytes).expect("entpackt");
        let names: Vec<_> = blobs.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(names, vec!["board.kicad_pcb", "main.kicad_sch"]);
    }

    #[test]
    fn archive_without_design_files_is_an_error() {
        let bytes = archive(&[("notes.md", "# x")]);
        let err = extract_zip("notes.zip", &bytes).expect_err("leer");
        assert_eq!(
            err.downcast_ref::<ViewerError>(),
            Some(&ViewerError::EmptyArchive {
                name: "notes.zip".into()
            })
        );
    }

    #[test]
    fn garbage_is_rejected_with_context() {
        let err = extract_zip("kaputt.zip", b"kein zip").expect_err("ungültig");
        assert!(err.to_string().contains("kaputt.zip"));
    }
}
