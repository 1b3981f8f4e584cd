//! ECAD-Viewer Kommandozeile.
//!
//! Lädt KiCad-Dateien, zeichnet einen Frame, spielt optional einen
//! gespeicherten View-State ein und gibt eine Zusammenfassung aus.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ecad_viewer::{DeferredLoad, LoadSources, SourceBlob, ViewState, Viewer, ViewerOptions};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// Gespeicherter View-State (JSON), der nach dem Load eingespielt wird
    #[arg(long, value_name = "PATH")]
    state: Option<PathBuf>,

    /// KiCad-Dateien (.kicad_pcb, .kicad_sch, .kicad_pro) oder ein einzelnes .zip
    #[arg(value_name = "DATEIEN", required = true)]
    files: Vec<PathBuf>,
}

fn read_blobs(files: &[PathBuf]) -> Result<Vec<SourceBlob>> {
    files
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Datei konnte nicht gelesen werden: {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(SourceBlob::new(filename, content))
        })
        .collect()
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    let options = ViewerOptions::load_from_file(&ViewerOptions::config_path());
    let mut viewer = Viewer::with_options(options);

    let request = match args.files.as_slice() {
        [single] if single.extension().is_some_and(|e| e.eq_ignore_ascii_case("zip")) => {
            DeferredLoad::ZipUrl(single.display().to_string())
        }
        files => DeferredLoad::Sources(LoadSources::from_blobs(read_blobs(files)?)),
    };
    let outcome = viewer.request_load(request)?;
    log::info!("Load: {outcome:?}");

    if let Some(path) = &args.state {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("View-State nicht lesbar: {}", path.display()))?;
        viewer.restore_view_state(&ViewState::from_json(&json)?)?;
    }
    viewer.tick();
    let stats = viewer.draw();

    for event in viewer.drain_events() {
        log::debug!("{event:?}");
    }

    let project = viewer.project();
    println!(
        "Projekt: {}",
        project.display_name().unwrap_or("(ohne Namen)")
    );
    println!("Boards: {}", project.boards().len());
    println!("Schaltpläne: {}", project.schematics().len());
    println!("Seiten: {}", project.pages().count());
    println!("BOM-Zeilen: {}", project.bom_items().len());
    if let Some(view) = viewer.board_view() {
        println!("Layer: {}", view.renderer.layers().len());
    }
    if let Some(stats) = stats {
        println!(
            "Labels: {} Tracks, {} Vias, {} Fehler",
            stats.track_labels, stats.via_labels, stats.failures
        );
    }
    println!("{}", viewer.get_view_state().to_json()?);
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("ECAD-Viewer v{} startet...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_state_and_files() {
        let args = CliArgs::try_parse_from([
            "ecad-viewer",
            "--state",
            "view.json",
            "demo.kicad_pcb",
            "demo.kicad_sch",
        ])
        .expect("gültige Argumente");
        assert_eq!(args.state, Some(PathBuf::from("view.json")));
        assert_eq!(
            args.files,
            vec![PathBuf::from("demo.kicad_pcb"), PathBuf::from("demo.kicad_sch")]
        );
    }

    #[test]
    fn files_are_required() {
        let err = CliArgs::try_parse_from(["ecad-viewer", "--state", "view.json"])
            .expect_err("ohne Dateien");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
