//! ETS2 Map Geometry: Headless-Runner.
//!
//! Lädt Optionen (TOML), einen Welt-Schnappschuss (JSON) und die Spieldateien
//! (Verzeichnis oder ZIP) und führt pro Referenzpunkt einen Tick aus.
//!
//! ```text
//! ets2-map-geometry <spieldaten> <welt.json> <x,z | x,y,z>... [--options <datei.toml>] [--json <ausgabe.json>]
//!
//! Negative Koordinaten: `ets2-map-geometry data world.json -- -10,-20`
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use ets2_map_geometry::{
    DirectoryFileSystem, FileSystem, GeometryOptions, ReconstructionDriver, WorldContext, WorldMap,
    ZipFileSystem,
};
use glam::Vec3;

fn main() -> Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("ETS2 Map Geometry v{} startet...", env!("CARGO_PKG_VERSION"));

    let args = RunnerArgs::parse();
    Runner::run(&args)
}

/// Kommandozeilen-Argumente des Runners.
#[derive(Debug, Parser)]
#[command(
    name = "ets2-map-geometry",
    about = "Rekonstruiert Fahrspuren und Prefab-Kurven um Referenzpunkte",
    version
)]
struct RunnerArgs {
    /// Spieldaten: entpacktes Verzeichnis oder ZIP-Archiv
    game_root: PathBuf,

    /// Welt-Schnappschuss (JSON)
    world: PathBuf,

    /// Referenzpunkte als `x,z` oder `x,y,z`
    #[arg(required = true, value_parser = parse_reference)]
    references: Vec<Vec3>,

    /// Optionen-Datei (TOML); Standard: neben der Binary
    #[arg(long)]
    options: Option<PathBuf>,

    /// Ausgabe des letzten Ticks als JSON
    #[arg(long = "json")]
    json_out: Option<PathBuf>,
}

/// `x,z` oder `x,y,z`.
fn parse_reference(raw: &str) -> Result<Vec3> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Ungültiger Referenzpunkt: {}", raw))?;
    match parts.as_slice() {
        [x, z] => Ok(Vec3::new(*x, 0.0, *z)),
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("Referenzpunkt braucht 2 oder 3 Komponenten: {}", raw),
    }
}

fn open_game_files(root: &Path) -> Result<Arc<dyn FileSystem>> {
    if root.is_dir() {
        Ok(Arc::new(DirectoryFileSystem::new(root)))
    } else {
        let archive = ZipFileSystem::open(root)?;
        log::info!("Archiv geladen: {} ({} Dateien)", root.display(), archive.len());
        Ok(Arc::new(archive))
    }
}

struct Runner;

impl Runner {
    fn run(args: &RunnerArgs) -> Result<()> {
        let options_path = args.options.clone().unwrap_or_else(GeometryOptions::config_path);
        let options = GeometryOptions::load_from_file(&options_path);

        let fs = open_game_files(&args.game_root)?;
        let world = WorldMap::load_snapshot_json(&args.world)?;
        let ctx = WorldContext::new(fs, world, options)?;
        let mut driver = ReconstructionDriver::new();

        for reference in &args.references {
            let output = driver.tick(&ctx, *reference);
            let stats = output.statistics;
            log::info!(
                "Referenz ({:.1}, {:.1}, {:.1}): {} Nodes, {} Straßen, {} Prefabs, {} Punkte",
                reference.x,
                reference.y,
                reference.z,
                stats.nodes,
                stats.roads,
                stats.prefabs,
                stats.points
            );
        }

        if let Some(path) = &args.json_out {
            let json = serde_json::to_string_pretty(driver.last_output())?;
            std::fs::write(path, json)
                .with_context(|| format!("Ausgabe nicht schreibbar: {}", path.display()))?;
            log::info!("Letzte Tick-Ausgabe gespeichert nach: {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        RunnerArgs::command().debug_assert();
    }

    #[test]
    fn positionals_and_flags_are_parsed() {
        let args = RunnerArgs::try_parse_from([
            "ets2-map-geometry",
            "game",
            "world.json",
            "10,20",
            "1,2,3",
            "--json",
            "out.json",
        ])
        .expect("Argumente erwartet");

        assert_eq!(args.game_root, PathBuf::from("game"));
        assert_eq!(args.world, PathBuf::from("world.json"));
        assert_eq!(args.references, vec![Vec3::new(10.0, 0.0, 20.0), Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(args.json_out, Some(PathBuf::from("out.json")));
        assert!(args.options.is_none());
    }

    #[test]
    fn references_are_required_and_validated() {
        assert!(RunnerArgs::try_parse_from(["ets2-map-geometry", "game", "world.json"]).is_err());
        assert!(
            RunnerArgs::try_parse_from(["ets2-map-geometry", "game", "world.json", "1,2,3,4"])
                .is_err()
        );
        assert!(parse_reference("a,b").is_err());
        assert_eq!(parse_reference(" -5 , 7 ").expect("Punkt erwartet"), Vec3::new(-5.0, 0.0, 7.0));
    }
}
