mod error;
mod logging;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use repertory_config::Settings;
use repertory_naming::{Conversion, HashSource, convert, sanitize_bounded};
use repertory_storage::{Relocation, RelocationEngine, StorageTopology};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "repertory", version)]
#[command(about = "Archive folder naming and file relocation")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// Log level; `RUST_LOG` directives apply on top of it
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show what a name becomes once sanitized and converted
    Name {
        text: String,
        /// Conversion to apply (defaults to the file conversion setting)
        #[arg(long)]
        conversion: Option<String>,
        /// Record id the hash conversion is computed from
        #[arg(long, default_value_t = 0)]
        id: u64,
    },
    /// Move a stored file, and its derivatives, inside the files directory
    Relocate {
        /// Current path, relative to the original root
        from: String,
        /// New path, relative to the original root
        to: String,
        /// Extension of the derivatives to move with it (usually `jpg`)
        #[arg(long)]
        derivative_ext: Option<String>,
    },
    /// Remove a folder, and its emptied parents, from every rendition root
    Prune { folder: String },
    /// List the rendition roots
    Roots,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Name { text, conversion, id } => {
            let conversion = match conversion {
                Some(raw) => raw.parse::<Conversion>().or_raise(|| ErrorKind::Argument(raw.clone()))?,
                None => settings.file.conversion,
            };
            println!("{}", preview(&text, conversion, id, settings.storage.sanitize_max_length));
        },
        Command::Relocate { from, to, derivative_ext } => {
            let topology = topology(&settings)?;
            let engine = RelocationEngine::new(&topology).with_max_name_length(settings.storage.max_name_length);
            match engine.relocate(&from, &to, derivative_ext.as_deref()).or_raise(|| ErrorKind::Storage)? {
                Relocation::Unchanged => println!("{from} is already in place"),
                Relocation::Moved { from, to, derivatives } => println!("{from} -> {to} ({derivatives} derivatives)"),
            }
        },
        Command::Prune { folder } => {
            let removed = topology(&settings)?.prune(&folder);
            println!("removed {removed} folders");
        },
        Command::Roots => {
            let topology = topology(&settings)?;
            for (name, root) in topology.all_roots() {
                println!("{name}\t{}", root.display());
            }
        },
    }
    Ok(())
}

fn topology(settings: &Settings) -> Result<StorageTopology> {
    let storage = &settings.storage;
    let topology =
        StorageTopology::new(&storage.files_dir, &storage.derivative_folders, storage.move_process, &storage.force_prune)
            .or_raise(|| ErrorKind::Storage)?;
    if let Some(kept) = topology.pruned_derivative_folders() {
        tracing::warn!(derivative_folders = kept, "ignoring derivative folders that don't exist");
    }
    Ok(topology)
}

fn preview(text: &str, conversion: Conversion, id: u64, max_length: usize) -> String {
    convert(&sanitize_bounded(text, max_length), conversion, HashSource::new(id, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;
    use std::fs;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_relocate() {
        let cli = Cli::parse_from(["repertory", "relocate", "a/b.png", "c/b.png", "--derivative-ext", "jpg"]);
        match cli.command {
            Command::Relocate { from, to, derivative_ext } => {
                assert_eq!((from.as_str(), to.as_str()), ("a/b.png", "c/b.png"));
                assert_eq!(derivative_ext.as_deref(), Some("jpg"));
            },
            _ => panic!("expected relocate"),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[rstest]
    #[case("  Für Élise (live)  ", Conversion::FullAscii, "Fur_Elise_[live]")]
    #[case("Für Élise", Conversion::Keep, "Für Élise")]
    #[case("a<br>b", Conversion::SpacesToUnderscore, "ab")]
    fn previews_names(#[case] text: &str, #[case] conversion: Conversion, #[case] expected: &str) {
        assert_eq!(preview(text, conversion, 0, 250), expected);
    }

    #[test]
    fn relocates_with_configured_files_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files_dir = dir.path().join("files");
        let config = dir.path().join("repertory.toml");
        fs::write(&config, format!("[storage]\nfiles_dir = {:?}\n", files_dir.display().to_string())).unwrap();
        fs::create_dir_all(files_dir.join("original/a")).unwrap();
        fs::write(files_dir.join("original/a/b.png"), b"data").unwrap();

        let config = config.to_str().unwrap();
        run(Cli::parse_from(["repertory", "--config", config, "relocate", "a/b.png", "c/b.png"])).unwrap();
        assert!(files_dir.join("original/c/b.png").is_file());
        assert!(!files_dir.join("original/a").exists());

        let err = run(Cli::parse_from(["repertory", "--config", config, "relocate", "a/b.png", "d/b.png"])).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Storage));
    }
}
