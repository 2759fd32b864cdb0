//! Headless driver: opens an image folder and reports annotation progress.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bbox_editor::EditorConfig;
use bbox_editor::Workspace;
use bbox_editor::detector::NoModel;

#[derive(Parser, Debug)]
#[command(name = "bbox-editor", about = "Bounding-box annotation progress for an image folder")]
struct Cli {
    /// Folder of images to annotate
    folder: PathBuf,

    /// Class names file (.txt, .yaml or .json)
    classes: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = EditorConfig::default_path()
        .map(|path| EditorConfig::load_or_default(&path))
        .unwrap_or_default();

    // RUST_LOG still wins over the configured level
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let folder = cli.folder;
    let mut workspace = match Workspace::open(&folder, config, Box::new(NoModel)) {
        Ok(workspace) => workspace,
        Err(e) => {
            log::error!("Failed to open {:?}: {}", folder, e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(classes) = cli.classes {
        if let Err(e) = workspace.load_class_names(&classes) {
            log::error!("Failed to load class names from {:?}: {}", classes, e);
            return ExitCode::FAILURE;
        }
    }

    let project = workspace.project();
    println!(
        "{}: {} images, {} annotated",
        project.folder.display(),
        project.len(),
        project.annotated_count()
    );
    match project.first_unannotated() {
        Some(index) => println!("Next to annotate: {}", project.images()[index].display()),
        None => println!("All images are annotated"),
    }
    println!(
        "Current: {} [{}]",
        project.current_name(),
        workspace.plate_reading()
    );
    for entry in workspace.list_entries() {
        println!("  {}", entry.label);
    }

    ExitCode::SUCCESS
}
