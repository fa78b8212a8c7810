use std::path::PathBuf;

use argh::FromArgs;

use geopcd::batch::{BatchPipeline, CorrespondenceSet};

#[derive(FromArgs, Debug)]
/// Transform every binary PCD file under a directory into the global frame.
struct Args {
    /// path to the directory containing the input PCD files
    #[argh(option, short = 'i')]
    input_dir: PathBuf,

    /// path to the directory receiving the transformed files
    #[argh(option, short = 'o')]
    output_dir: PathBuf,

    /// path to the JSON file with the local/global correspondences
    #[argh(
        option,
        short = 'c',
        default = "PathBuf::from(\"correspondences.json\")"
    )]
    correspondences: PathBuf,

    /// extension of the input files
    #[argh(option, default = "String::from(\"pcd\")")]
    extension: String,

    /// do not draw a progress bar
    #[argh(switch)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let pairs = CorrespondenceSet::from_json_file(&args.correspondences)?;
    log::info!(
        "Loaded {} correspondences from {}",
        pairs.local.len(),
        args.correspondences.display()
    );

    let report = BatchPipeline::new()
        .with_extension(args.extension)
        .with_progress(!args.quiet)
        .run(&args.input_dir, &args.output_dir, &pairs)?;

    for failure in &report.failures {
        println!(
            "❌ {} ({:?}): {}",
            failure.relative_path.display(),
            failure.stage,
            failure.reason
        );
    }

    println!("{report}");

    Ok(())
}
