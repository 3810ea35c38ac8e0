use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, Level};

use disk_gen::export::Manifest;
use disk_gen::settings::ScaleReference;
use disk_gen::{slice_model, stl_op, Axis, Object, Scene, Settings, SliceError};

/// Slice a closed STL mesh into thin disks
#[derive(Parser)]
#[command(name = "disk-gen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Slice a closed mesh into disks for laminated replicas", long_about = None)]
struct Cli {
    /// STL file to slice
    input: PathBuf,

    /// JSON settings file, command line options override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Distance between slice planes in model units
    #[arg(short, long)]
    step: Option<f32>,

    /// Disk thickness in cm, converted with --physical/--units
    #[arg(long)]
    physical_step: Option<f32>,

    /// Slicing axis, X, Y, Z or its index 0, 1, 2
    #[arg(short, long)]
    axis: Option<String>,

    /// Arrange the disks on a grid
    #[arg(long)]
    atlas: bool,

    /// Physical length in cm of the scale reference
    #[arg(long, requires = "units")]
    physical: Option<f32>,

    /// Model length in units of the scale reference
    #[arg(long, requires = "physical")]
    units: Option<f32>,

    /// Directory receiving one STL per disk and scene.json
    #[arg(short, long, default_value = "disks")]
    out: PathBuf,
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Returns Ok(false) if some slices failed.
fn run(cli:Cli) -> Result<bool,SliceError> {
    let start_time = Instant::now();

    let mut settings = match &cli.config {
        Some(path) => Settings::from_json_file(path)?,
        None => Settings::default(),
    };
    if let Some(step) = cli.step { settings.step = step; settings.physical_step = None; }
    if let Some(step) = cli.physical_step { settings.physical_step = Some(step); }
    if let Some(axis) = &cli.axis { settings.axis = axis.parse::<Axis>()?; }
    if cli.atlas { settings.build_atlas = true; }
    if let (Some(physical),Some(units)) = (cli.physical,cli.units) {
        settings.scale = Some(ScaleReference{ physical, units });
    }

    let name = cli.input.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".into());
    let mesh = stl_op::read_mesh(&cli.input)?;
    let mut scene = Scene::new();
    let name = scene.add_object(Object::new(name, mesh));

    let run = slice_model(&mut scene, &name, &settings)?;
    let slice_time = start_time.elapsed();

    let written = stl_op::export_collection(&scene, &run.collection, &cli.out)?;
    Manifest::new(&run, &scene).write(cli.out.join("scene.json"))?;

    println!("slicing time {} sec",slice_time.as_secs_f64());
    println!("{run}");
    println!("\x1b[034mExported {} disks to {}\x1b[0m",written.len(),cli.out.display());
    Ok(run.failed_indices().is_empty())
}

fn init_logger(){
    env_logger::builder()
        .format(|buf, record|{
            match record.level() {
                Level::Error => write!(buf,"\x1b[031mError\x1b[0m")?,
                Level::Warn  => write!(buf,"\x1b[033mWarn \x1b[0m")?,
                Level::Info  => write!(buf,"\x1b[032mInfo \x1b[0m")?,
                Level::Debug => write!(buf,"\x1b[034mDebug\x1b[0m")?,
                Level::Trace => write!(buf,"\x1b[035mTrace\x1b[0m")?,
            };
            writeln!(buf,": {}",record.args())
        })
    .init();
}
