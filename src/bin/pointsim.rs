use pointsim::{read_input_file, write_props, ModelRegistry, RunSummary, Simulation};
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::{error, info, Level};

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "pointsim",
    about = "Drives constitutive models through the legs defined in an input file"
)]
struct Options {
    /// Input file
    input: PathBuf,

    /// Output directory (default: the directory of the input file)
    #[structopt(short = "o", long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Do not write the parameter echo (.props) files
    #[structopt(long = "nowriteprops")]
    nowriteprops: bool,

    /// Print debug messages
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

fn main() -> Result<(), pointsim::Error> {
    // parse options
    let options = Options::from_args();
    let level = if options.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

    // read input file
    let inputs = read_input_file(&options.input)?;
    let base_dir = options.input.parent().map(Path::to_path_buf);
    let out_dir = match &options.out_dir {
        Some(dir) => dir.clone(),
        None => base_dir.clone().unwrap_or_default(),
    };

    // run all simulations
    let registry = ModelRegistry::builtin();
    let mut failures = Vec::new();
    for input in &inputs {
        let mut sim = Simulation::new(input, &registry, base_dir.as_deref())?;
        let (output, stats) = match sim.run() {
            Ok(res) => res,
            Err(err) => {
                error!("simulation {} failed: {}", sim.name, err);
                failures.push(err);
                continue;
            }
        };
        let path_out = out_dir.join(format!("{}.out", sim.name));
        output.write_table(&path_out)?;
        if sim.write_props && !options.nowriteprops {
            write_props(&out_dir.join(format!("{}.props", sim.name)), &sim.material.parameter_echo())?;
        }
        let summary = RunSummary::new(&sim, &output, &stats)?;
        summary.write_json(&out_dir.join(format!("{}.json", sim.name)))?;
        info!("results written to {}", path_out.display());
    }
    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0)),
        _ => Err(pointsim::Error::Multiple(failures)),
    }
}
