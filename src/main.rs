use std::rc::Rc;
use clap::Parser;
use surfgrid_rust_utils_core::model::surface::RegularSurface;
use surfgrid_rust_utils_core::model::template::{write_surface, Template};
use surfgrid_rust_utils_core::stream::{describe, LogStream, RerunStream, Stream};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filename of the job template (JSON)
    #[arg(short, long)]
    job: String,

    /// Input arrays (.npz)
    #[arg(short, long)]
    input: String,

    /// Output surface (.npz with values and mask)
    #[arg(short, long)]
    output: String,

    /// Stream diagnostics to a rerun viewer instead of the log
    #[arg(short, long)]
    rerun: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let template = Template::from_file(&args.job)?;
    let mut surface = RegularSurface::new(template.surface)?;
    let stream: Rc<dyn Stream> = if args.rerun {
        let recording = rerun::RecordingStreamBuilder::new("surfgrid").spawn()?;
        Rc::new(RerunStream::new(recording))
    } else {
        Rc::new(LogStream)
    };

    let gridder = template.gridder(&args.input)?.with_rerun_stream(stream);
    let report = gridder.grid(&mut surface)?;
    log::info!(
        "{}: used layers {:?}, skipped {}",
        gridder.name(),
        report.processed,
        report.skipped.len()
    );
    for (layer, reason) in &report.skipped {
        log::debug!("Layer {} skipped: {}", layer, reason);
    }
    log::info!("Surface {}", describe(surface.values().filled(f64::NAN).iter()));

    write_surface(&surface, &args.output)?;
    Ok(())
}
