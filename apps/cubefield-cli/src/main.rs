use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cubefield_common::EntityId;
use cubefield_kernel::{InteractOutcome, SimConfig, Simulation};
use cubefield_render::{DebugTextRenderer, RenderView, Renderer, ndc_from_pointer, pick};
use cubefield_tools::SimInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubefield-cli", about = "Headless host for the cubefield simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with simulation tunables (missing fields use defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the classic scene with a sweeping pointer triggering splits
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// RNG seed; drawn at random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
        /// Resolve a pointer pick every N frames (0 disables interaction)
        #[arg(short, long, default_value = "20")]
        interact_every: u64,
        /// Print a text render of the final frame
        #[arg(short, long)]
        render: bool,
    },
    /// Split the first root of the classic scene once and report the children
    Split {
        /// RNG seed for the split
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

const VIEWPORT: (u32, u32) = (1280, 720);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("cubefield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", cubefield_render::crate_info());
            println!("tools: {}", cubefield_tools::crate_info());
            println!("config: {config:#?}");
        }
        Commands::Run {
            frames,
            seed,
            interact_every,
            render,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            let mut sim = Simulation::with_default_scene(config, seed)?;
            tracing::info!(seed = sim.seed(), frames, "starting run");

            let mut view = RenderView::default();
            view.resize(VIEWPORT.0, VIEWPORT.1);

            let mut splits = 0usize;
            for frame in 0..frames {
                let target = (interact_every > 0 && frame % interact_every == 0)
                    .then(|| pointer_pick(&sim, &view, frame))
                    .flatten();
                let report = sim.frame(target);
                if let Some(Ok(InteractOutcome::Split { .. })) = report.interaction {
                    splits += 1;
                }
                if frame % 100 == 0 {
                    tracing::info!(
                        tick = report.stats.tick,
                        cubes = report.stats.population,
                        edges = report.stats.edges,
                        contacts = report.stats.contacts,
                        "frame"
                    );
                }
            }

            println!("{}", SimInspector::summary(&sim));
            println!("splits: {splits}");
            println!("levels: {:?}", SimInspector::level_histogram(&sim));
            if render {
                print!("{}", DebugTextRenderer::new().render(&sim, &view));
            }
        }
        Commands::Split { seed } => {
            let mut sim = Simulation::with_default_scene(config, seed)?;
            let Some(target) = sim.snapshot().first().map(|c| c.id) else {
                anyhow::bail!("scene has no cubes");
            };
            match sim.interact(target)? {
                InteractOutcome::Split {
                    children,
                    requested,
                } => {
                    println!(
                        "split {target}: placed {} of {requested} children",
                        children.len()
                    );
                    for id in children {
                        if let Some(info) = SimInspector::inspect_entity(&sim, id) {
                            println!("  {info}");
                        }
                    }
                }
                InteractOutcome::FlashOnly(reason) => {
                    println!("{target} flashed without splitting: {reason:?}");
                }
            }
            println!("{}", SimInspector::summary(&sim));
        }
    }

    Ok(())
}

/// Sweep a virtual pointer over the viewport and pick whatever is under it.
fn pointer_pick(sim: &Simulation, view: &RenderView, frame: u64) -> Option<EntityId> {
    let (w, h) = (VIEWPORT.0 as f32, VIEWPORT.1 as f32);
    let t = frame as f32;
    let x = w * 0.5 + w * 0.3 * (t * 0.031).cos();
    let y = h * 0.5 + h * 0.3 * (t * 0.047).sin();
    let ray = view.ray_from_ndc(ndc_from_pointer(x, y, w, h));
    pick(&sim.snapshot(), &ray)
}
