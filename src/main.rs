use clap::{Parser, ValueEnum};
use qlib::{
    BarnesHutSpace, BruteForceSpace, LeapFrogSpace, Simulation, SimulationSettings, Space, Vect,
    forces::BruteForce, integrators::LeapFrogIntegrator,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Evaluator {
    BarnesHut,
    BruteForce,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    Rk4,
    Leapfrog,
}

/// Runs a headless simulation of randomly placed particles and reports timing.
#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long, default_value_t = 1000)]
    count: usize,
    #[arg(short, long, default_value_t = 1000)]
    steps: usize,
    #[arg(long, default_value_t = 1e-4)]
    dt: f64,
    #[arg(long, default_value_t = 0.5)]
    theta: f64,
    #[arg(short, long, default_value_t = 1.0)]
    g: f64,
    #[arg(long, default_value_t = 2e-3)]
    softening: f64,
    #[arg(short, long, value_enum, default_value_t = Evaluator::BarnesHut)]
    evaluator: Evaluator,
    #[arg(short, long, value_enum, default_value_t = Method::Rk4)]
    integrator: Method,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(short, long)]
    parallel: bool,
}

fn init_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        env_logger::init();
    }
}

fn build(args: &Args) -> Box<dyn Simulation> {
    let mut sim: Box<dyn Simulation> = match (args.evaluator, args.integrator) {
        (Evaluator::BarnesHut, Method::Rk4) => Box::new(BarnesHutSpace::default()),
        (Evaluator::BruteForce, Method::Rk4) => Box::new(BruteForceSpace::default()),
        (Evaluator::BarnesHut, Method::Leapfrog) => Box::new(LeapFrogSpace::default()),
        (Evaluator::BruteForce, Method::Leapfrog) => {
            Box::new(Space::new(BruteForce, LeapFrogIntegrator::new()))
        }
    };
    *sim.settings_mut() = SimulationSettings {
        g: args.g,
        softening: args.softening,
        theta: args.theta,
        parallel: args.parallel,
        ..Default::default()
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    for _ in 0..args.count {
        let id = sim.add_particle(rng.random_range(0.1..1.0));
        if let Ok(p) = sim.particle_mut(id) {
            p.position = Vect::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
            p.velocity = Vect::new(rng.random_range(-0.1..0.1), rng.random_range(-0.1..0.1));
        }
    }
    sim
}

fn main() {
    init_logger();
    let args = Args::parse();
    log::info!("{:?}", args);

    let mut sim = build(&args);

    let start = web_time::Instant::now();
    for i in 0..args.steps {
        if let Err(err) = sim.step(args.dt) {
            eprintln!("step {} failed: {}", i, err);
            std::process::exit(1);
        }
    }
    let elapsed = start.elapsed();

    println!(
        "{} particles, {} steps, t = {}",
        sim.particle_count(),
        args.steps,
        sim.time()
    );
    if let Ok(p) = sim.particle(0) {
        println!("{}", p);
    }
    println!("Elapsed: {:?}", elapsed);
}
