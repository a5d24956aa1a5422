use clap::Parser;
use log::{error, info};

use dnc_harness::error::HarnessError;
use dnc_harness::task::build_task;
use dnc_harness::train::{run_loop, Config, GlobalStep, LoopConfig, Outcome, Session, Trainer};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    if let Err(e) = run(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), HarnessError> {
    // Configuration errors (unknown task, unknown controller) fail here,
    // before any session or checkpoint directory is touched.
    let task = build_task(config)?;
    let mut trainer = Trainer::new(config, task, GlobalStep::new())?;

    let session = Session::open(config, &mut trainer)?;
    let mut hooks = session.hook_schedule(config);

    let outcome = run_loop(&mut trainer, &mut hooks, &LoopConfig::from_config(config))?;
    match outcome {
        Outcome::Completed => info!("Reached {} iterations.", config.num_training_iterations),
        Outcome::StoppedEarly => {}
    }
    session.close(&trainer)
}
