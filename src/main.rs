use std::{env, fs, io};

use feedforward_nn::{Config, Dataset};
use log::info;

fn load_config() -> io::Result<Config> {
    let Some(path) = env::args().nth(1) else {
        info!("no config given, using the default one");
        return Ok(Config::default());
    };

    let json = fs::read_to_string(&path)?;
    info!(path = path.as_str(); "loaded config");
    Ok(Config::from_json(&json)?)
}

fn main() -> io::Result<()> {
    env_logger::init();

    let config = load_config()?;
    config.validate()?;

    let mut rng = config.training.rng();
    let mut model = config.model.build(&mut rng)?;
    let dataset = Dataset::noisy_quadratic(config.samples, config.noise, &mut rng)?;

    let before = model.mean_objective(dataset.instances())?;
    info!(loss = before; "initial mean loss");

    let mut trainer = config.training.trainer();
    trainer.train(&mut model, dataset.instances(), &mut rng)?;

    let after = model.mean_objective(dataset.instances())?;
    info!(before = before, after = after; "final mean loss");

    Ok(())
}
