#[macro_use]
extern crate log;

use clap::Arg;
use env_logger::Env;
use esp_bridge::boot;
use simulator::{parse_script, Setup, Step, Stdout};

fn init(matches: &clap::ArgMatches) -> Result<Setup, String> {
    let mut script = parse_script(matches.value_of("events").unwrap_or("shutdown"))?;
    if let Some(celsius) = matches.value_of("temperature") {
        let celsius = celsius.parse().map_err(|_| format!("Temperature {} not a number", celsius))?;
        script.insert(0, Step::Temperature(celsius));
    }
    let config = match matches.value_of("config") {
        Some(path) => {
            let bytes = std::fs::read(path);
            Some(bytes.map_err(|e| format!("Read config file {} failed: {}", path, e))?)
        }
        None => None,
    };
    Ok(Setup { script, config })
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let matches = clap::App::new("simulator")
        .version("0.1")
        .about("Runs the firmware image against simulated peripherals")
        .arg(
            Arg::with_name("events")
                .long("events")
                .help("Steps played while idle, e.g. click:1,speed:5,temp:70,shutdown")
                .takes_value(true),
        )
        .arg(Arg::with_name("temperature").long("temperature").help("Initial celsius").takes_value(true))
        .arg(Arg::with_name("config").long("config").help("Config file to preload").takes_value(true))
        .get_matches();
    let setup = match init(&matches) {
        Ok(setup) => setup,
        Err(error) => {
            println!("{}", error);
            std::process::exit(2);
        }
    };
    info!("Playing {} steps", setup.script.len());
    simulator::configure(setup);
    let status = boot::run_image(Stdout, simulator::rust_primary);
    std::process::exit(status)
}
