//! Demonstration binary: builds a cubical complex from box sizes given on
//! the command line, reduces it to its connection matrix, and prints the
//! resulting Betti numbers over Z/2Z.

use std::process::ExitCode;
use std::sync::Arc;

use morse::{homology, Complex, CubicalComplex};

struct Config {
    boxes: Vec<usize>,
}

impl Config {
    fn new(args: &[String]) -> Result<Self, String> {
        if args.len() < 2 {
            return Err(format!("usage: {} <box_size>...", args[0]));
        }
        let boxes = args[1..]
            .iter()
            .map(|s| s.parse::<usize>().map_err(|e| format!("invalid box size '{s}': {e}")))
            .collect::<Result<Vec<_>, _>>()?;
        if boxes.iter().any(|&b| b == 0) {
            return Err("box sizes must be positive".to_string());
        }
        Ok(Self { boxes })
    }
}

fn run(config: Config) -> morse::Result<String> {
    log::debug!("building cubical complex on boxes {:?}", config.boxes);
    let complex: Arc<dyn Complex> = Arc::new(CubicalComplex::new(config.boxes));
    let reduced = homology(complex)?;

    let mut lines = Vec::new();
    for d in 0..=reduced.dimension() {
        lines.push(format!("b_{d} = {}", reduced.size_in_dimension(d)));
    }
    Ok(lines.join("\n"))
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match Config::new(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Problem parsing arguments: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Problem computing homology: {err}");
            ExitCode::FAILURE
        }
    }
}
