// src/main.rs

use fsaudit::{cli, logging, run};

fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("fsaudit error: {err:?}");
        std::process::exit(1);
    }

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("fsaudit error: {err:?}");
            std::process::exit(1);
        }
    }
}
