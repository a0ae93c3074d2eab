//! Schemawiz command-line entry point.

use clap::Parser;
use schemawiz_cli::{init_tracing, render_error, run, Args};

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", render_error(&args, &e));
            std::process::exit(1);
        }
    }
}
