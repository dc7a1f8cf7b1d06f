mod args;
mod decode;
mod encode;
mod readin;

use crate::args::Arguments;
use log::error;

pub fn init_log(verbosity: usize) {
    let res = stderrlog::new()
        .module(module_path!())
        .verbosity(verbosity + 1)
        .init();

    if let Err(e) = res {
        eprintln!("Unable to init the logger: {}", e);
    }
}

fn main() {
    let res = match args::Arguments::parse_args() {
        Arguments::Decode(args) => {
            init_log(args.verbosity);
            decode::main(args)
        }
        Arguments::Encode(args) => {
            init_log(args.verbosity);
            encode::main(args)
        }
    };

    if let Err(err) = res {
        error!("{}", err);
    }
}
