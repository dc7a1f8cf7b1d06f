use clap::{App, Arg, ArgMatches, SubCommand};

use super::helpers;

pub const COMMAND_NAME: &str = "decode";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Decode DHCP packets or options given in hexadecimal")
        .arg(
            Arg::with_name("input")
                .takes_value(true)
                .multiple(true)
                .value_name("hex")
                .help("Hexadecimal bytes, separators (spaces, ':' or '-') are ignored. Also a file with one input per line. If none, they are read from stdin"),
        )
        .arg(
            Arg::with_name("options-only")
                .long("options-only")
                .short("O")
                .help("Input is just an options stream, without the packet header"),
        )
        .arg(
            Arg::with_name("nested")
                .long("nested")
                .short("n")
                .requires("options-only")
                .help("Options stream is a nested container, so the End option is not required"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
}

pub struct Arguments {
    pub inputs: Vec<String>,
    pub options_only: bool,
    pub nested: bool,
    pub verbosity: usize,
}

impl<'a> Arguments {
    pub fn parse(matches: &'a ArgMatches) -> Arguments {
        Self {
            inputs: helpers::parse_strings(matches, "input")
                .unwrap_or_default(),
            options_only: matches.is_present("options-only"),
            nested: matches.is_present("nested"),
            verbosity: matches.occurrences_of("verbosity") as usize,
        }
    }
}
