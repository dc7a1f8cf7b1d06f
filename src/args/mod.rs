pub mod decode;
pub mod encode;
mod helpers;

use clap::{App, AppSettings};

fn args() -> App<'static, 'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequired)
        .subcommand(decode::command())
        .subcommand(encode::command())
}

pub enum Arguments {
    Decode(decode::Arguments),
    Encode(encode::Arguments),
}

impl Arguments {
    pub fn parse_args() -> Self {
        let matches = args().get_matches();

        match matches.subcommand() {
            (decode::COMMAND_NAME, Some(matches)) => {
                return Arguments::Decode(decode::Arguments::parse(matches))
            }
            (encode::COMMAND_NAME, Some(matches)) => {
                return Arguments::Encode(encode::Arguments::parse(matches))
            }
            _ => unreachable!("Unknown command"),
        }
    }
}
