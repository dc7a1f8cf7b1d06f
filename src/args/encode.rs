use std::{net::Ipv4Addr, time::Duration};

use clap::{App, Arg, ArgMatches, SubCommand};
use dhcpwire::dhcp::DhcpMessageTypes;
use pnet::util::MacAddr;

use super::helpers;

pub const COMMAND_NAME: &str = "encode";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Build a DHCP packet and print it in hexadecimal")
        .arg(
            Arg::with_name("type")
                .long("type")
                .short("t")
                .takes_value(true)
                .default_value("discover")
                .validator(helpers::is_message_type)
                .help("DHCP message type, a number or a name like discover or request"),
        )
        .arg(
            Arg::with_name("mac")
                .long("mac")
                .short("m")
                .takes_value(true)
                .validator(helpers::is_mac)
                .help("Client MAC. If none, a random one is used"),
        )
        .arg(
            Arg::with_name("xid")
                .long("xid")
                .short("x")
                .takes_value(true)
                .validator(helpers::is_u32)
                .help("Transaction ID, decimal or 0x prefixed. If none, a random one is used"),
        )
        .arg(
            Arg::with_name("hostname")
                .long("hostname")
                .short("H")
                .takes_value(true)
                .help("Hostname to send in the petition"),
        )
        .arg(
            Arg::with_name("requested-ip")
                .long("requested-ip")
                .short("r")
                .takes_value(true)
                .value_name("ip")
                .validator(helpers::is_ip)
                .help("IP address requested by the client"),
        )
        .arg(
            Arg::with_name("options")
                .long("options")
                .short("o")
                .value_name("option")
                .use_delimiter(true)
                .validator(helpers::is_dhcp_option)
                .help("Indicate the DHCP options, separated by commas, that want to be retrieved, it must be a byte or a value in [all, none, bootfile, broadcast, dns, domain, mask, netbios, ntp, router, search, tftp, wins, wpad]"),
        )
        .arg(
            Arg::with_name("user-class")
                .long("user-class")
                .short("u")
                .takes_value(true)
                .help("User class to send"),
        )
        .arg(
            Arg::with_name("rfc3004")
                .long("rfc3004")
                .requires("user-class")
                .help("Send the user class as a RFC 3004 list instead of a plain string"),
        )
        .arg(
            Arg::with_name("relay")
                .long("relay")
                .takes_value(true)
                .value_name("ip")
                .validator(helpers::is_ip)
                .help("Relay agent IP. The packet is set as unicast and relayed by it"),
        )
        .arg(
            Arg::with_name("lease-time")
                .long("lease-time")
                .short("l")
                .takes_value(true)
                .value_name("secs")
                .validator(helpers::is_u32)
                .help("IP address lease time in seconds"),
        )
        .arg(
            Arg::with_name("netboot")
                .long("netboot")
                .short("N")
                .help("Request the TFTP server name and bootfile name"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
}

pub struct Arguments {
    pub msg_type: u8,
    pub mac: Option<MacAddr>,
    pub xid: Option<u32>,
    pub hostname: Option<String>,
    pub requested_ip: Option<Ipv4Addr>,
    pub options: Option<Vec<u8>>,
    pub user_class: Option<String>,
    pub rfc3004: bool,
    pub relay: Option<Ipv4Addr>,
    pub lease_time: Option<Duration>,
    pub netboot: bool,
    pub verbosity: usize,
}

impl<'a> Arguments {
    pub fn parse(matches: &'a ArgMatches) -> Arguments {
        Self {
            msg_type: helpers::parse_message_type(matches, "type")
                .unwrap_or(DhcpMessageTypes::DISCOVER),
            mac: helpers::parse_mac(matches, "mac"),
            xid: helpers::parse_u32(matches, "xid"),
            hostname: helpers::parse_string(matches, "hostname"),
            requested_ip: helpers::parse_ip(matches, "requested-ip"),
            options: helpers::parse_options(matches, "options"),
            user_class: helpers::parse_string(matches, "user-class"),
            rfc3004: matches.is_present("rfc3004"),
            relay: helpers::parse_ip(matches, "relay"),
            lease_time: helpers::parse_secs(matches, "lease-time"),
            netboot: matches.is_present("netboot"),
            verbosity: matches.occurrences_of("verbosity") as usize,
        }
    }
}
