use clap::ArgMatches;
use dhcpwire::dhcp::{DhcpMessageTypes, DhcpOptions};
use pnet::util::MacAddr;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

pub fn is_u32(v: String) -> Result<(), String> {
    parse_u32_str(&v).ok_or_else(|| {
        format!(
            "Incorrect value '{}' must be an unsigned integer of 32 bits (u32)",
            v
        )
    })?;

    return Ok(());
}

/// Decimal or 0x prefixed hexadecimal.
fn parse_u32_str(v: &str) -> Option<u32> {
    match v.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => v.parse().ok(),
    }
}

pub fn parse_u32(matches: &ArgMatches, name: &str) -> Option<u32> {
    matches.value_of(name).and_then(parse_u32_str)
}

pub fn parse_secs(matches: &ArgMatches, name: &str) -> Option<Duration> {
    parse_u32(matches, name).map(|s| Duration::from_secs(s as u64))
}

pub fn option_keywords() -> HashMap<&'static str, u8> {
    let mut k = HashMap::new();
    k.insert("bootfile", DhcpOptions::BOOTFILE_NAME);
    k.insert("broadcast", DhcpOptions::BROADCAST_ADDRESS);
    k.insert("dns", DhcpOptions::DOMAIN_NAME_SERVER);
    k.insert("domain", DhcpOptions::DOMAIN_NAME);
    k.insert("mask", DhcpOptions::SUBNET_MASK);
    k.insert("netbios", DhcpOptions::NETBIOS_NAME_SERVER);
    k.insert("ntp", DhcpOptions::NTP_SERVERS);
    k.insert("router", DhcpOptions::ROUTER);
    k.insert("search", DhcpOptions::DNS_DOMAIN_SEARCH_LIST);
    k.insert("tftp", DhcpOptions::TFTP_SERVER_NAME);
    k.insert("wins", DhcpOptions::NETBIOS_NAME_SERVER);
    k.insert("wpad", DhcpOptions::WPAD);

    return k;
}

fn option_code(keywords: &HashMap<&'static str, u8>, v: &str) -> Option<u8> {
    match keywords.get(v) {
        Some(code) => Some(*code),
        None => v.parse::<u8>().ok(),
    }
}

pub fn is_dhcp_option(v: String) -> Result<(), String> {
    let keywords = option_keywords();

    if v == "all" || v == "none" {
        return Ok(());
    }

    option_code(&keywords, &v).ok_or_else(|| {
        format!(
            "Invalid value '{}': Must be an integer between 0 and 255 or value in {:?}",
            v, keywords.keys()
        )
    })?;

    return Ok(());
}

pub fn parse_options(matches: &ArgMatches, name: &str) -> Option<Vec<u8>> {
    let options: Vec<&str> = matches.values_of(name)?.collect();
    if options.is_empty() {
        return None;
    }

    if options.contains(&"all") {
        return Some((1..255).collect());
    }

    if options.contains(&"none") {
        return Some(Vec::new());
    }

    let keywords = option_keywords();

    return Some(
        options
            .into_iter()
            .filter_map(|opt| option_code(&keywords, opt))
            .collect(),
    );
}

fn message_type_code(v: &str) -> Option<u8> {
    DhcpMessageTypes::from_name(v).or_else(|| v.parse::<u8>().ok())
}

pub fn is_message_type(v: String) -> Result<(), String> {
    message_type_code(&v).ok_or_else(|| {
        format!(
            "Invalid message type '{}': Must be a number or one of discover, offer, request, decline, ack, nak, release, inform",
            v
        )
    })?;

    return Ok(());
}

pub fn parse_message_type(matches: &ArgMatches, name: &str) -> Option<u8> {
    matches.value_of(name).and_then(message_type_code)
}

pub fn is_mac(v: String) -> Result<(), String> {
    match MacAddr::from_str(&v) {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("'{}' is not a valid MAC address", v)),
    }
}

pub fn parse_mac(matches: &ArgMatches, name: &str) -> Option<MacAddr> {
    matches
        .value_of(name)
        .and_then(|mac| MacAddr::from_str(mac).ok())
}

pub fn is_ip(v: String) -> Result<(), String> {
    v.parse::<Ipv4Addr>()
        .map_err(|_| format!("'{}' is not a valid IPv4", v))?;
    return Ok(());
}

pub fn parse_ip(matches: &ArgMatches, name: &str) -> Option<Ipv4Addr> {
    matches.value_of(name).and_then(|ip| ip.parse().ok())
}

pub fn parse_string(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.value_of(name).map(|s| s.into())
}

pub fn parse_strings(matches: &ArgMatches, name: &str) -> Option<Vec<String>> {
    let values: Vec<String> =
        matches.values_of(name)?.map(|s| s.to_string()).collect();
    if values.is_empty() {
        return None;
    }
    return Some(values);
}
