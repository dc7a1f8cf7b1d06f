use crate::args;
use dhcpwire::dhcp::modifiers::{
    with_broadcast, with_hw_addr, with_lease_time, with_message_type,
    with_netboot, with_option, with_relay, with_requested_options,
    with_transaction_id, with_user_class,
};
use dhcpwire::dhcp::{DhcpOption, DhcpPacket, Modifier};
use log::info;
use pnet::util::MacAddr;
use rand::Rng;

pub fn main(args: args::encode::Arguments) -> Result<(), String> {
    let packet = DhcpPacket::new(modifiers(args))
        .map_err(|e| format!("Unable to build the packet: {}", e))?;

    info!("{}", packet.summary());
    let hex: String =
        packet.build().iter().map(|b| format!("{:02x}", b)).collect();
    println!("{}", hex);

    return Ok(());
}

fn modifiers(args: args::encode::Arguments) -> Vec<Modifier> {
    let mac = args.mac.unwrap_or_else(random_mac);
    let mut mods = vec![
        with_hw_addr(mac),
        with_message_type(args.msg_type),
        with_broadcast(true),
    ];

    if let Some(xid) = args.xid {
        mods.push(with_transaction_id(xid));
    }

    if let Some(hostname) = args.hostname {
        mods.push(with_option(DhcpOption::HostName(hostname.into_bytes())));
    }

    if let Some(ip) = args.requested_ip {
        mods.push(with_option(DhcpOption::RequestedIpAddress(ip)));
    }

    if let Some(options) = args.options {
        mods.push(with_requested_options(options));
    }

    if args.netboot {
        mods.push(with_netboot());
    }

    if let Some(uc) = args.user_class {
        mods.push(with_user_class(uc.into_bytes(), args.rfc3004));
    }

    if let Some(lease) = args.lease_time {
        mods.push(with_lease_time(lease));
    }

    if let Some(relay) = args.relay {
        mods.push(with_relay(relay));
    }

    return mods;
}

fn random_mac() -> MacAddr {
    let mut rng = rand::thread_rng();
    return MacAddr::new(
        rng.gen(),
        rng.gen(),
        rng.gen(),
        rng.gen(),
        rng.gen(),
        rng.gen(),
    );
}
