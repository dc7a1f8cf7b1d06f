//! Packet construction by composition: every `with_*` function returns a
//! closure that tweaks one aspect of a packet, and the constructors apply
//! them in order. A modifier fails when the option it sets cannot be
//! encoded.

use super::err::{Error, Result};
use super::option::{DhcpMessageTypes, DhcpOption, UserClass};
use super::options::DhcpOptions;
use super::packet::{DhcpPacket, BOOT_REPLY, BOOT_REQUEST};
use pnet::util::MacAddr;
use rand::Rng;
use std::net::Ipv4Addr;
use std::time::Duration;

pub type Modifier = Box<dyn Fn(&mut DhcpPacket) -> Result<()>>;

impl DhcpPacket {
    /// Boot request with a random transaction id, with the modifiers
    /// applied in order.
    pub fn new(modifiers: Vec<Modifier>) -> Result<Self> {
        let mut rng = rand::thread_rng();
        let mut p = Self::new_request();
        p.xid = rng.gen();

        for modifier in modifiers.iter() {
            modifier(&mut p)?;
        }
        return Ok(p);
    }

    pub fn new_discovery(
        hwaddr: MacAddr,
        modifiers: Vec<Modifier>,
    ) -> Result<Self> {
        let mut all = vec![
            with_broadcast(true),
            with_hw_addr(hwaddr),
            with_requested_options(vec![
                DhcpOptions::SUBNET_MASK,
                DhcpOptions::ROUTER,
                DhcpOptions::DOMAIN_NAME,
                DhcpOptions::DOMAIN_NAME_SERVER,
            ]),
            with_message_type(DhcpMessageTypes::DISCOVER),
        ];
        all.extend(modifiers);
        return Self::new(all);
    }

    pub fn new_inform(
        hwaddr: MacAddr,
        local_ip: Ipv4Addr,
        modifiers: Vec<Modifier>,
    ) -> Result<Self> {
        let mut all = vec![
            with_hw_addr(hwaddr),
            with_message_type(DhcpMessageTypes::INFORM),
            with_client_ip(local_ip),
        ];
        all.extend(modifiers);
        return Self::new(all);
    }

    /// Request for the address offered. The offer must carry a server
    /// identifier.
    pub fn new_request_from_offer(
        offer: &DhcpPacket,
        modifiers: Vec<Modifier>,
    ) -> Result<Self> {
        let server_ip = offer
            .options
            .server_identifier()
            .and_then(|ids| ids.first().copied())
            .ok_or(Error::MissingOption(DhcpOptions::DHCP_SERVER_ID))?;

        let mut all = vec![
            with_reply(offer),
            with_message_type(DhcpMessageTypes::REQUEST),
            with_server_ip(server_ip),
            with_option(DhcpOption::RequestedIpAddress(offer.yiaddr)),
            with_option(DhcpOption::ServerIdentifier(vec![server_ip])),
        ];
        all.extend(modifiers);
        return Self::new(all);
    }

    pub fn new_reply_from_request(
        request: &DhcpPacket,
        modifiers: Vec<Modifier>,
    ) -> Result<Self> {
        let mut all = vec![with_reply(request)];
        all.extend(modifiers);
        return Self::new(all);
    }
}

pub fn with_transaction_id(xid: u32) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.xid = xid;
        Ok(())
    })
}

pub fn with_broadcast(broadcast: bool) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        if broadcast {
            p.set_broadcast();
        } else {
            p.set_unicast();
        }
        Ok(())
    })
}

pub fn with_hw_addr(hwaddr: MacAddr) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.chaddr = hwaddr;
        Ok(())
    })
}

pub fn with_client_ip(ip: Ipv4Addr) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.ciaddr = ip;
        Ok(())
    })
}

pub fn with_your_ip(ip: Ipv4Addr) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.yiaddr = ip;
        Ok(())
    })
}

pub fn with_server_ip(ip: Ipv4Addr) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.siaddr = ip;
        Ok(())
    })
}

/// Answer to `request`: flips the op code and copies the fields that
/// pair both messages.
pub fn with_reply(request: &DhcpPacket) -> Modifier {
    let op = if request.op == BOOT_REQUEST {
        BOOT_REPLY
    } else {
        BOOT_REQUEST
    };
    let (htype, xid, chaddr, flags, giaddr) = (
        request.htype,
        request.xid,
        request.chaddr,
        request.flags,
        request.giaddr,
    );

    Box::new(move |p: &mut DhcpPacket| {
        p.op = op;
        p.htype = htype;
        p.xid = xid;
        p.chaddr = chaddr;
        p.flags = flags;
        p.giaddr = giaddr;
        Ok(())
    })
}

/// Unicast through the relay agent at `ip`.
pub fn with_relay(ip: Ipv4Addr) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.set_unicast();
        p.giaddr = ip;
        p.hops = 1;
        Ok(())
    })
}

/// Appends the option, concatenating with any data already there.
pub fn with_option(option: DhcpOption) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| p.add_option(&option))
}

pub fn with_message_type(mtype: u8) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.update_option(&DhcpOption::DhcpMsgType(mtype))
    })
}

pub fn with_user_class(class: Vec<u8>, rfc: bool) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        let uc = if rfc {
            UserClass::rfc3004(vec![class.clone()])
        } else {
            UserClass::legacy(class.clone())
        };
        p.add_option(&DhcpOption::UserClass(uc))
    })
}

/// Adds the codes to the parameter request list, keeping the ones
/// already requested.
pub fn with_requested_options(codes: Vec<u8>) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| request_options(p, &codes))
}

/// Requests the TFTP server name and bootfile name.
pub fn with_netboot() -> Modifier {
    with_requested_options(vec![
        DhcpOptions::TFTP_SERVER_NAME,
        DhcpOptions::BOOTFILE_NAME,
    ])
}

fn request_options(p: &mut DhcpPacket, codes: &[u8]) -> Result<()> {
    let mut prl = p.options.parameter_request_list().unwrap_or_default();
    prl.extend(codes);
    prl.sort_unstable();
    prl.dedup();
    return p.update_option(&DhcpOption::ParameterRequestList(prl));
}

pub fn with_netmask(mask: Ipv4Addr) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.update_option(&DhcpOption::SubnetMask(mask))
    })
}

pub fn with_lease_time(lease: Duration) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.update_option(&DhcpOption::IpAddressLeaseTime(lease))
    })
}

pub fn with_router(routers: Vec<Ipv4Addr>) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.update_option(&DhcpOption::Router(routers.clone()))
    })
}

pub fn with_dns(servers: Vec<Ipv4Addr>) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.update_option(&DhcpOption::DomainNameServer(servers.clone()))
    })
}

pub fn with_domain_search_list(domains: Vec<String>) -> Modifier {
    Box::new(move |p: &mut DhcpPacket| {
        p.update_option(&DhcpOption::DomainSearch(domains.clone()))
    })
}
