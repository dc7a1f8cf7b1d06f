use super::cursor::{Cursor, Writer};
use super::err::{Error, Result};
use super::helpers::{join, len_u8, parse_utf8, text};
use super::labels::{build_domain_list, parse_domain_list};
use super::options::{write_option, DhcpOptions, Options};
pub use super::user_class::{UserClass, UserClassStyle};
use log::debug;
use std::{fmt, net::Ipv4Addr, time::Duration};

/// Typed value of a DHCP option. Options without a specific codec, or
/// that are decoded leniently and fail, are kept as `Unrecognized`.
///
/// Text options keep their payload bytes as received, they are not
/// required to be UTF-8.
#[derive(PartialEq, Debug, Clone)]
pub enum DhcpOption {
    BootfileName(Vec<u8>),
    BroadcastAddress(Ipv4Addr),
    ClassIdentifier(Vec<u8>),
    ClientArch(Vec<Arch>),
    ClientFqdn(ClientFqdn),
    DhcpMsgType(u8),
    DomainName(Vec<u8>),
    DomainNameServer(Vec<Ipv4Addr>),
    DomainSearch(Vec<String>),
    HostName(Vec<u8>),
    IpAddressLeaseTime(Duration),
    MaximumMessageSize(u16),
    Message(Vec<u8>),
    NameServer(Vec<Ipv4Addr>),
    NetbiosNameServer(Vec<Ipv4Addr>),
    NtpServers(Vec<Ipv4Addr>),
    ParameterRequestList(Vec<u8>),
    RebindingTime(Duration),
    RelayAgentInfo(Options),
    RenewalTime(Duration),
    RequestedIpAddress(Ipv4Addr),
    RootPath(Vec<u8>),
    Router(Vec<Ipv4Addr>),
    ServerIdentifier(Vec<Ipv4Addr>),
    SubnetMask(Ipv4Addr),
    TftpServerName(Vec<u8>),
    UserClass(UserClass),
    VendorClass(Vec<VendorClassId>),
    WPAD(Vec<u8>),
    Unrecognized(RawDhcpOption),
}

impl DhcpOption {
    /// Decodes the payload of an option with the codec of its code.
    pub fn parse(code: u8, data: &[u8]) -> Result<DhcpOption> {
        let option = match code {
            DhcpOptions::BOOTFILE_NAME => {
                DhcpOption::BootfileName(data.to_vec())
            }
            DhcpOptions::BROADCAST_ADDRESS => {
                DhcpOption::BroadcastAddress(parse_ip(data)?)
            }
            DhcpOptions::CLASS_IDENTIFIER => {
                DhcpOption::ClassIdentifier(data.to_vec())
            }
            DhcpOptions::CLIENT_SYSTEM_ARCHITECTURE_TYPE => {
                DhcpOption::ClientArch(parse_archs(data)?)
            }
            DhcpOptions::CLIENT_FQDN => {
                DhcpOption::ClientFqdn(ClientFqdn::parse(data)?)
            }
            DhcpOptions::DHCP_MSG_TYPE => {
                let mut buf = Cursor::new(data);
                let mtype = buf.read_u8();
                buf.finish()?;
                DhcpOption::DhcpMsgType(mtype)
            }
            DhcpOptions::DOMAIN_NAME => DhcpOption::DomainName(data.to_vec()),
            DhcpOptions::DOMAIN_NAME_SERVER => {
                DhcpOption::DomainNameServer(parse_ips(data)?)
            }
            DhcpOptions::DNS_DOMAIN_SEARCH_LIST => {
                DhcpOption::DomainSearch(parse_domain_list(data)?)
            }
            DhcpOptions::HOSTNAME => DhcpOption::HostName(data.to_vec()),
            DhcpOptions::IP_ADDRESS_LEASE_TIME => {
                DhcpOption::IpAddressLeaseTime(parse_seconds(data)?)
            }
            DhcpOptions::MAXIMUM_DHCP_MESSAGE_SIZE => {
                let mut buf = Cursor::new(data);
                let size = buf.read_u16();
                buf.finish()?;
                DhcpOption::MaximumMessageSize(size)
            }
            DhcpOptions::MESSAGE => DhcpOption::Message(data.to_vec()),
            DhcpOptions::NAME_SERVER => {
                DhcpOption::NameServer(parse_ips(data)?)
            }
            DhcpOptions::NETBIOS_NAME_SERVER => {
                DhcpOption::NetbiosNameServer(parse_ips(data)?)
            }
            DhcpOptions::NTP_SERVERS => {
                DhcpOption::NtpServers(parse_ips(data)?)
            }
            DhcpOptions::PARAMETER_REQUEST_LIST => {
                DhcpOption::ParameterRequestList(data.to_vec())
            }
            DhcpOptions::REBINDING_TIME => {
                DhcpOption::RebindingTime(parse_seconds(data)?)
            }
            DhcpOptions::RELAY_AGENT_INFORMATION => {
                DhcpOption::RelayAgentInfo(Options::from_bytes_nested(data)?)
            }
            DhcpOptions::RENEWAL_TIME => {
                DhcpOption::RenewalTime(parse_seconds(data)?)
            }
            DhcpOptions::REQUESTED_IP_ADDRESS => {
                DhcpOption::RequestedIpAddress(parse_ip(data)?)
            }
            DhcpOptions::ROOT_PATH => DhcpOption::RootPath(data.to_vec()),
            DhcpOptions::ROUTER => DhcpOption::Router(parse_ips(data)?),
            DhcpOptions::DHCP_SERVER_ID => {
                DhcpOption::ServerIdentifier(parse_ips(data)?)
            }
            DhcpOptions::SUBNET_MASK => DhcpOption::SubnetMask(parse_ip(data)?),
            DhcpOptions::TFTP_SERVER_NAME => {
                DhcpOption::TftpServerName(data.to_vec())
            }
            DhcpOptions::USER_CLASS => {
                DhcpOption::UserClass(UserClass::parse(data)?)
            }
            DhcpOptions::VENDOR_IDENTIFYING_VENDOR_CLASS => {
                DhcpOption::VendorClass(parse_vendor_class(data)?)
            }
            DhcpOptions::WPAD => DhcpOption::WPAD(data.to_vec()),
            _ => DhcpOption::Unrecognized(RawDhcpOption {
                code,
                data: data.to_vec(),
            }),
        };
        return Ok(option);
    }

    /// Like `parse`, but an invalid payload is kept as raw bytes.
    pub fn parse_or_raw(code: u8, data: &[u8]) -> DhcpOption {
        match Self::parse(code, data) {
            Ok(option) => option,
            Err(e) => {
                debug!("Unable to decode option {}: {}", code, e);
                DhcpOption::Unrecognized(RawDhcpOption {
                    code,
                    data: data.to_vec(),
                })
            }
        }
    }

    /// Encodes the payload. Fails when a value does not fit in its wire
    /// field, like a record longer than 255 bytes or a lease longer than
    /// `u32::MAX` seconds.
    pub fn to_raw(&self) -> Result<RawDhcpOption> {
        let code = self.code();
        let data = match self {
            Self::BootfileName(s)
            | Self::ClassIdentifier(s)
            | Self::DomainName(s)
            | Self::HostName(s)
            | Self::Message(s)
            | Self::RootPath(s)
            | Self::TftpServerName(s)
            | Self::WPAD(s) => s.clone(),
            Self::BroadcastAddress(addr)
            | Self::RequestedIpAddress(addr)
            | Self::SubnetMask(addr) => addr.octets().to_vec(),
            Self::DomainNameServer(addrs)
            | Self::NameServer(addrs)
            | Self::NetbiosNameServer(addrs)
            | Self::NtpServers(addrs)
            | Self::Router(addrs)
            | Self::ServerIdentifier(addrs) => {
                RawDhcpOption::from_addrs(code, addrs).data
            }
            Self::IpAddressLeaseTime(d)
            | Self::RebindingTime(d)
            | Self::RenewalTime(d) => RawDhcpOption::from_secs(code, d)?.data,
            Self::ClientArch(archs) => {
                let mut w = Writer::new();
                for arch in archs {
                    w.write_u16(arch.0);
                }
                w.into_bytes()
            }
            Self::ClientFqdn(cf) => cf.build(),
            Self::DhcpMsgType(mtype) => vec![*mtype],
            Self::DomainSearch(domains) => build_domain_list(domains)?,
            Self::MaximumMessageSize(size) => size.to_be_bytes().to_vec(),
            Self::ParameterRequestList(prl) => prl.clone(),
            Self::RelayAgentInfo(opts) => opts.to_bytes(false),
            Self::UserClass(uc) => uc.build()?,
            Self::VendorClass(ids) => {
                let mut w = Writer::new();
                for id in ids {
                    w.write_u32(id.enterprise_id);
                    let len =
                        len_u8("vendor class data length", id.data.len())?;
                    w.write_u8(len);
                    w.write_bytes(&id.data);
                }
                w.into_bytes()
            }
            Self::Unrecognized(raw) => raw.data.clone(),
        };

        return Ok(RawDhcpOption { code, data });
    }

    pub fn value_str(&self) -> String {
        match self {
            Self::BootfileName(s)
            | Self::ClassIdentifier(s)
            | Self::DomainName(s)
            | Self::HostName(s)
            | Self::Message(s)
            | Self::RootPath(s)
            | Self::TftpServerName(s)
            | Self::WPAD(s) => text(s),
            Self::BroadcastAddress(addr)
            | Self::RequestedIpAddress(addr)
            | Self::SubnetMask(addr) => format!("{}", addr),
            Self::DomainNameServer(addrs)
            | Self::NameServer(addrs)
            | Self::NetbiosNameServer(addrs)
            | Self::NtpServers(addrs)
            | Self::Router(addrs)
            | Self::ServerIdentifier(addrs) => join(addrs, ", "),
            Self::IpAddressLeaseTime(d)
            | Self::RebindingTime(d)
            | Self::RenewalTime(d) => format_secs(d),
            Self::ClientArch(archs) => join(archs, ", "),
            Self::ClientFqdn(cf) => format!("{:?}", cf),
            Self::DhcpMsgType(mtype) => DhcpMessageTypes::name(*mtype)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("Unknown ({})", mtype)),
            Self::DomainSearch(domains) => join(domains, ", "),
            Self::MaximumMessageSize(size) => format!("{}", size),
            Self::ParameterRequestList(prl) => prl
                .iter()
                .map(|code| match DhcpOptions::name(*code) {
                    Some(name) => name.to_string(),
                    None => format!("Unknown ({})", code),
                })
                .collect::<Vec<String>>()
                .join(", "),
            Self::RelayAgentInfo(opts) => {
                let mut s = String::new();
                for (code, data) in opts.iter() {
                    s.push_str(&format!(
                        "\n  {}: {:?}",
                        RelayAgentSubOptions::name(code).unwrap_or("Unknown"),
                        data
                    ));
                }
                s
            }
            Self::UserClass(uc) => format!("{}", uc),
            Self::VendorClass(ids) => join(ids, ", "),
            Self::Unrecognized(raw) => format!("{:?}", raw.data),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::BootfileName(_) => DhcpOptions::BOOTFILE_NAME,
            Self::BroadcastAddress(_) => DhcpOptions::BROADCAST_ADDRESS,
            Self::ClassIdentifier(_) => DhcpOptions::CLASS_IDENTIFIER,
            Self::ClientArch(_) => {
                DhcpOptions::CLIENT_SYSTEM_ARCHITECTURE_TYPE
            }
            Self::ClientFqdn(_) => DhcpOptions::CLIENT_FQDN,
            Self::DhcpMsgType(_) => DhcpOptions::DHCP_MSG_TYPE,
            Self::DomainName(_) => DhcpOptions::DOMAIN_NAME,
            Self::DomainNameServer(_) => DhcpOptions::DOMAIN_NAME_SERVER,
            Self::DomainSearch(_) => DhcpOptions::DNS_DOMAIN_SEARCH_LIST,
            Self::HostName(_) => DhcpOptions::HOSTNAME,
            Self::IpAddressLeaseTime(_) => DhcpOptions::IP_ADDRESS_LEASE_TIME,
            Self::MaximumMessageSize(_) => {
                DhcpOptions::MAXIMUM_DHCP_MESSAGE_SIZE
            }
            Self::Message(_) => DhcpOptions::MESSAGE,
            Self::NameServer(_) => DhcpOptions::NAME_SERVER,
            Self::NetbiosNameServer(_) => DhcpOptions::NETBIOS_NAME_SERVER,
            Self::NtpServers(_) => DhcpOptions::NTP_SERVERS,
            Self::ParameterRequestList(_) => {
                DhcpOptions::PARAMETER_REQUEST_LIST
            }
            Self::RebindingTime(_) => DhcpOptions::REBINDING_TIME,
            Self::RelayAgentInfo(_) => DhcpOptions::RELAY_AGENT_INFORMATION,
            Self::RenewalTime(_) => DhcpOptions::RENEWAL_TIME,
            Self::RequestedIpAddress(_) => DhcpOptions::REQUESTED_IP_ADDRESS,
            Self::RootPath(_) => DhcpOptions::ROOT_PATH,
            Self::Router(_) => DhcpOptions::ROUTER,
            Self::ServerIdentifier(_) => DhcpOptions::DHCP_SERVER_ID,
            Self::SubnetMask(_) => DhcpOptions::SUBNET_MASK,
            Self::TftpServerName(_) => DhcpOptions::TFTP_SERVER_NAME,
            Self::UserClass(_) => DhcpOptions::USER_CLASS,
            Self::VendorClass(_) => {
                DhcpOptions::VENDOR_IDENTIFYING_VENDOR_CLASS
            }
            Self::WPAD(_) => DhcpOptions::WPAD,
            Self::Unrecognized(raw) => raw.code,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        return DhcpOptions::name(self.code());
    }

    /// Option payload, without code and length.
    pub fn data(&self) -> Result<Vec<u8>> {
        return self.to_raw().map(|raw| raw.data);
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        return self.to_raw().map(|raw| raw.build());
    }
}

impl fmt::Display for DhcpOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.name().unwrap_or("Unknown"),
            self.value_str()
        )
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct RawDhcpOption {
    pub code: u8,
    pub data: Vec<u8>,
}

impl RawDhcpOption {
    pub fn from_addrs(code: u8, addrs: &[Ipv4Addr]) -> Self {
        let mut w = Writer::new();
        for a in addrs {
            w.write_ipv4(a);
        }

        return Self {
            code,
            data: w.into_bytes(),
        };
    }

    fn from_secs(code: u8, d: &Duration) -> Result<Self> {
        let secs = d.as_secs();
        if secs > u32::MAX as u64 {
            return Err(Error::ValueTooLarge {
                what: "duration in seconds",
                value: secs,
                max: u32::MAX as u64,
            });
        }

        return Ok(Self {
            code,
            data: (secs as u32).to_be_bytes().to_vec(),
        });
    }

    /// Option as TLV, split in several instances if longer than 255 bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::new();
        write_option(&mut w, self.code, &self.data);
        return w.into_bytes();
    }
}

fn parse_ips(data: &[u8]) -> Result<Vec<Ipv4Addr>> {
    if data.is_empty() {
        return Err(Error::EmptyList("IP DHCP options"));
    }

    let mut buf = Cursor::new(data);
    let mut ips = Vec::with_capacity(data.len() / 4);
    while buf.has(4) {
        ips.push(buf.read_ipv4());
    }
    buf.finish()?;

    return Ok(ips);
}

fn parse_ip(data: &[u8]) -> Result<Ipv4Addr> {
    let mut buf = Cursor::new(data);
    let ip = buf.read_ipv4();
    buf.finish()?;
    return Ok(ip);
}

fn parse_seconds(data: &[u8]) -> Result<Duration> {
    let mut buf = Cursor::new(data);
    let secs = buf.read_u32();
    buf.finish()?;
    return Ok(Duration::from_secs(secs as u64));
}

fn parse_archs(data: &[u8]) -> Result<Vec<Arch>> {
    if data.is_empty() {
        return Err(Error::EmptyList("Client System Architecture Type"));
    }

    let mut buf = Cursor::new(data);
    let mut archs = Vec::with_capacity(data.len() / 2);
    while buf.has(2) {
        archs.push(Arch(buf.read_u16()));
    }
    buf.finish()?;

    return Ok(archs);
}

/// RFC 3925 records: enterprise number, length and data.
fn parse_vendor_class(data: &[u8]) -> Result<Vec<VendorClassId>> {
    let mut buf = Cursor::new(data);
    let mut ids = Vec::new();
    while buf.has(5) {
        let enterprise_id = buf.read_u32();
        let len = buf.read_u8() as usize;
        let data = buf.copy_n(len);
        if buf.error().is_some() {
            break;
        }
        ids.push(VendorClassId {
            enterprise_id,
            data,
        });
    }
    buf.finish()?;

    return Ok(ids);
}

/// Go style rendering: 12h0m0s
fn format_secs(d: &Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        return format!("{}h{}m{}s", h, m, s);
    }
    if m > 0 {
        return format!("{}m{}s", m, s);
    }
    return format!("{}s", s);
}

/// Client system architecture type, defined in
/// https://datatracker.ietf.org/doc/html/rfc4578
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Arch(pub u16);

impl Arch {
    pub const INTEL_X86PC: Arch = Arch(0);
    pub const NEC_PC98: Arch = Arch(1);
    pub const EFI_ITANIUM: Arch = Arch(2);
    pub const DEC_ALPHA: Arch = Arch(3);
    pub const ARC_X86: Arch = Arch(4);
    pub const INTEL_LEAN_CLIENT: Arch = Arch(5);
    pub const EFI_IA32: Arch = Arch(6);
    pub const EFI_BC: Arch = Arch(7);
    pub const EFI_XSCALE: Arch = Arch(8);
    pub const EFI_X86_64: Arch = Arch(9);

    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Intel x86PC"),
            1 => Some("NEC/PC98"),
            2 => Some("EFI Itanium"),
            3 => Some("DEC Alpha"),
            4 => Some("Arc x86"),
            5 => Some("Intel Lean Client"),
            6 => Some("EFI IA32"),
            7 => Some("EFI BC"),
            8 => Some("EFI Xscale"),
            9 => Some("EFI x86-64"),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "unknown ({})", self.0),
        }
    }
}

/// Defined in https://datatracker.ietf.org/doc/html/rfc3925
#[derive(PartialEq, Debug, Clone)]
pub struct VendorClassId {
    pub enterprise_id: u32,
    pub data: Vec<u8>,
}

impl fmt::Display for VendorClassId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:'{}'",
            self.enterprise_id,
            String::from_utf8_lossy(&self.data)
        )
    }
}

/// Defined in https://datatracker.ietf.org/doc/html/rfc4702
#[derive(PartialEq, Debug, Clone)]
pub struct ClientFqdn {
    pub flags: u8,
    pub aresult: u8,
    pub ptrresult: u8,
    pub name: String,
}

impl ClientFqdn {
    pub fn parse(input: &[u8]) -> Result<Self> {
        let mut buf = Cursor::new(input);
        let flags = buf.read_u8();
        let aresult = buf.read_u8();
        let ptrresult = buf.read_u8();
        let rest = buf.rest();
        buf.check()?;

        let name = parse_utf8(rest)?;

        return Ok(Self {
            flags,
            aresult,
            ptrresult,
            name,
        });
    }

    pub fn build(&self) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.push(self.flags);
        raw.push(self.aresult);
        raw.push(self.ptrresult);
        raw.extend(self.name.as_bytes());

        return raw;
    }
}

#[allow(non_snake_case)]
pub mod DhcpMessageTypes {
    /// Client broadcast to locate available servers.
    pub const DISCOVER: u8 = 1;

    /// Server to client in response to DHCPDISCOVER with offer of
    /// configuration parameters.
    pub const OFFER: u8 = 2;

    /// Client message to servers either (a) requesting offered parameters
    /// from one server and implicitly declining offers from all others,
    /// (b) confirming correctness of previously allocated address after,
    /// e.g., system reboot, or (c) extending the lease on a particular
    /// network address.
    pub const REQUEST: u8 = 3;

    /// Client to server indicating network address is already in use.
    pub const DECLINE: u8 = 4;

    /// Server to client with configuration parameters, including committed
    /// network address.
    pub const ACK: u8 = 5;

    /// Server to client indicating client's notion of network address is
    /// incorrect (e.g., client has moved to new subnet) or client's lease
    /// as expired.
    pub const NAK: u8 = 6;

    /// Client to server relinquishing network address and cancelling
    /// remaining lease.
    pub const RELEASE: u8 = 7;

    /// Client to server, asking only for local configuration parameters;
    /// client already has externally configured network address.
    pub const INFORM: u8 = 8;

    pub fn name(msg_type: u8) -> Option<&'static str> {
        match msg_type {
            DISCOVER => Some("Discover"),
            OFFER => Some("Offer"),
            REQUEST => Some("Request"),
            DECLINE => Some("Decline"),
            ACK => Some("Ack"),
            NAK => Some("Nak"),
            RELEASE => Some("Release"),
            INFORM => Some("Inform"),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<u8> {
        (DISCOVER..=INFORM).find(|t| {
            self::name(*t)
                .map(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
    }
}

/// Sub-options of the relay agent information option (RFC 3046 and
/// later extensions).
#[allow(non_snake_case)]
pub mod RelayAgentSubOptions {
    pub const CIRCUIT_ID: u8 = 1;
    pub const REMOTE_ID: u8 = 2;
    pub const LINK_SELECTION: u8 = 5;
    pub const SUBSCRIBER_ID: u8 = 6;
    pub const VIRTUAL_SUBNET_SELECTION: u8 = 151;

    pub fn name(code: u8) -> Option<&'static str> {
        match code {
            CIRCUIT_ID => Some("Agent Circuit ID"),
            REMOTE_ID => Some("Agent Remote ID"),
            LINK_SELECTION => Some("Link Selection"),
            SUBSCRIBER_ID => Some("Subscriber ID"),
            VIRTUAL_SUBNET_SELECTION => Some("Virtual Subnet Selection"),
            _ => None,
        }
    }
}
