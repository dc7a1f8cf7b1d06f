use super::cursor::Writer;
use super::err::{Error, IResult, Result};
use super::helpers::{parse_chaddr, parse_cstring, parse_ipv4};
use super::option::{DhcpMessageTypes, DhcpOption};
use super::options::{DhcpOptions, Options};
use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u32, be_u8};
use pnet::util::MacAddr;
use std::fmt::Write;
use std::net::Ipv4Addr;

pub const BROADCAST_FLAG: u16 = 0x8000;

const DHCP_COOKIE: [u8; 4] = [99, 130, 83, 99];

const SNAME_LEN: usize = 64;
const FILE_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub struct DhcpPacket {
    /// Message op code.
    pub op: u8,

    /// Hardware address type.
    pub htype: u8,

    /// Hardware address length.
    pub hlen: u8,

    /// Client sets to zero, optionally used by relay agents
    /// when booting via a relay agent.
    pub hops: u8,

    /// Transaction ID, a random number chosen by the
    /// client, used by the client and server to associate
    /// messages and responses between a client and a
    /// server.
    pub xid: u32,

    /// Filled in by client, seconds elapsed since client
    /// began address acquisition or renewal process.
    pub secs: u16,

    /// Used to indicate if message is unicast or broadcast
    pub flags: u16,

    /// Client IP address; only filled in if client is in
    /// BOUND, RENEW or REBINDING state and can respond
    /// to ARP requests.
    pub ciaddr: Ipv4Addr,

    /// 'your' (client) IP address.
    pub yiaddr: Ipv4Addr,

    /// IP address of next server to use in bootstrap;
    /// returned in DHCPOFFER, DHCPACK by server.
    pub siaddr: Ipv4Addr,

    /// Relay agent IP address, used in booting via a
    /// relay agent.
    pub giaddr: Ipv4Addr,

    /// Client hardware address.
    pub chaddr: MacAddr,

    /// Optional server host name.
    pub sname: String,

    /// Boot file name; "generic" name or null in DHCPDISCOVER,
    /// fully qualified directory-path name in DHCPOFFER.
    pub file: String,

    pub options: Options,
}

pub const BOOT_REQUEST: u8 = 1; // From Client;
pub const BOOT_REPLY: u8 = 2; // From Server;

pub const ETHERNET_TYPE: u8 = 1;

pub const ETHERNET_ADDRESS_LEN: u8 = 6;

pub const DHCP_PACKET_MIN_SIZE: usize = 272;

impl DhcpPacket {
    pub fn new_reply() -> Self {
        let mut p = Self::default();
        p.op = BOOT_REPLY;
        return p;
    }

    pub fn new_request() -> Self {
        let mut p = Self::default();
        p.op = BOOT_REQUEST;
        return p;
    }

    pub fn is_broadcast(&self) -> bool {
        return self.flags & BROADCAST_FLAG != 0;
    }

    pub fn set_broadcast(&mut self) {
        self.flags |= BROADCAST_FLAG;
    }

    pub fn set_unicast(&mut self) {
        self.flags &= !BROADCAST_FLAG;
    }

    /// Appends the option data to the data already present for its code.
    pub fn add_option(&mut self, option: &DhcpOption) -> Result<()> {
        return self.options.add(option);
    }

    /// Replaces the option with the same code, if any.
    pub fn update_option(&mut self, option: &DhcpOption) -> Result<()> {
        return self.options.update(option);
    }

    pub fn message_type(&self) -> Option<u8> {
        return self.options.message_type();
    }

    /// Whether the code is in the client parameter request list.
    pub fn is_option_requested(&self, code: u8) -> bool {
        return self
            .options
            .parameter_request_list()
            .map(|prl| prl.contains(&code))
            .unwrap_or(false);
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::new();

        w.write_u8(self.op);
        w.write_u8(self.htype);
        w.write_u8(self.hlen);
        w.write_u8(self.hops);
        w.write_u32(self.xid);
        w.write_u16(self.secs);
        w.write_u16(self.flags);
        w.write_ipv4(&self.ciaddr);
        w.write_ipv4(&self.yiaddr);
        w.write_ipv4(&self.siaddr);
        w.write_ipv4(&self.giaddr);
        w.write_bytes(&self.chaddr.octets());
        w.write_bytes(&[0; 10]);
        write_cstring(&mut w, &self.sname, SNAME_LEN);
        write_cstring(&mut w, &self.file, FILE_LEN);

        w.write_bytes(&DHCP_COOKIE);

        self.options.marshal(&mut w, true);

        while w.len() < DHCP_PACKET_MIN_SIZE {
            w.write_u8(DhcpOptions::PAD);
        }

        return w.into_bytes();
    }

    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (raw, mut packet) = Self::parse_header(raw)?;
        packet.options = Options::from_bytes(raw)?;
        return Ok(packet);
    }

    /// Fixed part of the packet, up to the magic cookie included.
    fn parse_header(raw: &[u8]) -> IResult<&[u8], Self> {
        let (raw, op) = be_u8(raw)?;
        let (raw, htype) = be_u8(raw)?;
        let (raw, hlen) = be_u8(raw)?;
        let (raw, hops) = be_u8(raw)?;
        let (raw, xid) = be_u32(raw)?;
        let (raw, secs) = be_u16(raw)?;
        let (raw, flags) = be_u16(raw)?;
        let (raw, ciaddr) = parse_ipv4(raw)?;
        let (raw, yiaddr) = parse_ipv4(raw)?;
        let (raw, siaddr) = parse_ipv4(raw)?;
        let (raw, giaddr) = parse_ipv4(raw)?;
        let (raw, chaddr) = parse_chaddr(raw)?;
        let (raw, sname) = parse_cstring(raw, SNAME_LEN)?;
        let (raw, file) = parse_cstring(raw, FILE_LEN)?;

        let (raw, cookie) = take(4u8)(raw)?;
        if cookie != DHCP_COOKIE {
            return Err(nom::Err::Failure(Error::BadMagicCookie([
                cookie[0], cookie[1], cookie[2], cookie[3],
            ])));
        }

        return Ok((
            raw,
            Self {
                op,
                htype,
                hlen,
                hops,
                xid,
                secs,
                flags,
                ciaddr,
                yiaddr,
                siaddr,
                giaddr,
                chaddr,
                sname,
                file,
                options: Options::new(),
            },
        ));
    }

    /// Multiline human readable description of the packet.
    pub fn summary(&self) -> String {
        let op = match self.op {
            BOOT_REQUEST => "BootRequest".to_string(),
            BOOT_REPLY => "BootReply".to_string(),
            op => format!("Unknown ({})", op),
        };
        let msg_type = self
            .message_type()
            .map(|t| DhcpMessageTypes::name(t).unwrap_or("Unknown"))
            .unwrap_or("None");
        let flags = if self.is_broadcast() {
            "Broadcast"
        } else {
            "Unicast"
        };

        let mut s = String::new();
        // Writing to a String never fails
        let _ = writeln!(s, "DHCPv4 Message");
        let _ = writeln!(s, "  opcode: {}", op);
        let _ = writeln!(s, "  message type: {}", msg_type);
        let _ = writeln!(s, "  hwtype: {}", self.htype);
        let _ = writeln!(s, "  hwaddrlen: {}", self.hlen);
        let _ = writeln!(s, "  hopcount: {}", self.hops);
        let _ = writeln!(s, "  transaction ID: 0x{:08x}", self.xid);
        let _ = writeln!(s, "  num seconds: {}", self.secs);
        let _ = writeln!(s, "  flags: {} (0x{:02x})", flags, self.flags);
        let _ = writeln!(s, "  client IP: {}", self.ciaddr);
        let _ = writeln!(s, "  your IP: {}", self.yiaddr);
        let _ = writeln!(s, "  server IP: {}", self.siaddr);
        let _ = writeln!(s, "  gateway IP: {}", self.giaddr);
        let _ = writeln!(s, "  client MAC: {}", self.chaddr);
        let _ = writeln!(s, "  server hostname: {}", self.sname);
        let _ = writeln!(s, "  bootfile name: {}", self.file);
        let _ = writeln!(s, "  options:");
        let _ = write!(s, "{}", self.options);
        return s;
    }
}

fn write_cstring(w: &mut Writer, s: &str, size: usize) {
    let bytes = s.as_bytes();
    let len = bytes.len().min(size - 1);
    w.write_bytes(&bytes[..len]);
    w.write_bytes(&vec![0; size - len]);
}

impl Default for DhcpPacket {
    fn default() -> Self {
        return DhcpPacket {
            op: BOOT_REPLY,
            htype: ETHERNET_TYPE,
            hlen: ETHERNET_ADDRESS_LEN,
            hops: 0,
            xid: 0,
            secs: 0,
            flags: 0,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr: MacAddr::new(0, 0, 0, 0, 0, 0),
            sname: String::new(),
            file: String::new(),
            options: Options::new(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn discover() -> DhcpPacket {
        let mut p = DhcpPacket::new_request();
        p.xid = 0xdeadbeef;
        p.chaddr = MacAddr::new(0x00, 0x11, 0x22, 0x33, 0x44, 0x55);
        p.set_broadcast();
        p.add_option(&DhcpOption::DhcpMsgType(DhcpMessageTypes::DISCOVER))
            .unwrap();
        p.add_option(&DhcpOption::ParameterRequestList(vec![1, 3, 6]))
            .unwrap();
        p
    }

    #[test]
    fn test_build_layout() {
        let raw = discover().build();
        assert_eq!(raw.len(), DHCP_PACKET_MIN_SIZE);
        assert_eq!(&raw[..4], &[BOOT_REQUEST, 1, 6, 0]);
        assert_eq!(&raw[4..8], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&raw[10..12], &[0x80, 0]);
        assert_eq!(&raw[28..34], &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(&raw[236..240], &DHCP_COOKIE);
        assert_eq!(&raw[240..243], &[53, 1, 1]);
        assert_eq!(&raw[243..248], &[55, 3, 1, 3, 6]);
        assert_eq!(raw[248], DhcpOptions::END);
        assert!(raw[249..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_parse_built_packet() {
        let mut p = discover();
        p.sname = "server".to_string();
        p.file = "pxelinux.0".to_string();
        let lease = Duration::from_secs(60);
        p.update_option(&DhcpOption::IpAddressLeaseTime(lease)).unwrap();

        let parsed = DhcpPacket::parse(&p.build()).unwrap();
        assert_eq!(parsed, p);
        assert_eq!(parsed.message_type(), Some(DhcpMessageTypes::DISCOVER));
        assert_eq!(parsed.options.lease_time(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_bad_cookie() {
        let mut raw = discover().build();
        raw[236] = 1;
        assert_eq!(
            DhcpPacket::parse(&raw),
            Err(Error::BadMagicCookie([1, 130, 83, 99]))
        );
    }

    #[test]
    fn test_parse_short_header() {
        let raw = discover().build();
        assert!(DhcpPacket::parse(&raw[..100]).is_err());
    }

    #[test]
    fn test_parse_options_without_end() {
        let raw = discover().build();
        assert_eq!(
            DhcpPacket::parse(&raw[..248]),
            Err(Error::UnexpectedEnd)
        );
    }

    #[test]
    fn test_non_utf8_options_round_trip() {
        let mut p = discover();
        p.add_option(&DhcpOption::ClassIdentifier(vec![0x80, 0x01]))
            .unwrap();
        p.add_option(&DhcpOption::HostName(b"h\xf6st".to_vec()))
            .unwrap();

        let raw = p.build();
        let parsed = DhcpPacket::parse(&raw).unwrap();
        assert_eq!(parsed.options.class_identifier(), Some(vec![0x80, 0x01]));
        assert_eq!(parsed.options.host_name(), Some(b"h\xf6st".to_vec()));
        assert_eq!(parsed.build(), raw);
    }

    #[test]
    fn test_broadcast_flag() {
        let mut p = DhcpPacket::new_request();
        assert!(!p.is_broadcast());
        p.set_broadcast();
        assert!(p.is_broadcast());
        p.set_unicast();
        assert!(!p.is_broadcast());
        assert_eq!(p.flags, 0);
    }

    #[test]
    fn test_is_option_requested() {
        let p = discover();
        assert!(p.is_option_requested(DhcpOptions::ROUTER));
        assert!(!p.is_option_requested(DhcpOptions::BOOTFILE_NAME));
        assert!(!DhcpPacket::new_request().is_option_requested(1));
    }

    #[test]
    fn test_long_sname_truncated() {
        let mut p = discover();
        p.sname = "s".repeat(100);
        let raw = p.build();
        assert_eq!(raw[44 + 63], 0);
        let parsed = DhcpPacket::parse(&raw).unwrap();
        assert_eq!(parsed.sname.len(), 63);
    }

    #[test]
    fn test_summary() {
        let s = discover().summary();
        assert!(s.contains("  opcode: BootRequest\n"));
        assert!(s.contains("  message type: Discover\n"));
        assert!(s.contains("  transaction ID: 0xdeadbeef\n"));
        assert!(s.contains("  flags: Broadcast (0x8000)\n"));
        assert!(s.contains("    DHCP Message Type: Discover\n"));
    }
}
