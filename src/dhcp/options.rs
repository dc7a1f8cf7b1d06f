use super::cursor::{Cursor, Writer};
use super::err::{Error, Result};
use super::option::{
    Arch, ClientFqdn, DhcpOption, UserClass, VendorClassId,
};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Raw options of a packet, or of a nested sub-option container, keyed by
/// code. Every physical instance of a code is concatenated in the order
/// it was found (RFC 3396), so one code always holds one logical option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(BTreeMap<u8, Vec<u8>>);

macro_rules! get_option {
    ($fn:ident, $code:expr, $option:ident, $type:ty) => {
        pub fn $fn(&self) -> Option<$type> {
            match self.option($code) {
                Some(Ok(DhcpOption::$option(v))) => Some(v),
                _ => None,
            }
        }
    };
}

impl Options {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Parses a top level option stream, which must contain End.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        return Self::unmarshal(data, true);
    }

    /// Parses a sub-option container, where End is optional.
    pub fn from_bytes_nested(data: &[u8]) -> Result<Self> {
        return Self::unmarshal(data, false);
    }

    pub fn unmarshal(data: &[u8], require_end: bool) -> Result<Self> {
        let mut options = Self::new();
        if data.is_empty() {
            return Ok(options);
        }

        let mut buf = Cursor::new(data);
        let mut end = false;
        while buf.has(1) {
            let code = buf.read_u8();
            if code == DhcpOptions::PAD {
                continue;
            }
            if code == DhcpOptions::END {
                end = true;
                break;
            }

            let length = buf.read_u8();
            let payload = match buf.consume(length as usize) {
                Some(payload) => payload,
                None => {
                    let err =
                        buf.error().cloned().unwrap_or(Error::InvalidOptions);
                    debug!("Error collecting option {}: {}", code, err);
                    return Err(err);
                }
            };

            options.0.entry(code).or_default().extend_from_slice(payload);
        }

        if !end && require_end {
            return Err(Error::UnexpectedEnd);
        }

        while buf.has(1) {
            if buf.read_u8() != DhcpOptions::PAD {
                return Err(Error::InvalidOptions);
            }
        }

        return Ok(options);
    }

    /// Writes the options sorted by code. End is only written, last, when
    /// `write_end` is set.
    pub fn marshal(&self, w: &mut Writer, write_end: bool) {
        for (code, data) in &self.0 {
            if *code == DhcpOptions::END {
                continue;
            }
            write_option(w, *code, data);
        }

        if write_end {
            w.write_u8(DhcpOptions::END);
        }
    }

    pub fn to_bytes(&self, write_end: bool) -> Vec<u8> {
        let mut w = Writer::new();
        self.marshal(&mut w, write_end);
        return w.into_bytes();
    }

    pub fn len(&self) -> usize {
        return self.0.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.0.is_empty();
    }

    pub fn get(&self, code: u8) -> Option<&[u8]> {
        return self.0.get(&code).map(|d| d.as_slice());
    }

    pub fn has(&self, code: u8) -> bool {
        return self.0.contains_key(&code);
    }

    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.0.iter().map(|(c, d)| (*c, d.as_slice()))
    }

    /// Appends the option data to any data already stored for its code.
    pub fn add(&mut self, option: &DhcpOption) -> Result<()> {
        let raw = option.to_raw()?;
        self.add_raw(raw.code, &raw.data);
        return Ok(());
    }

    /// Replaces whatever is stored for the option code.
    pub fn update(&mut self, option: &DhcpOption) -> Result<()> {
        let raw = option.to_raw()?;
        self.update_raw(raw.code, raw.data);
        return Ok(());
    }

    pub fn add_raw(&mut self, code: u8, data: &[u8]) {
        self.0.entry(code).or_default().extend_from_slice(data);
    }

    pub fn update_raw(&mut self, code: u8, data: Vec<u8>) {
        self.0.insert(code, data);
    }

    pub fn remove(&mut self, code: u8) -> Option<Vec<u8>> {
        return self.0.remove(&code);
    }

    /// Decodes the typed value of `code`, if present.
    pub fn option(&self, code: u8) -> Option<Result<DhcpOption>> {
        return self.get(code).map(|data| DhcpOption::parse(code, data));
    }

    /// Typed view of every option. Options that fail to decode are
    /// returned as unrecognized raw options.
    pub fn options(&self) -> Vec<DhcpOption> {
        return self
            .iter()
            .map(|(code, data)| DhcpOption::parse_or_raw(code, data))
            .collect();
    }

    get_option!(subnet_mask, DhcpOptions::SUBNET_MASK, SubnetMask, Ipv4Addr);
    get_option!(router, DhcpOptions::ROUTER, Router, Vec<Ipv4Addr>);
    get_option!(
        dns,
        DhcpOptions::DOMAIN_NAME_SERVER,
        DomainNameServer,
        Vec<Ipv4Addr>
    );
    get_option!(
        ntp_servers,
        DhcpOptions::NTP_SERVERS,
        NtpServers,
        Vec<Ipv4Addr>
    );
    get_option!(
        server_identifier,
        DhcpOptions::DHCP_SERVER_ID,
        ServerIdentifier,
        Vec<Ipv4Addr>
    );
    get_option!(
        broadcast_address,
        DhcpOptions::BROADCAST_ADDRESS,
        BroadcastAddress,
        Ipv4Addr
    );
    get_option!(
        requested_ip_address,
        DhcpOptions::REQUESTED_IP_ADDRESS,
        RequestedIpAddress,
        Ipv4Addr
    );
    get_option!(host_name, DhcpOptions::HOSTNAME, HostName, Vec<u8>);
    get_option!(domain_name, DhcpOptions::DOMAIN_NAME, DomainName, Vec<u8>);
    get_option!(root_path, DhcpOptions::ROOT_PATH, RootPath, Vec<u8>);
    get_option!(
        class_identifier,
        DhcpOptions::CLASS_IDENTIFIER,
        ClassIdentifier,
        Vec<u8>
    );
    get_option!(
        tftp_server_name,
        DhcpOptions::TFTP_SERVER_NAME,
        TftpServerName,
        Vec<u8>
    );
    get_option!(
        bootfile_name,
        DhcpOptions::BOOTFILE_NAME,
        BootfileName,
        Vec<u8>
    );
    get_option!(message, DhcpOptions::MESSAGE, Message, Vec<u8>);
    get_option!(
        lease_time,
        DhcpOptions::IP_ADDRESS_LEASE_TIME,
        IpAddressLeaseTime,
        Duration
    );
    get_option!(renewal_time, DhcpOptions::RENEWAL_TIME, RenewalTime, Duration);
    get_option!(
        rebinding_time,
        DhcpOptions::REBINDING_TIME,
        RebindingTime,
        Duration
    );
    get_option!(message_type, DhcpOptions::DHCP_MSG_TYPE, DhcpMsgType, u8);
    get_option!(
        parameter_request_list,
        DhcpOptions::PARAMETER_REQUEST_LIST,
        ParameterRequestList,
        Vec<u8>
    );
    get_option!(
        max_message_size,
        DhcpOptions::MAXIMUM_DHCP_MESSAGE_SIZE,
        MaximumMessageSize,
        u16
    );
    get_option!(user_class, DhcpOptions::USER_CLASS, UserClass, UserClass);
    get_option!(client_fqdn, DhcpOptions::CLIENT_FQDN, ClientFqdn, ClientFqdn);
    get_option!(
        relay_agent_info,
        DhcpOptions::RELAY_AGENT_INFORMATION,
        RelayAgentInfo,
        Options
    );
    get_option!(
        client_arch,
        DhcpOptions::CLIENT_SYSTEM_ARCHITECTURE_TYPE,
        ClientArch,
        Vec<Arch>
    );
    get_option!(
        domain_search,
        DhcpOptions::DNS_DOMAIN_SEARCH_LIST,
        DomainSearch,
        Vec<String>
    );
    get_option!(
        vendor_class,
        DhcpOptions::VENDOR_IDENTIFYING_VENDOR_CLASS,
        VendorClass,
        Vec<VendorClassId>
    );
}

/// Writes one option as TLV. Data longer than 255 bytes is split in
/// consecutive instances of the same code (RFC 3396).
pub fn write_option(w: &mut Writer, code: u8, data: &[u8]) {
    if code == DhcpOptions::PAD {
        w.write_u8(code);
        return;
    }

    if data.is_empty() {
        w.write_u8(code);
        w.write_u8(0);
        return;
    }

    for chunk in data.chunks(u8::MAX as usize) {
        w.write_u8(code);
        w.write_u8(chunk.len() as u8);
        w.write_bytes(chunk);
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for opt in self.options() {
            // Nested containers come in several lines
            let s = opt.to_string().replace('\n', "\n    ");
            writeln!(f, "    {}", s)?;
        }
        return Ok(());
    }
}

#[allow(non_snake_case)]
pub mod DhcpOptions {

    pub const PAD: u8 = 0;

    pub const SUBNET_MASK: u8 = 1;

    pub const ROUTER: u8 = 3;

    pub const NAME_SERVER: u8 = 5;
    pub const DOMAIN_NAME_SERVER: u8 = 6;

    pub const HOSTNAME: u8 = 12;

    pub const DOMAIN_NAME: u8 = 15;

    pub const ROOT_PATH: u8 = 17;

    pub const BROADCAST_ADDRESS: u8 = 28;

    pub const NTP_SERVERS: u8 = 42;
    pub const VENDOR_SPECIFIC_INFO: u8 = 43;
    pub const NETBIOS_NAME_SERVER: u8 = 44;

    pub const REQUESTED_IP_ADDRESS: u8 = 50;
    pub const IP_ADDRESS_LEASE_TIME: u8 = 51;
    pub const OPTION_OVERLOAD: u8 = 52;
    pub const DHCP_MSG_TYPE: u8 = 53;
    pub const DHCP_SERVER_ID: u8 = 54;
    pub const PARAMETER_REQUEST_LIST: u8 = 55;
    pub const MESSAGE: u8 = 56;
    pub const MAXIMUM_DHCP_MESSAGE_SIZE: u8 = 57;
    pub const RENEWAL_TIME: u8 = 58;
    pub const REBINDING_TIME: u8 = 59;
    pub const CLASS_IDENTIFIER: u8 = 60;
    pub const CLIENT_IDENTIFIER: u8 = 61;

    pub const TFTP_SERVER_NAME: u8 = 66;
    pub const BOOTFILE_NAME: u8 = 67;

    pub const USER_CLASS: u8 = 77;

    pub const CLIENT_FQDN: u8 = 81;
    pub const RELAY_AGENT_INFORMATION: u8 = 82;

    pub const CLIENT_SYSTEM_ARCHITECTURE_TYPE: u8 = 93;

    pub const DNS_DOMAIN_SEARCH_LIST: u8 = 119;

    pub const VENDOR_IDENTIFYING_VENDOR_CLASS: u8 = 124;

    pub const WPAD: u8 = 252;

    pub const END: u8 = 255;

    pub fn name(code: u8) -> Option<&'static str> {
        match code {
            PAD => Some("Pad"),
            SUBNET_MASK => Some("Subnet Mask"),
            ROUTER => Some("Router"),
            NAME_SERVER => Some("Name Server"),
            DOMAIN_NAME_SERVER => Some("Domain Name Server"),
            HOSTNAME => Some("Host Name"),
            DOMAIN_NAME => Some("Domain Name"),
            ROOT_PATH => Some("Root Path"),
            BROADCAST_ADDRESS => Some("Broadcast Address"),
            NTP_SERVERS => Some("NTP Servers"),
            VENDOR_SPECIFIC_INFO => Some("Vendor Specific Information"),
            NETBIOS_NAME_SERVER => Some("NetBIOS Name Server"),
            REQUESTED_IP_ADDRESS => Some("Requested IP Address"),
            IP_ADDRESS_LEASE_TIME => Some("IP Addresses Lease Time"),
            OPTION_OVERLOAD => Some("Option Overload"),
            DHCP_MSG_TYPE => Some("DHCP Message Type"),
            DHCP_SERVER_ID => Some("Server Identifier"),
            PARAMETER_REQUEST_LIST => Some("Parameter Request List"),
            MESSAGE => Some("Message"),
            MAXIMUM_DHCP_MESSAGE_SIZE => Some("Maximum DHCP Message Size"),
            RENEWAL_TIME => Some("Renewal Time"),
            REBINDING_TIME => Some("Rebinding Time"),
            CLASS_IDENTIFIER => Some("Class Identifier"),
            CLIENT_IDENTIFIER => Some("Client Identifier"),
            TFTP_SERVER_NAME => Some("TFTP Server Name"),
            BOOTFILE_NAME => Some("Bootfile Name"),
            USER_CLASS => Some("User Class Information"),
            CLIENT_FQDN => Some("Client FQDN"),
            RELAY_AGENT_INFORMATION => Some("Relay Agent Information"),
            CLIENT_SYSTEM_ARCHITECTURE_TYPE => {
                Some("Client System Architecture Type")
            }
            DNS_DOMAIN_SEARCH_LIST => Some("DNS Domain Search List"),
            VENDOR_IDENTIFYING_VENDOR_CLASS => {
                Some("Vendor-Identifying Vendor Class")
            }
            WPAD => Some("WPAD"),
            END => Some("End"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(entries: Vec<(u8, Vec<u8>)>) -> Options {
        let mut o = Options::new();
        for (code, data) in entries {
            o.update_raw(code, data);
        }
        return o;
    }

    #[test]
    fn test_marshal_empty() {
        assert_eq!(Options::new().to_bytes(true), vec![255]);
        assert!(Options::new().to_bytes(false).is_empty());
    }

    #[test]
    fn test_marshal_sorted() {
        let o = opts(vec![(100, vec![101, 102, 103]), (5, vec![1, 2, 3])]);
        assert_eq!(
            o.to_bytes(true),
            vec![5, 3, 1, 2, 3, 100, 3, 101, 102, 103, 255]
        );
    }

    #[test]
    fn test_marshal_is_idempotent() {
        let o = opts(vec![
            (54, vec![10, 0, 0, 1]),
            (3, vec![10, 0, 0, 1]),
            (12, b"pc".to_vec()),
        ]);
        assert_eq!(o.to_bytes(true), o.to_bytes(true));
    }

    #[test]
    fn test_marshal_end_written_last() {
        let o = opts(vec![(255, vec![]), (5, vec![1])]);
        assert_eq!(o.to_bytes(true), vec![5, 1, 1, 255]);
        assert_eq!(o.to_bytes(false), vec![5, 1, 1]);
    }

    #[test]
    fn test_marshal_rfc3396_split() {
        let data = vec![10u8; 257];
        let o = opts(vec![(5, data.clone())]);
        let raw = o.to_bytes(true);

        let mut expected = vec![5, 255];
        expected.extend(vec![10u8; 255]);
        expected.extend(&[5, 2, 10, 10, 255]);
        assert_eq!(raw, expected);

        let parsed = Options::from_bytes(&raw).unwrap();
        assert_eq!(parsed.get(5), Some(&data[..]));
    }

    #[test]
    fn test_marshal_pad_without_length() {
        let o = opts(vec![(0, vec![0, 0]), (3, vec![1])]);
        assert_eq!(o.to_bytes(false), vec![0, 3, 1, 1]);
    }

    #[test]
    fn test_marshal_zero_length_option() {
        let raw = [3, 0, 255];
        let o = Options::from_bytes(&raw).unwrap();
        assert_eq!(o.to_bytes(true), raw.to_vec());
    }

    #[test]
    fn test_unmarshal_empty_input() {
        let o = Options::from_bytes(&[]).unwrap();
        assert!(o.is_empty());
    }

    #[test]
    fn test_unmarshal_only_end() {
        let o = Options::from_bytes(&[255]).unwrap();
        assert_eq!(o, Options::new());
    }

    #[test]
    fn test_unmarshal_missing_data() {
        let err = Options::from_bytes(&[3, 3, 1]).unwrap_err();
        assert_eq!(
            err,
            Error::ShortBuffer {
                wanted: 3,
                remaining: 1
            }
        );
    }

    #[test]
    fn test_unmarshal_missing_length() {
        assert!(Options::from_bytes(&[3]).is_err());
    }

    #[test]
    fn test_unmarshal_missing_end() {
        // The zeros after the option are padding, End never comes
        let err = Options::from_bytes(&[3, 3, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(err, Err(Error::UnexpectedEnd));
    }

    #[test]
    fn test_unmarshal_option_after_end() {
        assert_eq!(Options::from_bytes(&[255, 3]), Err(Error::InvalidOptions));
    }

    #[test]
    fn test_unmarshal_zero_length() {
        let o = Options::from_bytes(&[3, 0, 255]).unwrap();
        assert!(o.has(3));
        assert_eq!(o.get(3), Some(&[][..]));
    }

    #[test]
    fn test_unmarshal_pads_dropped() {
        let o = Options::from_bytes(&[10, 2, 0xff, 0xfe, 0, 0, 255]).unwrap();
        assert_eq!(o.len(), 1);
        assert_eq!(o.get(10), Some(&[0xff, 0xfe][..]));
        assert!(!o.has(0));
    }

    #[test]
    fn test_unmarshal_pads_between_options() {
        let o = Options::from_bytes(&[0, 10, 1, 7, 0, 0, 11, 1, 8, 255])
            .unwrap();
        assert_eq!(o.get(10), Some(&[7][..]));
        assert_eq!(o.get(11), Some(&[8][..]));
        assert_eq!(o.len(), 2);
    }

    #[test]
    fn test_unmarshal_trailing_pads_after_end() {
        let mut raw = vec![10, 2, 255, 254, 255];
        raw.extend(vec![0u8; 255]);
        let o = Options::from_bytes(&raw).unwrap();
        assert_eq!(o.get(10), Some(&[255, 254][..]));
    }

    #[test]
    fn test_unmarshal_concatenates_instances() {
        let mut raw = vec![3, 255];
        raw.extend(vec![10u8; 255]);
        raw.extend(&[3, 5, 10, 10, 10, 10, 10, 255]);
        let o = Options::from_bytes(&raw).unwrap();
        assert_eq!(o.get(3), Some(&vec![10u8; 260][..]));
    }

    #[test]
    fn test_unmarshal_repeated_code_is_not_last_write_wins() {
        let o = Options::from_bytes(&[3, 1, 1, 4, 1, 9, 3, 1, 2, 255])
            .unwrap();
        assert_eq!(o.get(3), Some(&[1, 2][..]));
    }

    #[test]
    fn test_unmarshal_nested_without_end() {
        let o = Options::from_bytes_nested(&[1, 1, 7, 2, 1, 8]).unwrap();
        assert_eq!(o.get(1), Some(&[7][..]));
        assert_eq!(o.get(2), Some(&[8][..]));
        assert!(Options::from_bytes(&[1, 1, 7, 2, 1, 8]).is_err());
    }

    #[test]
    fn test_add_appends_and_update_replaces() {
        let mut o = Options::new();
        o.add(&DhcpOption::HostName(b"foo".to_vec())).unwrap();
        o.add(&DhcpOption::HostName(b"bar".to_vec())).unwrap();
        assert_eq!(o.get(DhcpOptions::HOSTNAME), Some(&b"foobar"[..]));

        o.update(&DhcpOption::HostName(b"baz".to_vec())).unwrap();
        assert_eq!(o.host_name(), Some(b"baz".to_vec()));

        assert_eq!(o.remove(DhcpOptions::HOSTNAME), Some(b"baz".to_vec()));
        assert!(o.is_empty());
    }

    #[test]
    fn test_add_out_of_range_leaves_options_untouched() {
        let mut o = Options::new();
        o.update_raw(DhcpOptions::IP_ADDRESS_LEASE_TIME, vec![0, 0, 0, 60]);
        let lease = Duration::from_secs(u32::MAX as u64 + 1);

        assert!(o.update(&DhcpOption::IpAddressLeaseTime(lease)).is_err());
        assert!(o.add(&DhcpOption::IpAddressLeaseTime(lease)).is_err());
        assert_eq!(o.lease_time(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_typed_getters() {
        let raw = [
            3, 4, 192, 168, 0, 1, //
            51, 4, 0, 0, 168, 192, //
            53, 1, 1, //
            255,
        ];
        let o = Options::from_bytes(&raw).unwrap();
        assert_eq!(o.router(), Some(vec![Ipv4Addr::new(192, 168, 0, 1)]));
        assert_eq!(o.lease_time(), Some(Duration::from_secs(43200)));
        assert_eq!(o.message_type(), Some(1));
        assert_eq!(o.dns(), None);
    }

    #[test]
    fn test_typed_decode_failure_is_per_option() {
        // Router with 3 bytes is invalid, the host name is still readable
        let raw = [3, 3, 1, 2, 3, 12, 2, b'p', b'c', 255];
        let o = Options::from_bytes(&raw).unwrap();
        assert!(matches!(o.option(3), Some(Err(_))));
        assert_eq!(o.router(), None);
        assert_eq!(o.host_name(), Some(b"pc".to_vec()));
        assert_eq!(o.get(3), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn test_display() {
        let o = opts(vec![(12, b"foo".to_vec()), (102, vec![1])]);
        assert_eq!(o.to_string(), "    Host Name: foo\n    Unknown: [1]\n");
    }

    #[test]
    fn test_option_names() {
        assert_eq!(DhcpOptions::name(53), Some("DHCP Message Type"));
        assert_eq!(DhcpOptions::name(102), None);
    }
}
