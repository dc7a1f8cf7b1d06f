//! Encoding and decoding of DHCPv4 packets and options.

pub mod dhcp;
