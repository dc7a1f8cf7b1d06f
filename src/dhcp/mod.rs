mod cursor;
mod err;
mod helpers;
mod labels;
mod user_class;

pub mod bsdp;
pub mod modifiers;
pub mod option;
pub mod options;
pub mod packet;

pub use cursor::{Cursor, Writer};
pub use err::{Error, Result};
pub use modifiers::Modifier;
pub use option::{
    Arch, ClientFqdn, DhcpMessageTypes, DhcpOption, RawDhcpOption,
    RelayAgentSubOptions, UserClass, UserClassStyle, VendorClassId,
};
pub use options::{DhcpOptions, Options};
pub use packet::DhcpPacket;

pub const DHCP_SERVER_PORT: u16 = 67;
pub const DHCP_CLIENT_PORT: u16 = 68;
