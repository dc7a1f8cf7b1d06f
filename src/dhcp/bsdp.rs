//! Apple Boot Service Discovery Protocol records, carried inside the
//! vendor specific information option (43).

use super::cursor::{Cursor, Writer};
use super::err::Result;
use super::helpers::{len_u8, text};
use super::options::{DhcpOptions, Options};
use std::fmt;

#[allow(non_snake_case)]
pub mod BsdpOptions {
    pub const MESSAGE_TYPE: u8 = 1;
    pub const VERSION: u8 = 2;
    pub const SERVER_IDENTIFIER: u8 = 3;
    pub const SERVER_PRIORITY: u8 = 4;
    pub const REPLY_PORT: u8 = 5;
    pub const BOOT_IMAGE_LIST_PATH: u8 = 6;
    pub const DEFAULT_BOOT_IMAGE_ID: u8 = 7;
    pub const SELECTED_BOOT_IMAGE_ID: u8 = 8;
    pub const BOOT_IMAGE_LIST: u8 = 9;
    pub const NETBOOT_1_0_FIRMWARE: u8 = 10;
    pub const BOOT_IMAGE_ATTRIBUTES_FILTER_LIST: u8 = 11;
    pub const MAX_MESSAGE_LENGTH: u8 = 12;

    pub fn name(code: u8) -> Option<&'static str> {
        match code {
            MESSAGE_TYPE => Some("BSDP Message Type"),
            VERSION => Some("BSDP Version"),
            SERVER_IDENTIFIER => Some("BSDP Server Identifier"),
            SERVER_PRIORITY => Some("BSDP Server Priority"),
            REPLY_PORT => Some("BSDP Reply Port"),
            BOOT_IMAGE_LIST_PATH => Some("BSDP Boot Image List Path"),
            DEFAULT_BOOT_IMAGE_ID => Some("BSDP Default Boot Image ID"),
            SELECTED_BOOT_IMAGE_ID => Some("BSDP Selected Boot Image ID"),
            BOOT_IMAGE_LIST => Some("BSDP Boot Image List"),
            NETBOOT_1_0_FIRMWARE => Some("BSDP NetBoot 1.0 Firmware"),
            BOOT_IMAGE_ATTRIBUTES_FILTER_LIST => {
                Some("BSDP Boot Image Attributes Filter List")
            }
            MAX_MESSAGE_LENGTH => Some("BSDP Max Message Length"),
            _ => None,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BootImageType {
    MacOS9,
    MacOSX,
    MacOSXServer,
    HardwareDiagnostics,
    Other(u8),
}

impl BootImageType {
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::MacOS9 => Some("macOS 9"),
            Self::MacOSX => Some("macOS"),
            Self::MacOSXServer => Some("macOS Server"),
            Self::HardwareDiagnostics => Some("Hardware Diagnostics"),
            Self::Other(_) => None,
        }
    }
}

impl From<u8> for BootImageType {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::MacOS9,
            1 => Self::MacOSX,
            2 => Self::MacOSXServer,
            3 => Self::HardwareDiagnostics,
            v => Self::Other(v),
        }
    }
}

impl From<BootImageType> for u8 {
    fn from(t: BootImageType) -> Self {
        match t {
            BootImageType::MacOS9 => 0,
            BootImageType::MacOSX => 1,
            BootImageType::MacOSXServer => 2,
            BootImageType::HardwareDiagnostics => 3,
            BootImageType::Other(v) => v,
        }
    }
}

impl fmt::Display for BootImageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "unknown type {}", u8::from(*self)),
        }
    }
}

const INSTALL_BIT: u8 = 0x80;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct BootImageId {
    pub is_install: bool,
    pub image_type: BootImageType,
    pub index: u16,
}

impl BootImageId {
    pub fn parse(buf: &mut Cursor) -> Self {
        let attributes = buf.read_u8();
        let _reserved = buf.read_u8();
        let index = buf.read_u16();

        return Self {
            is_install: attributes & INSTALL_BIT != 0,
            image_type: BootImageType::from(attributes & !INSTALL_BIT),
            index,
        };
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut buf = Cursor::new(data);
        let id = Self::parse(&mut buf);
        buf.finish()?;
        return Ok(id);
    }

    pub fn write(&self, w: &mut Writer) {
        let mut attributes = u8::from(self.image_type) & !INSTALL_BIT;
        if self.is_install {
            attributes |= INSTALL_BIT;
        }
        w.write_u8(attributes);
        w.write_u8(0);
        w.write_u16(self.index);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        return w.into_bytes();
    }
}

impl fmt::Display for BootImageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let install = if self.is_install {
            "installable"
        } else {
            "uninstallable"
        };
        write!(f, "[{}] {} {} image", self.index, install, self.image_type)
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BootImage {
    pub id: BootImageId,
    /// Name bytes as announced, usually but not always UTF-8.
    pub name: Vec<u8>,
}

impl BootImage {
    /// Reads one record. Errors are left in the cursor.
    pub fn parse(buf: &mut Cursor) -> Self {
        let id = BootImageId::parse(buf);
        let len = buf.read_u8() as usize;
        let name = buf.copy_n(len);

        return Self { id, name };
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut buf = Cursor::new(data);
        let image = Self::parse(&mut buf);
        buf.finish()?;
        return Ok(image);
    }

    /// Fails if the name is longer than 255 bytes.
    pub fn write(&self, w: &mut Writer) -> Result<()> {
        let len = len_u8("boot image name length", self.name.len())?;
        self.id.write(w);
        w.write_u8(len);
        w.write_bytes(&self.name);
        return Ok(());
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write(&mut w)?;
        return Ok(w.into_bytes());
    }
}

impl fmt::Display for BootImage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", text(&self.name), self.id)
    }
}

/// Payload of the boot image list option. One malformed record fails
/// the whole list.
pub fn parse_boot_image_list(data: &[u8]) -> Result<Vec<BootImage>> {
    let mut buf = Cursor::new(data);
    let mut images = Vec::new();
    while buf.has(1) {
        let image = BootImage::parse(&mut buf);
        if buf.error().is_some() {
            break;
        }
        images.push(image);
    }
    buf.finish()?;

    return Ok(images);
}

pub fn boot_image_list_to_bytes(images: &[BootImage]) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    for image in images {
        image.write(&mut w)?;
    }
    return Ok(w.into_bytes());
}

/// Boot images announced in the BSDP sub-options of the vendor specific
/// information option.
pub fn boot_image_list(options: &Options) -> Option<Result<Vec<BootImage>>> {
    let vendor = options.get(DhcpOptions::VENDOR_SPECIFIC_INFO)?;
    let vendor = match Options::from_bytes_nested(vendor) {
        Ok(vendor) => vendor,
        Err(e) => return Some(Err(e)),
    };

    return vendor
        .get(BsdpOptions::BOOT_IMAGE_LIST)
        .map(parse_boot_image_list);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dhcp::err::Error;

    fn image(
        is_install: bool,
        t: BootImageType,
        index: u16,
        name: &str,
    ) -> BootImage {
        BootImage {
            id: BootImageId {
                is_install,
                image_type: t,
                index,
            },
            name: name.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_boot_image_id_to_bytes() {
        let mut id = BootImageId {
            is_install: true,
            image_type: BootImageType::MacOSX,
            index: 0x1000,
        };
        assert_eq!(id.to_bytes(), vec![0x81, 0, 0x10, 0]);

        id.is_install = false;
        assert_eq!(id.to_bytes(), vec![0x01, 0, 0x10, 0]);
    }

    #[test]
    fn test_boot_image_id_from_bytes() {
        let id = BootImageId::from_bytes(&[0x81, 0, 0x10, 0x11]).unwrap();
        assert_eq!(
            id,
            BootImageId {
                is_install: true,
                image_type: BootImageType::MacOSX,
                index: 0x1011,
            }
        );
    }

    #[test]
    fn test_boot_image_id_other_type() {
        let id = BootImageId::from_bytes(&[0x05, 0, 0, 1]).unwrap();
        assert_eq!(id.image_type, BootImageType::Other(5));
        assert_eq!(id.to_bytes(), vec![0x05, 0, 0, 1]);
    }

    #[test]
    fn test_boot_image_id_short() {
        assert_eq!(
            BootImageId::from_bytes(&[0x81, 0, 0x10]),
            Err(Error::ShortBuffer {
                wanted: 2,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_boot_image_id_string() {
        let id = BootImageId {
            is_install: false,
            image_type: BootImageType::MacOSX,
            index: 1001,
        };
        assert_eq!(id.to_string(), "[1001] uninstallable macOS image");
    }

    #[test]
    fn test_boot_image_to_bytes() {
        let img = image(true, BootImageType::MacOSX, 0x1000, "bsdp-1");
        assert_eq!(
            img.to_bytes(),
            Ok(vec![0x81, 0, 0x10, 0, 6, b'b', b's', b'd', b'p', b'-', b'1'])
        );
    }

    #[test]
    fn test_boot_image_from_bytes() {
        let data = [
            0x1, 0, 0x10, 0x10, 7, b'b', b's', b'd', b'p', b'-', b'2', b'1',
        ];
        let img = BootImage::from_bytes(&data).unwrap();
        assert_eq!(
            img,
            image(false, BootImageType::MacOSX, 0x1010, "bsdp-21")
        );
        assert_eq!(
            img.to_string(),
            "bsdp-21 [4112] uninstallable macOS image"
        );
    }

    #[test]
    fn test_boot_image_non_utf8_name() {
        let data = [0x1, 0, 0, 1, 3, b'm', 0xe9, 0xff];
        let img = BootImage::from_bytes(&data).unwrap();
        assert_eq!(img.name, vec![b'm', 0xe9, 0xff]);
        assert_eq!(img.to_bytes(), Ok(data.to_vec()));
    }

    #[test]
    fn test_boot_image_long_name() {
        let mut img = image(false, BootImageType::MacOSX, 1, "");
        img.name = vec![b'n'; 255];
        let raw = img.to_bytes().unwrap();
        assert_eq!(BootImage::from_bytes(&raw), Ok(img.clone()));

        img.name.push(b'n');
        assert!(matches!(
            img.to_bytes(),
            Err(Error::ValueTooLarge { value: 256, .. })
        ));
        assert!(boot_image_list_to_bytes(&[img]).is_err());
    }

    #[test]
    fn test_boot_image_only_id() {
        assert!(BootImage::from_bytes(&[0x1, 0, 0x10, 0x10]).is_err());
    }

    #[test]
    fn test_boot_image_short_name() {
        let data = [0x1, 0, 0x10, 0x10, 7, b'b', b's', b'd', b'p', b'-', b'2'];
        assert!(BootImage::from_bytes(&data).is_err());
    }

    #[test]
    fn test_boot_image_list() {
        let data = [
            0x1, 0x0, 0x03, 0xe9, 6, b'b', b's', b'd', b'p', b'-', b'1',
            0x80, 0x0, 0x23, 0x31, 6, b'b', b's', b'd', b'p', b'-', b'2',
        ];
        let images = parse_boot_image_list(&data).unwrap();
        assert_eq!(
            images,
            vec![
                image(false, BootImageType::MacOSX, 1001, "bsdp-1"),
                image(true, BootImageType::MacOS9, 9009, "bsdp-2"),
            ]
        );
        assert_eq!(
            images[1].to_string(),
            "bsdp-2 [9009] installable macOS 9 image"
        );
        assert_eq!(boot_image_list_to_bytes(&images), Ok(data.to_vec()));
    }

    #[test]
    fn test_boot_image_list_malformed() {
        let data = [
            0x1, 0x0, 0x03, 0xe9, 4, b'b', b's', b'd', b'p', b'-', b'1',
            0x80, 0x0, 0x23, 0x31, 6, b'b', b's', b'd', b'p', b'-', b'2',
        ];
        assert!(parse_boot_image_list(&data).is_err());
    }

    #[test]
    fn test_boot_image_list_from_vendor_info() {
        let images = vec![image(false, BootImageType::MacOSXServer, 7, "srv")];
        let mut vendor = Options::new();
        vendor.update_raw(BsdpOptions::MESSAGE_TYPE, vec![1]);
        vendor.update_raw(
            BsdpOptions::BOOT_IMAGE_LIST,
            boot_image_list_to_bytes(&images).unwrap(),
        );

        let mut options = Options::new();
        options.update_raw(
            DhcpOptions::VENDOR_SPECIFIC_INFO,
            vendor.to_bytes(false),
        );

        assert_eq!(boot_image_list(&options), Some(Ok(images)));
        assert_eq!(boot_image_list(&Options::new()), None);
    }
}
