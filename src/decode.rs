use crate::args;
use crate::readin::read_inputs;
use dhcpwire::dhcp::{bsdp, DhcpPacket, Options};
use log::{info, warn};
use regex::Regex;

pub fn main(args: args::decode::Arguments) -> Result<(), String> {
    let separators = Regex::new(r"[\s:\-]")
        .map_err(|e| format!("Unable to build separators regex: {}", e))?;

    for line in read_inputs(args.inputs, true, true) {
        let raw = match parse_hex(&separators, &line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        info!("Decoding {} bytes", raw.len());

        if args.options_only {
            match Options::unmarshal(&raw, !args.nested) {
                Ok(options) => print!("{}", options),
                Err(e) => warn!("Invalid options '{}': {}", line, e),
            }
        } else {
            match DhcpPacket::parse(&raw) {
                Ok(packet) => show_packet(&packet),
                Err(e) => warn!("Invalid packet '{}': {}", line, e),
            }
        }
        println!("");
    }

    return Ok(());
}

fn show_packet(packet: &DhcpPacket) {
    print!("{}", packet.summary());

    match bsdp::boot_image_list(&packet.options) {
        Some(Ok(images)) => {
            println!("BSDP Boot Image List ->");
            for image in images {
                println!("  {}", image);
            }
        }
        Some(Err(e)) => warn!("Invalid BSDP boot image list: {}", e),
        None => {}
    }
}

fn parse_hex(separators: &Regex, line: &str) -> Result<Vec<u8>, String> {
    let cleaned = separators.replace_all(line, "");
    let hex = cleaned.strip_prefix("0x").unwrap_or(&cleaned[..]);

    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(format!("Invalid value '{}': Not hexadecimal bytes", line));
    }

    return (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                format!("Invalid value '{}': Not hexadecimal bytes", line)
            })
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separators() -> Regex {
        Regex::new(r"[\s:\-]").unwrap()
    }

    #[test]
    fn test_parse_hex() {
        let re = separators();
        let expected = vec![12, 3, 0x66, 0x6f, 0x6f, 0xff];
        assert_eq!(parse_hex(&re, "0c03666f6fff"), Ok(expected.clone()));
        assert_eq!(parse_hex(&re, "0c:03-66 6f 6f ff"), Ok(expected));
        assert_eq!(parse_hex(&re, "0xFF"), Ok(vec![0xff]));
    }

    #[test]
    fn test_parse_hex_invalid() {
        let re = separators();
        assert!(parse_hex(&re, "abc").is_err());
        assert!(parse_hex(&re, "zz").is_err());
        assert!(parse_hex(&re, "é0").is_err());
    }
}
