//! Tests for byte order detection and the stream handlers

extern crate std;

use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};

#[test]
fn test_detects_both_markers() {
    let mut cursor = Cursor::new(b"II*\0".to_vec());
    std::assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::LittleEndian);

    let mut cursor = Cursor::new(b"MM\0*".to_vec());
    std::assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::BigEndian);

    let mut cursor = Cursor::new(b"IM*\0".to_vec());
    std::assert!(ByteOrder::detect(&mut cursor).is_err());
}

#[test]
fn test_handlers_read_sample_values() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let mut buffer = Vec::new();
        match order {
            ByteOrder::LittleEndian => {
                buffer.write_i16::<LittleEndian>(-9999).unwrap();
                buffer.write_f32::<LittleEndian>(15.5).unwrap();
                buffer.write_f64::<LittleEndian>(-0.125).unwrap();
                buffer.write_u32::<LittleEndian>(3).unwrap();
                buffer.write_u32::<LittleEndian>(4).unwrap();
            }
            ByteOrder::BigEndian => {
                buffer.write_i16::<BigEndian>(-9999).unwrap();
                buffer.write_f32::<BigEndian>(15.5).unwrap();
                buffer.write_f64::<BigEndian>(-0.125).unwrap();
                buffer.write_u32::<BigEndian>(3).unwrap();
                buffer.write_u32::<BigEndian>(4).unwrap();
            }
        }

        let handler = order.create_handler();
        std::assert_eq!(handler.byte_order(), order);

        let mut cursor = Cursor::new(buffer);
        std::assert_eq!(handler.read_i16(&mut cursor).unwrap(), -9999);
        std::assert_eq!(handler.read_f32(&mut cursor).unwrap(), 15.5);
        std::assert_eq!(handler.read_f64(&mut cursor).unwrap(), -0.125);
        std::assert_eq!(handler.read_rational(&mut cursor).unwrap(), (3, 4));
    }
}

#[test]
fn test_uint_codec_widths() {
    let mut bytes = [0u8; 8];
    ByteOrder::BigEndian.write_uint(&mut bytes, 4, 42113);
    std::assert_eq!(&bytes[..4], &[0, 0, 0xA4, 0x81]);
    std::assert_eq!(ByteOrder::BigEndian.read_uint(&bytes, 4), 42113);

    ByteOrder::LittleEndian.write_uint(&mut bytes, 2, 34735);
    std::assert_eq!(&bytes[..2], &[0xAF, 0x87]);
    std::assert_eq!(ByteOrder::LittleEndian.read_uint(&bytes, 2), 34735);

    ByteOrder::LittleEndian.write_uint(&mut bytes, 8, u64::MAX - 1);
    std::assert_eq!(ByteOrder::LittleEndian.read_uint(&bytes, 8), u64::MAX - 1);
    std::assert_eq!(ByteOrder::BigEndian.read_uint(&[7], 1), 7);
}
