use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

/// Creates a test buffer with TIFF header and sample data
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<LittleEndian>(8).unwrap();      // IFD offset

    // Sample IFD (at offset 8)
    buffer.write_u16::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u32::<LittleEndian>(800).unwrap();    // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(3).unwrap();      // Type (SHORT)
    buffer.write_u32::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u16::<LittleEndian>(600).unwrap();    // Value (height)
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Padding

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a test buffer with BigTIFF header and sample data
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // BigTIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    // Sample IFD (at offset 16)
    buffer.write_u64::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(1024).unwrap();   // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(768).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a big-endian 3x2 Float32 image in two strips
///
/// Pixel (row, col) holds `row * 10 + col + 0.5`. The second strip is
/// sparse (byte count 0), so row 1 reads as the fill value. A GDAL_NODATA tag
/// of "-9999" is stored externally.
pub fn create_big_endian_float_tiff() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();
    let entry_count: u16 = 10;
    let ifd_offset: u32 = 8;
    let data_offset = ifd_offset + 2 + 12 * entry_count as u32 + 4;
    let nodata_offset = data_offset + 12;

    buffer.write_u16::<BigEndian>(0x4D4D).unwrap();
    buffer.write_u16::<BigEndian>(42).unwrap();
    buffer.write_u32::<BigEndian>(ifd_offset).unwrap();

    buffer.write_u16::<BigEndian>(entry_count).unwrap();
    let short = |buf: &mut Vec<u8>, tag: u16, value: u16| {
        buf.write_u16::<BigEndian>(tag).unwrap();
        buf.write_u16::<BigEndian>(3).unwrap();
        buf.write_u32::<BigEndian>(1).unwrap();
        buf.write_u16::<BigEndian>(value).unwrap();
        buf.write_u16::<BigEndian>(0).unwrap();
    };
    short(&mut buffer, 256, 3);   // ImageWidth
    short(&mut buffer, 257, 2);   // ImageLength
    short(&mut buffer, 258, 32);  // BitsPerSample
    short(&mut buffer, 259, 1);   // Compression

    // StripOffsets: two SHORTs fit inline
    buffer.write_u16::<BigEndian>(273).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(2).unwrap();
    buffer.write_u16::<BigEndian>(data_offset as u16).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();

    short(&mut buffer, 277, 1);   // SamplesPerPixel
    short(&mut buffer, 278, 1);   // RowsPerStrip

    // StripByteCounts: two SHORTs inline, second strip sparse
    buffer.write_u16::<BigEndian>(279).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(2).unwrap();
    buffer.write_u16::<BigEndian>(12).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();

    short(&mut buffer, 339, 3);   // SampleFormat = IEEE float

    // GDAL_NODATA, ASCII "-9999\0" stored externally
    buffer.write_u16::<BigEndian>(42113).unwrap();
    buffer.write_u16::<BigEndian>(2).unwrap();
    buffer.write_u32::<BigEndian>(6).unwrap();
    buffer.write_u32::<BigEndian>(nodata_offset).unwrap();

    buffer.write_u32::<BigEndian>(0).unwrap();

    for col in 0..3 {
        buffer.write_f32::<BigEndian>(col as f32 + 0.5).unwrap();
    }
    buffer.extend_from_slice(b"-9999\0");

    Cursor::new(buffer)
}
