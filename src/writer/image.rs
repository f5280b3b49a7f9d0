//! Image format sniffing from magic bytes; pixel size read from the header.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// EMUs per CSS pixel at 96 dpi.
pub const EMU_PER_PX: u64 = 9525;

impl LoadedImage {
    /// Size in EMUs, scaled down proportionally to fit `max_width`.
    pub fn emu_size(&self, max_width: u64) -> (u64, u64) {
        self.fit(max_width, u64::MAX)
    }

    /// Size in EMUs, scaled down proportionally to fit the box. Neither side
    /// drops below one EMU.
    pub fn fit(&self, max_width: u64, max_height: u64) -> (u64, u64) {
        let px = u128::from(EMU_PER_PX);
        let mut w = u128::from(self.width.max(1)) * px;
        let mut h = u128::from(self.height.max(1)) * px;
        let (max_w, max_h) = (u128::from(max_width.max(1)), u128::from(max_height.max(1)));
        if w > max_w {
            h = (h * max_w / w).max(1);
            w = max_w;
        }
        if h > max_h {
            w = (w * max_h / h).max(1);
            h = max_h;
        }
        (clamp_u64(w), clamp_u64(h))
    }
}

fn clamp_u64(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

fn be16(b: &[u8], at: usize) -> Option<u32> {
    Some(u32::from(u16::from_be_bytes([*b.get(at)?, *b.get(at + 1)?])))
}

fn be32(b: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes([*b.get(at)?, *b.get(at + 1)?, *b.get(at + 2)?, *b.get(at + 3)?]))
}

fn le16(b: &[u8], at: usize) -> Option<u32> {
    Some(u32::from(u16::from_le_bytes([*b.get(at)?, *b.get(at + 1)?])))
}

fn png_size(b: &[u8]) -> Option<(u32, u32)> {
    // Signature, then the IHDR chunk: length, type, width, height.
    if b.get(12..16)? != b"IHDR" {
        return None;
    }
    Some((be32(b, 16)?, be32(b, 20)?))
}

fn gif_size(b: &[u8]) -> Option<(u32, u32)> {
    Some((le16(b, 6)?, le16(b, 8)?))
}

fn jpeg_size(b: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2usize;
    while i + 4 <= b.len() {
        if b[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = b[i + 1];
        match marker {
            0xFF => i += 1,
            0xD8 | 0x01 | 0xD0..=0xD7 => i += 2,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                // SOFn: length(2) precision(1) height(2) width(2)
                return Some((be16(b, i + 7)?, be16(b, i + 5)?));
            }
            _ => {
                let len = be16(b, i + 2)? as usize;
                i += 2 + len;
            }
        }
    }
    None
}

/// Recognizes PNG, JPEG and GIF; anything else is `None`.
pub fn sniff(bytes: Vec<u8>) -> Option<LoadedImage> {
    let (format, (width, height)) = if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        (ImageFormat::Png, png_size(&bytes)?)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        (ImageFormat::Jpeg, jpeg_size(&bytes)?)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        (ImageFormat::Gif, gif_size(&bytes)?)
    } else {
        return None;
    };
    Some(LoadedImage {
        format,
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Header-only PNG: enough for sniffing, not a decodable image.
    pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut b = b"\x89PNG\r\n\x1a\n".to_vec();
        b.extend_from_slice(&13u32.to_be_bytes());
        b.extend_from_slice(b"IHDR");
        b.extend_from_slice(&width.to_be_bytes());
        b.extend_from_slice(&height.to_be_bytes());
        b.extend_from_slice(&[8, 6, 0, 0, 0]);
        b
    }

    #[test]
    fn sniffs_png() {
        let img = sniff(png_header(640, 480)).unwrap();
        assert_eq!(img.format, ImageFormat::Png);
        assert_eq!((img.width, img.height), (640, 480));
    }

    #[test]
    fn sniffs_gif_and_jpeg() {
        let mut gif = b"GIF89a".to_vec();
        gif.extend_from_slice(&[0x20, 0x00, 0x10, 0x00]);
        let img = sniff(gif).unwrap();
        assert_eq!((img.format, img.width, img.height), (ImageFormat::Gif, 32, 16));

        let jpeg = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, // APP0, 2 payload bytes
            0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x64, 0x00, 0xC8, 0x03, 0, 0, 0,
        ];
        let img = sniff(jpeg).unwrap();
        assert_eq!((img.format, img.width, img.height), (ImageFormat::Jpeg, 200, 100));
    }

    #[test]
    fn rejects_unknown_bytes() {
        assert!(sniff(b"<svg/>".to_vec()).is_none());
        assert!(sniff(b"\x89PNG\r\n\x1a\n".to_vec()).is_none());
    }

    #[test]
    fn scales_to_max_width() {
        let img = sniff(png_header(2000, 1000)).unwrap();
        let (w, h) = img.emu_size(1000 * EMU_PER_PX);
        assert_eq!((w, h), (1000 * EMU_PER_PX, 500 * EMU_PER_PX));
    }

    #[test]
    fn huge_header_dimensions_do_not_overflow() {
        let img = sniff(png_header(2000, 4_000_000_000)).unwrap();
        let max = 6 * 914_400;
        let (w, h) = img.emu_size(max);
        assert_eq!(w, max);
        assert_eq!(h, 4_000_000_000 / 2000 * max);

        let (w, h) = img.fit(max, 9 * 914_400);
        assert_eq!(h, 9 * 914_400);
        assert!(w >= 1 && w < max);

        let wide = sniff(png_header(u32::MAX, 1)).unwrap();
        assert_eq!(wide.fit(max, max), (max, 1));
    }
}
