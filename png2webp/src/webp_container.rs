//! WebP container rewriting.
//!
//! libwebp's one-shot encoder emits the simple format (a single `VP8 ` or
//! `VP8L` chunk), which cannot carry metadata. `img-parts` upgrades it to the
//! extended format (`VP8X` header with the EXIF flag) when an `EXIF` chunk is
//! added.

use img_parts::riff::{RiffChunk, RiffContent};
use img_parts::webp::{WebP, CHUNK_EXIF};
use img_parts::{Bytes, ImageEXIF};
use shared_utils::{ConvertError, Result};

/// Rewrite an encoded WebP so it carries `exif` (raw TIFF bytes). An empty
/// `exif` returns the input unchanged.
pub fn embed_exif(webp: &[u8], exif: &[u8]) -> Result<Vec<u8>> {
    if exif.is_empty() {
        return Ok(webp.to_vec());
    }

    let mut image = WebP::from_bytes(Bytes::copy_from_slice(webp))
        .map_err(|e| ConvertError::Codec(format!("Failed to parse encoded WebP: {}", e)))?;
    if image.dimensions().is_none() {
        return Err(ConvertError::Codec("encoded WebP has no bitstream".into()));
    }

    image.set_exif(Some(Bytes::copy_from_slice(exif)));

    // set_exif stores `Exif\0\0` + TIFF; the chunk payload must start at the TIFF header
    for chunk in image.chunks_mut().iter_mut() {
        if chunk.id() == CHUNK_EXIF {
            *chunk = RiffChunk::new(CHUNK_EXIF, RiffContent::Data(Bytes::copy_from_slice(exif)));
        }
    }

    let mut out = Vec::with_capacity(webp.len() + exif.len() + 32);
    image
        .encoder()
        .write_to(&mut out)
        .map_err(|e| ConvertError::Codec(format!("Failed to write WebP: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use img_parts::webp::{CHUNK_VP8, CHUNK_VP8L, CHUNK_VP8X};
    use std::io::Cursor;

    fn encoded(width: u32, height: u32, lossless: bool) -> Vec<u8> {
        let pixels: Vec<u8> = (0..width * height * 3).map(|i| (i * 13 % 256) as u8).collect();
        let encoder = webp::Encoder::from_rgb(&pixels, width, height);
        let memory = if lossless {
            encoder.encode_lossless()
        } else {
            encoder.encode(80.0)
        };
        memory.to_vec()
    }

    fn chunk_ids(data: &[u8]) -> Vec<[u8; 4]> {
        WebP::from_bytes(Bytes::copy_from_slice(data))
            .unwrap()
            .chunks()
            .iter()
            .map(|c| c.id())
            .collect()
    }

    fn tiff_with_make(make: &str) -> Vec<u8> {
        let field = exif::Field {
            tag: exif::Tag::Make,
            ifd_num: exif::In::PRIMARY,
            value: exif::Value::Ascii(vec![make.as_bytes().to_vec()]),
        };
        let mut writer = exif::experimental::Writer::new();
        writer.push_field(&field);
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, true).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_lossy_becomes_extended() {
        let input = encoded(16, 9, false);
        assert_eq!(chunk_ids(&input), vec![CHUNK_VP8]);

        let tiff = tiff_with_make("odd");
        let out = embed_exif(&input, &tiff).unwrap();

        assert_eq!(chunk_ids(&out), vec![CHUNK_VP8X, CHUNK_VP8, CHUNK_EXIF]);
        let riff_size = u32::from_le_bytes([out[4], out[5], out[6], out[7]]) as usize;
        assert_eq!(riff_size, out.len() - 8);
        assert_eq!(out.len() % 2, 0);

        let parsed = WebP::from_bytes(Bytes::copy_from_slice(&out)).unwrap();
        let vp8x = parsed.chunk_by_id(CHUNK_VP8X).unwrap().content().data().unwrap().clone();
        assert_eq!(vp8x.len(), 10);
        assert_eq!(vp8x[0] & 0x08, 0x08);
        assert_eq!(&vp8x[4..7], &15u32.to_le_bytes()[..3]);
        assert_eq!(&vp8x[7..10], &8u32.to_le_bytes()[..3]);

        let exif_chunk = parsed.chunk_by_id(CHUNK_EXIF).unwrap().content().data().unwrap().clone();
        assert_eq!(exif_chunk.as_ref(), tiff.as_slice());
    }

    #[test]
    fn test_lossless_output_decodes_and_reads_back() {
        let input = encoded(5, 3, true);
        assert_eq!(chunk_ids(&input), vec![CHUNK_VP8L]);

        let out = embed_exif(&input, &tiff_with_make("maker")).unwrap();
        assert_eq!(chunk_ids(&out), vec![CHUNK_VP8X, CHUNK_VP8L, CHUNK_EXIF]);

        let decoded = webp::Decoder::new(&out).decode().expect("valid webp");
        assert_eq!((decoded.width(), decoded.height()), (5, 3));

        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(&out))
            .unwrap();
        let make = exif.get_field(exif::Tag::Make, exif::In::PRIMARY).unwrap();
        match &make.value {
            exif::Value::Ascii(v) => assert_eq!(v[0], b"maker".to_vec()),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_empty_exif_is_passthrough() {
        let input = encoded(2, 2, false);
        assert_eq!(embed_exif(&input, &[]).unwrap(), input);
    }

    #[test]
    fn test_rejects_non_webp() {
        assert!(matches!(
            embed_exif(b"not a webp file at all", b"x"),
            Err(ConvertError::Codec(_))
        ));
        let mut truncated = encoded(4, 4, false);
        truncated.truncate(truncated.len() - 5);
        assert!(embed_exif(&truncated, b"x").is_err());
    }
}
