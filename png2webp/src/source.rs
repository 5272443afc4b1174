//! Source image loading: PNG text metadata plus decoded pixels.

use image::{DynamicImage, ImageFormat};
use img_parts::png::Png;
use img_parts::Bytes;
use shared_utils::{ConvertError, Result};
use std::io::Cursor;
use std::path::Path;

/// A decoded PNG and its text metadata, alive only for one conversion.
#[derive(Debug)]
pub struct SourceImage {
    pub image: DynamicImage,
    /// Text chunk keyword/value pairs in file order.
    pub text: Vec<(String, String)>,
    pub file_size: u64,
}

impl SourceImage {
    /// Read and decode `path`. The file is read once into memory and the
    /// handle is closed before decoding starts.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ConvertError::filesystem(path, e))?;
        let text = read_text_chunks(&bytes)?;
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
        Ok(Self {
            image,
            text,
            file_size: bytes.len() as u64,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

const CHUNK_TEXT: [u8; 4] = *b"tEXt";
const CHUNK_ZTXT: [u8; 4] = *b"zTXt";
const CHUNK_ITXT: [u8; 4] = *b"iTXt";
const CHUNK_IDAT: [u8; 4] = *b"IDAT";

/// Kinds of the text chunks ahead of the first IDAT, in file order.
fn text_chunk_order(bytes: &[u8]) -> Result<Vec<[u8; 4]>> {
    let png = Png::from_bytes(Bytes::copy_from_slice(bytes))
        .map_err(|e| ConvertError::Codec(format!("PNG chunks: {}", e)))?;
    Ok(png
        .chunks()
        .iter()
        .map(|chunk| chunk.kind())
        .take_while(|kind| *kind != CHUNK_IDAT)
        .filter(|kind| [CHUNK_TEXT, CHUNK_ZTXT, CHUNK_ITXT].contains(kind))
        .collect())
}

/// Text metadata stored ahead of the image data, in file order whatever the
/// chunk kind.
pub fn read_text_chunks(bytes: &[u8]) -> Result<Vec<(String, String)>> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let reader = decoder
        .read_info()
        .map_err(|e| ConvertError::Codec(format!("PNG header: {}", e)))?;
    let info = reader.info();

    let mut plain = info
        .uncompressed_latin1_text
        .iter()
        .map(|chunk| Ok::<_, ConvertError>((chunk.keyword.clone(), chunk.text.clone())));
    let mut compressed = info.compressed_latin1_text.iter().map(|chunk| {
        chunk
            .get_text()
            .map(|value| (chunk.keyword.clone(), value))
            .map_err(|e| ConvertError::Codec(format!("zTXt '{}': {}", chunk.keyword, e)))
    });
    let mut international = info.utf8_text.iter().map(|chunk| {
        chunk
            .get_text()
            .map(|value| (chunk.keyword.clone(), value))
            .map_err(|e| ConvertError::Codec(format!("iTXt '{}': {}", chunk.keyword, e)))
    });

    let mut text = Vec::new();
    for kind in text_chunk_order(bytes)? {
        let next = match kind {
            CHUNK_TEXT => plain.next(),
            CHUNK_ZTXT => compressed.next(),
            _ => international.next(),
        };
        if let Some(entry) = next {
            text.push(entry?);
        }
    }
    // chunks the decoder kept but the walk did not see
    for entry in plain.chain(compressed).chain(international) {
        text.push(entry?);
    }
    Ok(text)
}
