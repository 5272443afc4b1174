//! In-memory PNG fixtures for tests.

use png::text_metadata::{ITXtChunk, TEXtChunk, ZTXtChunk};
use std::path::Path;

enum TextKind {
    Text,
    Ztxt,
    Itxt,
}

pub struct PngFixture {
    width: u32,
    height: u32,
    color: png::ColorType,
    chunks: Vec<(TextKind, String, String)>,
}

impl PngFixture {
    pub fn rgb(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color: png::ColorType::Rgb,
            chunks: Vec::new(),
        }
    }

    pub fn rgba(width: u32, height: u32) -> Self {
        Self {
            color: png::ColorType::Rgba,
            ..Self::rgb(width, height)
        }
    }

    pub fn text(mut self, key: &str, value: &str) -> Self {
        self.chunks
            .push((TextKind::Text, key.to_string(), value.to_string()));
        self
    }

    pub fn ztxt(mut self, key: &str, value: &str) -> Self {
        self.chunks
            .push((TextKind::Ztxt, key.to_string(), value.to_string()));
        self
    }

    pub fn itxt(mut self, key: &str, value: &str) -> Self {
        self.chunks
            .push((TextKind::Itxt, key.to_string(), value.to_string()));
        self
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, png_bytes(self)).unwrap();
    }
}

pub fn png_bytes(fixture: &PngFixture) -> Vec<u8> {
    let channels = match fixture.color {
        png::ColorType::Rgba => 4,
        _ => 3,
    };
    let pixels: Vec<u8> = (0..fixture.width * fixture.height * channels)
        .map(|i| (i * 37 % 251) as u8)
        .collect();

    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, fixture.width, fixture.height);
        encoder.set_color(fixture.color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        // written one by one so the file keeps the push order across kinds
        for (kind, key, value) in &fixture.chunks {
            match kind {
                TextKind::Text => writer.write_text_chunk(&TEXtChunk::new(key.as_str(), value.as_str())),
                TextKind::Ztxt => writer.write_text_chunk(&ZTXtChunk::new(key.as_str(), value.as_str())),
                TextKind::Itxt => writer.write_text_chunk(&ITXtChunk::new(key.as_str(), value.as_str())),
            }
            .unwrap();
        }
        writer.write_image_data(&pixels).unwrap();
        writer.finish().unwrap();
    }
    buf
}

/// ComfyUI-style PNG: prompt and workflow JSON in tEXt chunks.
pub fn write_generated_png(path: &Path) {
    PngFixture::rgba(8, 6)
        .text("prompt", r#"{"3":{"class_type":"KSampler","inputs":{"cfg":8.0,"seed":42}}}"#)
        .text("workflow", r#"{"nodes":[],"version":0.4}"#)
        .write_to(path);
}
