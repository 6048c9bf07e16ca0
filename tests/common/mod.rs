#![allow(dead_code)]

use plant_narrator::PlantRecord;
use std::io::Cursor;

pub fn jpeg_bytes() -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(32, 24);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

pub fn wav_bytes(sample_rate: u32, frames: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut out = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut out, spec).unwrap();
        for i in 0..frames {
            writer.write_sample(((i % 64) as i16 - 32) * 100).unwrap();
        }
        writer.finalize().unwrap();
    }
    out.into_inner()
}

pub fn tomato() -> PlantRecord {
    PlantRecord::new(
        "Tomate Cherry",
        "Parcela 3, Fila 2",
        jpeg_bytes(),
        "Planta de tomate con frutos pequeños",
        "Riego diario",
    )
}
