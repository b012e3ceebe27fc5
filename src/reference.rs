//! Fixed-rate IMA-ADPCM reference codec
//!
//! This is the baseline every MSE ratio is normalized against. It uses the
//! block layout libsndfile writes for mono 44.1 kHz IMA-ADPCM WAV: 1024-byte
//! blocks, each starting with a 4-byte header (first sample, step index,
//! reserved byte) followed by packed 4-bit codes, low nibble first.
use crate::audio::{convert_f32_to_i16, convert_i16_to_f32};
use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const REFERENCE_BLOCK_SIZE: usize = 1024;
const BLOCK_HEADER_SIZE: usize = 4;

const INDEX_TABLE: [i32; 16] = [
    -1, -1, -1, -1, 2, 4, 6, 8,
    -1, -1, -1, -1, 2, 4, 6, 8,
];

const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17,
    19, 21, 23, 25, 28, 31, 34, 37, 41, 45,
    50, 55, 60, 66, 73, 80, 88, 97, 107, 118,
    130, 143, 157, 173, 190, 209, 230, 253, 279, 307,
    337, 371, 408, 449, 494, 544, 598, 658, 724, 796,
    876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066,
    2272, 2499, 2749, 3024, 3327, 3660, 4026, 4428, 4871, 5358,
    5894, 6484, 7132, 7845, 8630, 9493, 10442, 11487, 12635, 13899,
    15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794, 32767,
];

/// Samples carried by one mono block: the header sample plus two per data byte
pub fn samples_per_block(block_size: usize) -> usize
{
    (block_size - BLOCK_HEADER_SIZE) * 2 + 1
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReferenceAudio
{
    pub header: ReferenceHeader,
    pub blocks: Vec<AdpcmBlock>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReferenceHeader
{
    pub sample_rate: u32,
    pub total_samples: u64,
    pub block_size: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdpcmBlock
{
    pub first_sample: i16,
    pub step_index: u8,
    pub codes: Vec<u8>,
}

/// Predictor state shared by both directions
#[derive(Debug, Clone, Copy, Default)]
struct AdpcmState
{
    predictor: i32,
    step_index: i32,
}

impl AdpcmState
{
    /// Apply one 4-bit code and return the reconstructed sample
    fn update(&mut self, code: u8) -> i16
    {
        let step = STEP_TABLE[self.step_index as usize];
        let mut diff = step >> 3;
        if code & 4 != 0 { diff += step; }
        if code & 2 != 0 { diff += step >> 1; }
        if code & 1 != 0 { diff += step >> 2; }

        if code & 8 != 0
        {
            self.predictor -= diff;
        }
        else
        {
            self.predictor += diff;
        }
        self.predictor = self.predictor.clamp(i16::MIN as i32, i16::MAX as i32);
        self.step_index = (self.step_index + INDEX_TABLE[code as usize]).clamp(0, 88);

        self.predictor as i16
    }

    fn quantize(&self, sample: i16) -> u8
    {
        let mut step = STEP_TABLE[self.step_index as usize];
        let mut diff = sample as i32 - self.predictor;
        let mut code = 0u8;
        if diff < 0
        {
            code = 8;
            diff = -diff;
        }
        for bit in [4u8, 2, 1]
        {
            if diff >= step
            {
                code |= bit;
                diff -= step;
            }
            step >>= 1;
        }
        code
    }
}

pub struct Encoder
{
    block_size: usize,
}

impl Encoder
{
    pub fn new() -> Self
    {
        Self::with_block_size(REFERENCE_BLOCK_SIZE)
    }

    pub fn with_block_size(block_size: usize) -> Self
    {
        assert!(block_size > BLOCK_HEADER_SIZE, "block must have room for data after the header");
        Encoder { block_size }
    }

    pub fn encode(&self, samples: &[f32], sample_rate: u32) -> ReferenceAudio
    {
        let pcm = convert_f32_to_i16(samples);
        let per_block = samples_per_block(self.block_size);
        let mut state = AdpcmState::default();
        let mut blocks = Vec::with_capacity(pcm.len() / per_block + 1);

        for chunk in pcm.chunks(per_block)
        {
            // The header sample is stored verbatim and resets the predictor
            state.predictor = chunk[0] as i32;
            let step_index = state.step_index as u8;

            let mut codes = Vec::with_capacity(self.block_size - BLOCK_HEADER_SIZE);
            for pair in chunk[1..].chunks(2)
            {
                let lo = state.quantize(pair[0]);
                state.update(lo);
                let hi = match pair.get(1)
                {
                    Some(&s) =>
                    {
                        let code = state.quantize(s);
                        state.update(code);
                        code
                    }
                    None => 0,
                };
                codes.push(lo | (hi << 4));
            }

            blocks.push(AdpcmBlock
            {
                first_sample: chunk[0],
                step_index,
                codes,
            });
        }

        ReferenceAudio
        {
            header: ReferenceHeader
            {
                sample_rate,
                total_samples: samples.len() as u64,
                block_size: self.block_size as u32,
            },
            blocks,
        }
    }
}

impl Default for Encoder
{
    fn default() -> Self
    {
        Self::new()
    }
}

pub struct Decoder;

impl Decoder
{
    /// Decode every block, trimmed to the original length
    pub fn decode(encoded: &ReferenceAudio) -> Vec<f32>
    {
        let total = encoded.header.total_samples as usize;
        let mut pcm = Vec::with_capacity(total);

        for block in &encoded.blocks
        {
            let mut state = AdpcmState
            {
                predictor: block.first_sample as i32,
                step_index: (block.step_index as i32).clamp(0, 88),
            };
            pcm.push(block.first_sample);
            for &byte in &block.codes
            {
                pcm.push(state.update(byte & 0x0F));
                pcm.push(state.update(byte >> 4));
            }
        }

        // Drop the padding nibble of a short final block
        pcm.truncate(total);
        convert_i16_to_f32(&pcm)
    }
}

pub fn save_encoded(encoded: &ReferenceAudio, path: &Path) -> Result<()>
{
    let data = bincode::serialize(encoded).map_err(|e| HarnessError::Artifact { path: path.to_path_buf(), source: e })?;
    std::fs::write(path, data).map_err(|e| HarnessError::io(path, e))?;
    Ok(())
}

pub fn load_encoded(path: &Path) -> Result<ReferenceAudio>
{
    let data = std::fs::read(path).map_err(|e| HarnessError::io(path, e))?;
    let encoded: ReferenceAudio = bincode::deserialize(&data)
        .map_err(|e| HarnessError::Artifact { path: path.to_path_buf(), source: e })?;
    log::debug!("Loaded reference {:?}: {} blocks, {} samples", path, encoded.blocks.len(), encoded.header.total_samples);
    Ok(encoded)
}
