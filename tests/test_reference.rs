// IMA-ADPCM reference codec
use codec_sweep::metrics::mse;
use codec_sweep::reference::{load_encoded, samples_per_block, save_encoded, Decoder, Encoder, REFERENCE_BLOCK_SIZE};
use codec_sweep::signals::{synthesize, SignalKind};

#[test]
fn test_block_geometry()
{
    assert_eq!(REFERENCE_BLOCK_SIZE, 1024);
    assert_eq!(samples_per_block(REFERENCE_BLOCK_SIZE), 2041);
    assert_eq!(samples_per_block(256), 505);
}

#[test]
fn test_sine_reconstruction_is_close_but_lossy()
{
    let samples = synthesize(SignalKind::Sine { frequency: 440.0 }, 44100, 44100, 0);
    let encoded = Encoder::new().encode(&samples, 44100);
    let decoded = Decoder::decode(&encoded);

    assert_eq!(decoded.len(), samples.len());
    assert_eq!(encoded.blocks.len(), samples.len().div_ceil(2041));
    for block in &encoded.blocks[..encoded.blocks.len() - 1]
    {
        assert_eq!(block.codes.len(), REFERENCE_BLOCK_SIZE - 4);
    }

    let error = mse(&samples, &decoded).expect("non-empty");
    println!("IMA-ADPCM MSE on 440 Hz sine: {:.3e}", error);
    assert!(error > 0.0, "4-bit ADPCM cannot be lossless on a full-scale sine");
    assert!(error < 1e-2, "reconstruction too poor: {}", error);
}

#[test]
fn test_odd_length_tail_block()
{
    // One full block, then a short block with an odd number of coded samples
    let samples = synthesize(SignalKind::Sawtooth { frequency: 100.0 }, 44100, 2041 + 10, 0);
    let encoded = Encoder::new().encode(&samples, 44100);
    assert_eq!(encoded.blocks.len(), 2);
    assert_eq!(encoded.blocks[1].codes.len(), 5);

    let decoded = Decoder::decode(&encoded);
    assert_eq!(decoded.len(), samples.len());
    // Header samples are stored verbatim
    assert!((decoded[2041] - samples[2041]).abs() < 1e-4);
}

#[test]
fn test_silence_is_reconstructed_exactly()
{
    let silence = vec![0.0f32; 5000];
    let decoded = Decoder::decode(&Encoder::new().encode(&silence, 44100));
    assert_eq!(mse(&silence, &decoded), Some(0.0));
}

#[test]
fn test_saved_reference_decodes_identically()
{
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chirp_adpcm.bin");
    let samples = synthesize(SignalKind::Chirp { start: 5000.0, end: 10000.0 }, 44100, 10000, 0);

    let encoded = Encoder::new().encode(&samples, 44100);
    save_encoded(&encoded, &path).expect("save failed");
    let loaded = load_encoded(&path).expect("load failed");

    assert_eq!(loaded.header.sample_rate, 44100);
    assert_eq!(loaded.header.total_samples, 10000);
    assert_eq!(Decoder::decode(&loaded), Decoder::decode(&encoded));
}

#[test]
fn test_corrupt_reference_is_an_error()
{
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken_adpcm.bin");
    std::fs::write(&path, [1u8, 2, 3]).expect("write");
    assert!(load_encoded(&path).is_err());
    assert!(load_encoded(&dir.path().join("missing.bin")).is_err());
}
