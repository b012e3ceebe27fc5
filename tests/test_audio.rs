// WAV export and load
use codec_sweep::audio::{convert_f32_to_i16, export_to_wav, load_mono_wav, load_wav};
use codec_sweep::error::HarnessError;

mod utils;
use utils::sine_signal;

#[test]
fn test_export_mono()
{
    let dir = tempfile::tempdir().expect("tempdir");
    let output_path = dir.path().join("sin1000Hz.wav");
    let signal = sine_signal(1000.0, 48000, 0.5);

    export_to_wav(&output_path, &signal.samples, 48000, 1).expect("WAV export failed");
    let (loaded, rate, channels) = load_wav(&output_path).expect("Failed to load exported file");

    assert_eq!(rate, 48000, "Sample rate mismatch");
    assert_eq!(channels, 1, "Channels mismatch");
    assert_eq!(loaded.len(), signal.samples.len(), "Sample count mismatch");
}

#[test]
fn test_out_of_range_samples_are_clamped()
{
    assert_eq!(convert_f32_to_i16(&[1.5, -1.5, 1.0, 0.0]), vec![32767, -32768, 32767, 0]);
}

#[test]
fn test_stereo_decoder_output_is_rejected()
{
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("decoded.wav");
    export_to_wav(&path, &[0.1, -0.1, 0.2, -0.2], 44100, 2).expect("WAV export failed");

    match load_mono_wav(&path)
    {
        Err(HarnessError::Format { message, .. }) => assert!(message.contains("2 channels")),
        other => panic!("expected a format error, got {:?}", other.map(|(s, _)| s.len())),
    }
}

#[test]
fn test_missing_file_is_a_wav_error()
{
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_wav(&dir.path().join("nothing.wav")).expect_err("file does not exist");
    assert!(matches!(err, HarnessError::Wav { .. }));
}
