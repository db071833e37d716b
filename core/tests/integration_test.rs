// End-to-end decode tests against waveforms from the reference encoder.
//
// With the default encoder (25 leading zeros) the framed characters of "1234"
// sit at these bit offsets of `frame_bits`:
//   ';' 25, '1' 30, '2' 35, '3' 40, '4' 45, '?' 50, LRC 55, trailing zeros 60..85

use magswipe_core::{
    decode, decode_bidirectional, DecodeFailure, Direction, ErrorKind, Track2Decoder,
    Track2Encoder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[u8] = b"0123456789:<=>";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn encode(data: &str) -> Vec<i16> {
    Track2Encoder::new().encode(data).expect("Failed to encode")
}

fn decode_bits(bits: &[u8]) -> Result<String, DecodeFailure> {
    decode(&Track2Encoder::new().modulate(bits))
}

fn bits_for(data: &str) -> Vec<u8> {
    Track2Encoder::new().frame_bits(data).expect("Failed to frame")
}

#[test]
fn test_silence_is_not_enough_peaks() {
    init_logging();
    for len in [0usize, 1, 100, 44_100] {
        let failure = decode(&vec![0i16; len]).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::NotEnoughPeaks, "len {}", len);
        assert_eq!(failure.partial, "");
    }
}

#[test]
fn test_too_few_transitions_is_not_enough_peaks() {
    // 5 reversals: the first is skipped, leaving 3 distances
    let samples = Track2Encoder::new().modulate(&[0; 4]);
    assert_eq!(decode(&samples).unwrap_err().kind, ErrorKind::NotEnoughPeaks);
}

#[test]
fn test_encode_decode_round_trip() {
    init_logging();
    for data in ["1234", "0", "4111111111111111=25121010000000000000", ":<=>", "9876543210"] {
        let decoded = decode(&encode(data)).expect("Failed to decode");
        assert_eq!(decoded, format!(";{}?", data));
    }
}

#[test]
fn test_reversed_swipe_is_not_misread() {
    let mut samples = encode("1234");
    samples.reverse();
    let failure = decode(&samples).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::StartSentinelNotFound);

    // A reversed track can frame as an empty ";?" with a matching LRC. That is
    // the only success a backwards swipe is allowed to produce.
    let mut rng = StdRng::seed_from_u64(0x7472_6b32);
    let mut empty_tracks = 0;
    for _ in 0..1000 {
        let len = rng.gen_range(1..=24);
        let data: String = (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        let mut samples = encode(&data);
        assert_eq!(decode(&samples), Ok(format!(";{}?", data)), "forward {:?}", data);

        samples.reverse();
        if let Ok(text) = decode(&samples) {
            assert_eq!(text, ";?", "reversed {:?} misread", data);
            empty_tracks += 1;
        }
    }
    log::info!("{} reversed swipes framed as an empty track", empty_tracks);
}

#[test]
fn test_reversed_swipe_can_frame_as_empty_track() {
    let mut samples = encode("740>30:5<74");
    samples.reverse();
    assert_eq!(decode(&samples), Ok(";?".to_string()));

    // The forward pass succeeds, so the reversed retry never runs
    let swipe = decode_bidirectional(&samples);
    assert_eq!(swipe.direction, Direction::Forward);
    assert!(swipe.report.is_success());
    assert_eq!(swipe.report.text(), ";?");
}

#[test]
fn test_data_bit_flip_fails_parity() {
    let mut bits = bits_for("1234");
    // '3' = 1,1,0,0,1; clearing b1 leaves an even number of ones
    bits[41] ^= 1;
    let failure = decode_bits(&bits).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::ParityBitCheckFailed);
    assert_eq!(failure.partial, ";12");
}

#[test]
fn test_lrc_parity_bit_flip() {
    let mut bits = bits_for("1234");
    bits[59] ^= 1;
    let failure = decode_bits(&bits).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::LrcParityBitCheckFailed);
    assert_eq!(failure.partial, ";1234?");
}

#[test]
fn test_self_consistent_corruption_fails_lrc() {
    let mut bits = bits_for("1234");
    // '2' (0,1,0,0,0) becomes '3' (1,1,0,0,1) with a correct parity bit
    bits[35] = 1;
    bits[39] = 1;
    let failure = decode_bits(&bits).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::LrcInvalid);
    assert_eq!(failure.partial, ";1334?");
}

#[test]
fn test_truncated_after_end_sentinel() {
    let bits = bits_for("1234");

    // End sentinel is the final group: it is never read
    let failure = decode_bits(&bits[..55]).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::NotEnoughDataForLrcCheck);
    assert_eq!(failure.partial, ";1234");

    // One bit more and the end sentinel is read, but the LRC is still short
    let failure = decode_bits(&bits[..56]).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::NotEnoughDataForLrcCheck);
    assert_eq!(failure.partial, ";1234?");

    // LRC ending exactly at the last bit is enough
    assert_eq!(decode_bits(&bits[..60]), Ok(";1234?".to_string()));
}

#[test]
fn test_parity_error_reported_before_lrc_error() {
    let mut bits = bits_for("1234");
    bits[41] ^= 1;
    bits[59] ^= 1;
    bits[55] ^= 1;
    assert_eq!(decode_bits(&bits).unwrap_err().kind, ErrorKind::ParityBitCheckFailed);
}

#[test]
fn test_lrc_parity_reported_before_lrc_value() {
    let mut bits = bits_for("1234");
    // Wrong LRC value and wrong LRC parity together
    bits[55] ^= 1;
    bits[56] ^= 1;
    bits[57] ^= 1;
    assert_eq!(decode_bits(&bits).unwrap_err().kind, ErrorKind::LrcParityBitCheckFailed);
}

#[test]
fn test_missing_start_sentinel() {
    // Only zero cells: plenty of peaks, no sentinel
    let failure = decode_bits(&[0; 60]).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::StartSentinelNotFound);
}

#[test]
fn test_decoding_is_deterministic() {
    let samples = encode("4111111111111111=2512");
    let decoder = Track2Decoder::new();
    let first = decoder.analyze(&samples);
    let second = decoder.analyze(&samples);
    assert_eq!(first, second);

    let mut corrupted = bits_for("1234");
    corrupted[41] ^= 1;
    assert_eq!(decode_bits(&corrupted), decode_bits(&corrupted));
}

#[test]
fn test_parallel_decodes_are_independent() {
    let decoder = Track2Decoder::new();
    let inputs: Vec<(String, Vec<i16>)> = ["1111", "2222", "3333", "4444"]
        .iter()
        .map(|data| (format!(";{}?", data), encode(data)))
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|(expected, samples)| {
                let decoder = &decoder;
                scope.spawn(move || {
                    assert_eq!(decoder.decode(samples).as_deref(), Ok(expected.as_str()));
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("decode thread panicked");
        }
    });
}
