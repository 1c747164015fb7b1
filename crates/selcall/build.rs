//! Generates the selective-call tone tables.
//!
//! Every table holds `TONE_LEN` samples (10 ms at 48 kHz) of a sine at the
//! tone's nominal frequency, phase 0 at index 0, peak amplitude 0x3FFF.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

const SAMPLE_RATE_HZ: u32 = 48_000;
const TONE_LEN: usize = 480;
const AMPLITUDE: f64 = 16_383.0;

/// 697 Hz primes the pool; the rest form the five-tone call.
const TONES_HZ: [u16; 6] = [697, 852, 1020, 1153, 1393, 2100];

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let mut src = String::new();
    writeln!(src, "/// Rate the tables below were generated for.").unwrap();
    writeln!(src, "pub const TONE_SAMPLE_RATE_HZ: u32 = {SAMPLE_RATE_HZ};").unwrap();
    writeln!(src, "/// Samples per tone table.").unwrap();
    writeln!(src, "pub const TONE_LEN: usize = {TONE_LEN};").unwrap();

    for hz in TONES_HZ {
        writeln!(src).unwrap();
        writeln!(src, "/// {hz} Hz, {TONE_LEN} samples.").unwrap();
        writeln!(src, "pub const TONE_{hz}_SAMPLES: [i16; TONE_LEN] = [").unwrap();
        for i in 0..TONE_LEN {
            let t = i as f64 / f64::from(SAMPLE_RATE_HZ);
            let v = (2.0 * std::f64::consts::PI * f64::from(hz) * t).sin() * AMPLITUDE;
            write!(src, "{},", v.round() as i16).unwrap();
            if i % 16 == 15 {
                writeln!(src).unwrap();
            }
        }
        writeln!(src, "];").unwrap();
    }

    fs::write(out.join("selcall_tones.rs"), src).expect("write selcall_tones.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
