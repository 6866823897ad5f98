// Decoding captures from all three acquisition modes
//
// This demo builds synthetic acquisition buffers and walks through the
// decoded output for each mode. No hardware is required.

use clap::Parser;
use digitizer2_rs::{decode, decode_maxfind, decode_raw, decode_tdc, AcqData};

#[derive(Parser)]
#[command(name = "decode_capture")]
#[command(about = "Decode synthetic digitizer2 capture buffers")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, help = "Show debug information and detailed logs")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    println!("digitizer2 Capture Decoding Demo");
    println!("================================\n");

    // Example 1: RAW mode, a sawtooth on the analog input and a toggling
    // pattern on the digital channels.
    println!("1. RAW capture");
    let raw_words: Vec<u16> = (0..16)
        .map(|i| {
            let analog = (i * 0x100) & 0x0fff;
            let digital = if i % 2 == 0 { 0xa000 } else { 0x5000 };
            digital | analog
        })
        .collect();
    let capture = decode_raw(&raw_words);
    println!("   {} analog samples over 2ns grid", capture.analog.values.len());
    println!(
        "   {} digital samples per channel over 1ns grid",
        capture.digital1.bits.len()
    );
    println!(
        "   first analog samples: {:?}",
        &capture.analog.values[..4.min(capture.analog.values.len())]
    );

    // Example 2: TDC mode with a counter overflow in the middle.
    println!("\n2. TDC capture with counter overflow");
    let tdc_words: Vec<u16> = [
        0x4000_0064u32,              // analog event at counter 100
        0x0180_03e8,                 // digital-2 event at counter 1000, sub 2
        0x8000_0000 | 0x4000_0000,   // overflow + analog event at counter 0
    ]
    .iter()
    .flat_map(|&p| [(p >> 16) as u16, p as u16])
    .collect();
    let events = decode_tdc(&tdc_words);
    println!("   analog timestamps:   {:?}", events.analog);
    println!("   digital-2 timestamps: {:?}", events.digital2);

    // Example 3: MAXFIND mode; the zero counter marks the overflow.
    println!("\n3. MAXFIND capture");
    let maxfind_words: Vec<u16> = [
        (250u32 << 22) | 40, // peak of 250 at counter 40
        700 << 22,           // counter 0: overflow marker and a peak of 700
    ]
    .iter()
    .flat_map(|&p| [(p >> 16) as u16, p as u16])
    .collect();
    let peaks = decode_maxfind(&maxfind_words);
    for (time, amplitude) in peaks.times.iter().zip(&peaks.amplitudes) {
        println!("   peak of {amplitude} ADC units at {time:.3e} s");
    }

    // Example 4: the unassigned selector passes the buffer through.
    println!("\n4. Unknown-mode passthrough");
    match decode(1, &maxfind_words) {
        AcqData::Unparsed(raw) => println!("   selector 1 returned {} raw words", raw.len()),
        other => println!("   unexpected: {other:?}"),
    }
}
