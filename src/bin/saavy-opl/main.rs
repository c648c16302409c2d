//! saavy-opl - dump the YM3812 register stream for a short MIDI phrase
//!
//! Run with: cargo run --bin saavy-opl -- [GENMIDI.op2]

use std::env;

use color_eyre::eyre::WrapErr;

use saavy_opl::{
    io::{converter::MidiRouter, midi::MidiEvent, op2},
    patch::default_patch,
    synth::clock::TickClock,
    ChipConfig, ChipMessage, PolyChip, RegisterLog,
};

// C major arpeggio on program 0, a snare on the drum channel, then silence
const PHRASE: &[&[u8]] = &[
    &[0xC0, 0],
    &[0x90, 60, 100],
    &[0x90, 64, 100],
    &[0x90, 67, 100],
    &[0x99, 38, 127],
    &[0x80, 60, 0],
    &[0x90, 72, 100],
    &[0xB0, 123, 0],
];

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut chip = PolyChip::new(RegisterLog::new(), TickClock::new(), ChipConfig::default())?;

    let mut router = match env::args().nth(1) {
        Some(path) => {
            let bank = op2::load(&path).wrap_err_with(|| format!("loading bank {path}"))?;
            let programs = chip.patches_mut().import_op2(&bank);
            MidiRouter::new(programs.melodic, programs.percussion)
        }
        None => {
            tracing::info!("no bank given, using the built-in patch");
            MidiRouter::single(chip.add_patch(default_patch()))
        }
    };

    chip.handle(ChipMessage::Reset)?;
    print_writes("reset", chip.dispatcher_mut().writer_mut().drain());

    for bytes in PHRASE {
        let Some(event) = MidiEvent::parse(bytes) else {
            continue;
        };
        for msg in router.route(event) {
            if let Err(err) = chip.handle(msg) {
                tracing::warn!(?msg, %err, "skipped");
            }
        }
        print_writes(&format!("{event:?}"), chip.dispatcher_mut().writer_mut().drain());
    }

    Ok(())
}

fn print_writes(label: &str, writes: Vec<(u8, u8)>) {
    println!("# {label}");
    for (address, value) in writes {
        println!("{address:#04X} {value:#04X}");
    }
}
