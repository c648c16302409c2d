use saavy_opl::{
    chip::frequency::{tuning, FREQUENCY_TABLE},
    io::{converter::MidiRouter, midi::MidiEvent},
    patch::{default_patch, encoder::encode_channel, OperatorParams},
    synth::clock::{Clock, TickClock},
    ChipConfig, ChipMessage, NoteDispatcher, Patch, PatchBank, PatchId, PitchPolicy, PolyChip,
    RegisterLog,
};

/// A clock that never advances, so every timestamp ties.
struct Frozen;

impl Clock for Frozen {
    fn now(&mut self) -> u64 {
        0
    }
}

fn bank(n: usize) -> (PatchBank, Vec<PatchId>) {
    let mut bank = PatchBank::new();
    let ids = (0..n).map(|_| bank.insert(default_patch())).collect();
    (bank, ids)
}

#[test]
fn full_tables_always_steal_the_oldest_note() {
    let (patches, ids) = bank(1);
    for n in 1..=9 {
        let config = ChipConfig::default().channels(n);
        let mut d = NoteDispatcher::new(RegisterLog::new(), TickClock::new(), config).unwrap();

        for expected in 0..n {
            assert_eq!(d.note_on(&patches, ids[0], 40).unwrap(), expected);
        }
        // Each steal makes that channel the newest, so stealing rotates
        for round in 0..2 * n {
            assert_eq!(d.note_on(&patches, ids[0], 50).unwrap(), round % n);
        }
    }
}

#[test]
fn timestamp_ties_resolve_to_the_lowest_index() {
    let (patches, ids) = bank(1);
    let mut d = NoteDispatcher::new(RegisterLog::new(), Frozen, ChipConfig::default()).unwrap();

    let filled: Vec<usize> = (0..9)
        .map(|i| d.note_on(&patches, ids[0], 40 + i).unwrap())
        .collect();
    assert_eq!(filled, (0..9).collect::<Vec<_>>());

    assert_eq!(d.note_on(&patches, ids[0], 70).unwrap(), 0);
    assert_eq!(d.note_on(&patches, ids[0], 71).unwrap(), 0);
}

#[test]
fn note_off_matches_patch_and_pitch_together() {
    let (patches, ids) = bank(2);
    let (a, b) = (ids[0], ids[1]);
    let mut d =
        NoteDispatcher::new(RegisterLog::new(), TickClock::new(), ChipConfig::default()).unwrap();

    d.note_on(&patches, a, 60).unwrap(); // 0
    d.note_on(&patches, a, 62).unwrap(); // 1 same patch
    d.note_on(&patches, b, 60).unwrap(); // 2 same pitch
    d.note_on(&patches, a, 60).unwrap(); // 3 duplicate

    assert_eq!(d.note_off(a, 60), 2);
    let sounding: Vec<bool> = d.channels()[..4].iter().map(|c| c.is_sounding()).collect();
    assert_eq!(sounding, vec![false, true, true, false]);
}

#[test]
fn patch_update_rewrites_every_holder_and_keeps_state() {
    let (mut patches, ids) = bank(2);
    let (a, b) = (ids[0], ids[1]);
    let mut d =
        NoteDispatcher::new(RegisterLog::new(), TickClock::new(), ChipConfig::default()).unwrap();

    d.note_on(&patches, a, 60).unwrap();
    d.note_on(&patches, b, 64).unwrap();
    d.note_on(&patches, a, 67).unwrap();
    d.note_off(a, 60);
    let before: Vec<_> = d.channels().to_vec();

    patches.get_mut(a).unwrap().operators[1].level = 127;
    d.writer_mut().clear();
    assert_eq!(d.patch_update(&patches, a), 2);

    // Two channels, eleven encoded writes each, no key or tuning writes
    let writes = d.writer().writes();
    assert_eq!(writes.len(), 22);
    assert!(writes.iter().all(|&(addr, _)| addr & 0xF0 != 0xA0 && addr & 0xF0 != 0xB0));
    assert_eq!(d.channels(), &before[..]);
}

#[test]
fn pitch_mapping_wraps_every_twelve_steps() {
    let at = |pitch| tuning(pitch).map(|t| (t.block, t.fnum));
    assert_eq!(at(19), Some((0, FREQUENCY_TABLE[19])));
    assert_eq!(at(31), Some((1, FREQUENCY_TABLE[19])));
    assert_eq!(at(18), Some((0, FREQUENCY_TABLE[18])));
    assert_eq!(at(114), Some((7, FREQUENCY_TABLE[30])));
    assert_eq!(at(115), None);
}

#[test]
fn played_notes_land_in_the_frequency_registers() {
    let (patches, ids) = bank(1);
    let mut d =
        NoteDispatcher::new(RegisterLog::new(), TickClock::new(), ChipConfig::default()).unwrap();

    let ch = d.note_on(&patches, ids[0], 31).unwrap();
    assert_eq!(d.registers().current_block(ch), 1);
    assert_eq!(d.registers().current_fnum(ch), FREQUENCY_TABLE[19]);
    assert!(d.registers().is_keyed_on(ch));

    let log = d.writer();
    assert_eq!(log.values_at(0xA0).last(), Some((FREQUENCY_TABLE[19] & 0xFF) as u8));
    assert_eq!(log.writes().last(), Some(&(0xB0, 0x20 | 1 << 2 | (FREQUENCY_TABLE[19] >> 8) as u8)));
}

#[test]
fn out_of_range_pitch_only_keys_off() {
    let (patches, ids) = bank(1);
    let mut d =
        NoteDispatcher::new(RegisterLog::new(), TickClock::new(), ChipConfig::default()).unwrap();

    let ch = d.note_on(&patches, ids[0], 115).unwrap();
    assert_eq!(d.writer().writes(), &[(0xB0, 0x00)]);
    assert!(!d.registers().is_keyed_on(ch));

    let strict = ChipConfig::default().pitch_policy(PitchPolicy::Strict);
    let mut d = NoteDispatcher::new(RegisterLog::new(), TickClock::new(), strict).unwrap();
    assert!(d.note_on(&patches, ids[0], 115).is_err());
    assert!(d.writer().is_empty());
}

#[test]
fn encoding_is_pure() {
    let patch = default_patch();
    for channel in 0..9 {
        assert_eq!(
            encode_channel(channel, &patch).writes(),
            encode_channel(channel, &patch.clone()).writes()
        );
    }
}

#[test]
fn sustain_level_is_inverted() {
    let with_sustain = |level| {
        let op = OperatorParams {
            sustain_level: level,
            ..Default::default()
        };
        Patch {
            operators: [op, op, OperatorParams::default(), OperatorParams::default()],
            ..Default::default()
        }
    };

    let loud = encode_channel(0, &with_sustain(0)).writes();
    let quiet = encode_channel(0, &with_sustain(127)).writes();
    let sustain_at = |writes: &[(u8, u8)]| {
        writes
            .iter()
            .find(|&&(addr, _)| addr == 0x80)
            .map(|&(_, v)| v >> 4)
    };
    assert_eq!(sustain_at(&loud), Some(0x0F));
    assert_eq!(sustain_at(&quiet), Some(0x00));
}

#[test]
fn midi_bytes_drive_the_chip_end_to_end() {
    let mut chip = PolyChip::new(RegisterLog::new(), TickClock::new(), ChipConfig::default()).unwrap();
    let lead = chip.add_patch(default_patch());
    let mut kick = default_patch();
    kick.note_number = 36;
    let kick = chip.add_patch(kick);
    let mut router = MidiRouter::new(vec![lead], vec![kick]);

    let stream: &[&[u8]] = &[&[0x90, 60, 100], &[0x99, 35, 127], &[0x90, 60, 0]];
    for bytes in stream {
        let event = MidiEvent::parse(bytes).unwrap();
        for msg in router.route(event) {
            chip.handle(msg).unwrap();
        }
    }

    let channels = chip.dispatcher().channels();
    assert!(channels[0].is_idle() && channels[0].holds(lead));
    assert!(channels[1].is_sounding() && channels[1].plays(kick, 36));

    chip.handle(ChipMessage::Reset).unwrap();
    assert!(chip.dispatcher().channels().iter().all(|c| c.patch().is_none()));
}

fn play_midi(chip: &mut PolyChip<RegisterLog, TickClock>, router: &mut MidiRouter, stream: &[&[u8]]) {
    for bytes in stream {
        let event = MidiEvent::parse(bytes).unwrap();
        for msg in router.route(event) {
            chip.handle(msg).unwrap();
        }
    }
}

#[test]
fn program_change_mid_note_still_releases_the_note() {
    let mut chip = PolyChip::new(RegisterLog::new(), TickClock::new(), ChipConfig::default()).unwrap();
    let piano = chip.add_patch(default_patch());
    let organ = chip.add_patch(default_patch());
    let mut router = MidiRouter::new(vec![piano, organ], Vec::new());

    play_midi(&mut chip, &mut router, &[&[0x90, 60, 100], &[0xC0, 1], &[0x80, 60, 0]]);
    let channel = chip.dispatcher().channels()[0];
    assert!(channel.is_idle() && channel.holds(piano));
    assert!(!chip.dispatcher().registers().is_keyed_on(0));

    // All-notes-off covers held notes from both programs
    play_midi(
        &mut chip,
        &mut router,
        &[&[0x90, 62, 100], &[0xC0, 0], &[0x90, 64, 100], &[0xB0, 123, 0]],
    );
    assert!(chip.dispatcher().channels().iter().all(|c| c.is_idle()));
    assert!((0..9).all(|ch| !chip.dispatcher().registers().is_keyed_on(ch)));
}

#[test]
fn reset_keys_off_held_notes_on_the_chip() {
    let mut chip = PolyChip::new(RegisterLog::new(), TickClock::new(), ChipConfig::default()).unwrap();
    let lead = chip.add_patch(default_patch());
    chip.handle(ChipMessage::NoteOn { patch: lead, pitch: 60 }).unwrap();
    chip.dispatcher_mut().writer_mut().clear();

    chip.handle(ChipMessage::Reset).unwrap();

    let log = chip.dispatcher().writer();
    let key_off = log.values_at(0xB0).last().unwrap();
    assert_eq!(key_off & 0x20, 0);
    // Key-offs land before the wave-select write
    assert_eq!(log.writes().last(), Some(&(0x01, 0x20)));
}

#[cfg(feature = "serde")]
#[test]
fn patches_and_config_survive_json() {
    let patch = default_patch();
    let json = serde_json::to_string(&patch).unwrap();
    assert_eq!(serde_json::from_str::<Patch>(&json).unwrap(), patch);

    let config = ChipConfig::default().channels(6).pitch_policy(PitchPolicy::Strict);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<ChipConfig>(&json).unwrap(), config);
}
