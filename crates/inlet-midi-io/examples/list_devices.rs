use inlet_midi_io::MidiInputContext;

fn main() -> inlet_midi_io::Result<()> {
    let input = MidiInputContext::builder().midir("list-devices").build()?;

    println!("=== MIDI Input Devices ===");
    let devices = input.scan_devices();
    if devices.is_empty() {
        println!("  (none found)");
    }
    for dev in &devices {
        println!("  [{}] {}", dev.id, dev.name);
    }
    Ok(())
}
