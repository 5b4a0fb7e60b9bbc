//! Print everything arriving from the first device whose name contains the
//! given argument.
//!
//!   cargo run -p inlet-midi-io --example monitor --features midi-io -- Keystation

use inlet_midi_io::{message_queue, MidiInputContext};
use std::sync::Arc;
use std::time::Duration;

fn main() -> inlet_midi_io::Result<()> {
    tracing_subscriber::fmt::init();

    let name = std::env::args().nth(1).unwrap_or_default();
    let input = MidiInputContext::builder()
        .midir("inlet-monitor")
        .scan_on_build()
        .build()?;

    let (receiver, mut consumer) = message_queue();
    input.set_receiver(Arc::new(receiver));

    let device = input
        .open_device_by_name(&name)?
        .wait_timeout(Duration::from_secs(2))?;
    println!("Listening to '{}' (Ctrl-C to quit)", device.name());

    loop {
        while let Some(message) = consumer.pop() {
            println!("{:02X?}", message.as_bytes());
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
