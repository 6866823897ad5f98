// Reading out a device through the register bus seam
//
// This demo implements RegisterBus against a small in-memory register file
// standing in for a real transport, then runs the normal readout flow:
// wait for the acquisition to finish, drain the buffer, decode it.

use std::collections::HashMap;
use std::time::Duration;

use digitizer2_rs::{AcqData, AcqState, Digitizer2, RegisterBus};

#[derive(Debug, thiserror::Error)]
#[error("simulated bus has no register at port {port} offset {offset}")]
struct SimBusError {
    port: u8,
    offset: u16,
}

/// Register file of a device that has just finished a MAXFIND acquisition.
struct SimulatedBus {
    regs: HashMap<(u8, u16), u16>,
    acq_fifo: Vec<u16>,
    drained: usize,
}

impl SimulatedBus {
    fn with_maxfind_capture(packets: &[u32]) -> Self {
        let words: Vec<u16> = packets
            .iter()
            .flat_map(|&p| [(p >> 16) as u16, p as u16])
            .collect();

        let mut regs = HashMap::new();
        regs.insert((0, 1), 4); // acquisition state: done
        regs.insert((0, 5), 3 << 2); // selected mode: MAXFIND
        regs.insert((4, 0), packets.len() as u16); // buffer fill, 32-bit entries

        Self {
            regs,
            acq_fifo: words,
            drained: 0,
        }
    }
}

impl RegisterBus for SimulatedBus {
    type Error = SimBusError;

    fn read_word(&mut self, port: u8, offset: u16) -> Result<u16, Self::Error> {
        if (port, offset) == (4, 1) {
            let word = self.acq_fifo.get(self.drained).copied().unwrap_or(0);
            self.drained += 1;
            return Ok(word);
        }
        self.regs
            .get(&(port, offset))
            .copied()
            .ok_or(SimBusError { port, offset })
    }

    fn write_word(&mut self, port: u8, offset: u16, value: u16) -> Result<(), Self::Error> {
        self.regs.insert((port, offset), value);
        Ok(())
    }

    fn sleep(&mut self, _duration: Duration) {}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("digitizer2 Readout Demo");
    println!("=======================\n");

    let bus = SimulatedBus::with_maxfind_capture(&[
        (120 << 22) | 1_000,
        (340 << 22) | 2_000_000,
        77 << 22, // counter wrapped here
        (512 << 22) | 50,
    ]);
    let mut device = Digitizer2::new(bus);

    while device.acq_state()? != AcqState::Done {
        // A real transport would poll with a settling delay here.
    }
    println!("Acquisition done, {} words buffered", device.buffer_count()?);

    match device.read_buffer()? {
        AcqData::Maxfind(events) => {
            println!("Decoded {} peaks:", events.times.len());
            for (time, amplitude) in events.times.iter().zip(&events.amplitudes) {
                println!("   {amplitude:>4} ADC units at {time:.4e} s");
            }
        }
        other => println!("Unexpected capture type: {other:?}"),
    }

    Ok(())
}
