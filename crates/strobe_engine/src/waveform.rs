//! Waveform output for generated patterns.
//!
//! The [`WaveformRecorder`] trait abstracts waveform output. [`VcdRecorder`]
//! implements the IEEE 1364 Value Change Dump (VCD) format so a pattern can be
//! inspected in GTKWave, Surfer, or other waveform viewers. [`write_vcd`]
//! replays a frozen [`Pattern`] into a recorder, one time unit per tester
//! cycle: `#0` is the state before the pattern, `#n` the state after its
//! `n`-th cycle committed.

use std::collections::HashMap;
use std::io::Write;

use crate::error::EngineError;
use crate::pattern::{Op, Pattern};
use crate::pin_set::PinId;

/// Trait for recording pin waveforms.
pub trait WaveformRecorder {
    /// Registers a pin for recording.
    fn register_pin(&mut self, id: PinId, name: &str, width: u32) -> Result<(), EngineError>;

    /// Opens a new scope (hierarchy level) in the waveform.
    fn begin_scope(&mut self, name: &str) -> Result<(), EngineError>;

    /// Closes the current scope.
    fn end_scope(&mut self) -> Result<(), EngineError>;

    /// Records a value change at the given time (in cycles).
    fn record_change(&mut self, time: u64, id: PinId, value: u64) -> Result<(), EngineError>;

    /// Finalizes the waveform output (flush, write trailer, etc.).
    fn finalize(&mut self) -> Result<(), EngineError>;
}

/// VCD (Value Change Dump) format recorder following IEEE 1364.
///
/// Pin identifiers use printable ASCII characters starting from `!` (0x21).
pub struct VcdRecorder<W: Write> {
    writer: W,
    id_map: Vec<(PinId, String, u32)>, // (pin_id, id_code, width)
    next_id: u32,
    header_written: bool,
    current_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a new VCD recorder writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            id_map: Vec::new(),
            next_id: 0,
            header_written: false,
            current_time: None,
        }
    }

    /// Consumes the recorder and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> Result<(), EngineError> {
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  strobe pattern generator")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$comment")?;
        writeln!(self.writer, "  one time unit per tester cycle")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1ns")?;
        writeln!(self.writer, "$end")?;
        self.header_written = true;
        Ok(())
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    /// Formats a pin value: a bare digit for 1-bit pins, `b<bits>` otherwise.
    fn format_value(value: u64, width: u32) -> String {
        if width == 1 {
            format!("{}", value & 1)
        } else {
            format!("b{value:0w$b}", w = width as usize)
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn register_pin(&mut self, id: PinId, name: &str, width: u32) -> Result<(), EngineError> {
        let id_code = Self::make_id_code(self.next_id);
        self.next_id += 1;

        writeln!(self.writer, "$var wire {width} {id_code} {name} $end")?;

        self.id_map.push((id, id_code, width));
        Ok(())
    }

    fn begin_scope(&mut self, name: &str) -> Result<(), EngineError> {
        if !self.header_written {
            self.write_header()?;
        }
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), EngineError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn record_change(&mut self, time: u64, id: PinId, value: u64) -> Result<(), EngineError> {
        if !self.header_written {
            self.write_header()?;
        }

        if self.current_time != Some(time) {
            if self.current_time.is_none() {
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "$dumpvars")?;
            }
            writeln!(self.writer, "#{time}")?;
            self.current_time = Some(time);
        }

        let (_, id_code, width) = self
            .id_map
            .iter()
            .find(|(pid, _, _)| *pid == id)
            .ok_or_else(|| EngineError::UnknownPin {
                name: format!("<unregistered VCD pin {}>", id.as_raw()),
            })?;

        let val_str = Self::format_value(value, *width);
        if *width == 1 {
            writeln!(self.writer, "{val_str}{id_code}")?;
        } else {
            writeln!(self.writer, "{val_str} {id_code}")?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), EngineError> {
        if self.current_time.is_none() {
            if !self.header_written {
                self.write_header()?;
            }
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Replays `pattern` into `recorder` under a scope named `scope`.
pub fn record_pattern(
    pattern: &Pattern,
    scope: &str,
    recorder: &mut dyn WaveformRecorder,
) -> Result<(), EngineError> {
    recorder.begin_scope(scope)?;
    let mut ids = HashMap::new();
    for (index, pin) in pattern.pins().iter().enumerate() {
        let id = PinId::from_raw(index as u32);
        recorder.register_pin(id, &pin.name, pin.width)?;
        ids.insert(pin.name.as_str(), id);
    }
    recorder.end_scope()?;

    let mut state: Vec<u64> = pattern.pins().iter().map(|p| p.initial).collect();
    for (index, value) in state.iter().enumerate() {
        recorder.record_change(0, PinId::from_raw(index as u32), *value)?;
    }

    let mut pending: Vec<Option<u64>> = pattern
        .pins()
        .iter()
        .map(|p| p.carried_drive)
        .collect();
    for record in pattern.records() {
        match &record.op {
            Op::Drive { pin, value } => {
                let id = ids.get(pin.as_str()).ok_or_else(|| EngineError::UnknownPin {
                    name: pin.clone(),
                })?;
                pending[id.as_raw() as usize] = Some(*value);
            }
            Op::Cycle => {
                let time = record.cycle.saturating_sub(pattern.start_cycle()) + 1;
                for (index, slot) in pending.iter_mut().enumerate() {
                    if let Some(next) = slot.take() {
                        if state[index] != next {
                            state[index] = next;
                            recorder.record_change(time, PinId::from_raw(index as u32), next)?;
                        }
                    }
                }
            }
            Op::Section { .. } | Op::Assert { .. } => {}
        }
    }
    recorder.finalize()
}

/// Writes `pattern` as a VCD document.
pub fn write_vcd<W: Write>(pattern: &Pattern, scope: &str, writer: W) -> Result<(), EngineError> {
    let mut recorder = VcdRecorder::new(writer);
    record_pattern(pattern, scope, &mut recorder)
}
