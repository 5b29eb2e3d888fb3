//! Interactive device selection.
//!
//! Prints the enumerated devices with their index, reads one line and
//! returns the chosen device. An invalid answer is reported once; the
//! prompt is never repeated.

use crate::device::Described;
use crate::error::{Error, Result, SelectionError};
use std::io::{BufRead, Write};
use std::num::IntErrorKind;

/// Parse a line of user input as an index into a list of `count` devices.
pub fn parse_choice(line: &str, count: usize) -> std::result::Result<usize, SelectionError> {
    let trimmed = line.trim();
    let choice: i64 = match trimmed.parse() {
        Ok(choice) => choice,
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            return Err(SelectionError::OutOfRange {
                choice: trimmed.trim_start_matches('+').to_string(),
                count,
            });
        }
        Err(_) => {
            return Err(SelectionError::NotANumber {
                input: trimmed.to_string(),
            });
        }
    };

    usize::try_from(choice)
        .ok()
        .filter(|&index| index < count)
        .ok_or_else(|| SelectionError::OutOfRange {
            choice: choice.to_string(),
            count,
        })
}

/// Write the line a rejected selection is reported with.
pub fn report_selection_error(out: &mut impl Write, err: &SelectionError) -> std::io::Result<()> {
    match err {
        SelectionError::OutOfRange { .. } => writeln!(out, "ERROR - {}", err),
        _ => writeln!(out, "Exception: {}", err),
    }
}

/// Prompt for one of `devices` and return it.
///
/// Returns `Ok(None)` after printing a diagnostic when the answer is not a
/// valid index. Only console I/O failures are returned as errors.
pub fn select_device<D, R, W>(devices: Vec<D>, mut input: R, out: &mut W) -> Result<Option<D>>
where
    D: Described,
    R: BufRead,
    W: Write,
{
    writeln!(out, "### SELECT AN INPUT DEVICE ###")?;
    for (i, device) in devices.iter().enumerate() {
        writeln!(out, "[{}] {}", i, device.info())?;
    }
    write!(out, ">> ")?;
    out.flush()?;

    let mut line = String::new();
    let choice = match input.read_line(&mut line).map_err(Error::Io)? {
        0 => Err(SelectionError::NoInput),
        _ => parse_choice(&line, devices.len()),
    };

    match choice {
        Ok(index) => {
            let device = devices.into_iter().nth(index);
            if let Some(device) = &device {
                log::debug!("selected [{}] {}", index, device.info());
            }
            Ok(device)
        }
        Err(err) => {
            // The prompt left the cursor mid-line when input ended early.
            if matches!(err, SelectionError::NoInput) {
                writeln!(out)?;
            }
            report_selection_error(out, &err)?;
            Ok(None)
        }
    }
}
