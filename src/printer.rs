//! The event printing loop.

use crate::categorize::categorize;
use crate::device::EventSource;
use crate::error::Result;
use evdev::InputEvent;
use std::convert::Infallible;
use std::io::Write;

/// Whether an event carries a payload worth printing.
///
/// Code zero is dropped: for synchronization events this is the frame
/// marker `SYN_REPORT`.
pub fn should_print(event: &InputEvent) -> bool {
    event.code() != 0
}

/// Write one event as `<categorized>: <value>`.
pub fn write_event(out: &mut impl Write, event: &InputEvent) -> std::io::Result<()> {
    writeln!(out, "{}: {}", categorize(event), event.value())?;
    out.flush()
}

/// Print events from `source` to `out` in arrival order until the source fails.
///
/// This never returns `Ok`: the loop ends only on a read error, an
/// interruption or an output failure.
pub fn print_events<S, W>(source: &mut S, out: &mut W) -> Result<Infallible>
where
    S: EventSource + ?Sized,
    W: Write,
{
    loop {
        let event = source.next_event()?;
        if !should_print(&event) {
            log::trace!("dropped {:?}", event);
            continue;
        }
        write_event(out, &event)?;
    }
}
