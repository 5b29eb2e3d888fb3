//! Displays raw events from HID-compatible input devices.
//!
//! Run with: rawev [-d /dev/input/eventN] [--grab]
//!
//! Without `--device` the available devices are listed and one is chosen
//! by number. Press Ctrl+C to exit.

use clap::Parser;
use rawev::{
    DeviceInfo, Described, EvdevDevice, Error, EventSource, Result, print_events, select_device,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Status the process exits with when no device could be used (-1).
const FAILURE: u8 = 255;

#[derive(Parser, Debug)]
#[command(version, about = "Displays raw events from HID-compatible input devices")]
struct Args {
    /// Input device to open
    #[arg(short, long, value_name = "PATH")]
    device: Option<PathBuf>,

    /// Grab the device so other applications stop receiving its events
    #[arg(short, long)]
    grab: bool,
}

fn device_header(info: &DeviceInfo) -> String {
    format!("### DEVICE: {} ###", info)
}

/// Print `Exception: <err>`. A closed stdout is not reported twice.
fn report(out: &mut impl Write, err: &Error) {
    let _ = writeln!(out, "Exception: {}", err).and_then(|_| out.flush());
}

/// Exit status for the error that ended the event loop.
fn exit_status(err: &Error) -> u8 {
    match err {
        Error::Interrupted => 0,
        // Reader went away, e.g. `rawev | head`.
        Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe => 0,
        _ => FAILURE,
    }
}

/// Open the device at `path`, or ask the user to pick one of `enumerate()`.
///
/// On failure the diagnostic has been printed and `Err` carries the exit status.
fn choose_device<D, R, W>(
    path: Option<&Path>,
    open: impl FnOnce(&Path) -> Result<D>,
    enumerate: impl FnOnce() -> Result<Vec<D>>,
    input: R,
    out: &mut W,
) -> std::result::Result<D, u8>
where
    D: Described,
    R: BufRead,
    W: Write,
{
    let result = match path {
        Some(path) => open(path).map(Some),
        None => enumerate().and_then(|devices| select_device(devices, input, out)),
    };

    match result {
        Ok(Some(device)) => Ok(device),
        Ok(None) => Err(FAILURE),
        Err(e) => {
            report(out, &e);
            Err(FAILURE)
        }
    }
}

/// Print the device header, then events until the loop ends.
fn stream<S, W>(device: &mut S, out: &mut W) -> u8
where
    S: Described + EventSource,
    W: Write,
{
    let header = writeln!(out, "{}", device_header(device.info())).and_then(|_| out.flush());
    let err = match header
        .map_err(Error::Io)
        .and_then(|_| print_events(&mut *device, &mut *out))
    {
        Ok(never) => match never {},
        Err(e) => e,
    };

    let status = exit_status(&err);
    if status == 0 {
        log::info!("{}, releasing {}", err, device.info().path.display());
    } else {
        report(out, &err);
    }
    status
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let mut out = io::stdout().lock();

    let device = match choose_device(
        args.device.as_deref(),
        |path| EvdevDevice::open(path),
        rawev::enumerate_devices,
        io::stdin().lock(),
        &mut out,
    ) {
        Ok(device) => device,
        Err(status) => return ExitCode::from(status),
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        log::warn!("failed to install Ctrl+C handler: {}", e);
    }

    let mut device = device.with_running(running);
    if args.grab {
        if let Err(e) = device.grab() {
            report(&mut out, &e);
            return ExitCode::from(FAILURE);
        }
    }

    ExitCode::from(stream(&mut device, &mut out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::{EventType, InputEvent};
    use std::collections::VecDeque;
    use std::io::Cursor;

    struct FakeDevice {
        info: DeviceInfo,
        events: VecDeque<InputEvent>,
        end: Option<Error>,
    }

    impl Described for FakeDevice {
        fn info(&self) -> &DeviceInfo {
            &self.info
        }
    }

    impl EventSource for FakeDevice {
        fn next_event(&mut self) -> Result<InputEvent> {
            match self.events.pop_front() {
                Some(event) => Ok(event),
                None => Err(self.end.take().unwrap_or(Error::Interrupted)),
            }
        }
    }

    fn fake(path: &str, name: &str) -> FakeDevice {
        FakeDevice {
            info: DeviceInfo {
                path: PathBuf::from(path),
                name: name.into(),
                phys: "usb-0000:00:14.0-1/input0".into(),
            },
            events: VecDeque::new(),
            end: None,
        }
    }

    fn keyboard_and_mouse() -> Result<Vec<FakeDevice>> {
        Ok(vec![
            fake("/dev/input/event0", "Keyboard"),
            fake("/dev/input/event3", "Mouse"),
        ])
    }

    fn open_known(path: &Path) -> Result<FakeDevice> {
        match keyboard_and_mouse()?
            .into_iter()
            .find(|d| d.info.path == path)
        {
            Some(device) => Ok(device),
            None => Err(Error::Open {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    /// A stdout whose reader has gone away.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_parse_device_and_grab() {
        let args = Args::try_parse_from(["rawev", "-d", "/dev/input/event0", "--grab"]).unwrap();
        assert_eq!(args.device, Some(PathBuf::from("/dev/input/event0")));
        assert!(args.grab);

        let args = Args::try_parse_from(["rawev", "--device", "/dev/input/event3", "-g"]).unwrap();
        assert_eq!(args.device, Some(PathBuf::from("/dev/input/event3")));
        assert!(args.grab);
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["rawev"]).unwrap();
        assert_eq!(args.device, None);
        assert!(!args.grab);
    }

    #[test]
    fn test_parse_rejects_bad_flags() {
        assert!(Args::try_parse_from(["rawev", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["rawev", "-d"]).is_err());
    }

    #[test]
    fn test_device_header() {
        let device = fake("/dev/input/event0", "Keyboard");
        assert_eq!(
            device_header(&device.info),
            "### DEVICE: /dev/input/event0 \"Keyboard\" (usb-0000:00:14.0-1/input0) ###"
        );
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&Error::Interrupted), 0);
        assert_eq!(
            exit_status(&Error::Io(io::ErrorKind::BrokenPipe.into())),
            0
        );
        assert_eq!(
            exit_status(&Error::Read {
                path: "/dev/input/event0".into(),
                source: io::Error::from_raw_os_error(libc::ENODEV),
            }),
            FAILURE
        );
    }

    #[test]
    fn test_explicit_device_streams_events() {
        let mut out = Vec::new();
        let mut device = choose_device(
            Some(Path::new("/dev/input/event0")),
            open_known,
            || unreachable!("no enumeration with an explicit device"),
            Cursor::new(""),
            &mut out,
        )
        .ok()
        .unwrap();
        device.events.extend([
            InputEvent::new(EventType::KEY, 30, 1),
            InputEvent::new(EventType::SYNCHRONIZATION, 0, 0),
        ]);

        let status = stream(&mut device, &mut out);
        assert_eq!(status, 0);
        assert_eq!(
            output(out),
            "### DEVICE: /dev/input/event0 \"Keyboard\" (usb-0000:00:14.0-1/input0) ###\n\
             key event at 0.000000, 30 (KEY_A), down: 1\n"
        );
    }

    #[test]
    fn test_explicit_device_open_failure() {
        let mut out = Vec::new();
        let result = choose_device(
            Some(Path::new("/dev/input/event9")),
            open_known,
            || unreachable!("no enumeration with an explicit device"),
            Cursor::new(""),
            &mut out,
        );
        assert_eq!(result.err(), Some(FAILURE));
        assert!(output(out).starts_with("Exception: cannot open /dev/input/event9: "));
    }

    #[test]
    fn test_selecting_mouse() {
        let mut out = Vec::new();
        let device = choose_device(
            None,
            open_known,
            keyboard_and_mouse,
            Cursor::new("1\n"),
            &mut out,
        )
        .ok()
        .unwrap();
        assert_eq!(device.info.path, PathBuf::from("/dev/input/event3"));
        assert_eq!(device.info.name, "Mouse");
    }

    #[test]
    fn test_invalid_choice_exits_with_failure() {
        let mut out = Vec::new();
        let result = choose_device(
            None,
            open_known,
            keyboard_and_mouse,
            Cursor::new("5\n"),
            &mut out,
        );
        assert_eq!(result.err(), Some(FAILURE));
        assert!(output(out).ends_with("ERROR - Invalid choice: 5\n"));
    }

    #[test]
    fn test_enumeration_failure() {
        let mut out = Vec::new();
        let result = choose_device(
            None,
            open_known,
            || {
                Err(Error::Enumeration {
                    path: "/dev/input".into(),
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                })
            },
            Cursor::new("0\n"),
            &mut out,
        );
        assert_eq!(result.err(), Some(FAILURE));
        assert!(output(out).starts_with("Exception: cannot list input devices in /dev/input: "));
    }

    #[test]
    fn test_read_failure_is_reported() {
        let mut device = fake("/dev/input/event3", "Mouse");
        device.end = Some(Error::Read {
            path: "/dev/input/event3".into(),
            source: io::Error::from_raw_os_error(libc::ENODEV),
        });

        let mut out = Vec::new();
        let status = stream(&mut device, &mut out);
        assert_eq!(status, FAILURE);
        let out = output(out);
        let last = out.lines().last().unwrap();
        assert!(last.starts_with("Exception: cannot read from /dev/input/event3: "));
    }

    #[test]
    fn test_closed_stdout_does_not_panic() {
        let mut device = fake("/dev/input/event0", "Keyboard");
        device
            .events
            .push_back(InputEvent::new(EventType::KEY, 30, 1));
        assert_eq!(stream(&mut device, &mut ClosedPipe), 0);
    }
}
