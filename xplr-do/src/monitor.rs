// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial port detection and the interactive raw terminal.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use regex::Regex;
use serialport::{SerialPortInfo, SerialPortType};

/// Console baud rate of the XPLR-IOT-1 examples.
pub const BAUD_RATE: u32 = 115_200;

/// Signature of the CP2105 bridge interface wired to the nRF5340 UART0.
const UART0_PATTERN: &str = "CP210.+Interface 0";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn uart0_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UART0_PATTERN).expect("valid regex"))
}

/// Human readable description of a port: name, USB product and interface.
pub fn port_label(port: &SerialPortInfo) -> String {
    let mut label = port.port_name.clone();
    if let SerialPortType::UsbPort(usb) = &port.port_type {
        if let Some(product) = &usb.product {
            label.push_str(" - ");
            label.push_str(product);
        }
        if let Some(interface) = usb.interface {
            label.push_str(&format!(" - Interface {}", interface));
        }
    }
    label
}

/// First port whose label matches the XPLR-IOT-1 UART0 signature.
pub fn find_uart0(ports: &[SerialPortInfo]) -> Option<String> {
    ports
        .iter()
        .find(|p| uart0_re().is_match(&port_label(p)))
        .map(|p| p.port_name.clone())
}

/// Scan the system serial ports for the XPLR-IOT-1 UART0.
pub fn detect_uart0() -> Result<String> {
    let ports = serialport::available_ports().context("Failed to list serial ports")?;
    for port in &ports {
        log::debug!("Found serial port: {}", port_label(port));
    }
    match find_uart0(&ports) {
        Some(name) => Ok(name),
        None => bail!("Failed to detect the serial port.\nIs the unit connected?"),
    }
}

/// What a key press means to the terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    Send(Vec<u8>),
    Quit,
    Ignore,
}

/// Map a key press to the bytes sent to the device.
///
/// `Ctrl+]` quits. Terminals report it either as `]` or as `5` with the
/// control modifier.
pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let bytes: &[u8] = match key.code {
        KeyCode::Char(']') | KeyCode::Char('5') if ctrl => return KeyAction::Quit,
        KeyCode::Char(c) if ctrl && c.is_ascii_alphabetic() => {
            return KeyAction::Send(vec![c.to_ascii_lowercase() as u8 - b'a' + 1]);
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            return KeyAction::Send(c.encode_utf8(&mut buf).as_bytes().to_vec());
        }
        KeyCode::Enter => b"\r",
        KeyCode::Tab => b"\t",
        KeyCode::Backspace => b"\x08",
        KeyCode::Esc => b"\x1b",
        KeyCode::Delete => b"\x1b[3~",
        KeyCode::Up => b"\x1b[A",
        KeyCode::Down => b"\x1b[B",
        KeyCode::Right => b"\x1b[C",
        KeyCode::Left => b"\x1b[D",
        KeyCode::Home => b"\x1b[H",
        KeyCode::End => b"\x1b[F",
        _ => return KeyAction::Ignore,
    };
    KeyAction::Send(bytes.to_vec())
}

/// Restores cooked mode when dropped, including on error paths.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to switch terminal to raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Bridge the console and `port_name` until the user quits with `Ctrl+]`.
///
/// Device output is copied verbatim to stdout by a reader thread; key
/// presses are forwarded from the calling thread.
pub fn run_terminal(port_name: &str, baud_rate: u32) -> Result<()> {
    let mut port = serialport::new(port_name, baud_rate)
        .timeout(POLL_INTERVAL)
        .open()
        .with_context(|| format!("Failed to open serial port {}", port_name))?;
    let reader = port
        .try_clone()
        .with_context(|| format!("Failed to clone serial port {}", port_name))?;

    println!(
        "--- Monitor on {} at {} baud --- Quit: Ctrl+] ---",
        port_name, baud_rate
    );

    bridge(reader, RawModeGuard::enable, |stop| forward_keys(&mut *port, stop))
}

/// Copy `reader` to stdout on a worker thread while `forward` runs on the
/// calling one. Either side stopping ends the session. The console is in raw
/// mode for exactly the lifetime of the worker.
fn bridge<R, G>(
    mut reader: R,
    raw_mode: impl FnOnce() -> Result<G>,
    forward: impl FnOnce(&AtomicBool) -> Result<()>,
) -> Result<()>
where
    R: Read + Send + 'static,
{
    let raw = raw_mode()?;

    let stop = Arc::new(AtomicBool::new(false));
    let reader_stop = Arc::clone(&stop);
    let reader_thread = thread::spawn(move || -> io::Result<()> {
        let mut buf = [0u8; 1024];
        let mut stdout = io::stdout();
        while !reader_stop.load(Ordering::Relaxed) {
            match reader.read(&mut buf) {
                Ok(0) => {}
                Ok(n) => {
                    stdout.write_all(&buf[..n])?;
                    stdout.flush()?;
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) => {
                    reader_stop.store(true, Ordering::Relaxed);
                    return Err(e);
                }
            }
        }
        Ok(())
    });

    let result = forward(&stop);
    stop.store(true, Ordering::Relaxed);
    drop(raw);

    println!();
    println!("--- exit ---");

    let read_result = reader_thread
        .join()
        .map_err(|_| anyhow::anyhow!("Serial reader thread panicked"))?;
    result?;
    read_result.context("Serial read error")
}

fn forward_keys(port: &mut dyn serialport::SerialPort, stop: &AtomicBool) -> Result<()> {
    while !stop.load(Ordering::Relaxed) {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            match key_action(&key) {
                KeyAction::Send(bytes) => {
                    port.write_all(&bytes).context("Failed to write to serial port")?;
                    port.flush()?;
                }
                KeyAction::Quit => break,
                KeyAction::Ignore => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;
    use std::sync::atomic::AtomicUsize;

    fn usb_port(name: &str, product: &str, interface: Option<u8>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x10c4,
                pid: 0xea70,
                serial_number: None,
                manufacturer: Some("Silicon Labs".to_string()),
                product: Some(product.to_string()),
                interface,
            }),
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_finds_cp2105_interface_0() {
        let ports = vec![
            SerialPortInfo {
                port_name: "/dev/ttyS0".to_string(),
                port_type: SerialPortType::Unknown,
            },
            usb_port("/dev/ttyUSB1", "CP2105 Dual USB to UART Bridge Controller", Some(1)),
            usb_port("/dev/ttyUSB0", "CP2105 Dual USB to UART Bridge Controller", Some(0)),
        ];
        assert_eq!(find_uart0(&ports).as_deref(), Some("/dev/ttyUSB0"));
    }

    #[test]
    fn test_no_matching_port() {
        let ports = vec![usb_port("/dev/ttyACM0", "J-Link", Some(0))];
        assert_eq!(find_uart0(&ports), None);
        assert_eq!(find_uart0(&[]), None);
    }

    #[test]
    fn test_port_label() {
        let port = usb_port("COM4", "CP2105 Dual USB to UART Bridge Controller", Some(0));
        assert_eq!(
            port_label(&port),
            "COM4 - CP2105 Dual USB to UART Bridge Controller - Interface 0"
        );
    }

    /// Counts reads and fails every one with `kind`.
    struct FailingReader {
        reads: Arc<AtomicUsize>,
        kind: io::ErrorKind,
    }

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.reads.fetch_add(1, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(1));
            Err(io::Error::from(self.kind))
        }
    }

    fn wait_for_stop(stop: &AtomicBool) -> Result<()> {
        while !stop.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }

    #[test]
    fn test_raw_mode_failure_starts_no_reader() {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = FailingReader {
            reads: Arc::clone(&reads),
            kind: io::ErrorKind::TimedOut,
        };
        let result = bridge(
            reader,
            || -> Result<()> { bail!("not a terminal") },
            |_: &AtomicBool| -> Result<()> { panic!("keys forwarded without raw mode") },
        );
        assert!(result.unwrap_err().to_string().contains("not a terminal"));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(reads.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_read_error_ends_session() {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = FailingReader {
            reads: Arc::clone(&reads),
            kind: io::ErrorKind::BrokenPipe,
        };
        let err = bridge(reader, || -> Result<()> { Ok(()) }, wait_for_stop).unwrap_err();
        assert_eq!(err.to_string(), "Serial read error");
        assert_eq!(reads.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_quit_stops_reader() {
        let reads = Arc::new(AtomicUsize::new(0));
        let reader = FailingReader {
            reads: Arc::clone(&reads),
            kind: io::ErrorKind::TimedOut,
        };
        bridge(reader, || -> Result<()> { Ok(()) }, |_: &AtomicBool| -> Result<()> {
            thread::sleep(Duration::from_millis(50));
            Ok(())
        })
        .unwrap();
        assert!(reads.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_ctrl_bracket_quits() {
        assert_eq!(
            key_action(&press(KeyCode::Char(']'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
        assert_eq!(
            key_action(&press(KeyCode::Char('5'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_keys_are_sent_raw() {
        assert_eq!(
            key_action(&press(KeyCode::Char('a'), KeyModifiers::NONE)),
            KeyAction::Send(b"a".to_vec())
        );
        assert_eq!(
            key_action(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Send(vec![0x03])
        );
        assert_eq!(
            key_action(&press(KeyCode::Enter, KeyModifiers::NONE)),
            KeyAction::Send(b"\r".to_vec())
        );
        assert_eq!(
            key_action(&press(KeyCode::Up, KeyModifiers::NONE)),
            KeyAction::Send(b"\x1b[A".to_vec())
        );
        assert_eq!(
            key_action(&press(KeyCode::F(5), KeyModifiers::NONE)),
            KeyAction::Ignore
        );
    }
}
