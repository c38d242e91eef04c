use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};
use memscope_traits::AcquisitionEvent;

use crate::config::LinkConfig;
use crate::frame::FrameParser;
use crate::link::SerialLink;

/// Wait between polls when the transport had nothing buffered.
const IDLE_WAIT: Duration = Duration::from_millis(5);

/// Drives the open/read/close lifecycle on a background thread and publishes
/// events to subscribers.
///
/// The open/closed flag is the only state shared between the read loop and
/// the controlling context; `stop` clears it and the loop exits at its next
/// iteration boundary, so stop latency is bounded by one read wait.
pub struct AcquisitionWorker {
    port_open: Arc<Mutex<bool>>,
    senders: Vec<Sender<AcquisitionEvent>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AcquisitionWorker {
    pub fn new() -> Self {
        AcquisitionWorker {
            port_open: Arc::new(Mutex::new(false)),
            senders: Vec::new(),
            handle: None,
        }
    }

    /// Registers a subscriber. Call before `start`; each subscriber gets its
    /// own FIFO queue and delivery never blocks the read loop.
    pub fn subscribe(&mut self) -> Receiver<AcquisitionEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    /// Whether a session is currently open.
    pub fn is_open(&self) -> bool {
        self.port_open.lock().map(|flag| *flag).unwrap_or(false)
    }

    /// Opens the link on a background thread and, on success, enters the read
    /// loop. Open failure surfaces as a `PortError` event followed by
    /// `Finished`; the loop is not entered. A second `start` while a session
    /// runs is ignored.
    pub fn start(&mut self, config: LinkConfig) {
        if let Some(handle) = &self.handle {
            if !handle.is_finished() {
                warn!("acquisition already running; start ignored");
                return;
            }
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let port_open = Arc::clone(&self.port_open);
        let senders = self.senders.clone();
        self.handle = Some(thread::spawn(move || run(config, port_open, senders)));
    }

    /// Requests the read loop to exit at its next iteration boundary. The
    /// thread then closes the link and emits `PortClosed` and `Finished`.
    pub fn stop(&self) {
        if let Ok(mut flag) = self.port_open.lock() {
            *flag = false;
        }
    }
}

impl Default for AcquisitionWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AcquisitionWorker {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(config: LinkConfig, port_open: Arc<Mutex<bool>>, senders: Vec<Sender<AcquisitionEvent>>) {
    let emit = |event: AcquisitionEvent| {
        for sender in &senders {
            let _ = sender.send(event.clone());
        }
    };

    let mut link = SerialLink::new();
    if let Err(e) = link.open(&config) {
        error!("open failed: {}", e);
        emit(AcquisitionEvent::PortError(e.to_string()));
        emit(AcquisitionEvent::Finished);
        return;
    }
    set_flag(&port_open, true);
    emit(AcquisitionEvent::PortOpened);
    debug!("acquisition started on {}", config.path);

    let mut parser = FrameParser::new(config.sample_rate_hz);
    while flag_set(&port_open) {
        match link.read_available() {
            Ok(bytes) if bytes.is_empty() => thread::sleep(IDLE_WAIT),
            Ok(bytes) => {
                for record in parser.feed(&bytes) {
                    emit(AcquisitionEvent::NewData(record));
                }
            }
            Err(e) => {
                error!("serial link failed: {}", e);
                emit(AcquisitionEvent::PortError(e.to_string()));
                break;
            }
        }
    }

    link.close();
    set_flag(&port_open, false);
    emit(AcquisitionEvent::PortClosed);
    emit(AcquisitionEvent::Finished);
    debug!("acquisition thread exiting");
}

fn set_flag(flag: &Mutex<bool>, value: bool) {
    if let Ok(mut guard) = flag.lock() {
        *guard = value;
    }
}

fn flag_set(flag: &Mutex<bool>) -> bool {
    flag.lock().map(|guard| *guard).unwrap_or(false)
}
