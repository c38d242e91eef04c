use memscope::{AcquisitionEvent, AcquisitionWorker, LinkConfig, PlotBuffer, SerialLink};
use std::io;

fn main() -> io::Result<()> {
    let path = if cfg!(target_os = "linux") {
        "/dev/ttyUSB0".to_string()
    } else if cfg!(target_os = "macos") {
        "/dev/tty.usbserial-0001".to_string()
    } else {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Unsupported OS: {}", std::env::consts::OS),
        ));
    };

    let available = SerialLink::available_ports();
    if !available.is_empty() {
        println!("available ports: {}", available.join(", "));
    }

    let config = LinkConfig {
        path,
        ..LinkConfig::default()
    };
    println!("reading {} at {} baud", config.path, config.baud_rate);

    let mut worker = AcquisitionWorker::new();
    let rx = worker.subscribe();
    let mut plot = PlotBuffer::new(10.0);
    worker.start(config);

    for event in rx {
        match event {
            AcquisitionEvent::PortOpened => println!("port opened"),
            AcquisitionEvent::NewData(record) => {
                println!(
                    "t: {: >8.3}  acc: x {: >10.3} y {: >10.3} z {: >10.3}  \
                     gyro: x {: >10.3} y {: >10.3} z {: >10.3}",
                    record.timestamp,
                    record.channels[0],
                    record.channels[1],
                    record.channels[2],
                    record.channels[3],
                    record.channels[4],
                    record.channels[5],
                );
                plot.append(&record);
            }
            AcquisitionEvent::PortError(message) => eprintln!("port error: {}", message),
            AcquisitionEvent::PortClosed => {
                let retained = plot.series(0).map(|s| s.len()).unwrap_or(0);
                println!(
                    "port closed; {} samples per channel in the last {}s",
                    retained,
                    plot.window()
                );
            }
            AcquisitionEvent::Finished => break,
        }
    }

    Ok(())
}
