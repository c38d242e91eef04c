//! Serial acquisition pipeline for a microcontroller-attached MEMS motion
//! sensor: link management, frame reassembly into records, a background
//! acquisition worker, and the bounded plot buffer that feeds the chart
//! renderer.
//!
//! Data flow: [`SerialLink`] bytes → [`FrameParser`] → `SampleRecord` →
//! [`AcquisitionWorker`] event queue → [`PlotBuffer`] on the foreground
//! context.

pub mod config;
pub mod frame;
pub mod link;
pub mod plot;
pub mod worker;

pub use config::LinkConfig;
pub use frame::FrameParser;
pub use link::SerialLink;
pub use plot::PlotBuffer;
pub use worker::AcquisitionWorker;

pub use memscope_traits::{
    AcquisitionEvent, LinkError, SampleRecord, Subscriber, CHANNEL_COUNT,
};
