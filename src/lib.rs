//!
//! This library provides communication with a Victor 8145C digital multimeter.
//!
//! <br>
//!
//! # Details
//!
//! - The meter talks a line based ASCII protocol over RS-232
//!   (9600 baud, 8n1, hardware flow control).
//!
//! - Basic setup and measurement
//!
//!   ```no_run
//!   use v8145ctrl::{serial::SerialParams, ChannelHost, Device, DEFAULT_TTY};
//!   #[tokio::main]
//!   async fn main() -> v8145ctrl::Result<()> {
//!       let mut device = Device::open(DEFAULT_TTY, &SerialParams::default()).await?;
//!       device.set_limit_samples(Some(5));
//!       let (mut host, mut samples) = ChannelHost::new();
//!       device.acquire(&mut host).await?;
//!       while let Ok(mea) = samples.try_recv() {
//!           println!("{}", mea);
//!       }
//!       device.close().await
//!   }
//!   ```
//!
//! # Supported devices
//!
//!  * Victor 8145C (DC voltage only)
//!

pub mod acquisition;
pub mod config;
pub mod device;
pub mod limits;
pub mod measurement;
pub mod proto;
pub mod serial;

pub use acquisition::{ChannelHost, Host};
pub use device::Device;
pub use proto::Result;

#[cfg(unix)]
pub const DEFAULT_TTY: &str = "/dev/ttyUSB0";
#[cfg(windows)]
pub const DEFAULT_TTY: &str = "COM1";

/// Default Baudrate for Victor 8145C.
pub const DEFAULT_BAUDRATE: u32 = 9600;
