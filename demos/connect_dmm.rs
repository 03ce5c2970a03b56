use v8145ctrl::{serial::SerialParams, Device, DEFAULT_TTY};

#[tokio::main]
async fn main() -> v8145ctrl::Result<()> {
    let mut device = Device::new(DEFAULT_TTY, &SerialParams::default())?;
    match device.ident().await? {
        Some(reply) => eprintln!("Connected to: {}\n", reply),
        None => eprintln!("No reply to online probe\n"),
    }
    device.close().await
}
