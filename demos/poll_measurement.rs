use v8145ctrl::{serial::SerialParams, ChannelHost, Device, DEFAULT_TTY};

#[tokio::main]
async fn main() -> v8145ctrl::Result<()> {
    env_logger::init();

    let mut device = Device::open(DEFAULT_TTY, &SerialParams::default()).await?;
    device.set_limit_samples(Some(20));

    let (mut host, mut samples) = ChannelHost::new();

    // Samples arrive on the channel while the session is running.
    let printer = tokio::spawn(async move {
        while let Some(mea) = samples.recv().await {
            println!("Value: {}", mea);
        }
    });

    device.acquire(&mut host).await?;
    drop(host);
    let _ = printer.await;
    device.close().await
}
