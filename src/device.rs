use futures::StreamExt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::SerialStream;
use tokio_util::codec::{Decoder, Framed};

use crate::acquisition::{send_command, AcquisitionCycle, CycleState, Host};
use crate::config::{self, ConfigKey, ConfigValue, OptionScope};
use crate::limits::SampleLimitTracker;
use crate::proto::{codec::ProtocolCodec, command::Command, response::Response, ProtoError};
use crate::proto::Result;
use crate::serial::SerialParams;

pub const VENDOR: &str = "Victor";
pub const MODEL: &str = "8145C";
/// Name of the single analog channel.
pub const CHANNEL: &str = "A1";

/// How long to wait for the reply to the online probe.
const IDENT_TIMEOUT: Duration = Duration::from_millis(100);

/// One open multimeter along with its acquisition state.
///
/// A device owns the framed serial link (including the line buffer) and
/// the acquisition cycle with its sample limit. It lives from
/// [`Device::new`] until [`Device::close`].
pub struct Device<T = SerialStream> {
    stream: Framed<T, ProtocolCodec>,
    cycle: AcquisitionCycle,
    write_timeout: Duration,
    ident: Option<String>,
}

impl Device<SerialStream> {
    pub fn new(com: impl AsRef<str>, params: &SerialParams) -> Result<Self> {
        let port = params.open(com)?;
        Ok(Self::with_transport(
            port,
            params.write_timeout(Command::ReadMeasurement.wire_len()),
        ))
    }

    /// Open the port and send the online probe.
    pub async fn open(com: impl AsRef<str>, params: &SerialParams) -> Result<Self> {
        let mut device = Self::new(com, params)?;
        device.ident().await?;
        Ok(device)
    }
}

#[cfg(test)]
impl Device<crate::proto::fake::FakeBuffer> {
    pub(crate) fn new_faked(fake: crate::proto::fake::FakeBuffer) -> Self {
        Self::with_transport(
            fake,
            SerialParams::default().write_timeout(Command::ReadMeasurement.wire_len()),
        )
    }
}

impl<T> Device<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    fn with_transport(io: T, write_timeout: Duration) -> Self {
        Self {
            stream: ProtocolCodec::default().framed(io),
            cycle: AcquisitionCycle::new(write_timeout),
            write_timeout,
            ident: None,
        }
    }

    /// Send `#*ONL` and return the reply line, if the device sent one.
    ///
    /// The reply is not interpreted.
    pub async fn ident(&mut self) -> Result<Option<String>> {
        if let Err(err) = send_command(&mut self.stream, Command::Online, self.write_timeout).await
        {
            log::error!("Unable to send identification request: {}", err);
            return Err(err);
        }

        let reply = match tokio::time::timeout(IDENT_TIMEOUT, self.stream.next()).await {
            Ok(Some(Ok(Response::Line(line)))) => {
                Some(String::from_utf8_lossy(&line).into_owned())
            }
            Ok(Some(Ok(Response::Overflow))) => None,
            Ok(Some(Err(ioerr))) => return Err(ioerr.into()),
            Ok(None) | Err(_) => None,
        };
        log::debug!("Identification reply: {:?}", reply);
        self.ident = reply.clone();
        Ok(reply)
    }

    /// Reply to the last online probe.
    pub fn identification(&self) -> Option<&str> {
        self.ident.as_deref()
    }

    pub fn state(&self) -> CycleState {
        self.cycle.state()
    }

    pub fn limits(&self) -> &SampleLimitTracker {
        self.cycle.limits()
    }

    pub fn set_limit_samples(&mut self, limit: Option<u64>) {
        self.cycle.limits_mut().configure(limit);
    }

    pub fn config_get(&self, key: ConfigKey) -> Result<ConfigValue> {
        self.cycle.limits().config_get(key)
    }

    pub fn config_set(&mut self, key: ConfigKey, value: &ConfigValue) -> Result<()> {
        if !key.is_settable() {
            return Err(ProtoError::NotApplicable(key));
        }
        self.cycle.limits_mut().config_set(key, value)
    }

    /// Keys accepted in the given scope.
    pub fn config_list(scope: OptionScope) -> &'static [ConfigKey] {
        config::config_list(scope)
    }

    /// Run one acquisition session until the sample limit is reached.
    ///
    /// Without a limit this only returns on error, or when the future is
    /// dropped, in which case [`Device::acquisition_stop`] must follow.
    /// Link errors abort the session after a best-effort stop.
    /// Overflowing and malformed lines are skipped.
    pub async fn acquire<H: Host>(&mut self, host: &mut H) -> Result<()> {
        self.stream.codec_mut().reset();
        self.cycle.start(&mut self.stream, host).await?;

        while self.cycle.is_running() {
            let event = self.stream.next().await;
            let result = match event {
                Some(Ok(Response::Line(line))) => self
                    .cycle
                    .on_line_complete(&line, &mut self.stream, host)
                    .await
                    .map(|_| ()),
                Some(Ok(Response::Overflow)) => {
                    log::warn!("{}, waiting for next line", ProtoError::BufferOverflow);
                    Ok(())
                }
                Some(Err(ioerr)) => Err(ioerr.into()),
                None => Err(ProtoError::Abort),
            };

            if let Err(err) = result {
                if let Err(stop_err) = self.acquisition_stop(host).await {
                    log::warn!("Teardown after failed acquisition: {}", stop_err);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Stop a running acquisition. Any partial line is dropped.
    pub async fn acquisition_stop<H: Host>(&mut self, host: &mut H) -> Result<()> {
        self.stream.codec_mut().reset();
        self.cycle.stop(&mut self.stream, host).await
    }

    pub async fn reset(&mut self) -> Result<()> {
        send_command(&mut self.stream, Command::Reset, self.write_timeout).await
    }

    /// Close the link. The device is reset unless a stopped acquisition
    /// already did so.
    pub async fn close(mut self) -> Result<()> {
        if self.cycle.state() == CycleState::Stopped {
            return Ok(());
        }
        self.reset().await
    }
}
