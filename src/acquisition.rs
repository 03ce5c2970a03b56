//! Request/response cadence of a measurement session.
//!
//! Starting a session writes one `#*RD?` request. Every decoded response
//! line is forwarded to the [`Host`] and answered with the next request.
//! Once the sample limit is reached the session stops: `#*RST` is written
//! and the host is told to stop polling the serial link.

use std::{io, time::Duration};

use futures::{Sink, SinkExt};
use tokio::sync::mpsc;

use crate::limits::SampleLimitTracker;
use crate::measurement::{self, Measurement};
use crate::proto::{command::Command, ProtoError, Result};

/// The acquisition framework a session reports to.
pub trait Host {
    /// Start delivering serial readiness to the session.
    fn register_readiness_callback(&mut self) -> Result<()>;
    /// Stop delivering serial readiness; also ends the acquisition.
    fn deregister_readiness_callback(&mut self) -> Result<()>;
    fn send_sample(&mut self, measurement: Measurement) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    AwaitingLine,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Sample forwarded, next request sent.
    Emitted,
    /// Line could not be decoded. No request is sent for it.
    Discarded,
    /// Sample forwarded and the session stopped on the sample limit.
    LimitReached,
}

pub(crate) async fn send_command<W>(writer: &mut W, cmd: Command, timeout: Duration) -> Result<()>
where
    W: Sink<Command, Error = io::Error> + Unpin,
{
    match tokio::time::timeout(timeout, writer.send(cmd)).await {
        Ok(res) => Ok(res?),
        Err(_) => Err(ProtoError::Timeout),
    }
}

#[derive(Debug)]
pub struct AcquisitionCycle {
    state: CycleState,
    registered: bool,
    limits: SampleLimitTracker,
    write_timeout: Duration,
}

impl AcquisitionCycle {
    pub fn new(write_timeout: Duration) -> Self {
        Self {
            state: CycleState::Idle,
            registered: false,
            limits: SampleLimitTracker::default(),
            write_timeout,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CycleState::AwaitingLine
    }

    pub fn limits(&self) -> &SampleLimitTracker {
        &self.limits
    }

    pub fn limits_mut(&mut self) -> &mut SampleLimitTracker {
        &mut self.limits
    }

    pub async fn start<W, H>(&mut self, writer: &mut W, host: &mut H) -> Result<()>
    where
        W: Sink<Command, Error = io::Error> + Unpin,
        H: Host,
    {
        if self.state == CycleState::AwaitingLine {
            return Err(ProtoError::AlreadyAcquiring);
        }
        self.limits.reset();

        if let Err(err) = send_command(writer, Command::ReadMeasurement, self.write_timeout).await {
            log::error!("Unable to send capture request: {}", err);
            return Err(err);
        }

        host.register_readiness_callback()?;
        self.registered = true;
        self.state = CycleState::AwaitingLine;
        Ok(())
    }

    pub async fn on_line_complete<W, H>(
        &mut self,
        line: &[u8],
        writer: &mut W,
        host: &mut H,
    ) -> Result<LineOutcome>
    where
        W: Sink<Command, Error = io::Error> + Unpin,
        H: Host,
    {
        if self.state != CycleState::AwaitingLine {
            return Err(ProtoError::NotAcquiring);
        }

        let mea = match measurement::decode(line) {
            Ok(mea) => mea,
            Err(err) => {
                // No new request goes out, the device stays silent until
                // a line arrives on its own.
                log::warn!("{}, line discarded", err);
                return Ok(LineOutcome::Discarded);
            }
        };

        host.send_sample(mea)?;
        self.limits.record_sample();

        if let Err(err) = send_command(writer, Command::ReadMeasurement, self.write_timeout).await {
            log::error!("Unable to send capture request: {}", err);
            return Err(err);
        }

        if self.check_limit(writer, host).await? {
            Ok(LineOutcome::LimitReached)
        } else {
            Ok(LineOutcome::Emitted)
        }
    }

    /// Stop the session if the sample limit is reached. Returns whether it
    /// was stopped. Teardown failures are logged, the session counts as
    /// complete regardless.
    pub async fn check_limit<W, H>(&mut self, writer: &mut W, host: &mut H) -> Result<bool>
    where
        W: Sink<Command, Error = io::Error> + Unpin,
        H: Host,
    {
        if self.state == CycleState::AwaitingLine && self.limits.limit_reached() {
            log::info!(
                "Sample limit reached after {} samples.",
                self.limits.samples_read()
            );
            if let Err(err) = self.stop(writer, host).await {
                log::warn!("Teardown after sample limit incomplete: {}", err);
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Safe to call in any state. A failed reset write is returned after
    /// the teardown has completed.
    pub async fn stop<W, H>(&mut self, writer: &mut W, host: &mut H) -> Result<()>
    where
        W: Sink<Command, Error = io::Error> + Unpin,
        H: Host,
    {
        if self.state == CycleState::Stopped {
            return Ok(());
        }
        self.state = CycleState::Stopped;

        let reset = send_command(writer, Command::Reset, self.write_timeout).await;
        if let Err(err) = &reset {
            log::error!("Unable to send reset request: {}", err);
        }

        if self.registered {
            self.registered = false;
            host.deregister_readiness_callback()?;
        }
        reset
    }
}

/// [`Host`] forwarding samples into an unbounded channel.
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<Measurement>,
    registered: bool,
}

impl ChannelHost {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Measurement>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                registered: false,
            },
            rx,
        )
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl Host for ChannelHost {
    fn register_readiness_callback(&mut self) -> Result<()> {
        self.registered = true;
        Ok(())
    }

    fn deregister_readiness_callback(&mut self) -> Result<()> {
        if !self.registered {
            return Err(ProtoError::NotRegistered);
        }
        self.registered = false;
        Ok(())
    }

    fn send_sample(&mut self, measurement: Measurement) -> Result<()> {
        self.tx.send(measurement).map_err(|_| ProtoError::Abort)
    }
}
