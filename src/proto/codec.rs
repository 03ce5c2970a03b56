use bytes::{Buf, BytesMut};
use std::{
    fmt::{self, Write},
    io::{self},
};
use tokio_util::codec::{Decoder, Encoder};

use super::assembler::{LineAssembler, LineEvent};
use super::response::Response;
use crate::proto::command::Command;

#[derive(Default)]
pub struct ProtocolCodec {
    assembler: LineAssembler,
}

impl ProtocolCodec {
    /// Forget any partially received line.
    pub fn reset(&mut self) {
        self.assembler.reset();
    }
}

impl Decoder for ProtocolCodec {
    type Item = Response;
    // Overflows are reported as a Response, not as an error: the stream
    // resynchronises on the next terminator and stays usable.
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            match self.assembler.feed(src.get_u8()) {
                LineEvent::Incomplete => {}
                LineEvent::LineComplete(line) => {
                    log::trace!("Received line '{}'.", String::from_utf8_lossy(&line));
                    return Ok(Some(Response::Line(line)));
                }
                LineEvent::Overflow => return Ok(Some(Response::Overflow)),
            }
        }
        Ok(None)
    }
}

fn write_fmt_guarded(dst: &mut BytesMut, args: fmt::Arguments<'_>) -> Result<(), io::Error> {
    dst.write_fmt(args)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

impl Encoder<Command> for ProtocolCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        write_fmt_guarded(dst, format_args!("{}\r\n", item.mnemonic()))?;
        log::debug!("Sent command {}", item.mnemonic());
        Ok(())
    }
}
