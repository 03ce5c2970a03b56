#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Online / identification probe, sent on device open.
    Online,
    /// Request a single measurement line.
    ReadMeasurement,
    /// Reset, sent on stop and close.
    Reset,
}

impl Command {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Command::Online => "#*ONL",
            Command::ReadMeasurement => "#*RD?",
            Command::Reset => "#*RST",
        }
    }

    /// Length on the wire including the CR LF terminator.
    pub fn wire_len(&self) -> usize {
        self.mnemonic().len() + 2
    }
}
