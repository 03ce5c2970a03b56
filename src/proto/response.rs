/// Events produced by the framing codec.
///
/// The device answers every request with a single ASCII line
/// terminated by CR LF. Lines are handed out as raw bytes without the
/// terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Line(Vec<u8>),
    /// A line exceeded the line buffer and was dropped.
    Overflow,
}
