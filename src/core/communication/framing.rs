//! Wire framing: terminator append on send, terminator split on receive.

/// Frame an outgoing message: payload bytes followed by terminator bytes.
pub fn frame_message(msg: &str, terminator: &str) -> Vec<u8> {
    let mut framed = Vec::with_capacity(msg.len() + terminator.len());
    framed.extend_from_slice(msg.as_bytes());
    framed.extend_from_slice(terminator.as_bytes());
    framed
}

/// Split `buf` into lines on `terminator` boundaries.
///
/// Terminator sequences are stripped; interior empty lines are preserved.
/// A trailing chunk that was cut off before its terminator arrived is
/// returned as-is as the final line. Empty input yields no lines.
///
/// An empty terminator cannot delimit anything, so the whole buffer comes
/// back as a single line.
pub fn split_lines(buf: &[u8], terminator: &[u8]) -> Vec<Vec<u8>> {
    if buf.is_empty() {
        return Vec::new();
    }
    if terminator.is_empty() {
        return vec![buf.to_vec()];
    }

    let mut lines = Vec::new();
    let mut rest = buf;
    while let Some(pos) = find(rest, terminator) {
        lines.push(rest[..pos].to_vec());
        rest = &rest[pos + terminator.len()..];
    }
    if !rest.is_empty() {
        lines.push(rest.to_vec());
    }
    lines
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
