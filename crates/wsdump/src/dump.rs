//! Message-by-message rendering of a captured receive stream.

use std::io::{BufRead, Write};

use tracing::{debug, info};
use wsframe::{CloseCode, CloseFrame, Connection, Frame, Message, Opcode, WsError};

/// How messages are printed.
pub struct DumpOptions {
    /// One JSON object per line instead of tab-separated text.
    pub json: bool,
    /// Payload bytes shown per message.
    pub preview: usize,
}

/// Why the dump stopped without an error.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The capture ended on a message boundary.
    Eof { messages: usize },
    /// The peer sent a close frame.
    Closed { messages: usize, close: CloseFrame },
}

/// Print every message in the stream until EOF, a close frame, or an error.
///
/// Ending in the middle of a frame or message is an error, as is any
/// protocol or limit violation.
pub fn dump<S: BufRead, W: Write>(
    conn: &mut Connection<S>,
    out: &mut W,
    opts: &DumpOptions,
) -> Result<Outcome, String> {
    let mut messages = 0usize;
    let mut control_frames = 0usize;

    loop {
        let next = conn
            .get_mut()
            .fill_buf()
            .map_err(|e| format!("read capture: {}", e))?
            .first()
            .copied();
        let Some(first) = next else {
            info!(messages, control_frames, "end of capture");
            return Ok(Outcome::Eof { messages });
        };

        // Pings and pongs between messages are consumed here so the capture
        // may end right after one.
        if matches!(Opcode::try_from(first & 0x0F), Ok(Opcode::Ping | Opcode::Pong)) {
            let frame = conn.read_frame().map_err(|e| failure(messages, &e))?;
            skip_control(&frame, &mut control_frames);
            continue;
        }

        let result = conn.read_message_with(|frame| skip_control(frame, &mut control_frames));
        match result {
            Ok(message) => {
                write_message(out, messages, &message, opts)
                    .map_err(|e| format!("write output: {}", e))?;
                messages += 1;
            }
            Err(WsError::Close(close)) => {
                write_close(out, &close, opts.json).map_err(|e| format!("write output: {}", e))?;
                info!(messages, control_frames, code = close.code, "peer closed");
                return Ok(Outcome::Closed { messages, close });
            }
            Err(e) => return Err(failure(messages, &e)),
        }
    }
}

fn skip_control(frame: &Frame, count: &mut usize) {
    *count += 1;
    debug!(opcode = frame.opcode, len = frame.payload.len(), "skipped control frame");
}

fn failure(index: usize, e: &WsError) -> String {
    format!("message {}: {} ({:?} error)", index, e, e.kind())
}

fn write_message<W: Write>(
    out: &mut W,
    index: usize,
    message: &Message,
    opts: &DumpOptions,
) -> std::io::Result<()> {
    let shown = &message.payload[..message.payload.len().min(opts.preview)];
    let text = match message.opcode {
        Opcode::Text => text_preview(shown, shown.len() < message.payload.len()),
        _ => None,
    };
    let shown_len = text.map_or(shown.len(), str::len);

    if opts.json {
        let mut obj = serde_json::json!({
            "index": index,
            "opcode": message.opcode.as_str(),
            "len": message.payload.len(),
        });
        match text {
            Some(t) => obj["text"] = serde_json::Value::String(t.to_string()),
            None => obj["hex"] = serde_json::Value::String(hex(shown)),
        }
        writeln!(out, "{}", obj)
    } else {
        let preview = match text {
            Some(t) => format!("{:?}", t),
            None => hex(shown),
        };
        let ellipsis = if shown_len < message.payload.len() { "..." } else { "" };
        writeln!(
            out,
            "{}\t{}\t{}\t{}{}",
            index,
            message.opcode,
            message.payload.len(),
            preview,
            ellipsis
        )
    }
}

/// Text shown for a preview slice. When the slice was `cut` from a longer
/// payload, a character split at the end is dropped. Any other invalid UTF-8
/// yields `None` so the caller falls back to hex.
fn text_preview(shown: &[u8], cut: bool) -> Option<&str> {
    match std::str::from_utf8(shown) {
        Ok(text) => Some(text),
        Err(e) if cut && e.error_len().is_none() => {
            std::str::from_utf8(&shown[..e.valid_up_to()]).ok()
        }
        Err(_) => None,
    }
}

fn write_close<W: Write>(out: &mut W, close: &CloseFrame, json: bool) -> std::io::Result<()> {
    let name = CloseCode::name(close.code).unwrap_or("unknown");
    if json {
        let obj = serde_json::json!({
            "close": { "code": close.code, "name": name, "reason": close.reason }
        });
        writeln!(out, "{}", obj)
    } else {
        writeln!(out, "close\t{}\t{}\t{:?}", close.code, name, close.reason)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame(fin: bool, opcode: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![(if fin { 0x80 } else { 0x00 }) | opcode, payload.len() as u8];
        out.extend_from_slice(payload);
        out
    }

    fn run(bytes: Vec<u8>, json: bool) -> (Result<Outcome, String>, String) {
        run_with(bytes, &DumpOptions { json, preview: 4 })
    }

    fn run_with(bytes: Vec<u8>, opts: &DumpOptions) -> (Result<Outcome, String>, String) {
        let mut conn = Connection::new(Cursor::new(bytes));
        let mut out = Vec::new();
        let result = dump(&mut conn, &mut out, opts);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn text_output() {
        let bytes = [
            frame(false, 0x1, b"He"),
            frame(true, 0x9, b""),
            frame(true, 0x0, b"llo"),
            frame(true, 0x2, &[0xde, 0xad]),
        ]
        .concat();
        let (result, out) = run(bytes, false);
        assert_eq!(result, Ok(Outcome::Eof { messages: 2 }));
        assert_eq!(out, "0\ttext\t5\t\"Hell\"...\n1\tbinary\t2\tdead\n");
    }

    #[test]
    fn json_output_and_close() {
        let mut close = 1001u16.to_be_bytes().to_vec();
        close.extend_from_slice(b"bye");
        let bytes = [frame(true, 0x1, b"hi"), frame(true, 0x8, &close)].concat();
        let (result, out) = run(bytes, true);
        assert_eq!(
            result,
            Ok(Outcome::Closed {
                messages: 1,
                close: CloseFrame { code: 1001, reason: "bye".to_string() },
            })
        );
        let lines: Vec<serde_json::Value> =
            out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["opcode"], "text");
        assert_eq!(lines[0]["len"], 2);
        assert_eq!(lines[0]["text"], "hi");
        assert_eq!(lines[1]["close"]["code"], 1001);
        assert_eq!(lines[1]["close"]["name"], "going away");
    }

    #[test]
    fn empty_capture() {
        let (result, out) = run(Vec::new(), false);
        assert_eq!(result, Ok(Outcome::Eof { messages: 0 }));
        assert!(out.is_empty());
    }

    #[test]
    fn capture_ending_in_control_frame() {
        let bytes = [frame(true, 0x1, b"hi"), frame(true, 0xA, b"")].concat();
        let (result, out) = run(bytes, false);
        assert_eq!(result, Ok(Outcome::Eof { messages: 1 }));
        assert_eq!(out, "0\ttext\t2\t\"hi\"\n");

        let bytes = [frame(true, 0x9, b"a"), frame(true, 0xA, b"b")].concat();
        let (result, out) = run(bytes, false);
        assert_eq!(result, Ok(Outcome::Eof { messages: 0 }));
        assert!(out.is_empty());
    }

    #[test]
    fn truncated_control_frame_is_error() {
        let mut bytes = frame(true, 0x2, &[1]);
        bytes.extend_from_slice(&frame(true, 0x9, b"ping")[..3]);
        let (result, _) = run(bytes, false);
        let err = result.unwrap_err();
        assert!(err.starts_with("message 1:"), "Error: {}", err);
        assert!(err.contains("Transport"), "Error: {}", err);
    }

    #[test]
    fn text_preview_stops_at_char_boundary() {
        let opts = DumpOptions { json: false, preview: 2 };
        let (result, out) = run_with(frame(true, 0x1, "h\u{e9}llo".as_bytes()), &opts);
        assert_eq!(result, Ok(Outcome::Eof { messages: 1 }));
        assert_eq!(out, "0\ttext\t6\t\"h\"...\n");

        let opts = DumpOptions { json: true, preview: 2 };
        let (_, out) = run_with(frame(true, 0x1, "h\u{e9}llo".as_bytes()), &opts);
        let line: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(line["text"], "h");
    }

    #[test]
    fn invalid_text_falls_back_to_hex() {
        let (_, out) = run(frame(true, 0x1, &[b'a', 0xff, b'b']), false);
        assert_eq!(out, "0\ttext\t3\t61ff62\n");
    }

    #[test]
    fn truncated_capture_is_error() {
        let mut bytes = frame(true, 0x1, b"ok");
        bytes.extend_from_slice(&frame(true, 0x1, b"cut")[..3]);
        let (result, out) = run(bytes, false);
        let err = result.unwrap_err();
        assert!(err.starts_with("message 1:"), "Error: {}", err);
        assert!(err.contains("Transport"), "Error: {}", err);
        assert_eq!(out, "0\ttext\t2\t\"ok\"\n");
    }

    #[test]
    fn protocol_error_is_reported() {
        let (result, _) = run(frame(true, 0x3, b""), false);
        let err = result.unwrap_err();
        assert_eq!(err, "message 0: unknown control message, fin=true, op=3 (Protocol error)");
    }
}
