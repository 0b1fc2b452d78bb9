//! Line parser for raw process logs
//!
//! Every raw line follows one fixed grammar:
//!
//! ```text
//! <processId>:<threadId>::<threadName> <YYYY-MM-DD HH:MM:SS,mmm> - <message>
//! ```
//!
//! Parsing never returns a partial record: a line either yields a complete
//! [`LogRecord`] or an [`Error::Parse`] naming the offending line.

use crate::error::{Error, Result};
use crate::types::{parse_timestamp, LogRecord};

/// Separator between the `processId:threadId` head and the rest of the line.
const THREAD_SEPARATOR: &str = "::";

/// Separator between the thread name/timestamp and the message.
const MESSAGE_SEPARATOR: &str = " - ";

/// Ids become part of an output file name and may not contain these.
const FORBIDDEN_ID_CHARS: [char; 3] = ['/', '\\', '\0'];

/// Parse one raw line into a [`LogRecord`].
pub fn parse_line(line: &str) -> Result<LogRecord> {
    let fail = |reason: &str| Error::Parse {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let (head, tail) = line
        .split_once(THREAD_SEPARATOR)
        .ok_or_else(|| fail("missing '::' separator"))?;

    // Exactly two tokens: a third ':' anywhere in the head is malformed.
    let mut ids = head.split(':');
    let (process_id, thread_id) = match (ids.next(), ids.next(), ids.next()) {
        (Some(pid), Some(tid), None) => (pid, tid),
        _ => return Err(fail("expected '<processId>:<threadId>' before '::'")),
    };

    let (name_and_ts, message) = tail
        .split_once(MESSAGE_SEPARATOR)
        .ok_or_else(|| fail("missing ' - ' message separator"))?;

    let (thread_name, ts_text) = name_and_ts
        .split_once(' ')
        .ok_or_else(|| fail("missing timestamp after thread name"))?;

    if process_id.is_empty() || thread_id.is_empty() || thread_name.is_empty() {
        return Err(fail("empty process id, thread id or thread name"));
    }
    if process_id.contains(FORBIDDEN_ID_CHARS) || thread_id.contains(FORBIDDEN_ID_CHARS) {
        return Err(fail("path separator in process id or thread id"));
    }

    let timestamp = parse_timestamp(ts_text).map_err(|e| fail(&e.to_string()))?;

    Ok(LogRecord {
        process_id: process_id.to_string(),
        thread_id: thread_id.to_string(),
        thread_name: thread_name.to_string(),
        timestamp,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{END_MARKER, START_MARKER};

    const LINE: &str = "1234:5678::http-worker-1 2020-08-09 18:59:25,200 - served /index";

    #[test]
    fn test_parse_well_formed_line() {
        let record = parse_line(LINE).unwrap();
        assert_eq!(record.process_id, "1234");
        assert_eq!(record.thread_id, "5678");
        assert_eq!(record.thread_name, "http-worker-1");
        assert_eq!(
            record.timestamp.format("%H:%M:%S%.3f").to_string(),
            "18:59:25.200"
        );
        assert_eq!(record.message, "served /index");
    }

    #[test]
    fn test_render_round_trips() {
        let record = parse_line(LINE).unwrap();
        assert_eq!(record.to_string(), LINE);
        assert_eq!(parse_line(&record.to_string()).unwrap(), record);
    }

    #[test]
    fn test_message_keeps_later_separators() {
        let record =
            parse_line("p:t::main 2020-08-09 18:59:25,200 - a - b :: c").unwrap();
        assert_eq!(record.message, "a - b :: c");
    }

    #[test]
    fn test_empty_message_allowed() {
        let record = parse_line("p:t::main 2020-08-09 18:59:25,200 - ").unwrap();
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_markers_detected() {
        let start = parse_line(&format!("p:t::main 2020-08-09 18:59:25,200 - {START_MARKER}"));
        let end = parse_line(&format!("p:t::main 2020-08-09 18:59:25,900 - {END_MARKER}"));
        assert!(start.unwrap().is_start());
        assert!(end.unwrap().is_end());
    }

    #[test]
    fn test_rejects_missing_double_colon() {
        let err = parse_line("1234:5678:worker 2020-08-09 18:59:25,200 - hi").unwrap_err();
        assert!(matches!(err, Error::Parse { ref reason, .. } if reason.contains("'::'")));
    }

    #[test]
    fn test_rejects_bad_head() {
        assert!(parse_line("1234::worker 2020-08-09 18:59:25,200 - hi").is_err());
        assert!(parse_line("1:2:3::worker 2020-08-09 18:59:25,200 - hi").is_err());
        assert!(parse_line(":5678::worker 2020-08-09 18:59:25,200 - hi").is_err());
    }

    #[test]
    fn test_rejects_missing_message_separator() {
        assert!(parse_line("1:2::worker 2020-08-09 18:59:25,200 hi").is_err());
    }

    #[test]
    fn test_rejects_missing_timestamp() {
        assert!(parse_line("1:2::worker - hi").is_err());
        assert!(parse_line("1:2:: 2020-08-09 18:59:25,200 - hi").is_err());
    }

    #[test]
    fn test_rejects_malformed_timestamp() {
        let err = parse_line("1:2::worker 2020-08-09 18:59:25.200 - hi").unwrap_err();
        match err {
            Error::Parse { line, reason } => {
                assert!(line.contains("18:59:25.200"));
                assert!(reason.starts_with("invalid timestamp"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parse_line("1:2::worker 2020-13-09 18:59:25,200 - hi").is_err());
    }

    #[test]
    fn test_rejects_unpadded_timestamp() {
        assert!(parse_line("p:t::n 2020-8-9 1:2:3,000 - x").is_err());
    }

    #[test]
    fn test_rejects_path_separators_in_ids() {
        for line in [
            "../escaped:1::n 2020-08-09 18:59:25,000 - **START**",
            "p:../../t::n 2020-08-09 18:59:25,000 - **START**",
            "p:a\\b::n 2020-08-09 18:59:25,000 - **START**",
        ] {
            let err = parse_line(line).unwrap_err();
            assert!(
                matches!(err, Error::Parse { ref reason, .. } if reason.contains("path separator")),
                "{line}"
            );
        }
        // Dots alone cannot leave the output directory once joined as `<pid>-<tid>.log`.
        assert!(parse_line("..:1::n 2020-08-09 18:59:25,000 - **START**").is_ok());
    }
}
