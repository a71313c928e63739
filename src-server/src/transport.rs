//! JSON-lines transport
//!
//! One request per line in, one reply per line out:
//!
//! ```text
//! {"id": 1, "method": "item.move", "params": {...}}
//! {"id": 1, "result": {"ok": true, "item": {...}}}
//! ```
//!
//! Each line is handled on its own task, so replies can come back out of
//! order; clients match them by `id`.

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinSet;

use crate::commands::{dispatch, error_envelope};
use crate::domain::DomainError;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct RequestLine {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct ReplyLine {
    id: Value,
    result: Value,
}

async fn handle_line(state: Arc<AppState>, line: String) -> ReplyLine {
    match serde_json::from_str::<RequestLine>(&line) {
        Ok(req) => {
            log::debug!("request {} {}", req.id, req.method);
            let result = dispatch(&state, &req.method, req.params).await;
            ReplyLine { id: req.id, result }
        }
        Err(e) => ReplyLine {
            id: Value::Null,
            result: error_envelope(&DomainError::Validation(format!("malformed request: {}", e))),
        },
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &ReplyLine) -> io::Result<()> {
    let mut out = serde_json::to_vec(reply).map_err(io::Error::other)?;
    out.push(b'\n');
    writer.write_all(&out).await?;
    writer.flush().await
}

/// Serve requests from `reader` until EOF, then drain in-flight calls
pub async fn serve_lines<R, W>(state: Arc<AppState>, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut pending = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => {
                        pending.spawn(handle_line(state.clone(), line));
                    }
                    None => break,
                }
            }
            Some(done) = pending.join_next() => {
                match done {
                    Ok(reply) => write_reply(&mut writer, &reply).await?,
                    Err(e) => log::error!("request task failed: {}", e),
                }
            }
        }
    }

    while let Some(done) = pending.join_next().await {
        match done {
            Ok(reply) => write_reply(&mut writer, &reply).await?,
            Err(e) => log::error!("request task failed: {}", e),
        }
    }
    log::info!("input closed, transport stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;
    use tokio::io::BufReader;

    async fn state() -> Arc<AppState> {
        let db = crate::repository::init_db(Path::new(":memory:"), Duration::from_millis(50))
            .await
            .unwrap();
        Arc::new(AppState::new(db, ":memory:".into()))
    }

    fn replies(out: Vec<u8>) -> Vec<Value> {
        let text = String::from_utf8(out).unwrap();
        text.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_serves_each_line() {
        let state = state().await;
        let input = concat!(
            r#"{"id": 1, "method": "container.create", "params": {"name": "To do"}}"#,
            "\n\n",
            r#"{"id": "b", "method": "board.load"}"#,
            "\n",
        );
        let mut out = Vec::new();
        serve_lines(state.clone(), BufReader::new(input.as_bytes()), &mut out)
            .await
            .unwrap();

        let replies = replies(out);
        assert_eq!(replies.len(), 2);
        let created = replies.iter().find(|r| r["id"] == 1).unwrap();
        assert_eq!(created["result"]["container"]["name"], "To do");
        let board = replies.iter().find(|r| r["id"] == "b").unwrap();
        assert_eq!(board["result"]["ok"], true);
    }

    #[tokio::test]
    async fn test_malformed_line_gets_validation_reply() {
        let state = state().await;
        let mut out = Vec::new();
        serve_lines(state, BufReader::new("not json\n".as_bytes()), &mut out)
            .await
            .unwrap();

        let replies = replies(out);
        assert_eq!(replies[0]["id"], Value::Null);
        assert_eq!(replies[0]["result"]["error"]["kind"], "validation");
    }
}
