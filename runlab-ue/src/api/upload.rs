//! Upload timing echo
//!
//! Accepts a multipart form with a binary `file`, a `seq` token and a
//! client timestamp `client_t0_ns`, and echoes them back with the payload
//! size and two server timestamps:
//! - `server_t1_ns`: handler entry, before any of the body is read
//! - `server_t2_ns`: right after the `file` part has been fully read
//!
//! Nothing is stored. The file is streamed and only its length is kept.

use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    Json,
};
use runlab_common::time::AnchoredClock;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::UploadError;

/// Echo returned by `POST /upload`
#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub ok: bool,
    pub seq: String,
    pub bytes_received: usize,
    pub server_t1_ns: i64,
    pub server_t2_ns: i64,
    pub client_t0_ns: String,
}

/// POST /upload
pub async fn upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadReceipt>, UploadError> {
    let clock = AnchoredClock::start();
    let mut multipart = multipart?;

    let mut seq = None;
    let mut client_t0_ns = None;
    let mut file_read: Option<(usize, i64)> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let mut bytes = 0usize;
                while let Some(chunk) = field.chunk().await? {
                    bytes += chunk.len();
                }
                file_read = Some((bytes, clock.now_ns()));
            }
            Some("seq") => seq = Some(field.text().await?),
            Some("client_t0_ns") => client_t0_ns = Some(field.text().await?),
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let (bytes_received, server_t2_ns) = file_read.ok_or(UploadError::MissingField("file"))?;
    let seq = seq.ok_or(UploadError::MissingField("seq"))?;
    let client_t0_ns = client_t0_ns.ok_or(UploadError::MissingField("client_t0_ns"))?;

    info!(
        "Upload seq={} bytes={} read_ns={}",
        seq,
        bytes_received,
        server_t2_ns - clock.start_ns()
    );

    Ok(Json(UploadReceipt {
        ok: true,
        seq,
        bytes_received,
        server_t1_ns: clock.start_ns(),
        server_t2_ns,
        client_t0_ns,
    }))
}
