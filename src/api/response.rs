use std::io::{self, Write};

use axum::{
    http::{
        header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, VARY},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use flate2::{write::DeflateEncoder, Compression, Crc};
use parking_lot::Mutex;
use serde::Serialize;

const APPLICATION_JSON: &str = "application/json";

/// Error payload: `{"Msg": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "Msg")]
    pub msg: String,
}

pub fn write_error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::to_vec(&ErrorBody {
        msg: message.to_string(),
    })
    .unwrap_or_else(|_| br#"{"Msg":"internal error"}"#.to_vec());

    (status, [(CONTENT_TYPE, APPLICATION_JSON)], body).into_response()
}

/// Serialize `value` as the response body. With a pool the response varies
/// on `Accept-Encoding`, and the body is gzipped when the client accepts it.
pub fn write_json<T: Serialize>(
    status: StatusCode,
    value: &T,
    gzip: Option<&GzipPool>,
    request_headers: &HeaderMap,
) -> Response {
    let json = match serde_json::to_vec(value) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to encode response: {}", e);
            return write_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("failed to encode response: {}", e),
            );
        }
    };

    let Some(pool) = gzip else {
        return (status, [(CONTENT_TYPE, APPLICATION_JSON)], json).into_response();
    };

    if accepts_gzip(request_headers) {
        match pool.compress(&json) {
            Ok(compressed) => {
                return (
                    status,
                    [
                        (CONTENT_TYPE, APPLICATION_JSON),
                        (CONTENT_ENCODING, "gzip"),
                        (VARY, "accept-encoding"),
                    ],
                    compressed,
                )
                    .into_response();
            }
            Err(e) => log::warn!("Gzip encoding failed, sending identity body: {}", e),
        }
    }

    (
        status,
        [(CONTENT_TYPE, APPLICATION_JSON), (VARY, "accept-encoding")],
        json,
    )
        .into_response()
}

/// Whether the client lists `gzip` (or `*`) with a non-zero quality.
pub fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|entry| {
            let mut params = entry.split(';').map(str::trim);
            let coding = params.next().unwrap_or_default();
            if !coding.eq_ignore_ascii_case("gzip") && coding != "*" {
                return false;
            }
            params
                .filter_map(|param| param.strip_prefix("q="))
                .all(|q| q.parse::<f32>().map(|q| q > 0.0).unwrap_or(false))
        })
}

// Fixed member header: deflate, no flags, no mtime, unknown OS.
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0x00, 0xff];

const DEFAULT_MAX_IDLE: usize = 64;

/// A reusable gzip compressor. The deflate state is the expensive part to
/// allocate, so it is reset between bodies rather than rebuilt.
struct GzipWriter {
    deflate: DeflateEncoder<Vec<u8>>,
    crc: Crc,
}

impl GzipWriter {
    fn new(level: Compression) -> Self {
        Self {
            deflate: DeflateEncoder::new(Vec::new(), level),
            crc: Crc::new(),
        }
    }

    fn encode(&mut self, data: &[u8]) -> io::Result<Vec<u8>> {
        self.crc.update(data);
        self.deflate.write_all(data)?;
        // reset() finishes the current stream and hands back its output
        let deflated = self.deflate.reset(Vec::new())?;

        let mut out = Vec::with_capacity(GZIP_HEADER.len() + deflated.len() + 8);
        out.extend_from_slice(&GZIP_HEADER);
        out.extend_from_slice(&deflated);
        out.extend_from_slice(&self.crc.sum().to_le_bytes());
        out.extend_from_slice(&self.crc.amount().to_le_bytes());
        Ok(out)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.crc.reset();
        self.deflate.reset(Vec::new()).map(|_| ())
    }
}

/// Process-wide pool of gzip compressors shared by all requests.
pub struct GzipPool {
    idle: Mutex<Vec<GzipWriter>>,
    level: Compression,
    max_idle: usize,
}

impl GzipPool {
    pub fn new(level: Compression, max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            level,
            max_idle,
        }
    }

    /// Gzip `data` with a pooled compressor. The compressor goes back to the
    /// pool whether or not encoding succeeded.
    pub fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut writer = self.acquire();
        let result = writer.encode(data);
        self.release(writer);
        result
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    fn acquire(&self) -> GzipWriter {
        self.idle
            .lock()
            .pop()
            .unwrap_or_else(|| GzipWriter::new(self.level))
    }

    fn release(&self, mut writer: GzipWriter) {
        if let Err(e) = writer.reset() {
            log::warn!("Dropping gzip compressor that failed to reset: {}", e);
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(writer);
        }
    }
}

impl Default for GzipPool {
    fn default() -> Self {
        Self::new(Compression::default(), DEFAULT_MAX_IDLE)
    }
}

impl std::fmt::Debug for GzipPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipPool")
            .field("level", &self.level.level())
            .field("max_idle", &self.max_idle)
            .field("idle", &self.idle_count())
            .finish()
    }
}
