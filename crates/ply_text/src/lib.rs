//! PLY_TEXT: lenient reader for ASCII PLY point clouds.
//!
//! - Reads positions (x, y, z) and, when declared, 8-bit RGB per vertex.
//! - Single pass over the text; output buffers are allocated once from the
//!   declared vertex count and never grown.
//! - Malformed data rows are skipped instead of failing the whole file.
//!
//! Accepted layout (line oriented, LF or CRLF):
//!   ply                          first token of the payload
//!   format ascii 1.0             optional, recorded but not enforced
//!   comment ...                  ignored
//!   element vertex N             N > 0, last declaration wins
//!   property float x             ignored except:
//!   property uchar red           => per-vertex color present
//!   ...
//!   end_header                   sentinel
//!   x y z [r g b ...]            one vertex per non-empty row
//!
//! Row rules:
//!   - fewer than 3 tokens, or a non-finite x/y/z => row skipped, no vertex consumed
//!   - color declared and >= 6 tokens => tokens 4..6 clamped into [0, 255]
//!     (non-numeric => 0, fractional => truncated)
//!   - color declared and < 6 tokens => that vertex stays (0, 0, 0)
//!   - rows after the N-th vertex are ignored

use std::path::Path;

use thiserror::Error;

pub const PLY_MAGIC: &str = "ply";
pub const END_HEADER: &str = "end_header";

/// Shortest possible data row (`0 0 0` plus newline). Bounds the up-front
/// allocation when the header declares far more vertices than the body holds.
const MIN_ROW_BYTES: usize = 6;

#[derive(Debug, Error)]
pub enum PlyError {
    #[error("not a recognized point-cloud file")]
    NotPly,

    #[error("vertex count missing or zero")]
    MissingVertexCount,

    #[error("payload is not UTF-8 text: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the header declared.
#[derive(Debug, Default)]
struct Header {
    vertex_count: usize,
    has_color: bool,
    /// Raw `format` line body, e.g. `ascii 1.0`.
    format: Option<String>,
}

/// Decoded vertices: `positions` is x,y,z interleaved, `colors` r,g,b
/// interleaved and present iff the header declared a red channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    pub positions: Vec<f32>,
    pub colors: Option<Vec<u8>>,
}

impl PointSet {
    /// Number of vertices stored.
    #[inline]
    pub fn position_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Iterates vertices as `[x, y, z]`.
    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.positions.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Color of vertex `index`, if colors are present and the index is valid.
    pub fn color(&self, index: usize) -> Option<[u8; 3]> {
        let colors = self.colors.as_ref()?;
        let c = colors.get(index * 3..index * 3 + 3)?;
        Some([c[0], c[1], c[2]])
    }
}

/// Parse a PLY payload from raw bytes (UTF-8, optional BOM).
pub fn parse_ply_bytes(bytes: &[u8]) -> Result<PointSet, PlyError> {
    let text = std::str::from_utf8(bytes)?;
    parse_ply_str(text)
}

/// Parse a PLY payload from text. This is the single source of truth for parsing.
pub fn parse_ply_str(text: &str) -> Result<PointSet, PlyError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.split_whitespace().next() != Some(PLY_MAGIC) {
        return Err(PlyError::NotPly);
    }

    let mut lines = text.split_inclusive('\n');
    let mut consumed = 0usize;

    // Header
    let mut header = Header::default();
    let mut sentinel = false;

    for raw in lines.by_ref() {
        consumed += raw.len();
        let line = raw.trim();

        if line == END_HEADER {
            sentinel = true;
            break;
        }

        if let Some(rest) = line.strip_prefix("element vertex") {
            header.vertex_count = rest
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0);
        } else if let Some(rest) = line.strip_prefix("format") {
            header.format = Some(rest.trim().to_string());
        } else if line == "property uchar red" {
            header.has_color = true;
        }
    }

    if header.vertex_count == 0 {
        return Err(PlyError::MissingVertexCount);
    }

    log::debug!(
        "PLY header: vertices={}, color={}, format={:?}, sentinel={}",
        header.vertex_count,
        header.has_color,
        header.format,
        sentinel
    );

    // Body: allocate once, capped by what the remaining bytes could possibly hold.
    let remaining = text.len() - consumed;
    let capacity = header.vertex_count.min(remaining / MIN_ROW_BYTES + 1);

    let mut positions = vec![0.0f32; capacity * 3];
    let mut colors = header.has_color.then(|| vec![0u8; capacity * 3]);

    let mut v = 0usize;
    for raw in lines {
        if v == capacity {
            break;
        }

        let mut tokens = raw.split_whitespace();
        let (Some(tx), Some(ty), Some(tz)) = (tokens.next(), tokens.next(), tokens.next()) else {
            continue;
        };
        let (Some(x), Some(y), Some(z)) = (coord(tx), coord(ty), coord(tz)) else {
            continue;
        };

        positions[v * 3] = x;
        positions[v * 3 + 1] = y;
        positions[v * 3 + 2] = z;

        if let Some(col) = colors.as_mut() {
            if let (Some(r), Some(g), Some(b)) = (tokens.next(), tokens.next(), tokens.next()) {
                col[v * 3] = clamp_channel(r);
                col[v * 3 + 1] = clamp_channel(g);
                col[v * 3 + 2] = clamp_channel(b);
            }
        }

        v += 1;
    }

    if v < header.vertex_count {
        log::warn!(
            "PLY body ended after {} of {} declared vertices",
            v,
            header.vertex_count
        );
        positions.truncate(v * 3);
        if let Some(col) = colors.as_mut() {
            col.truncate(v * 3);
        }
    }

    Ok(PointSet { positions, colors })
}

/// Read and parse a PLY file from disk.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<PointSet, PlyError> {
    let bytes = std::fs::read(path)?;
    parse_ply_bytes(&bytes)
}

#[inline]
fn coord(token: &str) -> Option<f32> {
    token.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Parses one color token into a byte. Non-numeric or non-finite => 0;
/// out of range => clamped.
#[inline]
pub fn clamp_channel(token: &str) -> u8 {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => v.clamp(0.0, 255.0) as u8,
        _ => 0,
    }
}
