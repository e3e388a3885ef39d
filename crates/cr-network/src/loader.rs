//! CSV record loader.
//!
//! Reads node, segment, and block records exported by the persistence layer
//! so they can be fed into [`build_graph`](crate::build_graph).
//!
//! # CSV formats
//!
//! ```csv
//! key,lat,lon
//! depot,40.1885,29.0610
//! j1,40.1901,29.0644
//! ```
//!
//! ```csv
//! key,from,to,length_m,directed,shaded,lit,surface
//! s1,depot,j1,310.5,false,true,true,asphalt
//! s2,j1,depot,,true,,,
//! ```
//!
//! Segment columns `key`, `from`, `to` are required.  `length_m` may be
//! empty (great-circle length is used).  `directed`, `shaded`, `lit` accept
//! `true/false`, `yes/no`, `1/0` and default to `false`.  Any other column
//! lands in [`EdgeRecord::extensions`] when non-empty.
//!
//! ```csv
//! edge,start_unix_secs,end_unix_secs,reason
//! s1,1700000000,,flooding
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use cr_core::{EdgeKey, GeoPoint, NodeKey};

use crate::records::{BlockedRoad, EdgeRecord, NodeRecord, SegmentAttributes, TimeWindow};
use crate::{SpatialError, SpatialResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRow {
    key: String,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct BlockRow {
    edge:            String,
    start_unix_secs: i64,
    end_unix_secs:   Option<i64>,
    reason:          Option<String>,
}

const SEGMENT_COLUMNS: [&str; 7] = ["key", "from", "to", "length_m", "directed", "shaded", "lit"];

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_nodes_csv(path: &Path) -> SpatialResult<Vec<NodeRecord>> {
    load_nodes_reader(std::fs::File::open(path)?)
}

/// Like [`load_nodes_csv`] but accepts any `Read` source.
pub fn load_nodes_reader<R: Read>(reader: R) -> SpatialResult<Vec<NodeRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<NodeRow>()
        .map(|row| {
            let row = row.map_err(|e| SpatialError::Parse(e.to_string()))?;
            Ok(NodeRecord { key: NodeKey(row.key), pos: GeoPoint::new(row.lat, row.lon) })
        })
        .collect()
}

pub fn load_edges_csv(path: &Path) -> SpatialResult<Vec<EdgeRecord>> {
    load_edges_reader(std::fs::File::open(path)?)
}

/// Like [`load_edges_csv`] but accepts any `Read` source.
pub fn load_edges_reader<R: Read>(reader: R) -> SpatialResult<Vec<EdgeRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| SpatialError::Parse(e.to_string()))?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(key_col), Some(from_col), Some(to_col)) = (column("key"), column("from"), column("to")) else {
        return Err(SpatialError::Parse(
            "segment CSV needs `key`, `from` and `to` columns".into(),
        ));
    };
    let length_col   = column("length_m");
    let directed_col = column("directed");
    let shaded_col   = column("shaded");
    let lit_col      = column("lit");

    let mut out = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).map(str::trim).unwrap_or("");

        let length_m = match field(length_col) {
            "" => None,
            s => Some(s.parse::<f64>().map_err(|_| {
                SpatialError::Parse(format!("row {}: invalid length_m {s:?}", line + 1))
            })?),
        };

        let mut extensions = BTreeMap::new();
        for (i, name) in headers.iter().enumerate() {
            let name = name.trim();
            if SEGMENT_COLUMNS.contains(&name) {
                continue;
            }
            if let Some(value) = record.get(i).map(str::trim).filter(|v| !v.is_empty()) {
                extensions.insert(name.to_owned(), value.to_owned());
            }
        }

        out.push(EdgeRecord {
            key:      EdgeKey::new(field(Some(key_col))),
            from:     NodeKey::new(field(Some(from_col))),
            to:       NodeKey::new(field(Some(to_col))),
            length_m,
            directed: parse_flag(field(directed_col), "directed", line)?,
            attrs: SegmentAttributes {
                shaded: parse_flag(field(shaded_col), "shaded", line)?,
                lit:    parse_flag(field(lit_col), "lit", line)?,
            },
            extensions,
        });
    }
    Ok(out)
}

pub fn load_blocks_csv(path: &Path) -> SpatialResult<Vec<BlockedRoad>> {
    load_blocks_reader(std::fs::File::open(path)?)
}

/// Like [`load_blocks_csv`] but accepts any `Read` source.
pub fn load_blocks_reader<R: Read>(reader: R) -> SpatialResult<Vec<BlockedRoad>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<BlockRow>()
        .map(|row| {
            let row = row.map_err(|e| SpatialError::Parse(e.to_string()))?;
            Ok(BlockedRoad {
                edge: EdgeKey(row.edge),
                window: TimeWindow {
                    start_unix_secs: row.start_unix_secs,
                    end_unix_secs:   row.end_unix_secs,
                },
                reason: row.reason.filter(|r| !r.is_empty()),
            })
        })
        .collect()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_flag(s: &str, column: &str, line: usize) -> SpatialResult<bool> {
    match s.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Ok(false),
        "true" | "yes" | "1" => Ok(true),
        other => Err(SpatialError::Parse(format!(
            "row {}: invalid {column} {other:?}: expected true/false, yes/no, or 1/0",
            line + 1
        ))),
    }
}
