//! HNSW index v2 persistence: a line-delimited UTF-8 format for
//! portability (§6.2). Vectors are written before the graph so a reload
//! can resolve every neighbor reference against an already-known ID.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Error, Result};

use super::graph::Graph;
use super::params::HnswParams;

const MAGIC: &str = "HNSW_v2";
const GRAPH_MARKER: &str = "---GRAPH---";

/// Construction params recovered from a persisted file. Lacks a `seed`
/// since none is written to disk — see [`load`].
#[derive(Debug, Clone, Copy)]
pub struct PersistedParams {
    /// See [`HnswParams::m`].
    pub m: usize,
    /// See [`HnswParams::ef_construction`].
    pub ef_construction: usize,
    /// See [`HnswParams::ml`].
    pub ml: f64,
}

/// Writes `graph` to `path` in the HNSW v2 format, via write-to-temp then
/// rename so a prior good file is never left half-overwritten.
pub fn save(path: &Path, graph: &Graph, params: &HnswParams, dimension: usize) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut f = fs::File::create(&tmp_path)?;
        writeln!(f, "{MAGIC}")?;
        writeln!(f, "{},{},{},{}", params.m, params.ef_construction, params.ml, dimension)?;
        writeln!(f, "{}", graph.len())?;

        match graph.entry_point {
            Some(ep) => writeln!(f, "{}", graph.node(ep).external_id)?,
            None => writeln!(f, "null")?,
        }

        for (_, node) in graph.iter() {
            let row = node
                .vector
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            writeln!(f, "{}|{},{}", node.external_id, node.max_layer, row)?;
        }

        writeln!(f, "{GRAPH_MARKER}")?;
        for (internal, node) in graph.iter() {
            for (layer, neighbors) in node.neighbors.iter().enumerate() {
                if neighbors.is_empty() {
                    continue;
                }
                let nids = neighbors
                    .iter()
                    .map(|&nb| graph.node(nb).external_id.to_string())
                    .collect::<Vec<_>>()
                    .join(";");
                writeln!(f, "{}|{layer}:{nids}", graph.node(internal).external_id)?;
            }
        }
        f.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Loads an HNSW v2 file into a fresh [`Graph`], returning it along with the
/// persisted `(m, ef_construction, ml)` and the dimension recorded in the
/// file so the caller can verify the dimension against its own kernel
/// before committing. The seed isn't part of the file format (it only
/// governs future layer sampling, not the graph that was already built), so
/// the caller is expected to keep its own seed and only adopt these three
/// fields. In non-strict mode, neighbor entries referencing unknown IDs are
/// dropped silently (treated as corrupt but recoverable); in strict mode
/// they're a hard error.
pub fn load(path: &Path, strict: bool) -> Result<(Graph, PersistedParams, usize)> {
    let f = fs::File::open(path)?;
    let mut lines = BufReader::new(f).lines();

    let magic = lines
        .next()
        .ok_or_else(|| Error::CorruptData("empty file".into()))??;
    if magic.trim() != MAGIC {
        return Err(Error::CorruptData(format!("bad magic: {magic}")));
    }

    let header = lines
        .next()
        .ok_or_else(|| Error::CorruptData("missing header line".into()))??;
    let mut header_parts = header.split(',');
    let max_m: usize = parse_field(header_parts.next(), "maxM")?;
    let ef_construction: usize = parse_field(header_parts.next(), "efConstruction")?;
    let ml: f64 = parse_field(header_parts.next(), "mL")?;
    let dimension: usize = parse_field(header_parts.next(), "dimension")?;

    let vector_count: usize = lines
        .next()
        .ok_or_else(|| Error::CorruptData("missing vector count".into()))??
        .trim()
        .parse()
        .map_err(|_| Error::CorruptData("invalid vector count".into()))?;

    let entry_point_line = lines
        .next()
        .ok_or_else(|| Error::CorruptData("missing entry point line".into()))??;
    let entry_point_id: Option<u64> = match entry_point_line.trim() {
        "null" => None,
        s => Some(
            s.parse()
                .map_err(|_| Error::CorruptData("invalid entry point id".into()))?,
        ),
    };

    let mut graph = Graph::new();
    for _ in 0..vector_count {
        let line = lines
            .next()
            .ok_or_else(|| Error::CorruptData("truncated vector section".into()))??;
        let (id_part, rest) = line
            .split_once('|')
            .ok_or_else(|| Error::CorruptData("malformed vector line".into()))?;
        let id: u64 = id_part
            .parse()
            .map_err(|_| Error::CorruptData("invalid node id".into()))?;
        let mut rest_parts = rest.splitn(2, ',');
        let max_layer: usize = parse_field(rest_parts.next(), "maxLayer")?;
        let values: Vec<f32> = rest_parts
            .next()
            .unwrap_or("")
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f32>().map_err(|_| Error::CorruptData("invalid float".into())))
            .collect::<Result<_>>()?;
        if values.len() != dimension {
            return Err(Error::CorruptData(format!(
                "vector for id {id} has {} components, expected {dimension}",
                values.len()
            )));
        }
        graph.insert_new(id, values, max_layer);
    }

    if let Some(marker) = lines.next() {
        let marker = marker?;
        if marker.trim() != GRAPH_MARKER {
            return Err(Error::CorruptData(format!("expected {GRAPH_MARKER}, got {marker}")));
        }
    }

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (id_part, rest) = match line.split_once('|') {
            Some(parts) => parts,
            None => continue, // unknown trailing content, ignored
        };
        let Ok(id) = id_part.parse::<u64>() else { continue };
        let Some(internal) = graph.internal_of(id) else {
            if strict {
                return Err(Error::CorruptData(format!("graph edge references unknown node {id}")));
            }
            continue;
        };
        let Some((layer_part, nids_part)) = rest.split_once(':') else {
            continue;
        };
        let Ok(layer) = layer_part.parse::<usize>() else {
            continue;
        };

        let mut resolved = Vec::new();
        for nid_str in nids_part.split(';').filter(|s| !s.is_empty()) {
            let Ok(nid) = nid_str.parse::<u64>() else {
                if strict {
                    return Err(Error::CorruptData(format!("invalid neighbor id {nid_str}")));
                }
                continue;
            };
            match graph.internal_of(nid) {
                Some(n_internal) => resolved.push(n_internal),
                None if strict => {
                    return Err(Error::CorruptData(format!("neighbor references unknown node {nid}")));
                }
                None => {} // lenient: drop unknown neighbor reference
            }
        }
        if layer <= graph.node(internal).max_layer {
            graph.set_neighbors(internal, layer, resolved);
        } else if strict {
            return Err(Error::CorruptData(format!(
                "graph edge for node {id} references layer {layer} above its max layer"
            )));
        }
    }

    graph.entry_point = entry_point_id.and_then(|id| graph.internal_of(id));
    if entry_point_id.is_some() && graph.entry_point.is_none() {
        return Err(Error::CorruptData("entry point id not found among loaded nodes".into()));
    }

    let params = PersistedParams {
        m: max_m,
        ef_construction,
        ml,
    };
    Ok((graph, params, dimension))
}

fn parse_field<T: std::str::FromStr>(part: Option<&str>, name: &str) -> Result<T> {
    part.ok_or_else(|| Error::CorruptData(format!("missing {name}")))?
        .trim()
        .parse()
        .map_err(|_| Error::CorruptData(format!("invalid {name}")))
}
