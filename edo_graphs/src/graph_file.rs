// Graph file: the handoff between the generate and layout stages.
//
// A small Pajek-style text format:
//
//   %12
//   *Vertices 3
//   1 "324" 0.0 0.0 0.0
//   2 "234" 0.0 0.0 0.0
//   3 "333" 0.0 0.0 0.0
//   *Arcs
//   1 2 1.0
//   2 3 1.0
//
// The first line carries the EDO. Vertices are 1-indexed in node-id order;
// coordinates are placeholders and arc weights are always 1.0. The reader
// checks every line and reports the first problem with its line number.
//
// `save` writes to a sibling temp file and renames it into place, so a reader
// never observes a partly written graph and a failed write keeps the previous
// file.

use crate::error::{Error, GraphFileError};
use crate::graph::{Graph, NodeId};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A graph read back from disk, with the EDO it was generated for.
#[derive(Clone, Debug)]
pub struct GraphFile {
    pub edo: usize,
    pub graph: Graph,
}

pub fn write_graph<W: Write>(writer: &mut W, edo: usize, graph: &Graph) -> io::Result<()> {
    writeln!(writer, "%{edo}")?;
    writeln!(writer, "*Vertices {}", graph.node_count())?;
    for node in graph.nodes() {
        writeln!(writer, "{} \"{}\" 0.0 0.0 0.0", node.id.index() + 1, node.label)?;
    }
    writeln!(writer, "*Arcs")?;
    for edge in graph.edges() {
        writeln!(writer, "{} {} 1.0", edge.from.index() + 1, edge.to.index() + 1)?;
    }
    writer.flush()
}

pub fn read_graph<R: BufRead>(reader: R) -> Result<GraphFile, GraphFileError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)))
        .filter(|line| !matches!(line, Ok((_, l)) if l.trim().is_empty()));

    let mut next_line = |missing: &'static str| -> Result<(usize, String), GraphFileError> {
        match lines.next() {
            Some(line) => Ok(line?),
            None => Err(GraphFileError::Truncated(missing)),
        }
    };

    let (line_no, header) = next_line("missing %EDO header")?;
    let edo = header
        .trim()
        .strip_prefix('%')
        .and_then(|n| n.trim().parse::<usize>().ok())
        .ok_or_else(|| {
            GraphFileError::syntax(line_no, format!("expected %<EDO>, found {header:?}"))
        })?;

    let (line_no, vertices) = next_line("missing *Vertices section")?;
    let count = section_header(&vertices, "*Vertices")
        .and_then(|rest| rest.trim().parse::<usize>().ok())
        .ok_or_else(|| {
            let reason = format!("expected *Vertices <count>, found {vertices:?}");
            GraphFileError::syntax(line_no, reason)
        })?;

    let mut graph = Graph::new();
    for expected in 1..=count {
        let (line_no, line) = next_line("vertex list shorter than declared")?;
        let mut tokens = line.split_whitespace();
        let index = tokens.next().and_then(|t| t.parse::<usize>().ok());
        if index != Some(expected) {
            return Err(GraphFileError::syntax(
                line_no,
                format!("expected vertex {expected}, found {line:?}"),
            ));
        }
        let label = tokens
            .next()
            .and_then(|t| t.strip_prefix('"'))
            .and_then(|t| t.strip_suffix('"'))
            .ok_or_else(|| GraphFileError::syntax(line_no, "vertex label must be quoted"))?;
        if graph.find(label).is_some() {
            return Err(GraphFileError::syntax(line_no, format!("duplicate label {label:?}")));
        }
        graph.add_node(label);
    }

    let (line_no, arcs) = next_line("missing *Arcs section")?;
    if section_header(&arcs, "*Arcs").is_none_or(|rest| !rest.trim().is_empty()) {
        return Err(GraphFileError::syntax(line_no, format!("expected *Arcs, found {arcs:?}")));
    }

    for line in lines {
        let (line_no, line) = line?;
        let mut tokens = line.split_whitespace();
        let mut endpoint = || {
            tokens
                .next()
                .and_then(|t| t.parse::<usize>().ok())
                .filter(|&i| (1..=count).contains(&i))
                .map(|i| NodeId((i - 1) as u32))
        };
        let (Some(from), Some(to)) = (endpoint(), endpoint()) else {
            return Err(GraphFileError::syntax(
                line_no,
                format!("arc endpoints must be vertex indices 1..={count}, found {line:?}"),
            ));
        };
        if let Some(weight) = tokens.next()
            && weight.parse::<f64>().is_err()
        {
            return Err(GraphFileError::syntax(line_no, format!("bad arc weight {weight:?}")));
        }
        graph.add_edge(from, to);
    }

    Ok(GraphFile { edo, graph })
}

/// The text after a case-insensitive section keyword, if the line starts with it.
fn section_header<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let line = line.trim();
    let head = line.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword).then(|| &line[keyword.len()..])
}

/// Write the graph file atomically.
pub fn save(path: &Path, edo: usize, graph: &Graph) -> Result<(), Error> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let written = File::create(&tmp).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_graph(&mut writer, edo, graph)?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()
    });
    if let Err(source) = written.and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    Ok(())
}

pub fn load(path: &Path) -> Result<GraphFile, Error> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(read_graph(BufReader::new(file))?)
}
