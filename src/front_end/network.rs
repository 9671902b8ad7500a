use crate::{
    error::{Error, Result},
    graph::{Graph, GraphBuilder, LinkAlphabet},
    types::ELabel,
};
use itertools::Itertools;
use log::{info, warn};
use memmap::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Reads the tab-separated edge list at `path` into `builder`, with every
/// link of type `elabel`.
///
/// Lines containing `#`, without a tab, or starting with a tab are skipped.
/// The suffixes of the link type are appended to the two vertex names; links
/// from a vertex to itself are skipped. Returns the number of links read.
pub fn read_network(path: &Path, elabel: ELabel, builder: &mut GraphBuilder) -> Result<usize> {
    let link_type = builder.alphabet().get(elabel).cloned().ok_or_else(|| {
        Error::MalformedGraph(format!(
            "{}: link type {} is not in the alphabet",
            path.display(),
            elabel
        ))
    })?;
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(0);
    }
    let mmap = unsafe { Mmap::map(&file)? };
    let mut num_links = 0;
    for (line_no, line) in mmap.split(|&b| b == b'\n').enumerate() {
        let line = std::str::from_utf8(line).map_err(|_| {
            Error::MalformedGraph(format!(
                "{}:{}: not valid UTF-8",
                path.display(),
                line_no + 1
            ))
        })?;
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if line.contains('#') {
            continue;
        }
        let (src, dst) = match line.find('\t') {
            Some(tab) if tab > 0 => {
                let mut fields = line.split('\t');
                match (fields.next(), fields.next()) {
                    (Some(src), Some(dst)) if !dst.is_empty() => (src, dst),
                    _ => continue,
                }
            }
            _ => continue,
        };
        let src = format!("{}{}", src, link_type.source_suffix());
        let dst = format!("{}{}", dst, link_type.destination_suffix());
        if src == dst {
            continue;
        }
        let (u, v) = (builder.add_vertex(&src), builder.add_vertex(&dst));
        builder.add_link(u, v, link_type.name())?;
        num_links += 1;
    }
    Ok(num_links)
}

/// Reads the network files in `folder`, the i-th one with the link type of
/// the i-th entry.
///
/// `entries` comes from [`parse_link_types`](super::parse_link_types); files
/// whose entry was skipped are skipped too. All files are merged into one
/// network unless `separate` is set, in which case every file becomes a
/// network of its own.
pub fn read_networks<S: AsRef<str>>(
    folder: &Path,
    files: &[S],
    alphabet: &LinkAlphabet,
    entries: &[Option<ELabel>],
    separate: bool,
) -> Result<Vec<Graph>> {
    let time_now = Instant::now();
    if files.len() != entries.len() {
        warn!(
            "{} network files for {} link types, extra ones are ignored",
            files.len(),
            entries.len()
        );
    }
    let mut inputs: Vec<(PathBuf, ELabel)> = Vec::new();
    for (file, entry) in files.iter().zip(entries) {
        let path = folder.join(file.as_ref().trim());
        match entry {
            Some(elabel) => inputs.push((path, *elabel)),
            None => warn!("{} has no valid link type, skipping it", path.display()),
        }
    }
    let networks = if separate {
        inputs
            .iter()
            .map(|(path, elabel)| {
                let mut builder = GraphBuilder::new(&path.to_string_lossy(), alphabet);
                read_file(path, *elabel, &mut builder)?;
                Ok(builder.build())
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let name = inputs.iter().map(|(path, _)| path.display()).join(",");
        let mut builder = GraphBuilder::new(&name, alphabet);
        for (path, elabel) in &inputs {
            read_file(path, *elabel, &mut builder)?;
        }
        vec![builder.build()]
    };
    info!(
        "read {} network(s): {} ms",
        networks.len(),
        time_now.elapsed().as_millis()
    );
    Ok(networks)
}

fn read_file(path: &Path, elabel: ELabel, builder: &mut GraphBuilder) -> Result<()> {
    let num_links = read_network(path, elabel, builder)?;
    info!(
        "{}: {} links, {} vertices so far",
        path.display(),
        num_links,
        builder.num_vertices()
    );
    Ok(())
}
