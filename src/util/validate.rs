use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::handle::Owner;
use crate::kmer::Kmer;
use crate::policy::DataPolicy;

use fnv::FnvHashSet;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

/// Check the structural invariants of `graph`: adjacency lists and
/// edge endpoints agree, every element and its conjugate point at each
/// other, conjugate edges run between the conjugate endpoints, and, if
/// the graph keeps a k-mer index, the index agrees with the sequences.
///
/// Every problem found is logged; the first one is returned.
pub fn validate<P: DataPolicy>(graph: &Graph<P>) -> Result<()> {
    info!("validating graph");

    let mut problems: Vec<String> = Vec::new();

    let vertices = graph.vertices().collect::<FnvHashSet<_>>();
    if vertices.len() != graph.vertex_count() {
        problems.push(format!(
            "{} distinct vertices but a count of {}",
            vertices.len(),
            graph.vertex_count()
        ));
    }

    for &v in vertices.iter() {
        let conj = graph.conjugate_vertex(v)?;
        if !vertices.contains(&conj) {
            problems.push(format!("conjugate {} of vertex {} is dead", conj, v));
        } else if graph.conjugate_vertex(conj)? != v {
            problems.push(format!("vertex {} is not the conjugate of {}", v, conj));
        }

        for &e in graph.outgoing_edges(v)? {
            if !graph.contains_edge(e) {
                problems.push(format!("vertex {} leaves by dead edge {}", v, e));
            } else if graph.edge_start(e)? != v {
                problems.push(format!("edge {} is outgoing at {} but starts elsewhere", e, v));
            }
        }
        for &e in graph.incoming_edges(v)? {
            if !graph.contains_edge(e) {
                problems.push(format!("vertex {} is entered by dead edge {}", v, e));
            } else if graph.edge_end(e)? != v {
                problems.push(format!("edge {} is incoming at {} but ends elsewhere", e, v));
            }
        }
    }

    let mut edge_count = 0;
    for e in graph.edges() {
        edge_count += 1;
        let start = graph.edge_start(e)?;
        let end = graph.edge_end(e)?;
        if !vertices.contains(&start) || !vertices.contains(&end) {
            problems.push(format!("edge {} has a dead endpoint", e));
            continue;
        }
        if !graph.outgoing_edges(start)?.contains(&e) {
            problems.push(format!("edge {} is missing from the outgoing edges of {}", e, start));
        }
        if !graph.incoming_edges(end)?.contains(&e) {
            problems.push(format!("edge {} is missing from the incoming edges of {}", e, end));
        }

        let conj = graph.conjugate_edge(e)?;
        if !graph.contains_edge(conj) {
            problems.push(format!("conjugate {} of edge {} is dead", conj, e));
            continue;
        }
        if graph.conjugate_edge(conj)? != e {
            problems.push(format!("edge {} is not the conjugate of {}", e, conj));
        }
        if graph.edge_start(conj)? != graph.conjugate_vertex(end)?
            || graph.edge_end(conj)? != graph.conjugate_vertex(start)?
        {
            problems.push(format!(
                "conjugate {} of edge {} does not run between the conjugate endpoints",
                conj, e
            ));
        }
    }
    if edge_count != graph.edge_count() {
        problems.push(format!(
            "{} edges but a count of {}",
            edge_count,
            graph.edge_count()
        ));
    }

    if let Some(index) = graph.kmer_index() {
        let k = index.k();

        for (kmer, pos) in index.iter() {
            let seq = match pos.owner {
                Owner::Vertex(v) if graph.contains_vertex(v) => graph.vertex_sequence(v)?,
                Owner::Edge(e) if graph.contains_edge(e) => graph.edge_sequence(e)?,
                owner => {
                    problems.push(format!("k-mer {} is owned by dead {}", kmer, owner));
                    continue;
                }
            };
            let found = seq
                .and_then(|seq| seq.get(pos.offset..pos.offset + k))
                .map(|window| window == kmer.to_bytes().as_slice())
                .unwrap_or(false);
            if !found {
                problems.push(format!(
                    "k-mer {} is not at offset {} of {}",
                    kmer, pos.offset, pos.owner
                ));
            }
        }

        let owners = graph
            .vertices()
            .map(Owner::Vertex)
            .chain(graph.edges().map(Owner::Edge));
        for owner in owners {
            let seq = match owner {
                Owner::Vertex(v) => graph.vertex_sequence(v)?,
                Owner::Edge(e) => graph.edge_sequence(e)?,
            };
            let seq = match seq {
                Some(seq) => seq,
                None => continue,
            };
            for (offset, kmer) in Kmer::windows(seq, k) {
                if !index.contains(&kmer) {
                    problems.push(format!(
                        "k-mer {} at offset {} of {} is not indexed",
                        kmer, offset, owner
                    ));
                }
            }
        }
    }

    for problem in problems.iter() {
        error!("{}", problem);
    }

    match problems.into_iter().next() {
        None => {
            info!("graph successfully validated");
            Ok(())
        }
        Some(first) => {
            info!("errors when validating graph");
            Err(GraphError::InvariantViolation(first))
        }
    }
}
