use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bio::alignment::distance::levenshtein;
use clap::Parser;
use log::{debug, info, LevelFilter};

use debruijn_rs::{
    assemble, load_reference, read_sequences, DeBruijnBuilder, DeBruijnGraph, PackedKmer,
};

/// Reassemble a sequence from fixed-length reads via a De Bruijn graph.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// FASTQ/FASTA/plain-lines file of equal-length reads (optionally gzipped)
    reads: String,

    /// Read length k (default: length of the first read)
    #[arg(long, short)]
    k: Option<usize>,

    /// Optional reference used for post-assembly confirmation
    #[arg(long)]
    reference: Option<String>,

    /// Optional output FASTA path for the assembled sequence
    #[arg(long)]
    output_fasta: Option<String>,

    /// Optional output file for the De Bruijn graph (JSON nodes and edges)
    #[arg(long)]
    export_graph_json: Option<String>,

    /// Wrap assembled FASTA lines to this width (0 = no-wrap)
    #[arg(long, default_value_t = 60)]
    fasta_line_width: usize,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v', alias = "info")]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Trace output
    #[arg(long)]
    trace: bool,
}

fn log_level(args: &Args) -> LevelFilter {
    if args.trace {
        LevelFilter::Trace
    } else if args.debug {
        LevelFilter::Debug
    } else if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(log_level(&args))
        .init();

    info!("De Bruijn assembler");
    info!("reads: {}", args.reads);
    if let Some(refp) = &args.reference {
        info!("reference: {}", refp);
    }

    if let Err(error) = run_pipeline(&args) {
        eprintln!("Assembly failed: {error:?}");
        std::process::exit(1);
    }
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn export_graph(graph: &DeBruijnGraph<PackedKmer>, path: &str) -> Result<()> {
    use serde_json::json;

    ensure_parent_dir(path)?;
    let nodes: Vec<_> = graph
        .nodes()
        .map(|(id, node)| {
            json!({
                "id": id.0,
                "sequence": node.label().to_string(),
                "inbound": node.inbound(),
                "outbound": node.outbound(),
            })
        })
        .collect();
    let edges: Vec<_> = graph
        .nodes()
        .flat_map(|(id, _)| {
            graph
                .successors(id)
                .iter()
                .map(move |target| json!({"source": id.0, "target": target.0}))
        })
        .collect();

    let graph_json = json!({
        "k": graph.fragment_len(),
        "nodes": nodes,
        "edges": edges,
    });
    let mut file = File::create(path)?;
    writeln!(file, "{}", serde_json::to_string_pretty(&graph_json)?)?;
    info!("De Bruijn graph written to {}", path);
    Ok(())
}

fn write_fasta(path: &str, header: &str, sequence: &str, line_width: usize) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut fh = File::create(path)?;
    writeln!(fh, ">{header}")?;
    if line_width == 0 {
        writeln!(fh, "{sequence}")?;
    } else {
        for line in sequence.as_bytes().chunks(line_width) {
            fh.write_all(line)?;
            writeln!(fh)?;
        }
    }
    Ok(())
}

fn run_pipeline(args: &Args) -> Result<String> {
    let reads = read_sequences(Path::new(&args.reads))
        .with_context(|| format!("Failed to parse reads from {}", args.reads))?;
    let Some(first) = reads.first() else {
        bail!("No reads found in {}", args.reads);
    };
    let k = args.k.unwrap_or(first.len());
    if k < 2 {
        bail!("Read length must be at least 2, got {k}");
    }
    info!("Loaded {} reads, k = {}", reads.len(), k);

    info!("Building De Bruijn graph...");
    let mut builder = DeBruijnBuilder::<PackedKmer>::new(k);
    for (idx, read) in reads.iter().enumerate() {
        let kmer = PackedKmer::encode_strict(read)
            .with_context(|| format!("Read {idx} contains symbols outside ACTG"))?;
        builder
            .insert(&kmer)
            .with_context(|| format!("Read {idx} cannot be inserted"))?;
    }
    let graph = builder.build();
    info!(
        "Graph built with {} nodes and {} edges.",
        graph.node_count(),
        graph.edge_count()
    );

    if let Some(graph_path) = &args.export_graph_json {
        export_graph(&graph, graph_path)?;
    }

    let walk = graph
        .compute_walk()
        .context("Failed to compute an Eulerian walk")?;
    debug!("Eulerian walk visits {} nodes", walk.len());
    let assembled = assemble(&walk)?;

    let header = format!(
        "assembled_from_{}",
        Path::new(&args.reads)
            .file_name()
            .unwrap_or_else(|| "reads".as_ref())
            .to_string_lossy()
    );
    if let Some(path) = &args.output_fasta {
        write_fasta(path, &header, &assembled, args.fasta_line_width)?;
        info!("Assembly written to {}", path);
    } else {
        info!(">{header}");
        debug!("{assembled}");
    }

    if let Some(reference_path) = &args.reference {
        let reference = load_reference(Path::new(reference_path))
            .with_context(|| format!("Failed to load reference {}", reference_path))?;
        const MAX_DISTANCE_LEN: usize = 20_000;
        if assembled == reference {
            info!(
                "Assembled sequence matches the reference exactly ({} bp).",
                assembled.len()
            );
        } else if assembled.len() <= MAX_DISTANCE_LEN && reference.len() <= MAX_DISTANCE_LEN {
            let distance = levenshtein(assembled.as_bytes(), reference.as_bytes());
            info!(
                "Edit distance to reference (len {} vs {}): {}",
                assembled.len(),
                reference.len(),
                distance
            );
        } else {
            info!(
                "Reference check skipped: assembled length {} or reference length {} exceeds {} bp threshold.",
                assembled.len(),
                reference.len(),
                MAX_DISTANCE_LEN
            );
        }
    }

    Ok(assembled)
}
