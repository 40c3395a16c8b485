use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use qtree::codec::{encode_document, read_document, Document};
use qtree::request::load_request;
use qtree::visit::composers::{collect_parameters, count_nodes};
use qtree::Error;

#[derive(Parser)]
#[command(name = "qtree", version, about = "Rewrite quoted expression trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a rewrite request to a document
    Rewrite {
        /// Document path (.json)
        document: PathBuf,
        /// Rewrite request (.toml)
        #[arg(short, long)]
        request: PathBuf,
        /// Output document path. If omitted, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the tree of a document as source text
    Show {
        /// Document path (.json)
        document: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_env("QTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Error> {
    match command {
        Commands::Rewrite { document, request, output } => {
            let doc = read_document(&document)?;
            let request = load_request(&request)?;
            let tree = request.apply(&doc.tree, &doc.catalog)?;
            let summary = format!(
                "rewrote {} nodes; {} parameters",
                count_nodes(&tree, |_| true),
                collect_parameters(&tree).len()
            );
            let json = encode_document(&Document { catalog: doc.catalog, tree })?;
            match output {
                Some(path) => std::fs::write(&path, json + "\n").map_err(|e| Error::io(&path, e))?,
                None => println!("{json}"),
            }
            eprintln!("{summary}");
        }
        Commands::Show { document } => {
            let doc = read_document(&document)?;
            println!("{}", doc.tree);
        }
    }
    Ok(())
}
