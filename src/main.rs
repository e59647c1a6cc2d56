//! Listish - command line driver for the variadic input extension
//!
//! `demo` builds a small graph around a ConvertAny2List node and prints its
//! input slots after each edit; `inspect` loads a saved graph and prints the
//! slots of every node in it; `classes` lists the registered node classes.

use clap::{Parser, Subcommand};
use egui::{Pos2, Vec2};
use listish::nodes::{Node, NodeGraph, NodeId, NodeRegistry, OperationContext};
use listish::{FileManager, ListishConfig, ListishExtension};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "listish")]
#[command(about = "Self-growing input lists for aggregator nodes")]
struct Cli {
    /// JSON config overriding the extension defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect, disconnect and paste around a ConvertAny2List node
    Demo {
        /// Write the resulting graph to this file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
    /// Print the input slots of every node in a saved graph
    Inspect { file: PathBuf },
    /// List registered node classes, marking the ones with variadic inputs
    Classes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ListishConfig::load(path).unwrap_or_else(|err| {
            warn!("Ignoring {}: {}", path.display(), err);
            ListishConfig::default()
        }),
        None => ListishConfig::default(),
    };
    let mut registry = NodeRegistry::with_builtin_classes();
    registry.register_extension(Box::new(ListishExtension::new(&config)?));

    match cli.command {
        Command::Demo { save } => run_demo(&registry, save)?,
        Command::Inspect { file } => {
            let mut manager = FileManager::new();
            let graph = manager.load_from_file(&file, &registry)?;
            println!("{}", manager.get_file_display_name());
            let mut ids: Vec<NodeId> = graph.nodes.keys().copied().collect();
            ids.sort_unstable();
            for id in ids {
                if let Some(node) = graph.node(id) {
                    print_slots(&graph, node);
                }
            }
        }
        Command::Classes => {
            for class in registry.classes() {
                let marker = if class.hooks.node_created.is_empty() { "" } else { "  variadic" };
                println!(
                    "{:<18} {:<20} {}{}",
                    class.metadata.node_type,
                    class.metadata.category.display_string(),
                    class.metadata.description,
                    marker
                );
            }
        }
    }
    Ok(())
}

fn run_demo(registry: &NodeRegistry, save: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = NodeGraph::new();
    let list = registry.create_node("ConvertAny2List", Pos2::new(200.0, 200.0), &mut graph)?;
    let sources = [
        registry.create_node("Float", Pos2::new(0.0, 0.0), &mut graph)?,
        registry.create_node("Int", Pos2::new(150.0, 0.0), &mut graph)?,
        registry.create_node("String", Pos2::new(300.0, 0.0), &mut graph)?,
    ];

    for (slot, source) in sources.iter().enumerate() {
        graph.connect(*source, 0, list, slot, OperationContext::DirectEdit)?;
    }
    show(&graph, list, "after connecting three sources");

    graph.disconnect_input(list, 1, OperationContext::DirectEdit);
    show(&graph, list, "after the user removes the second link");

    let mut selection = vec![list];
    selection.extend(sources);
    let clipboard = graph.copy_to_clipboard(&selection);
    let pasted = graph.paste_from_clipboard(&clipboard, registry, Vec2::new(0.0, 150.0))?;
    for id in pasted {
        show(&graph, id, "pasted copy");
    }

    if let Some(path) = save {
        let mut manager = FileManager::new();
        manager.save_to_file(&path, &graph)?;
        info!("Wrote {}", manager.get_file_display_name());
    }
    Ok(())
}

fn show(graph: &NodeGraph, node_id: NodeId, label: &str) {
    println!("-- {}", label);
    if let Some(node) = graph.node(node_id) {
        print_slots(graph, node);
    }
}

fn print_slots(graph: &NodeGraph, node: &Node) {
    println!("{} #{} ({})", node.title, node.id, node.class_type);
    for (slot, input) in node.inputs.iter().enumerate() {
        let source = match graph.input_link(node.id, slot) {
            Some(link) => format!("<- node {} output {}", link.origin_node, link.origin_slot),
            None => "open".to_string(),
        };
        println!("  {:<10} {:<8} {}", input.name, input.data_type.name(), source);
    }
}
