use facematch::bands::ThresholdBand;
use facematch::matcher;
use facematch::{FaceStore, RegisterOutcome};
use std::env;
use std::io::{self, Write};

pub enum Command {
    Register { name: String, embedding: Vec<f64> },
    Nearest { embedding: Vec<f64>, threshold: f64 },
    Get { name: String },
    List,
    Count,
    Band { threshold: f64 },
    Save { path: String },
    Load { path: String },
}

/// Parse a command from a provided argument vector
/// This is used both for command-line args and REPL input
pub fn parse_command_from_args(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command provided. Use: register, nearest, get, list, count, band, save, load".to_string());
    }

    let command = &args[1];

    match command.as_str() {
        "register" => parse_register(args),
        "nearest" => parse_nearest(args),
        "get" => parse_get(args),
        "list" => parse_list(args),
        "count" => parse_count(args),
        "band" => parse_band(args),
        "save" => parse_save(args),
        "load" => parse_load(args),
        _ => Err(format!("Unknown command: {}. Available: register, nearest, get, list, count, band, save, load", command)),
    }
}

/// Parse the 'register' command
/// Usage: facematch register <name> <embedding>
fn parse_register(args: &[String]) -> Result<Command, String> {
    // args[0] = program name
    // args[1] = "register"
    // args[2] = name (required)
    // args[3..] = embedding components (required, at least 1)
    if args.len() < 4 {
        return Err("'register' command requires a name and an embedding. Usage: facematch register <name> <embedding>".to_string());
    }

    let name = args[2].clone();
    let embedding: Result<Vec<f64>, _> = args[3..].iter()
        .map(|s| s.parse::<f64>())
        .collect();

    match embedding {
        Ok(e) => Ok(Command::Register { name, embedding: e }),
        Err(_) => Err("Embedding parsing error".to_string()),
    }
}

/// Parse the 'nearest' command
/// Usage: facematch nearest <v1> <v2> ... [--threshold <number>]
fn parse_nearest(args: &[String]) -> Result<Command, String> {
    // args[0] = program name
    // args[1] = "nearest"
    // args[2..] = embedding components and optional --threshold flag

    if args.len() < 3 {
        return Err("'nearest' command requires at least one embedding component. Usage: facematch nearest <v1> <v2> ... [--threshold <number>]".to_string());
    }

    let mut threshold = 0.7; // default value
    let mut vector_end = args.len();

    // Check if last two args are --threshold and a number
    if args.len() >= 4 && args[args.len() - 2] == "--threshold" {
        match args[args.len() - 1].parse::<f64>() {
            Ok(t) => {
                threshold = t;
                vector_end = args.len() - 2; // Exclude --threshold and the number
            }
            Err(_) => {
                return Err(format!("Invalid --threshold value: '{}'. Must be a number.", args[args.len() - 1]));
            }
        }
    }

    let embedding: Result<Vec<f64>, _> = args[2..vector_end].iter()
        .map(|s| s.parse::<f64>())
        .collect();

    match embedding {
        Ok(e) => {
            if e.is_empty() {
                return Err("Query embedding cannot be empty".to_string());
            }
            Ok(Command::Nearest { embedding: e, threshold })
        }
        Err(_) => Err("Failed to parse embedding components as numbers".to_string()),
    }
}

/// Parse the 'get' command
/// Usage: facematch get <name>
fn parse_get(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'get' command requires a name. Usage: facematch get <name>".to_string());
    }

    let name = args[2].clone();

    Ok(Command::Get { name })
}

/// Parse the 'list' command
/// Usage: facematch list
fn parse_list(args: &[String]) -> Result<Command, String> {
    // List takes no arguments
    if args.len() > 2 {
        eprintln!("Warning: 'list' command takes no arguments, ignoring extras");
    }

    Ok(Command::List)
}

/// Parse the 'count' command
/// Usage: facematch count
fn parse_count(args: &[String]) -> Result<Command, String> {
    // Count takes no arguments
    if args.len() > 2 {
        eprintln!("Warning: 'count' command takes no arguments, ignoring extras");
    }

    Ok(Command::Count)
}

/// Parse the 'band' command
/// Usage: facematch band <threshold>
fn parse_band(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'band' command requires a threshold. Usage: facematch band <threshold>".to_string());
    }

    match args[2].parse::<f64>() {
        Ok(threshold) => Ok(Command::Band { threshold }),
        Err(_) => Err(format!("Invalid threshold: '{}'. Must be a number.", args[2])),
    }
}

/// Parse the 'save' command
/// Usage: facematch save <path>
fn parse_save(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'save' command requires a file path. Usage: save <path>".to_string());
    }
    let path = args[2].clone();
    Ok(Command::Save { path })
}

/// Parse the 'load' command
/// Usage: facematch load <path>
fn parse_load(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'load' command requires a file path. Usage: load <path>".to_string());
    }
    let path = args[2].clone();
    Ok(Command::Load { path })
}

/// REPL mode - interactive session with an in-memory store
pub fn run_repl(store: &mut FaceStore) {
    println!("facematch - Face Identity Store");
    println!("Type 'help' for commands, 'exit' or 'quit' to quit\n");

    loop {
        print!("facematch> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => {}
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input == "exit" || input == "quit" {
            println!("Goodbye!");
            break;
        }

        if input == "help" {
            print_help();
            continue;
        }

        let mut args: Vec<String> = vec!["facematch".to_string()];
        args.extend(input.split_whitespace().map(|s| s.to_string()));

        let command = match parse_command_from_args(&args) {
            Ok(cmd) => cmd,
            Err(error) => {
                eprintln!("Error: {}", error);
                continue;
            }
        };

        execute_command(store, command);
    }
}

/// Single-command mode - load store from snapshot, execute command, save back
/// Usage: facematch <snapshot_path> <command> [args...]
pub fn run_single_command() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: facematch <snapshot_path> <command> [args...]");
        std::process::exit(1);
    }

    let snapshot_path = &args[1];

    // A missing snapshot starts the store empty; a corrupt one is fatal
    let mut store = match FaceStore::load(snapshot_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading '{}': {}", snapshot_path, e);
            std::process::exit(1);
        }
    };

    // Rebuild args: shift so args[1] becomes the command
    let shifted_args: Vec<String> = std::iter::once(args[0].clone())
        .chain(args[2..].iter().cloned())
        .collect();

    let command = match parse_command_from_args(&shifted_args) {
        Ok(cmd) => cmd,
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    };

    execute_command(&mut store, command);

    // Save store back to path
    if let Err(e) = store.save(snapshot_path) {
        eprintln!("Error saving '{}': {}", snapshot_path, e);
        std::process::exit(1);
    }
}

fn execute_command(store: &mut FaceStore, command: Command) {
    match command {
        Command::Get { name } => {
            match store.get(&name) {
                Some(embedding) => println!("Embedding '{}': {:?}", name, embedding),
                None => eprintln!("Error: Identity '{}' not found", name),
            }
        }

        Command::List => {
            if store.is_empty() {
                println!("Store is empty");
            } else {
                println!("Registered identities:");
                for (name, embedding) in store.records() {
                    println!("  {}: {:?}", name, embedding);
                }
                println!("Total: {} identities", store.count());
            }
        }

        Command::Count => println!("{}", store.count()),

        Command::Register { name, embedding } => {
            match store.register(name.clone(), embedding) {
                Ok(RegisterOutcome::Inserted) => println!("Registered '{}'", name),
                Ok(RegisterOutcome::Replaced) => println!("Updated '{}'", name),
                Err(error) => eprintln!("Error: {}", error),
            }
        }

        Command::Nearest { embedding, threshold } => {
            match matcher::find_nearest(store, &embedding, threshold) {
                Ok(outcome) => {
                    let band = ThresholdBand::classify(threshold);
                    match (outcome.identity, outcome.distance) {
                        (Some(identity), Some(distance)) => {
                            println!("Match: {} (distance {:.4}, threshold {} = {})",
                                identity, distance, threshold, band.label());
                        }
                        (None, Some(distance)) => {
                            println!("No match (nearest distance {:.4}, threshold {} = {})",
                                distance, threshold, band.label());
                        }
                        _ => println!("No records"),
                    }
                }
                Err(error) => eprintln!("Error: {}", error),
            }
        }

        Command::Band { threshold } => {
            let band = ThresholdBand::classify(threshold);
            println!("{}: {}", band.label(), band.description());
        }

        Command::Save { path } => {
            match store.save(&path) {
                Ok(()) => println!("Store saved to '{}'", path),
                Err(error) => eprintln!("Error: {}", error),
            }
        }

        Command::Load { path } => {
            match FaceStore::load(&path) {
                Ok(loaded) => {
                    let count = loaded.count();
                    *store = loaded;
                    println!("Store loaded from '{}' ({} identities)", path, count);
                }
                Err(error) => eprintln!("Error: {}", error),
            }
        }
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  register <name> <v1> <v2> ...        - Register an identity's embedding");
    println!("  nearest <v1> <v2> ... [--threshold T] - Find the closest identity (default T=0.7)");
    println!("  get <name>                           - Retrieve an embedding by name");
    println!("  list                                 - List all identities");
    println!("  count                                - Show identity count");
    println!("  band <threshold>                     - Describe a threshold's tolerance band");
    println!("  save <path>                          - Save store snapshot to file");
    println!("  load <path>                          - Load store snapshot from file");
    println!("  help                                 - Show this help");
    println!("  exit, quit                           - Exit the program");
}
