// algotrace: instrumenting tracer with time-travel playback for algorithm source

use std::fs;
use std::io;
use std::path::Path;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use algotrace::harness::{self, Family, Input};
use algotrace::playback::Playback;
use algotrace::templates;
use algotrace::trace::Trace;
use algotrace::ui::App;

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} <file.js | template> [--graph] [numbers...]", program_name);
    eprintln!();
    eprintln!("Templates:");
    for template in &templates::TEMPLATES {
        eprintln!("  {:<10} {}", template.name, template.title);
    }
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} bubble 5 3 1          # Bubble sort template on [5, 3, 1]", program_name);
    eprintln!("  {} mysort.js             # Your own sort on the demo array", program_name);
    eprintln!("  {} mybfs.js --graph      # Your own graph routine on the demo graph", program_name);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("algotrace");

    if args.len() < 2 {
        eprintln!("Error: No input file or template provided");
        eprintln!();
        print_usage(program_name);
        std::process::exit(1);
    }

    let target = &args[1];
    let mut graph = false;
    let mut numbers = Vec::new();
    for arg in &args[2..] {
        if arg == "--graph" {
            graph = true;
            continue;
        }
        match arg.parse::<f64>() {
            Ok(n) => numbers.push(n),
            Err(_) => {
                eprintln!("Error: '{}' is not a number", arg);
                print_usage(program_name);
                std::process::exit(1);
            }
        }
    }

    let (title, source) = if let Some(template) = templates::by_name(target) {
        graph |= template.family == Family::Graph;
        (template.title.to_string(), template.source.to_string())
    } else if Path::new(target).exists() {
        (target.clone(), fs::read_to_string(target)?)
    } else {
        eprintln!("Error: '{}' is neither a file nor a template", target);
        print_usage(program_name);
        std::process::exit(1);
    };

    let (inputs, baseline) = if graph {
        let adjacency = templates::demo_graph();
        let baseline = vec![0.0; adjacency.len()];
        (templates::graph_inputs(&adjacency), baseline)
    } else {
        let values = if numbers.is_empty() {
            templates::demo_array()
        } else {
            numbers
        };
        (vec![Input::numbers(&values)], values)
    };

    eprintln!("Executing {}...", title);
    let mut app = match harness::execute(&source, &inputs) {
        Ok(trace) => {
            eprintln!(
                "Execution completed. {} events, {} comparisons, {} swaps.",
                trace.len(),
                trace.final_stats().comparisons,
                trace.final_stats().swaps
            );
            App::new(Playback::new(trace, baseline), source, title)
        }
        Err(err) => {
            eprintln!("Execution failed: {}", err);
            App::new(Playback::new(Trace::default(), baseline), source, title)
                .with_error(err.to_string())
        }
    };

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
