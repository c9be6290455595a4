use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use citelink_core::{
    ChatMessage, CrossRefController, Effect, Role, TelemetryEvent, TelemetrySink,
    render_message_html,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut input: Option<String> = None;
    let mut json = false;
    let mut fragment: Option<String> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--json" => json = true,
            "--fragment" => match args.next() {
                Some(value) => fragment = Some(value),
                None => {
                    eprintln!("--fragment expects a value like '#cite-c2'");
                    print_usage();
                    process::exit(2);
                }
            },
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    let source = match input {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|err| {
                    eprintln!("failed to read stdin: {}", err);
                    process::exit(1);
                });
            buffer
        }
    };

    let message: ChatMessage = if json {
        serde_json::from_str(&source).unwrap_or_else(|err| {
            eprintln!("failed to parse message JSON: {}", err);
            process::exit(1);
        })
    } else {
        // Bare text: treat it as an assistant answer with no registry, so
        // every marker renders as broken.
        plain_message(source)
    };

    print!("{}", render_message_html(&message));

    if let Some(fragment) = fragment {
        let mut controller = CrossRefController::new(message.citations.clone());
        let effects = controller.resolve_fragment(&fragment, &StderrSink);
        if effects.is_empty() {
            eprintln!("fragment '{}' did not resolve to a citation", fragment);
            process::exit(1);
        }
        for effect in effects {
            eprintln!("{}", describe_effect(&effect));
        }
    }
}

fn plain_message(content: String) -> ChatMessage {
    ChatMessage {
        id: "stdin".to_string(),
        role: Role::Assistant,
        content,
        rendered_html: None,
        citations: Vec::new(),
        created_at: chrono::Utc::now(),
    }
}

fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::ScrollCitationIntoView { index } => {
            format!("scroll citation {} into view", index)
        }
        Effect::ReplaceFragment { fragment } => format!("replace fragment with {}", fragment),
        Effect::ScheduleClear { token, after } => {
            format!("schedule clear token={} after {}ms", token, after.as_millis())
        }
        Effect::CancelClear { token } => format!("cancel clear token={}", token),
    }
}

struct StderrSink;

impl TelemetrySink for StderrSink {
    fn track(&self, event: TelemetryEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => eprintln!("{}", line),
            Err(err) => eprintln!("failed to serialize telemetry event: {}", err),
        }
    }
}

fn print_usage() {
    eprintln!("Usage: citelink-cli [--json] [--fragment '#cite-cN'] [input]");
    eprintln!("  --json      input is a ChatMessage JSON document");
    eprintln!("  --fragment  replay a deep-link fragment and trace the effects");
}
