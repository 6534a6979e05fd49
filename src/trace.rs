use std::fmt::Write as _;

use chrono::Local;
use console::{measure_text_width, Term};
use tracing::field::Visit;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

#[derive(Default)]
struct EventFields {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}

/// Formats events as single lines on stderr: local timestamp, level, message
/// and key=value fields, with the module path right-aligned to the terminal
/// width.
pub struct ConsoleLayer;

impl ConsoleLayer {
    fn format_event(&self, event: &Event<'_>) -> String {
        let metadata = event.metadata();
        let formatted_time = Local::now().format("%H:%M:%S%.3f").to_string();

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let mut message = format!("{} {:>5}", formatted_time, metadata.level());
        if let Some(msg) = &fields.message {
            let _ = write!(message, " {}", msg.trim_matches('"'));
        }
        for (k, v) in &fields.fields {
            let _ = write!(message, " {}={}", k, v.trim_matches('"'));
        }

        let loc = match (metadata.module_path(), metadata.line()) {
            (Some(module_path), Some(line)) => format!("{}:{}", module_path, line),
            (Some(module_path), None) => module_path.to_string(),
            _ => String::new(),
        };

        // Add right-aligned module path
        let terminal_width = Term::stdout().size().1 as usize;
        let content_width = measure_text_width(&message) + measure_text_width(&loc);
        let padding = " ".repeat(terminal_width.saturating_sub(content_width));
        message.push_str(&padding);
        message.push_str(&loc);

        message
    }
}

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        eprintln!("{}", self.format_event(event));
    }
}

pub fn init() {
    let registry = Registry::default().with(ConsoleLayer);
    tracing::subscriber::set_global_default(registry).expect("setting tracing default failed");
}
