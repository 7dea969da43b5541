//! Trace command implementation
//!
//! Provides `deptrace trace` and `deptrace plan`. Flags override the
//! loaded configuration for this invocation only.
//!
//! @module cli/trace

use crate::cli::{project_root, TraceArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::logger::TracingLogger;
use crate::trace::output::{create_formatter, OutputFormat};
use crate::trace::{TraceRequest, TraceStatus, Tracer};
use std::sync::Arc;
use tracing::debug;

/// Run a trace; returns the process exit code
pub async fn run(args: TraceArgs, config: Config, force_plan: bool) -> Result<i32> {
    let root = project_root(args.root.clone())?;
    let config = apply_overrides(config, &args);
    config.validate()?;

    debug!(root = %root.display(), entry = %args.entry, "Tracing");

    let format = OutputFormat::from_json_flag(args.json);
    let formatter = create_formatter(format, config.output.max_items);
    let tracer = Tracer::new(config, Arc::new(TracingLogger));

    let mut request = TraceRequest::new(args.entry, root).with_plan(args.plan || force_plan);
    if args.pick_first {
        request = request.with_pick_first(true);
    }
    if let Some(choice) = args.choose {
        request = request.with_choice(choice);
    }

    let outcome = tracer.trace_or_report(request).await;
    let rendered = formatter.format_trace(&outcome.result);

    if outcome.result.status == TraceStatus::Error && format == OutputFormat::Plain {
        eprint!("{}", rendered);
    } else {
        print!("{}", rendered);
        if format == OutputFormat::Json {
            println!();
        }
    }

    Ok(outcome.exit_code())
}

/// Fold command-line flags into the configuration
fn apply_overrides(mut config: Config, args: &TraceArgs) -> Config {
    if let Some(index) = &args.index {
        config.index.path = Some(index.clone());
    }
    if let Some(max_age_ms) = args.max_age_ms {
        config.index.max_age_ms = max_age_ms;
    }
    if let Some(depth) = args.depth {
        config.index.max_depth = Some(depth);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeouts.trace_ms = timeout_ms;
    }
    if args.strict {
        config.planner.strict = true;
    }
    config
}
