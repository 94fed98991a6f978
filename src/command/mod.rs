//! Command-facing surface for embedding hosts
//!
//! A debugger plugin wires these entry points to its own command
//! registry. Analysis failures are printed to the output sink as
//! diagnostics; only sink I/O errors propagate.

use crate::analyze::{ProcessScanner, Traverser, VisitedBlocks};
use crate::config::{Config, LoggingConfig};
use crate::core::types::Address;
use crate::host::{DebugHost, HeapInspect, SymbolInspect, TypeInspect, ValueInspect};
use crate::report::{collect_block_stats, write_walk, ExprUsage};
use anyhow::Result;
use std::io::Write;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Finds the variables with the most reachable heap memory
///
/// With arguments: measures each whitespace-separated expression or
/// symbol name individually, each against a fresh block ledger.
/// Without arguments: scans every stack variable of every thread and
/// every global, billing shared memory once, and prints the ranked
/// summary.
pub struct TopVars {
    top_n: usize,
    min_expand_size: usize,
    verbose: bool,
}

impl TopVars {
    pub fn new(config: &Config) -> Self {
        TopVars {
            top_n: config.scan.top_n,
            min_expand_size: config.scan.min_expand_size,
            verbose: config.scan.verbose,
        }
    }

    pub fn run<H: DebugHost, W: Write>(
        &self,
        host: &H,
        arguments: &str,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "Find variables with most memory consumption")?;
        let exprs: Vec<&str> = arguments.split_whitespace().collect();
        if exprs.is_empty() {
            self.run_scan(host, out)
        } else {
            self.run_expressions(host, &exprs, out)
        }
    }

    fn run_expressions<H: DebugHost, W: Write>(
        &self,
        host: &H,
        exprs: &[&str],
        out: &mut W,
    ) -> Result<()> {
        let traverser = Traverser::new(host).with_min_expand_size(self.min_expand_size);
        for &expr in exprs {
            let Some(value) = resolve_expression(host, expr) else {
                writeln!(out, "cannot resolve expression: {}", expr)?;
                continue;
            };

            let mut counted = VisitedBlocks::new();
            let usage = traverser.measure(expr, value.clone(), &mut counted);

            let ty = host.value_type(&value);
            let row = ExprUsage {
                expr: expr.to_string(),
                type_name: host
                    .type_name(&ty)
                    .unwrap_or_else(|| "<unknown>".to_string()),
                static_size: host.type_size(&ty),
                usage,
            };
            row.write_row(out)?;
        }
        Ok(())
    }

    fn run_scan<H: DebugHost, W: Write>(&self, host: &H, out: &mut W) -> Result<()> {
        let scanner = ProcessScanner::new(host)
            .with_min_expand_size(self.min_expand_size)
            .with_verbose(self.verbose);
        match scanner.scan() {
            Ok(report) => report.write_summary(out, self.top_n)?,
            Err(err) => writeln!(out, "scan failed: {}", err)?,
        }
        Ok(())
    }
}

/// Evaluates an expression, falling back to global-symbol lookup
fn resolve_expression<H: SymbolInspect>(host: &H, expr: &str) -> Option<H::ValueRef> {
    match host.evaluate(expr) {
        Ok(Some(value)) => return Some(value),
        Ok(None) => {}
        Err(err) => warn!(expr, error = %err, "expression evaluation failed"),
    }
    match host.lookup_global(expr) {
        Ok(found) => found,
        Err(err) => {
            warn!(expr, error = %err, "global symbol lookup failed");
            None
        }
    }
}

/// Lists all global/static variables grouped by source file
pub fn write_globals<H: SymbolInspect, W: Write>(host: &H, out: &mut W) -> Result<()> {
    let mut globals = match host.global_variables() {
        Ok(globals) => globals,
        Err(err) => {
            writeln!(out, "cannot enumerate global variables: {}", err)?;
            return Ok(());
        }
    };
    globals.sort_by(|a, b| a.source_file.cmp(&b.source_file));

    let mut current_file: Option<String> = None;
    for global in globals {
        let file = global
            .source_file
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string());
        if current_file.as_deref() != Some(file.as_str()) {
            writeln!(out, "{}:", file)?;
            current_file = Some(file);
        }
        let ty = host.value_type(&global.value);
        let type_name = host
            .type_name(&ty)
            .unwrap_or_else(|| "<unknown>".to_string());
        match host.address_of(&global.value) {
            Some(addr) => writeln!(out, "    {} type={} @{:x}", global.name, type_name, addr)?,
            None => writeln!(out, "    {} type={}", global.name, type_name)?,
        }
    }
    Ok(())
}

/// Prints the in-use heap histogram: totals plus top-N block sizes
/// and size classes
pub fn run_top_blocks<H: HeapInspect, W: Write>(host: &H, out: &mut W, n: usize) -> Result<()> {
    match collect_block_stats(host) {
        Ok(stats) => stats.write_top(out, n)?,
        Err(err) => writeln!(out, "heap walk failed: {}", err)?,
    }
    Ok(())
}

/// Lists heap blocks one per line with trailing totals
///
/// `arguments` is `[start-address [max-blocks]]`; a zero or missing
/// start address walks from the first block.
pub fn run_heap_walk<H: HeapInspect, W: Write>(
    host: &H,
    out: &mut W,
    arguments: &str,
) -> Result<()> {
    let mut tokens = arguments.split_whitespace();

    let start = match tokens.next() {
        Some(token) => match token.parse::<Address>() {
            Ok(addr) if addr.is_null() => None,
            Ok(addr) => Some(addr),
            Err(err) => {
                writeln!(out, "{}", err)?;
                return Ok(());
            }
        },
        None => None,
    };
    let limit = match tokens.next() {
        Some(token) => match token.parse::<usize>() {
            Ok(n) => Some(n),
            Err(_) => {
                writeln!(out, "invalid block limit: {}", token)?;
                return Ok(());
            }
        },
        None => None,
    };

    if let Err(err) = write_walk(host, out, start, limit) {
        writeln!(out, "heap walk failed: {}", err)?;
    }
    Ok(())
}

/// Installs the global tracing subscriber from the logging section
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {}", err))
}
