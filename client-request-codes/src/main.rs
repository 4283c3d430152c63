use std::io::{stdout, Write};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use client_request_codes::{
    table, Resolution, TableEntry, Tool, IS_PLATFORM_SUPPORTED_BY_VALGRIND, SUPPORT,
    VALGRIND_HEADER_VERSION,
};
use colored::{control, Colorize};
use env_logger::Env;
use log::{debug, error, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ToolArg {
    All,
    Valgrind,
    Callgrind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Print the valgrind client request codes resolved when this binary was built
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Only print the requests of this tool
    #[arg(long, value_enum, default_value_t = ToolArg::All)]
    tool: ToolArg,

    /// The output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Serialize)]
struct Listing {
    platform_supported: bool,
    support: &'static str,
    valgrind_version: Option<String>,
    requests: Vec<TableEntry>,
}

impl Listing {
    fn new(tool: ToolArg) -> Self {
        let requests = table()
            .into_iter()
            .filter(|entry| match tool {
                ToolArg::All => true,
                ToolArg::Valgrind => entry.tool == Tool::Valgrind,
                ToolArg::Callgrind => entry.tool == Tool::Callgrind,
            })
            .collect();

        Self {
            platform_supported: IS_PLATFORM_SUPPORTED_BY_VALGRIND,
            support: SUPPORT.as_str(),
            valgrind_version: VALGRIND_HEADER_VERSION
                .map(|(major, minor)| format!("{major}.{minor}")),
            requests,
        }
    }

    fn write_text<W>(&self, mut writer: W) -> Result<()>
    where
        W: Write,
    {
        writeln!(
            writer,
            "platform supported: {} ({}), valgrind headers: {}",
            self.platform_supported,
            self.support,
            self.valgrind_version.as_deref().unwrap_or("none")
        )?;
        for entry in &self.requests {
            let code = match entry.resolution {
                Resolution::Framework => format!("{:#x}", entry.code),
                Resolution::Placeholder => entry.code.to_string(),
            };
            writeln!(
                writer,
                "{}::{} {code} ({})",
                entry.tool, entry.name, entry.resolution
            )?;
        }
        Ok(())
    }

    fn write_json<W>(&self, mut writer: W) -> Result<()>
    where
        W: Write,
    {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    debug!("Arguments: {args:?}");

    if VALGRIND_HEADER_VERSION.is_none() {
        warn!("No valgrind headers were found at build time. All codes are placeholders");
    }

    let listing = Listing::new(args.tool);
    let stdout = stdout().lock();
    match args.format {
        Format::Text => listing.write_text(stdout),
        Format::Json => listing.write_json(stdout),
    }
}

fn main() {
    // Configure the colored crate to respect CARGO_TERM_COLOR
    if let Ok(var) = std::env::var("CARGO_TERM_COLOR") {
        if var == "never" {
            control::set_override(false);
        } else if var == "always" {
            control::set_override(true);
        }
    }

    // Configure the env_logger crate to respect CARGO_TERM_COLOR
    env_logger::Builder::from_env(
        Env::default()
            .default_filter_or("warn")
            .write_style("CARGO_TERM_COLOR"),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "{}: {:<5}: {}",
            record
                .module_path()
                .unwrap_or(record.module_path_static().unwrap_or("???")),
            match record.level() {
                log::Level::Error => "Error".red().bold(),
                log::Level::Warn => "Warn".yellow().bold(),
                log::Level::Info => "Info".green().bold(),
                log::Level::Debug => "Debug".blue().bold(),
                log::Level::Trace => "Trace".cyan().bold(),
            },
            record.args()
        )
    })
    .init();

    if let Err(error) = run() {
        error!("{error}");
        std::process::exit(1)
    }
}
