mod feedback;
mod geometry;
mod grab;
mod report;
mod selection;
mod server;
mod style;
#[cfg(test)]
mod testing;
mod x11;

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::AsFd;
use std::process;

use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};

use crate::geometry::ScreenSize;
use crate::grab::GrabOptions;
use crate::selection::SelectionOutcome;
use crate::server::DisplayServer;
use crate::style::{BorderStyle, ColorSpec, LineStyle};
use crate::x11::X11Server;

const DEFAULT_BORDER_COLOR: &str = "#ffffff";

const USAGE_NOTES: &str = r#"Color format:
  hex: #7CFC00
  rgb: 127,252,0
  x11: "Lawn Green"

Format placeholders:
  %x %X  offset from left/right of screen
  %y %Y  offset from top/bottom of screen
  %w %h  selection width/height
  %%     literal percent sign

Examples:
  rectsel -w 3 -b "Lawn Green"
  rectsel -f '%wx%h+%x+%y\n'
  rectsel | read x y width height

Press any key while dragging to cancel; nothing is printed in that case."#;

#[derive(Parser, Debug)]
#[command(
    name = "rectsel",
    version,
    about = "Drag out a rectangle on the X11 screen and print its geometry",
    after_help = USAGE_NOTES
)]
struct Cli {
    /// Output format (default: "%x %y %w %h\n"); \n and \t are expanded
    #[arg(short = 'f', long, env = "RECTSEL_FORMAT")]
    format: Option<String>,
    /// Grab the X server while selecting (may prevent tearing)
    #[arg(short = 'g', long, action = ArgAction::SetTrue)]
    grab: bool,
    /// Border width in pixels
    #[arg(
        short = 'w',
        long,
        env = "RECTSEL_BORDER_WIDTH",
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(0..=10)
    )]
    border_width: u16,
    /// Border line style
    #[arg(
        short = 's',
        long,
        env = "RECTSEL_BORDER_STYLE",
        value_enum,
        default_value_t = LineStyle::Solid
    )]
    border_style: LineStyle,
    /// Border color (default: white)
    #[arg(short = 'b', long, env = "RECTSEL_BORDER_COLOR")]
    border_color: Option<String>,
    /// X display to connect to (default: $DISPLAY)
    #[arg(short = 'd', long)]
    display: Option<String>,
    /// Print the selection as a JSON object instead of using --format
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Output {
    Template(String),
    Json,
}

impl Output {
    fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            return Output::Json;
        }
        let template = cli
            .format
            .as_deref()
            .map(report::unescape)
            .unwrap_or_else(|| report::DEFAULT_TEMPLATE.to_string());
        Output::Template(template)
    }
}

fn main() {
    init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(exit_code(err.kind()));
        }
    };
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn init_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or("RECTSEL_LOG", "info")
            .write_style("RECTSEL_LOG_STYLE"),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::from_cli(&cli);
    let color_input = cli
        .border_color
        .as_deref()
        .unwrap_or(DEFAULT_BORDER_COLOR);
    // Reject malformed colors before touching the display.
    let literal_color = ColorSpec::parse(color_input).literal(color_input)?;

    let mut server = X11Server::open(cli.display.as_deref())?;
    let color = match literal_color {
        Some(color) => color,
        None => server.lookup_color(color_input)?,
    };
    server.set_border(BorderStyle {
        color,
        width: cli.border_width,
        line: cli.border_style,
    })?;
    let screen = server
        .screen_size()
        .context("failed to get root window geometry")?;

    let outcome = selection::select(
        &mut server,
        GrabOptions {
            freeze_server: cli.grab,
        },
    )?;

    finish(outcome, &output, screen, &mut unbuffered_stdout()?)
}

// `Stdout` is line-buffered and would split a multi-line report into
// several writes.
fn unbuffered_stdout() -> Result<File> {
    let fd = io::stdout()
        .as_fd()
        .try_clone_to_owned()
        .context("failed to duplicate stdout")?;
    Ok(File::from(fd))
}

fn finish<W: Write>(
    outcome: SelectionOutcome,
    output: &Output,
    screen: ScreenSize,
    out: &mut W,
) -> Result<()> {
    match outcome {
        SelectionOutcome::Committed(rect) => {
            let text = match output {
                Output::Template(template) => report::format(template, rect, screen),
                Output::Json => report::format_json(rect, screen)?,
            };
            report::emit(out, &text)
        }
        SelectionOutcome::Aborted => Ok(()),
        SelectionOutcome::ConnectionLost => bail!("connection to X display lost"),
    }
}
