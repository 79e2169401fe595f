use anstyle::{AnsiColor, Style};
use anyhow::{Context, Result};
use env_logger::{Builder, Target, WriteStyle};
use log::kv::Key;
use std::io::Write;

const DIM: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightBlack)));

const DURATION: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Cyan)));

/// Width of the duration column that prefixes every message line
const DURATION_WIDTH: usize = 10;

/// Reformat a `Debug`-printed duration such as `1.234567s` into `1.23 s`.
pub fn format_duration_field(raw: &str) -> String {
    if let Some(idx) = raw.find(|c: char| c.is_alphabetic()) {
        let (num, unit) = (&raw[..idx], &raw[idx..]);
        if let Ok(val) = num.parse::<f32>() {
            return format!("{:.2} {}", val, unit);
        }
    }
    raw.to_string()
}

/// Initialize the global logger. `RUST_LOG` overrides the default `info` level.
pub fn initialize_logger() -> Result<()> {
    Builder::new()
        .write_style(WriteStyle::Auto)
        .format(|buf, record| {
            let ts = buf.timestamp();
            let level_style = buf.default_level_style(record.level());

            writeln!(
                buf,
                "{}{}{} {}{}{} {}{}{}",
                DIM.render(),
                ts,
                DIM.render_reset(),
                level_style.render(),
                record.level(),
                level_style.render_reset(),
                DIM.render(),
                record.target(),
                DIM.render_reset(),
            )?;

            let dur_raw = record
                .key_values()
                .get(Key::from("duration"))
                .map(|v| format_duration_field(&v.to_string()))
                .unwrap_or_default();

            let dur = if dur_raw.is_empty() {
                " ".repeat(DURATION_WIDTH)
            } else {
                format!(
                    "{}{:>width$}{}",
                    DURATION.render(),
                    dur_raw,
                    DURATION.render_reset(),
                    width = DURATION_WIDTH
                )
            };

            let message = record.args().to_string();
            let subsequent_indent = " ".repeat(DURATION_WIDTH + 1);
            let mut lines = message.lines();

            if let Some(first_line) = lines.next() {
                writeln!(buf, "{} {}", dur, first_line)?;
            }
            for line in lines {
                writeln!(buf, "{}{}", subsequent_indent, line)?;
            }

            Ok(())
        })
        .target(Target::Stderr)
        .filter(None, log::LevelFilter::Info)
        .filter(Some("reqwest"), log::LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .context("failed to initialize logger")
}
