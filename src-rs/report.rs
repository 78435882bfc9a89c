use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::geometry::{Rectangle, ScreenSize};

pub const DEFAULT_TEMPLATE: &str = "%x %y %w %h\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Report {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    #[serde(rename = "X")]
    pub right: i64,
    #[serde(rename = "Y")]
    pub bottom: i64,
}

impl Report {
    pub fn new(rect: Rectangle, screen: ScreenSize) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            right: i64::from(screen.width) - i64::from(rect.x) - i64::from(rect.w),
            bottom: i64::from(screen.height) - i64::from(rect.y) - i64::from(rect.h),
        }
    }
}

// Any other character after `%` is dropped along with the `%`.
pub fn format(template: &str, rect: Rectangle, screen: ScreenSize) -> String {
    let report = Report::new(rect, screen);
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('x') => out.push_str(&report.x.to_string()),
            Some('y') => out.push_str(&report.y.to_string()),
            Some('w') => out.push_str(&report.w.to_string()),
            Some('h') => out.push_str(&report.h.to_string()),
            Some('X') => out.push_str(&report.right.to_string()),
            Some('Y') => out.push_str(&report.bottom.to_string()),
            Some(_) | None => {}
        }
    }
    out
}

pub fn format_json(rect: Rectangle, screen: ScreenSize) -> Result<String> {
    let mut line = serde_json::to_string(&Report::new(rect, screen))?;
    line.push('\n');
    Ok(line)
}

// Unknown escapes are kept as written.
pub fn unescape(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            _ => {
                out.push('\\');
                continue;
            }
        }
        chars.next();
    }
    out
}

pub fn emit<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .context("failed to write selection to stdout")?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}
