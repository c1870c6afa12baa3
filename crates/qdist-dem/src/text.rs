//! Reader for the line-oriented detector error model text format.
//!
//! ```text
//! error(0.001) D0 D1 ^ L0
//! detector(1, 0, 0) D2
//! logical_observable L0
//! shift_detectors(0, 0, 1) 3
//! repeat 10 {
//!     error(0.001) D0 D3
//!     shift_detectors 3
//! }
//! ```
//!
//! Instructions may carry a `[tag]` between the name and the argument list.
//! Everything after `#` on a line is a comment.

use qdist_core::{DemInstruction, DemTarget, DetectorErrorModel, ErrorInfo, QdistError};

struct Frame {
    count: u64,
    line: usize,
    body: Vec<DemInstruction>,
}

enum Line {
    Instruction(DemInstruction),
    RepeatStart(u64),
}

struct Head<'a> {
    name: &'a str,
    args: Vec<f64>,
    rest: &'a str,
}

fn syntax_error(line: usize, message: impl Into<String>) -> QdistError {
    QdistError::Dem(ErrorInfo::new("invalid-syntax", message).with_line(line))
}

/// Parses DEM text into a [`DetectorErrorModel`].
///
/// Shifted models parse successfully; only the distance reduction refuses
/// them.
pub fn parse_dem_text(content: &str) -> Result<DetectorErrorModel, QdistError> {
    let mut top = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if line == "}" {
            let frame = stack
                .pop()
                .ok_or_else(|| syntax_error(line_no, "unmatched closing brace"))?;
            let block = DemInstruction::Repeat {
                count: frame.count,
                body: frame.body,
            };
            current(&mut stack, &mut top).push(block);
            continue;
        }
        match parse_line(line, line_no)? {
            Line::RepeatStart(count) => stack.push(Frame {
                count,
                line: line_no,
                body: Vec::new(),
            }),
            Line::Instruction(instruction) => current(&mut stack, &mut top).push(instruction),
        }
    }

    if let Some(frame) = stack.last() {
        return Err(syntax_error(frame.line, "repeat block is never closed"));
    }
    Ok(DetectorErrorModel::new(top))
}

fn current<'a>(stack: &'a mut [Frame], top: &'a mut Vec<DemInstruction>) -> &'a mut Vec<DemInstruction> {
    match stack.last_mut() {
        Some(frame) => &mut frame.body,
        None => top,
    }
}

fn split_head(line: &str, line_no: usize) -> Result<Head<'_>, QdistError> {
    let end = line
        .find(|c: char| c == '(' || c == '[' || c.is_whitespace())
        .unwrap_or(line.len());
    let name = &line[..end];
    let mut rest = line[end..].trim_start();

    if let Some(tagged) = rest.strip_prefix('[') {
        let close = tagged
            .find(']')
            .ok_or_else(|| syntax_error(line_no, "missing closing bracket in tag"))?;
        rest = tagged[close + 1..].trim_start();
    }

    let mut args = Vec::new();
    if let Some(inner) = rest.strip_prefix('(') {
        let close = inner
            .find(')')
            .ok_or_else(|| syntax_error(line_no, "missing closing parenthesis"))?;
        for piece in inner[..close].split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let value: f64 = piece.parse().map_err(|_| {
                QdistError::Dem(
                    ErrorInfo::new("invalid-number", "argument is not a number")
                        .with_line(line_no)
                        .with_context("argument", piece),
                )
            })?;
            args.push(value);
        }
        rest = inner[close + 1..].trim_start();
    }

    Ok(Head { name, args, rest })
}

fn parse_target(token: &str, line_no: usize) -> Result<DemTarget, QdistError> {
    if token == "^" {
        return Ok(DemTarget::Separator);
    }
    let parsed = if let Some(id) = token.strip_prefix('D') {
        id.parse().ok().map(DemTarget::RelativeDetector)
    } else if let Some(id) = token.strip_prefix('L') {
        id.parse().ok().map(DemTarget::LogicalObservable)
    } else {
        None
    };
    parsed.ok_or_else(|| {
        QdistError::Dem(
            ErrorInfo::new("invalid-target", "unrecognised instruction target")
                .with_line(line_no)
                .with_context("target", token)
                .with_hint("targets look like D3, L0 or ^"),
        )
    })
}

fn parse_targets(rest: &str, line_no: usize) -> Result<Vec<DemTarget>, QdistError> {
    rest.split_whitespace()
        .map(|token| parse_target(token, line_no))
        .collect()
}

fn parse_line(line: &str, line_no: usize) -> Result<Line, QdistError> {
    let head = split_head(line, line_no)?;
    match head.name {
        "error" => {
            let probability = match head.args.as_slice() {
                [p] => *p,
                _ => return Err(syntax_error(line_no, "error takes exactly one probability")),
            };
            if !(0.0..=1.0).contains(&probability) {
                return Err(QdistError::Dem(
                    ErrorInfo::new("invalid-probability", "probability must lie in [0, 1]")
                        .with_line(line_no)
                        .with_context("probability", probability.to_string()),
                ));
            }
            let targets = parse_targets(head.rest, line_no)?;
            Ok(Line::Instruction(DemInstruction::Error {
                probability,
                targets,
            }))
        }
        "detector" => {
            let targets = parse_targets(head.rest, line_no)?;
            if targets.iter().any(|t| !t.is_relative_detector_id()) {
                return Err(syntax_error(line_no, "detector declarations only take D targets"));
            }
            Ok(Line::Instruction(DemInstruction::Detector {
                coordinates: head.args,
                targets,
            }))
        }
        "logical_observable" => {
            let targets = parse_targets(head.rest, line_no)?;
            if targets.iter().any(|t| !t.is_logical_observable_id()) {
                return Err(syntax_error(
                    line_no,
                    "logical_observable declarations only take L targets",
                ));
            }
            Ok(Line::Instruction(DemInstruction::LogicalObservable { targets }))
        }
        "shift_detectors" => {
            let mut tokens = head.rest.split_whitespace();
            let detector_shift = match tokens.next() {
                Some(token) => token
                    .parse()
                    .map_err(|_| syntax_error(line_no, "detector shift must be an integer"))?,
                None => 0,
            };
            if tokens.next().is_some() {
                return Err(syntax_error(line_no, "shift_detectors takes a single shift"));
            }
            Ok(Line::Instruction(DemInstruction::ShiftDetectors {
                detector_shift,
                coordinate_shift: head.args,
            }))
        }
        "repeat" => {
            let body = head
                .rest
                .strip_suffix('{')
                .ok_or_else(|| syntax_error(line_no, "repeat block must open with '{'"))?;
            let count = body
                .trim()
                .parse()
                .map_err(|_| syntax_error(line_no, "repeat count must be an integer"))?;
            Ok(Line::RepeatStart(count))
        }
        other => Err(QdistError::Dem(
            ErrorInfo::new("unknown-instruction", "unknown DEM instruction")
                .with_line(line_no)
                .with_context("instruction", other),
        )),
    }
}
