//! Left-aligned text fitting into a fixed rectangle.

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use super::fonts::{encode_win_ansi, helvetica_text_width, HELVETICA_ASCENT, HELVETICA_DESCENT};
use super::layout::unpack_rgb;
use crate::model::BBox;
use crate::options::FitOptions;

/// Slack for float comparisons against the rectangle edges.
const EPSILON: f32 = 0.01;

/// The result of fitting text into a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    /// Font size of the final layout
    pub font_size: f32,
    /// Whether the layout stays inside the rectangle
    pub fit: bool,
    /// Wrapped lines, top to bottom
    pub lines: Vec<String>,
}

/// Wrap text into lines no wider than `max_width` at `size`.
///
/// Explicit newlines always break. A word wider than `max_width` sits on a
/// line of its own and overflows it.
pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<(String, f32)> {
    let space_width = helvetica_text_width(" ", size);
    let mut lines = Vec::new();

    for paragraph in text.replace('\r', "").split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0;
        for word in paragraph.split_whitespace() {
            let word_width = helvetica_text_width(word, size);
            if current.is_empty() {
                current = word.to_string();
                current_width = word_width;
            } else if current_width + space_width + word_width <= max_width + EPSILON {
                current.push(' ');
                current.push_str(word);
                current_width += space_width + word_width;
            } else {
                lines.push((std::mem::take(&mut current), current_width));
                current = word.to_string();
                current_width = word_width;
            }
        }
        lines.push((current, current_width));
    }

    // Trailing blank lines carry nothing to draw.
    while lines.last().is_some_and(|(line, _)| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Height taken by `count` lines at `size`.
pub fn block_height(count: usize, size: f32, line_height: f32) -> f32 {
    if count == 0 {
        return 0.0;
    }
    size * (HELVETICA_ASCENT + HELVETICA_DESCENT) + (count - 1) as f32 * size * line_height
}

/// One fit attempt: wrap at `size` and check the rectangle.
pub fn try_fit(text: &str, rect: BBox, size: f32, line_height: f32) -> (bool, Vec<String>) {
    let width = rect[2] - rect[0];
    let height = rect[3] - rect[1];
    let wrapped = wrap_text(text, size, width);

    let fits_width = wrapped.iter().all(|(_, w)| *w <= width + EPSILON);
    let fits_height = block_height(wrapped.len(), size, line_height) <= height + EPSILON;
    (
        fits_width && fits_height,
        wrapped.into_iter().map(|(line, _)| line).collect(),
    )
}

/// Shrink text until it fits `rect`, starting from the extracted size.
///
/// The start size is clamped into the configured range, each failed attempt
/// steps down until the floor, and after the last attempt the layout at the
/// last attempted size is returned with `fit: false`.
///
/// The unfit layout is not shrunk once more: from a start of 10pt with the
/// default options it is drawn and reported at 5.1pt, not at the 5pt floor.
pub fn fit_text(text: &str, rect: BBox, extracted_size: f32, options: &FitOptions) -> FittedText {
    let mut size = options.start_size(extracted_size);
    let mut last = FittedText {
        font_size: size,
        fit: false,
        lines: Vec::new(),
    };

    for attempt in 0..options.max_attempts {
        let (fit, lines) = try_fit(text, rect, size, options.line_height);
        if fit {
            return FittedText {
                font_size: size,
                fit: true,
                lines,
            };
        }
        log::debug!("Fit attempt {} at {:.2}pt overflowed", attempt + 1, size);
        last = FittedText {
            font_size: size,
            fit: false,
            lines,
        };
        size = options.next_size(size);
    }

    if last.lines.is_empty() {
        last.lines = wrap_text(text, last.font_size, rect[2] - rect[0])
            .into_iter()
            .map(|(line, _)| line)
            .collect();
    }
    last
}

/// Content operations that draw fitted text left-aligned from the top of `rect`.
///
/// Returns the operations and the number of characters WinAnsi could not encode.
pub fn text_operations(
    font_resource: &[u8],
    fitted: &FittedText,
    rect: BBox,
    color: u32,
    line_height: f32,
) -> (Vec<Operation>, usize) {
    let size = fitted.font_size;
    let (r, g, b) = unpack_rgb(color);
    let mut missing = 0;

    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font_resource.to_vec()), Object::Real(size)],
        ),
        Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
    ];

    let mut baseline = rect[3] - size * HELVETICA_ASCENT;
    for line in &fitted.lines {
        if !line.is_empty() {
            let (bytes, unknown) = encode_win_ansi(line);
            missing += unknown;
            ops.push(Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Real(rect[0]),
                    Object::Real(baseline),
                ],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(bytes, StringFormat::Literal)],
            ));
        }
        baseline -= size * line_height;
    }

    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
    (ops, missing)
}
