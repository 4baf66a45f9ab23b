//! Layout analysis for PDF pages.
//!
//! A page's content stream is interpreted into positioned text spans, the
//! spans are grouped into visual lines by baseline, and lines into blocks
//! by spacing. Coordinates are PDF user space with the origin at the
//! bottom-left of the page.

use std::collections::{BTreeMap, HashMap};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::fonts::FontMetrics;
use crate::error::{Error, Result};
use crate::model::BBox;

/// Gap, in multiples of the font size, that splits one baseline into two lines.
const LINE_SPLIT_GAP: f32 = 2.5;

/// TJ adjustment (thousandths of an em) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Nesting limit for Form XObjects drawn by `Do`.
const MAX_FORM_DEPTH: usize = 12;

/// Parent chain depth limit when looking up inherited page resources.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// An affine transform `[a b c d e f]`, applied to row vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit x vector.
    pub fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Length of the transformed unit y vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
        (n.len() == 6).then(|| Matrix::new(n[0], n[1], n[2], n[3], n[4], n[5]))
    }
}

/// A run of text drawn by one text-showing operator.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// Decoded text
    pub text: String,
    /// Origin x in user space
    pub x: f32,
    /// Baseline y in user space
    pub y: f32,
    /// Advance width in user space
    pub width: f32,
    /// Effective font size in user space
    pub font_size: f32,
    /// Base font name, subset tag removed
    pub font_name: String,
    /// Fill colour packed as 0xRRGGBB
    pub color: u32,
    /// Index of the operator in the decoded operations of its stream
    pub op_index: usize,
    /// TJ adjustment that moves the text position exactly as this span did
    pub displacement: f32,
    /// Content stream the operator belongs to
    pub source: SpanSource,
}

/// Where a span's text-showing operator lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanSource {
    /// The page's own content
    Page,
    /// A Form XObject painted by the page's `Do` at `do_index`
    Form { xobject: ObjectId, do_index: usize },
    /// A Form XObject painted from inside another form
    NestedForm,
}

impl TextSpan {
    /// Approximate descender line.
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Approximate ascender line.
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A visual text line: spans sharing a baseline, sorted left to right.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line
    pub spans: Vec<TextSpan>,
    /// Baseline of the first span
    pub y: f32,
    /// Left edge
    pub x: f32,
}

impl TextLine {
    /// Create a line from spans on one baseline.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        let (x, y) = spans.first().map_or((0.0, 0.0), |s| (s.x, s.y));
        Self { spans, y, x }
    }

    /// The span that represents the line's styling.
    pub fn first_span(&self) -> Option<&TextSpan> {
        self.spans.first()
    }

    /// Right edge of the rightmost span.
    pub fn right(&self) -> f32 {
        self.spans
            .iter()
            .map(TextSpan::right)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Line rectangle, or `None` when the geometry is unusable.
    pub fn bbox(&self) -> Option<BBox> {
        if self.spans.is_empty() {
            return None;
        }
        let x0 = self.spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
        let y0 = self.spans.iter().map(TextSpan::bottom).fold(f32::INFINITY, f32::min);
        let y1 = self.spans.iter().map(TextSpan::top).fold(f32::NEG_INFINITY, f32::max);
        let bbox = [x0, y0, self.right(), y1];
        (bbox.iter().all(|v| v.is_finite()) && bbox[2] >= bbox[0] && bbox[3] > bbox[1])
            .then_some(bbox)
    }

    /// Combined text of all spans.
    ///
    /// A space is inserted where the gap between two spans is wider than a
    /// fraction of a character, except between ideographic characters.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - prev.right();
                let chars = span.text.chars().count();
                let avg_char_width = if chars > 0 && span.width > 0.0 {
                    span.width / chars as f32
                } else {
                    span.font_size * 0.5
                };

                let spaced = prev.text.ends_with([' ', '\u{00A0}'])
                    || span.text.starts_with([' ', '\u{00A0}']);
                let spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                    && span.text.chars().next().is_some_and(is_spaceless_script_char);

                if gap > avg_char_width * 0.2 && !spaced && !spaceless {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }
        result
    }
}

/// A block of consecutive lines with regular spacing.
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// Lines in reading order
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Union of the line rectangles.
    pub fn bbox(&self) -> Option<BBox> {
        self.lines
            .iter()
            .filter_map(TextLine::bbox)
            .reduce(|a, b| [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])])
    }
}

/// A page's decoded operations and the text spans they draw.
#[derive(Debug)]
pub struct PageContent {
    /// Page object
    pub page_id: ObjectId,
    /// Decoded content stream operations, all content streams concatenated
    pub operations: Vec<Operation>,
    /// Text spans in drawing order
    pub spans: Vec<TextSpan>,
}

/// Layout analyzer over a loaded PDF.
pub struct LayoutAnalyzer<'a> {
    doc: &'a Document,
    pages: Vec<ObjectId>,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create an analyzer for a document.
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            pages: doc.get_pages().into_values().collect(),
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Object id of a 0-based page.
    pub fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange(
                page_index as u32 + 1,
                self.pages.len() as u32,
            ))
    }

    /// Decode and interpret a page's content.
    pub fn page_content(&self, page_index: usize) -> Result<PageContent> {
        let page_id = self.page_id(page_index)?;
        let data = self.doc.get_page_content(page_id)?;
        let operations = Content::decode(&data)
            .map_err(|e| Error::PdfParse(e.to_string()))?
            .operations;

        let fonts = self.doc.get_page_fonts(page_id)?;
        let xobjects = page_resources(self.doc, page_id)
            .map(|resources| resource_xobjects(self.doc, resources))
            .unwrap_or_default();
        let spans = ContentInterpreter::new(self.doc, fonts, xobjects, 0).run(&operations);
        log::debug!(
            "Page {}: {} operations, {} text spans",
            page_index + 1,
            operations.len(),
            spans.len()
        );

        Ok(PageContent {
            page_id,
            operations,
            spans,
        })
    }

    /// Visual text blocks of a page in reading order.
    pub fn page_blocks(&self, page_index: usize) -> Result<Vec<TextBlock>> {
        let content = self.page_content(page_index)?;
        let spans = content
            .spans
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .collect();
        Ok(group_lines_into_blocks(group_spans_into_lines(spans)))
    }
}

/// Group spans into lines by baseline, top to bottom.
///
/// Spans on one baseline separated by a wide gap become separate lines, so
/// side-by-side columns do not merge.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<Vec<TextSpan>> = Vec::new();
    for span in spans {
        let tolerance = span.font_size * 0.3;
        match rows.last_mut() {
            Some(row) if (row[0].y - span.y).abs() <= tolerance => row.push(span),
            _ => rows.push(vec![span]),
        }
    }

    let mut lines = Vec::new();
    for mut row in rows {
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
        let mut current: Vec<TextSpan> = Vec::new();
        for span in row {
            if let Some(prev) = current.last() {
                if span.x - prev.right() > prev.font_size.max(span.font_size) * LINE_SPLIT_GAP {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
            }
            current.push(span);
        }
        if !current.is_empty() {
            lines.push(TextLine::from_spans(current));
        }
    }
    lines
}

/// Group lines into blocks by spacing, font size and indentation.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(TextBlock {
                    lines: std::mem::take(&mut current),
                });
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(TextBlock { lines: current });
    }
    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        12.0
    } else {
        spacings.iter().sum::<f32>() / spacings.len() as f32
    }
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let size = |l: &TextLine| l.first_span().map_or(0.0, |s| s.font_size);
    (prev.y - curr.y).abs() > avg_spacing * 1.5
        || (size(prev) - size(curr)).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

/// Graphics state entries that matter for text placement.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    fill: u32,
    font: Option<Vec<u8>>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
    leading: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            fill: 0,
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Content stream interpreter that records text spans.
struct ContentInterpreter<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    xobjects: BTreeMap<Vec<u8>, ObjectId>,
    metrics: HashMap<Vec<u8>, FontMetrics>,
    depth: usize,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    tm: Matrix,
    tlm: Matrix,
}

impl<'a> ContentInterpreter<'a> {
    fn new(
        doc: &'a Document,
        fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
        xobjects: BTreeMap<Vec<u8>, ObjectId>,
        depth: usize,
    ) -> Self {
        let metrics = fonts
            .iter()
            .map(|(name, dict)| (name.clone(), FontMetrics::from_dict(doc, dict)))
            .collect();
        Self {
            doc,
            fonts,
            xobjects,
            metrics,
            depth,
            state: GraphicsState::default(),
            stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
        }
    }

    fn run(mut self, operations: &[Operation]) -> Vec<TextSpan> {
        let mut spans = Vec::new();
        for (index, op) in operations.iter().enumerate() {
            let operands = &op.operands;
            let num = |i: usize| operands.get(i).and_then(get_number);
            match op.operator.as_str() {
                "q" => self.stack.push(self.state.clone()),
                "Q" => {
                    if let Some(state) = self.stack.pop() {
                        self.state = state;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.state.ctm = m.then(&self.state.ctm);
                    }
                }
                "BT" => {
                    self.tm = Matrix::IDENTITY;
                    self.tlm = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.state.font = Some(name.clone());
                    }
                    self.state.font_size = num(1).unwrap_or(self.state.font_size);
                }
                "Tc" => self.state.char_spacing = num(0).unwrap_or(0.0),
                "Tw" => self.state.word_spacing = num(0).unwrap_or(0.0),
                "Tz" => self.state.horizontal_scaling = num(0).unwrap_or(100.0) / 100.0,
                "TL" => self.state.leading = num(0).unwrap_or(0.0),
                "Ts" => self.state.rise = num(0).unwrap_or(0.0),
                "Td" => self.move_line(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = num(1).unwrap_or(0.0);
                    self.state.leading = -ty;
                    self.move_line(num(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.tm = m;
                        self.tlm = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(s @ Object::String(..)) = operands.first() {
                        spans.extend(self.show(index, std::slice::from_ref(s)));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        spans.extend(self.show(index, items));
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(s @ Object::String(..)) = operands.first() {
                        spans.extend(self.show(index, std::slice::from_ref(s)));
                    }
                }
                "\"" => {
                    self.state.word_spacing = num(0).unwrap_or(self.state.word_spacing);
                    self.state.char_spacing = num(1).unwrap_or(self.state.char_spacing);
                    self.next_line();
                    if let Some(s @ Object::String(..)) = operands.get(2) {
                        spans.extend(self.show(index, std::slice::from_ref(s)));
                    }
                }
                "g" => {
                    if let Some(gray) = num(0) {
                        self.state.fill = pack_rgb(gray, gray, gray);
                    }
                }
                "rg" => {
                    if let (Some(r), Some(g), Some(b)) = (num(0), num(1), num(2)) {
                        self.state.fill = pack_rgb(r, g, b);
                    }
                }
                "k" => {
                    if let (Some(c), Some(m), Some(y), Some(k)) = (num(0), num(1), num(2), num(3)) {
                        self.state.fill = pack_cmyk(c, m, y, k);
                    }
                }
                "sc" | "scn" => {
                    let values: Vec<f32> = operands.iter().filter_map(get_number).collect();
                    match values.as_slice() {
                        [gray] => self.state.fill = pack_rgb(*gray, *gray, *gray),
                        [r, g, b] => self.state.fill = pack_rgb(*r, *g, *b),
                        [c, m, y, k] => self.state.fill = pack_cmyk(*c, *m, *y, *k),
                        _ => {}
                    }
                }
                "cs" => self.state.fill = 0,
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        spans.extend(self.paint_form(name, index));
                    }
                }
                _ => {}
            }
        }
        spans
    }

    /// Interpret a Form XObject with the current state, as if wrapped in `q`/`Q`.
    ///
    /// Images and unknown names draw no text and are skipped.
    fn paint_form(&self, name: &[u8], do_index: usize) -> Vec<TextSpan> {
        let Some(&xobject) = self.xobjects.get(name) else {
            return Vec::new();
        };
        let Ok(stream) = self.doc.get_object(xobject).and_then(Object::as_stream) else {
            return Vec::new();
        };
        if !matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Form") {
            return Vec::new();
        }
        if self.depth >= MAX_FORM_DEPTH {
            log::debug!(
                "Form /{} nested deeper than {}, skipped",
                String::from_utf8_lossy(name),
                MAX_FORM_DEPTH
            );
            return Vec::new();
        }
        let operations = match stream_operations(stream) {
            Ok(operations) => operations,
            Err(e) => {
                log::debug!("Form /{} unreadable: {}", String::from_utf8_lossy(name), e);
                return Vec::new();
            }
        };

        // A form without its own resources uses those of whatever paints it.
        let (fonts, xobjects) = match stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_dict(self.doc, o))
        {
            Some(resources) => (
                resource_fonts(self.doc, resources),
                resource_xobjects(self.doc, resources),
            ),
            None => (self.fonts.clone(), self.xobjects.clone()),
        };

        let mut form = ContentInterpreter::new(self.doc, fonts, xobjects, self.depth + 1);
        form.state = self.state.clone();
        if let Some(matrix) = stream
            .dict
            .get(b"Matrix")
            .and_then(Object::as_array)
            .ok()
            .and_then(|m| Matrix::from_operands(m))
        {
            form.state.ctm = matrix.then(&self.state.ctm);
        }

        let mut spans = form.run(&operations);
        for span in &mut spans {
            span.source = match span.source {
                SpanSource::Page => SpanSource::Form { xobject, do_index },
                _ => SpanSource::NestedForm,
            };
        }
        spans
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    /// Show a TJ-style array of strings and adjustments as one span.
    fn show(&mut self, op_index: usize, items: &[Object]) -> Option<TextSpan> {
        let doc = self.doc;
        let font_key = self.state.font.clone().unwrap_or_default();
        let metrics = self
            .metrics
            .entry(font_key.clone())
            .or_insert_with(|| FontMetrics::fallback(&String::from_utf8_lossy(&font_key)))
            .clone();
        let font: Option<&'a Dictionary> = self.fonts.get(&font_key).copied();
        let encoding = font.and_then(|f| f.get_font_encoding(doc).ok());

        let size = self.state.font_size;
        let scaling = self.state.horizontal_scaling;
        let start = self.tm.then(&self.state.ctm);

        let mut text = String::new();
        // Advance in unscaled text space, before horizontal scaling.
        let mut advance = 0.0f32;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = match &encoding {
                        Some(enc) => Document::decode_text(enc, bytes).unwrap_or_default(),
                        None => decode_text_simple(bytes),
                    };
                    text.push_str(&decoded);

                    for code in metrics.codes(bytes) {
                        let mut spacing = self.state.char_spacing;
                        if metrics.code_length() == 1 && code == 32 {
                            spacing += self.state.word_spacing;
                        }
                        advance += metrics.code_width(code) / 1000.0 * size + spacing;
                    }
                }
                other => {
                    if let Some(adjust) = get_number(other) {
                        advance -= adjust / 1000.0 * size;
                        if -adjust > TJ_SPACE_THRESHOLD
                            && !text.is_empty()
                            && !text.ends_with([' ', '\u{00A0}'])
                            && !text.chars().last().is_some_and(is_spaceless_script_char)
                        {
                            text.push(' ');
                        }
                    }
                }
            }
        }

        let tx = advance * scaling;
        self.tm = Matrix::translation(tx, 0.0).then(&self.tm);

        if text.is_empty() {
            return None;
        }

        let (x, y) = start.apply(0.0, self.state.rise);
        let displacement = if size != 0.0 {
            -advance * 1000.0 / size
        } else {
            0.0
        };

        Some(TextSpan {
            text,
            x,
            y,
            width: tx * start.horizontal_scale(),
            font_size: size * start.vertical_scale(),
            font_name: metrics.base_font.clone(),
            color: self.state.fill,
            op_index,
            displacement,
            source: SpanSource::Page,
        })
    }
}

/// Decoded operations of a content stream, filters removed where possible.
pub(crate) fn stream_operations(stream: &Stream) -> Result<Vec<Operation>> {
    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    Content::decode(&data)
        .map(|content| content.operations)
        .map_err(|e| Error::PdfParse(e.to_string()))
}

/// The resource dictionary a page uses, following `/Parent` inheritance.
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Some(resources) = node.get(b"Resources").ok().and_then(|o| resolve_dict(doc, o)) {
            return Some(resources);
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(id)) => node = doc.get_dictionary(*id).ok()?,
            _ => return None,
        }
    }
    None
}

/// A dictionary given inline or by reference.
pub(crate) fn resolve_dict<'d>(doc: &'d Document, obj: &'d Object) -> Option<&'d Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn resource_fonts<'d>(
    doc: &'d Document,
    resources: &'d Dictionary,
) -> BTreeMap<Vec<u8>, &'d Dictionary> {
    resources
        .get(b"Font")
        .ok()
        .and_then(|o| resolve_dict(doc, o))
        .map(|fonts| {
            fonts
                .iter()
                .filter_map(|(name, font)| resolve_dict(doc, font).map(|f| (name.clone(), f)))
                .collect()
        })
        .unwrap_or_default()
}

fn resource_xobjects(doc: &Document, resources: &Dictionary) -> BTreeMap<Vec<u8>, ObjectId> {
    resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve_dict(doc, o))
        .map(|xobjects| {
            xobjects
                .iter()
                .filter_map(|(name, obj)| obj.as_reference().ok().map(|id| (name.clone(), id)))
                .collect()
        })
        .unwrap_or_default()
}

/// Pack normalized RGB components into 0xRRGGBB.
pub fn pack_rgb(r: f32, g: f32, b: f32) -> u32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Split 0xRRGGBB into normalized RGB components.
pub fn unpack_rgb(color: u32) -> (f32, f32, f32) {
    let channel = |shift: u32| ((color >> shift) & 0xFF) as f32 / 255.0;
    (channel(16), channel(8), channel(0))
}

fn pack_cmyk(c: f32, m: f32, y: f32, k: f32) -> u32 {
    pack_rgb((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
}

/// Helper to extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without spaces between words.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF       // CJK unified ideographs
        | 0x3400..=0x4DBF     // extension A
        | 0x20000..=0x2EBEF   // extensions B-F
        | 0x3040..=0x30FF     // hiragana, katakana
        | 0x3000..=0x303F     // CJK punctuation
    )
}

/// Decode a string operand when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
