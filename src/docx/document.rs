//! Paragraph-level view of a WordprocessingML main document part.

use std::collections::HashSet;

use super::xml::{NodeId, XmlTree};
use crate::error::{Error, Result};

/// A body-level content item, discriminated once during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockItem {
    /// `w:p`
    Paragraph(NodeId),
    /// `w:tbl`
    Table(NodeId),
}

/// Elements whose content does not belong to the enclosing paragraph's text.
const FOREIGN_CONTENT: [&str; 4] = ["txbxContent", "del", "moveFrom", "instrText"];

/// Paragraph children that must not be duplicated when a paragraph is copied.
const UNIQUE_MARKERS: [&str; 2] = ["bookmarkStart", "bookmarkEnd"];

/// The main document part, mutable for the duration of one operation.
pub struct WordDocument {
    tree: XmlTree,
    body: NodeId,
    prefix: String,
}

impl WordDocument {
    /// Wrap a parsed main document part.
    pub fn from_tree(tree: XmlTree) -> Result<Self> {
        let root = tree
            .root()
            .ok_or_else(|| Error::Docx("Document part has no root element".to_string()))?;
        let body = tree
            .first_child_named(root, "body")
            .ok_or_else(|| Error::Docx("Document part has no w:body".to_string()))?;
        let prefix = tree
            .element(body)
            .and_then(|e| e.name.split_once(':').map(|(p, _)| p.to_string()))
            .unwrap_or_default();
        Ok(Self { tree, body, prefix })
    }

    /// The underlying XML tree.
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Body-level block items in document order.
    pub fn block_items(&self, container: NodeId) -> Vec<BlockItem> {
        let mut items = Vec::new();
        self.collect_block_items(container, &mut items);
        items
    }

    fn collect_block_items(&self, container: NodeId, items: &mut Vec<BlockItem>) {
        for &child in self.tree.children(container) {
            if self.tree.is(child, "p") {
                items.push(BlockItem::Paragraph(child));
            } else if self.tree.is(child, "tbl") {
                items.push(BlockItem::Table(child));
            } else if self.tree.is(child, "sdt") {
                if let Some(content) = self.tree.first_child_named(child, "sdtContent") {
                    self.collect_block_items(content, items);
                }
            }
        }
    }

    /// Every paragraph in reading order, including those inside table cells.
    ///
    /// Each physical cell is visited once: merged cells that the grid
    /// exposes at several positions resolve to one structural identity.
    pub fn paragraphs(&self) -> Vec<NodeId> {
        let mut paragraphs = Vec::new();
        let mut seen_cells = HashSet::new();
        self.walk(self.body, &mut seen_cells, &mut paragraphs);
        paragraphs
    }

    fn walk(&self, container: NodeId, seen_cells: &mut HashSet<NodeId>, out: &mut Vec<NodeId>) {
        for item in self.block_items(container) {
            match item {
                BlockItem::Paragraph(p) => out.push(p),
                BlockItem::Table(tbl) => {
                    for row in self.cell_grid(tbl) {
                        for cell in row.into_iter().flatten() {
                            if seen_cells.insert(cell) {
                                self.walk(cell, seen_cells, out);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Cells of a table by row and grid column.
    ///
    /// A cell spanning several grid columns appears once per column, and a
    /// vertical-merge continuation resolves to the cell that starts the merge.
    pub fn cell_grid(&self, tbl: NodeId) -> Vec<Vec<Option<NodeId>>> {
        let mut grid: Vec<Vec<Option<NodeId>>> = Vec::new();
        for tr in self.tree.children_named(tbl, "tr") {
            // Columns skipped by w:gridBefore hold no cell.
            let mut row: Vec<Option<NodeId>> = vec![None; self.grid_before(tr)];
            for tc in self.tree.children_named(tr, "tc") {
                let col = row.len();
                let identity = if self.is_merge_continuation(tc) {
                    grid.last()
                        .and_then(|above| above.get(col).copied().flatten())
                        .unwrap_or(tc)
                } else {
                    tc
                };
                row.extend(std::iter::repeat(Some(identity)).take(self.grid_span(tc)));
            }
            grid.push(row);
        }
        grid
    }

    fn tc_property(&self, tc: NodeId, local: &str) -> Option<NodeId> {
        let props = self.tree.first_child_named(tc, "tcPr")?;
        self.tree.first_child_named(props, local)
    }

    fn grid_span(&self, tc: NodeId) -> usize {
        self.tc_property(tc, "gridSpan")
            .and_then(|id| self.tree.element(id))
            .and_then(|e| e.attribute("val"))
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }

    fn grid_before(&self, tr: NodeId) -> usize {
        self.tree
            .first_child_named(tr, "trPr")
            .and_then(|props| self.tree.first_child_named(props, "gridBefore"))
            .and_then(|id| self.tree.element(id))
            .and_then(|e| e.attribute("val"))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0)
    }

    fn is_merge_continuation(&self, tc: NodeId) -> bool {
        self.tc_property(tc, "vMerge")
            .and_then(|id| self.tree.element(id))
            .is_some_and(|e| e.attribute("val").unwrap_or("continue") != "restart")
    }

    /// The runs that carry a paragraph's text, in order.
    pub fn runs(&self, paragraph: NodeId) -> Vec<NodeId> {
        let mut runs = Vec::new();
        self.collect_runs(paragraph, &mut runs);
        runs
    }

    fn collect_runs(&self, node: NodeId, runs: &mut Vec<NodeId>) {
        for &child in self.tree.children(node) {
            let Some(element) = self.tree.element(child) else {
                continue;
            };
            match element.local_name() {
                "r" => runs.push(child),
                "p" | "pPr" => {}
                local if FOREIGN_CONTENT.contains(&local) => {}
                _ => self.collect_runs(child, runs),
            }
        }
    }

    /// Text of one run: `w:t` text, tabs and line breaks.
    pub fn run_text(&self, run: NodeId) -> String {
        let mut text = String::new();
        for &child in self.tree.children(run) {
            let Some(element) = self.tree.element(child) else {
                continue;
            };
            match element.local_name() {
                "t" => {
                    for &t in self.tree.children(child) {
                        if let Some(s) = self.tree.text(t) {
                            text.push_str(s);
                        }
                    }
                }
                "tab" => text.push('\t'),
                "br" if matches!(element.attribute("type"), None | Some("textWrapping")) => {
                    text.push('\n')
                }
                "cr" => text.push('\n'),
                "noBreakHyphen" => text.push('-'),
                _ => {}
            }
        }
        text
    }

    /// Raw (uncleaned) text of a paragraph.
    pub fn paragraph_text(&self, paragraph: NodeId) -> String {
        self.runs(paragraph)
            .into_iter()
            .map(|r| self.run_text(r))
            .collect()
    }

    /// Check if a paragraph renders its bullet or number through list formatting.
    pub fn is_list_paragraph(&self, paragraph: NodeId) -> bool {
        let Some(props) = self.tree.first_child_named(paragraph, "pPr") else {
            return false;
        };
        if self.tree.first_child_named(props, "numPr").is_some() {
            return true;
        }
        self.tree
            .first_child_named(props, "pStyle")
            .and_then(|id| self.tree.element(id))
            .and_then(|e| e.attribute("val"))
            .is_some_and(|style| style.starts_with("List"))
    }

    /// Replace a paragraph's visible text, keeping paragraph and first-run formatting.
    ///
    /// The first run receives the whole text and every other run is emptied.
    /// A paragraph without runs gets a new plain run.
    pub fn set_paragraph_text(&mut self, paragraph: NodeId, text: &str) {
        let runs = self.runs(paragraph);
        match runs.split_first() {
            Some((&first, rest)) => {
                self.set_run_text(first, text);
                for &run in rest {
                    self.set_run_text(run, "");
                }
            }
            None => {
                let run = self.tree.create_element(&self.qualified("r"));
                self.tree.append_child(paragraph, run);
                self.set_run_text(run, text);
            }
        }
    }

    /// Replace a run's content with text, keeping its `w:rPr`.
    pub fn set_run_text(&mut self, run: NodeId, text: &str) {
        let content: Vec<NodeId> = self
            .tree
            .children(run)
            .iter()
            .copied()
            .filter(|c| !self.tree.is(*c, "rPr"))
            .collect();
        for child in content {
            self.tree.detach(child);
        }

        let mut segment = String::new();
        for ch in text.chars() {
            match ch {
                '\t' | '\n' => {
                    self.push_text(run, &std::mem::take(&mut segment));
                    let local = if ch == '\t' { "tab" } else { "br" };
                    let marker = self.tree.create_element(&self.qualified(local));
                    self.tree.append_child(run, marker);
                }
                _ => segment.push(ch),
            }
        }
        self.push_text(run, &segment);
    }

    fn push_text(&mut self, run: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let t = self.tree.create_element(&self.qualified("t"));
        if let Some(element) = self.tree.element_mut(t) {
            element.set_attribute("xml:space", "preserve");
        }
        let content = self.tree.create_text(text);
        self.tree.append_child(t, content);
        self.tree.append_child(run, t);
    }

    /// Insert a copy of `anchor` right after it and give the copy `text`.
    ///
    /// The copy keeps the anchor's paragraph properties and run formatting.
    /// Section breaks and bookmarks are not duplicated.
    pub fn insert_paragraph_after(&mut self, anchor: NodeId, text: &str) -> Result<NodeId> {
        let copy = self.tree.deep_copy(anchor);

        let markers: Vec<NodeId> = self
            .tree
            .children(copy)
            .iter()
            .copied()
            .filter(|c| UNIQUE_MARKERS.iter().any(|m| self.tree.is(*c, m)))
            .collect();
        for marker in markers {
            self.tree.detach(marker);
        }
        if let Some(props) = self.tree.first_child_named(copy, "pPr") {
            if let Some(section) = self.tree.first_child_named(props, "sectPr") {
                self.tree.detach(section);
            }
        }

        self.tree.insert_after(anchor, copy)?;
        self.set_paragraph_text(copy, text);
        Ok(copy)
    }

    fn qualified(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }
}
