//! Content-stream interpreter
//!
//! Walks a decoded page content stream and paints path operators into a
//! pixmap through tiny-skia. The interpreter keeps the PDF graphics-state
//! stack (`q`/`Q`/`cm`), accumulates the current path, and applies fills,
//! strokes, and clipping with the active coordinate transform.
//!
//! Scope follows the crate's contract: path construction, painting,
//! clipping, and device color spaces. Text, shading, XObject, and inline
//! image operators are skipped. A known operator with malformed operands
//! fails the render rather than painting partial output.

use lopdf::content::{Content, Operation};
use lopdf::Object;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};
use tracing::trace;

use crate::error::{RasterError, RasterResult};

/// Per-`q` graphics state
#[derive(Clone)]
struct GraphicsState {
    /// Current transformation matrix, user space to device pixels
    ctm: Transform,
    fill_color: Color,
    stroke_color: Color,
    line_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    /// Active clip region in device space; `None` means unclipped
    clip: Option<Mask>,
}

impl GraphicsState {
    fn new(base: Transform) -> Self {
        Self {
            ctm: base,
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            clip: None,
        }
    }
}

/// Interprets one page's content stream into a pixmap
pub(crate) struct ContentInterpreter<'a> {
    pixmap: &'a mut Pixmap,
    page_index: usize,
    states: Vec<GraphicsState>,
    path: PathBuilder,
    /// Set by `W`/`W*`; applied after the next painting operator
    pending_clip: Option<FillRule>,
}

impl<'a> ContentInterpreter<'a> {
    pub(crate) fn new(pixmap: &'a mut Pixmap, base_transform: Transform, page_index: usize) -> Self {
        Self {
            pixmap,
            page_index,
            states: vec![GraphicsState::new(base_transform)],
            path: PathBuilder::new(),
            pending_clip: None,
        }
    }

    /// Decode and paint the content stream
    pub(crate) fn run(&mut self, content: &[u8]) -> RasterResult<()> {
        if content.is_empty() {
            return Ok(());
        }
        let content = Content::decode(content)
            .map_err(|e| self.corrupt(format!("content stream decode failed: {e}")))?;
        trace!(
            page = self.page_index,
            operations = content.operations.len(),
            "interpreting content stream"
        );
        for op in &content.operations {
            self.execute(op)?;
        }
        Ok(())
    }

    fn execute(&mut self, op: &Operation) -> RasterResult<()> {
        match op.operator.as_str() {
            // Graphics state
            "q" => {
                let top = self.state().clone();
                self.states.push(top);
            }
            // Unbalanced Q is tolerated; the initial state is never popped.
            "Q" => {
                if self.states.len() > 1 {
                    self.states.pop();
                }
            }
            "cm" => {
                let [a, b, c, d, e, f] = self.nums(op)?;
                let m = Transform::from_row(a, b, c, d, e, f);
                let state = self.state_mut();
                state.ctm = m.post_concat(state.ctm);
            }
            "w" => {
                let [width] = self.nums(op)?;
                self.state_mut().line_width = width;
            }
            "J" => {
                let [cap] = self.nums(op)?;
                self.state_mut().line_cap = match cap as i32 {
                    1 => LineCap::Round,
                    2 => LineCap::Square,
                    _ => LineCap::Butt,
                };
            }
            "j" => {
                let [join] = self.nums(op)?;
                self.state_mut().line_join = match join as i32 {
                    1 => LineJoin::Round,
                    2 => LineJoin::Bevel,
                    _ => LineJoin::Miter,
                };
            }
            "M" => {
                let [limit] = self.nums(op)?;
                self.state_mut().miter_limit = limit;
            }

            // Path construction
            "m" => {
                let [x, y] = self.nums(op)?;
                self.path.move_to(x, y);
            }
            "l" => {
                let [x, y] = self.nums(op)?;
                self.path.line_to(x, y);
            }
            "c" => {
                let [x1, y1, x2, y2, x3, y3] = self.nums(op)?;
                self.path.cubic_to(x1, y1, x2, y2, x3, y3);
            }
            "v" => {
                let [x2, y2, x3, y3] = self.nums(op)?;
                // First control point coincides with the current point.
                let (cx, cy) = self
                    .path
                    .last_point()
                    .map(|p| (p.x, p.y))
                    .unwrap_or((0.0, 0.0));
                self.path.cubic_to(cx, cy, x2, y2, x3, y3);
            }
            "y" => {
                let [x1, y1, x3, y3] = self.nums(op)?;
                self.path.cubic_to(x1, y1, x3, y3, x3, y3);
            }
            "h" => self.path.close(),
            "re" => {
                let [x, y, w, h] = self.nums(op)?;
                self.path.move_to(x, y);
                self.path.line_to(x + w, y);
                self.path.line_to(x + w, y + h);
                self.path.line_to(x, y + h);
                self.path.close();
            }

            // Painting
            "f" | "F" => self.paint(Some(FillRule::Winding), false, false)?,
            "f*" => self.paint(Some(FillRule::EvenOdd), false, false)?,
            "S" => self.paint(None, true, false)?,
            "s" => self.paint(None, true, true)?,
            "B" => self.paint(Some(FillRule::Winding), true, false)?,
            "B*" => self.paint(Some(FillRule::EvenOdd), true, false)?,
            "b" => self.paint(Some(FillRule::Winding), true, true)?,
            "b*" => self.paint(Some(FillRule::EvenOdd), true, true)?,
            "n" => self.paint(None, false, false)?,

            // Clipping, applied after the next painting operator
            "W" => self.pending_clip = Some(FillRule::Winding),
            "W*" => self.pending_clip = Some(FillRule::EvenOdd),

            // Device color spaces
            "g" => {
                let [v] = self.nums(op)?;
                self.state_mut().fill_color = gray(v);
            }
            "G" => {
                let [v] = self.nums(op)?;
                self.state_mut().stroke_color = gray(v);
            }
            "rg" => {
                let [r, g, b] = self.nums(op)?;
                self.state_mut().fill_color = rgb(r, g, b);
            }
            "RG" => {
                let [r, g, b] = self.nums(op)?;
                self.state_mut().stroke_color = rgb(r, g, b);
            }
            "k" => {
                let [c, m, y, k] = self.nums(op)?;
                self.state_mut().fill_color = cmyk(c, m, y, k);
            }
            "K" => {
                let [c, m, y, k] = self.nums(op)?;
                self.state_mut().stroke_color = cmyk(c, m, y, k);
            }
            "sc" | "scn" => {
                if let Some(color) = component_color(&op.operands) {
                    self.state_mut().fill_color = color;
                }
            }
            "SC" | "SCN" => {
                if let Some(color) = component_color(&op.operands) {
                    self.state_mut().stroke_color = color;
                }
            }

            // Out of scope: color-space selection details, dash patterns,
            // rendering intent, text, shadings, XObjects, inline images,
            // marked content. Well-formed occurrences are skipped.
            _ => {}
        }
        Ok(())
    }

    /// Finish the current path, fill and/or stroke it, then apply any
    /// pending clip. Called for every painting operator including `n`.
    fn paint(&mut self, fill: Option<FillRule>, stroke: bool, close: bool) -> RasterResult<()> {
        if close {
            self.path.close();
        }
        let builder = std::mem::replace(&mut self.path, PathBuilder::new());
        let path = builder.finish();

        if let Some(path) = &path {
            let state = self.states.last().expect("state stack is never empty");
            let ctm = state.ctm;
            let mask = state.clip.as_ref();

            if let Some(rule) = fill {
                let mut paint = Paint::default();
                paint.set_color(state.fill_color);
                paint.anti_alias = true;
                self.pixmap.fill_path(path, &paint, rule, ctm, mask);
            }
            if stroke {
                let mut paint = Paint::default();
                paint.set_color(state.stroke_color);
                paint.anti_alias = true;
                let stroke = Stroke {
                    // Zero-width strokes render as thin hairlines.
                    width: if state.line_width > 0.0 {
                        state.line_width
                    } else {
                        1.0
                    },
                    miter_limit: state.miter_limit,
                    line_cap: state.line_cap,
                    line_join: state.line_join,
                    dash: None,
                };
                self.pixmap.stroke_path(path, &paint, &stroke, ctm, mask);
            }
        }

        if let Some(rule) = self.pending_clip.take() {
            let ctm = self.state().ctm;
            let device_path = path.and_then(|p| p.transform(ctm));
            self.intersect_clip(device_path, rule);
        }
        Ok(())
    }

    /// Intersect the active clip with a device-space path
    ///
    /// A missing path (e.g. `W n` with nothing constructed) clips the whole
    /// canvas away, matching the empty-region semantics of an empty path.
    fn intersect_clip(&mut self, path: Option<Path>, rule: FillRule) {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let state = self.states.last_mut().expect("state stack is never empty");
        match path {
            Some(path) => match state.clip.as_mut() {
                Some(mask) => mask.intersect_path(&path, rule, true, Transform::identity()),
                None => {
                    // A fresh mask is fully transparent; fill in the new
                    // clip region.
                    if let Some(mut mask) = Mask::new(width, height) {
                        mask.fill_path(&path, rule, true, Transform::identity());
                        state.clip = Some(mask);
                    }
                }
            },
            // An empty clip path clips the whole canvas away.
            None => state.clip = Mask::new(width, height),
        }
    }

    fn state(&self) -> &GraphicsState {
        self.states.last().expect("state stack is never empty")
    }

    fn state_mut(&mut self) -> &mut GraphicsState {
        self.states.last_mut().expect("state stack is never empty")
    }

    /// Extract exactly `N` numeric operands or fail the render
    fn nums<const N: usize>(&self, op: &Operation) -> RasterResult<[f32; N]> {
        if op.operands.len() < N {
            return Err(self.corrupt(format!(
                "operator {} expects {} operands, got {}",
                op.operator,
                N,
                op.operands.len()
            )));
        }
        let mut out = [0.0f32; N];
        for (slot, obj) in out.iter_mut().zip(&op.operands) {
            *slot = number(obj).ok_or_else(|| {
                self.corrupt(format!("operator {} has a non-numeric operand", op.operator))
            })?;
        }
        Ok(out)
    }

    fn corrupt(&self, reason: String) -> RasterError {
        RasterError::RenderFailed {
            index: self.page_index,
            reason,
        }
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

fn clamp_unit(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

fn gray(v: f32) -> Color {
    let v = clamp_unit(v);
    Color::from_rgba(v, v, v, 1.0).unwrap_or(Color::BLACK)
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::from_rgba(clamp_unit(r), clamp_unit(g), clamp_unit(b), 1.0).unwrap_or(Color::BLACK)
}

fn cmyk(c: f32, m: f32, y: f32, k: f32) -> Color {
    let k = clamp_unit(k);
    rgb(
        (1.0 - clamp_unit(c)) * (1.0 - k),
        (1.0 - clamp_unit(m)) * (1.0 - k),
        (1.0 - clamp_unit(y)) * (1.0 - k),
    )
}

/// Interpret `sc`/`scn` operands by component count: 1 = gray, 3 = RGB,
/// 4 = CMYK. Pattern operands (a trailing name) are out of scope and the
/// operation is skipped.
fn component_color(operands: &[Object]) -> Option<Color> {
    let values: Option<Vec<f32>> = operands.iter().map(number).collect();
    match values?.as_slice() {
        [v] => Some(gray(*v)),
        [r, g, b] => Some(rgb(*r, *g, *b)),
        [c, m, y, k] => Some(cmyk(*c, *m, *y, *k)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmyk_black() {
        let color = cmyk(0.0, 0.0, 0.0, 1.0);
        assert_eq!(color, Color::BLACK);
    }

    #[test]
    fn test_cmyk_components_clamped() {
        let color = cmyk(-1.0, 2.0, 0.0, 0.0);
        assert_eq!(color.red(), 1.0);
        assert_eq!(color.green(), 0.0);
        assert_eq!(color.blue(), 1.0);
    }

    #[test]
    fn test_component_color_by_arity() {
        let gray_ops = vec![Object::Real(0.5)];
        assert!(component_color(&gray_ops).is_some());

        let rgb_ops = vec![Object::Integer(1), Object::Integer(0), Object::Integer(0)];
        let color = component_color(&rgb_ops).unwrap();
        assert_eq!(color.red(), 1.0);
        assert_eq!(color.green(), 0.0);

        let pattern_ops = vec![Object::Name(b"P1".to_vec())];
        assert!(component_color(&pattern_ops).is_none());
    }

    #[test]
    fn test_malformed_operand_fails_render() {
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        let mut interp = ContentInterpreter::new(&mut pixmap, Transform::identity(), 2);
        let op = Operation::new("re", vec![Object::Integer(1), Object::Integer(2)]);
        let err = interp.execute(&op).unwrap_err();
        assert_eq!(err.kind(), "RenderFailed");
    }

    #[test]
    fn test_unknown_operator_is_skipped() {
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        let mut interp = ContentInterpreter::new(&mut pixmap, Transform::identity(), 0);
        let op = Operation::new("BT", vec![]);
        assert!(interp.execute(&op).is_ok());
    }

    #[test]
    fn test_unbalanced_restore_is_tolerated() {
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        let mut interp = ContentInterpreter::new(&mut pixmap, Transform::identity(), 0);
        assert!(interp.execute(&Operation::new("Q", vec![])).is_ok());
        assert!(interp.execute(&Operation::new("Q", vec![])).is_ok());
        assert_eq!(interp.states.len(), 1);
    }
}
