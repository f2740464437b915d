use crate::draw::capture::Anchor;
use crate::eval::wire::{EvaluationResult, VariableValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(u64);

impl ResultId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Waiting for its stagger delay; not shown.
    Pending,
    Placed,
    UserRepositioned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedResult {
    pub id: ResultId,
    pub expression: String,
    pub answer: VariableValue,
    pub renderable_expression: String,
    pub position: Anchor,
    pub state: OverlayState,
}

impl PlacedResult {
    pub fn is_visible(&self) -> bool {
        self.state != OverlayState::Pending
    }

    /// Input for a TeX typesetter.
    pub fn latex(&self) -> String {
        format!("\\LARGE{{{}}}", self.renderable_expression)
    }
}

/// Messages from the presentation layer. The manager is the only writer of
/// result positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayMessage {
    Reposition { id: ResultId, position: Anchor },
}

#[derive(Debug, Default)]
pub struct OverlayManager {
    results: Vec<PlacedResult>,
    next_id: u64,
}

impl OverlayManager {
    /// Adds a hidden result at `anchor`.
    pub fn stage(&mut self, result: &EvaluationResult, anchor: Anchor) -> ResultId {
        self.next_id += 1;
        let id = ResultId(self.next_id);
        self.results.push(PlacedResult {
            id,
            expression: result.expression.clone(),
            answer: result.answer.clone(),
            renderable_expression: format!("{} = {}", result.expression, result.answer),
            position: anchor,
            state: OverlayState::Pending,
        });
        id
    }

    /// `Pending -> Placed`. Returns `false` for unknown or already shown ids.
    pub fn reveal(&mut self, id: ResultId) -> bool {
        match self.results.iter_mut().find(|r| r.id == id) {
            Some(result) if result.state == OverlayState::Pending => {
                result.state = OverlayState::Placed;
                true
            }
            _ => false,
        }
    }

    pub fn apply(&mut self, message: OverlayMessage) {
        match message {
            OverlayMessage::Reposition { id, position } => {
                let Some(result) = self.results.iter_mut().find(|r| r.id == id) else {
                    return;
                };
                if result.state == OverlayState::Pending {
                    return;
                }
                result.position = position;
                result.state = OverlayState::UserRepositioned;
            }
        }
    }

    pub fn get(&self, id: ResultId) -> Option<&PlacedResult> {
        self.results.iter().find(|r| r.id == id)
    }

    /// Every result, pending ones included, in staging order.
    pub fn all(&self) -> &[PlacedResult] {
        &self.results
    }

    pub fn visible(&self) -> impl Iterator<Item = &PlacedResult> {
        self.results.iter().filter(|r| r.is_visible())
    }

    pub fn pending_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.state == OverlayState::Pending)
            .count()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}
