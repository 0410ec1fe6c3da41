//! Step numbering for dynamic views.
//!
//! Top-level steps are numbered `1`, `2`, ... A parallel block takes the next slot at its
//! level as a prefix and numbers its steps `<prefix>.1`, `<prefix>.2`, ...; nested blocks
//! repeat this one level deeper. Each root block that ends bumps `ended_parallel_flows`,
//! and later top-level steps are offset by it so they never collide with a block's prefix.

use crate::error::{Error, Result};
use crate::ordering::OrderToken;
use crate::view::RelationshipView;

#[derive(Debug)]
struct ParallelFrame {
    prefix: OrderToken,
    issued: u32,
}

#[derive(Debug, Default)]
pub struct DynamicSequence {
    steps: Vec<RelationshipView>,
    top_level_steps: u32,
    ended_parallel_flows: u32,
    frames: Vec<ParallelFrame>,
}

impl DynamicSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, relationship: impl Into<String>) -> &mut RelationshipView {
        let order = self.next_order();
        self.steps
            .push(RelationshipView::new(relationship).with_order(order.to_string()));
        let idx = self.steps.len() - 1;
        &mut self.steps[idx]
    }

    pub fn add_with_description(
        &mut self,
        relationship: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut RelationshipView {
        let step = self.add(relationship);
        step.description = Some(description.into());
        step
    }

    /// Adds a step rendered from the destination back to the source.
    pub fn add_response(&mut self, relationship: impl Into<String>) -> &mut RelationshipView {
        let step = self.add(relationship);
        step.response = true;
        step
    }

    pub fn start_parallel(&mut self) {
        let prefix = match self.frames.last_mut() {
            Some(frame) => {
                frame.issued += 1;
                frame.prefix.child(frame.issued)
            }
            None => OrderToken::top_level(self.top_level_steps + self.ended_parallel_flows + 1),
        };
        self.frames.push(ParallelFrame { prefix, issued: 0 });
    }

    pub fn end_parallel(&mut self) -> Result<()> {
        self.frames.pop().ok_or(Error::NoParallelSequence)?;
        if self.frames.is_empty() {
            self.ended_parallel_flows += 1;
        }
        Ok(())
    }

    /// Runs `steps` inside a parallel block.
    ///
    /// Blocks `steps` leaves open are closed with it; frames outside the block are never
    /// touched.
    pub fn parallel(&mut self, steps: impl FnOnce(&mut Self)) {
        let outer = self.frames.len();
        self.start_parallel();
        steps(self);
        if self.frames.len() <= outer {
            tracing::warn!("parallel block was closed inside its own body");
        }
        while self.frames.len() > outer {
            if self.end_parallel().is_err() {
                break;
            }
        }
    }

    pub fn ended_parallel_flows(&self) -> u32 {
        self.ended_parallel_flows
    }

    pub fn steps(&self) -> &[RelationshipView] {
        &self.steps
    }

    pub fn finish(self) -> Vec<RelationshipView> {
        if !self.frames.is_empty() {
            tracing::warn!(
                open = self.frames.len(),
                "dynamic sequence finished with open parallel blocks"
            );
        }
        self.steps
    }

    fn next_order(&mut self) -> OrderToken {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.issued += 1;
                frame.prefix.child(frame.issued)
            }
            None => {
                self.top_level_steps += 1;
                OrderToken::top_level(self.top_level_steps + self.ended_parallel_flows)
            }
        }
    }
}
