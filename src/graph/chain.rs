use crate::graph::node::{Stream, Unit};

/*
Processing Order (Chain)
========================

A Chain owns a list of units and computes them in insertion order, once per
cycle. Because every unit reads its inputs from streams that upstream units
have already written, inserting producers before consumers is all the
scheduling there is:

    let mut chain = Chain::new();
    chain.push(splitter);      // writes band streams
    chain.push(low_tap);       // reads band(0)
    chain.push(reverb);        // reads low_tap's output
    chain.process_block();

Topology is fixed once built; there is no reordering or dependency sort.
*/

#[derive(Default)]
pub struct Chain {
    units: Vec<Box<dyn Unit>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit and return its primary output.
    pub fn push<U: Unit + 'static>(&mut self, unit: U) -> Stream {
        let output = unit.output();
        self.units.push(Box::new(unit));
        output
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Compute every unit once, in insertion order.
    pub fn process_block(&mut self) {
        for unit in &mut self.units {
            unit.compute_next_block();
        }
    }

    pub fn reset(&mut self) {
        for unit in &mut self.units {
            unit.reset();
        }
    }
}

impl Unit for Chain {
    fn compute_next_block(&mut self) {
        self.process_block();
    }

    /// Output of the last unit, or an empty stream for an empty chain.
    fn output(&self) -> Stream {
        self.units
            .last()
            .map(|unit| unit.output())
            .unwrap_or_else(|| Stream::new(0))
    }

    fn reset(&mut self) {
        Chain::reset(self);
    }
}
