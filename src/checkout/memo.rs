//! Pricing Memo

use smallvec::SmallVec;

use crate::{
    items::LineItem,
    pricing::{PricingEngine, PricingResult},
    products::ProductId,
};

/// Everything a pricing result depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PricingKey {
    lines: SmallVec<[(ProductId, i64, u32); 8]>,
    promo_eligible: bool,
    promo_applied: bool,
}

impl PricingKey {
    fn new(items: &[LineItem<'_>], promo_eligible: bool, promo_applied: bool) -> Self {
        Self {
            lines: items
                .iter()
                .map(|item| (item.id(), item.unit_price().to_minor_units(), item.quantity()))
                .collect(),
            promo_eligible,
            promo_applied,
        }
    }
}

/// Keeps the last pricing result and recomputes only when its inputs change.
#[derive(Debug)]
pub struct PricingMemo<'a> {
    engine: PricingEngine,
    cached: Option<(PricingKey, PricingResult<'a>)>,
    computations: usize,
}

impl<'a> PricingMemo<'a> {
    /// Create an empty memo around an engine.
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            engine,
            cached: None,
            computations: 0,
        }
    }

    /// Return the engine
    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Price the cart, reusing the previous result when nothing changed.
    pub fn get(
        &mut self,
        items: &[LineItem<'a>],
        promo_eligible: bool,
        promo_applied: bool,
    ) -> &PricingResult<'a> {
        let key = PricingKey::new(items, promo_eligible, promo_applied);

        if self
            .cached
            .as_ref()
            .is_some_and(|(cached_key, _)| *cached_key != key)
        {
            self.cached = None;
        }

        let engine = &self.engine;
        let computations = &mut self.computations;

        let (_, result) = self.cached.get_or_insert_with(|| {
            *computations += 1;

            (key, engine.compute(items, promo_eligible, promo_applied))
        });

        result
    }

    /// Drop the cached result.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of times the engine actually ran.
    pub fn computations(&self) -> usize {
        self.computations
    }
}
