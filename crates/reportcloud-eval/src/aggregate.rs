//! Scoped aggregates
//!
//! Evaluation order for every aggregate:
//!
//! 1. resolve the scope against the current row
//! 2. return the value cached under the occurrence's key, if any
//! 3. otherwise reduce the inner expression over the resolved rows
//! 4. store the result when the scope is cacheable
//!
//! A scope that does not resolve yields the "no data" value and is never
//! cached.

use crate::cache::CacheSlot;
use crate::engine::ExprEngine;
use crate::error::{EvalError, EvalResult};
use crate::instance::ExecutionInstance;
use crate::scope::RowId;
use reportcloud_expr::{AggregateFunc, CacheKey, ExprId, ScopeDescriptor};
use reportcloud_types::Value;
use std::cmp::Ordering;

/// Result of an aggregate with no contributing rows
fn no_data(func: AggregateFunc) -> Value {
    match func {
        AggregateFunc::Max => Value::Null,
        AggregateFunc::Stdevp => Value::Float64(f64::NAN),
    }
}

impl ExprEngine {
    pub(crate) fn eval_aggregate(
        &self,
        func: AggregateFunc,
        inner: ExprId,
        scope: &ScopeDescriptor,
        key: CacheKey,
        instance: &mut ExecutionInstance,
        row: Option<RowId>,
    ) -> EvalResult<Value> {
        instance.bind_tree(self.tree().id())?;
        let Some(resolved) = instance.data().resolve_scope(scope, row) else {
            log::trace!("{} {}: scope {} did not resolve", func.name(), key, scope);
            return Ok(no_data(func));
        };

        let slot = CacheSlot::Aggregate(key);
        let caching = self.options().cache_aggregates;
        if caching {
            if let Some(cached) = instance.cache_mut().get(&slot) {
                log::trace!("{} {}: cache hit", func.name(), key);
                return Ok(cached.clone());
            }
        }

        let value = match func {
            AggregateFunc::Max => self.max_over(inner, &resolved.rows, instance)?,
            AggregateFunc::Stdevp => self.stdevp_over(inner, &resolved.rows, instance)?,
        };

        if caching && resolved.cacheable {
            log::trace!("{} {}: cached over {} rows", func.name(), key, resolved.rows.len());
            instance.cache_mut().insert(slot, value.clone());
        }
        Ok(value)
    }

    /// Running maximum by native ordering. Absent values are skipped; no
    /// contributing rows gives null.
    fn max_over(&self, inner: ExprId, rows: &[RowId], instance: &mut ExecutionInstance) -> EvalResult<Value> {
        let mut max: Option<Value> = None;

        for row in rows {
            let item = self.eval_native(inner, instance, Some(*row))?;
            if item.is_absent() {
                continue;
            }

            max = Some(match max {
                None => item,
                Some(current) => match current.compare(&item) {
                    Some(Ordering::Less) => item,
                    Some(_) => current,
                    None => {
                        return Err(EvalError::NotComparable {
                            lhs: current.kind().map_or("Null", |k| k.name()).to_string(),
                            rhs: item.kind().map_or("Null", |k| k.name()).to_string(),
                        });
                    }
                },
            });
        }

        Ok(max.unwrap_or(Value::Null))
    }

    /// Population standard deviation, `sqrt((n·Σx² − (Σx)²) / n²)`, in
    /// Float64. Rows whose value is absent or not numeric are skipped; no
    /// contributing rows gives NaN.
    fn stdevp_over(&self, inner: ExprId, rows: &[RowId], instance: &mut ExecutionInstance) -> EvalResult<Value> {
        let mut sum = 0.0_f64;
        let mut sum2 = 0.0_f64;
        let mut count = 0_u64;

        for row in rows {
            let item = self.eval_native(inner, instance, Some(*row))?;
            let x = match item.to_float64() {
                Ok(x) if !x.is_nan() => x,
                Ok(_) | Err(_) => continue,
            };
            sum += x;
            sum2 += x * x;
            count += 1;
        }

        if count == 0 {
            return Ok(Value::Float64(f64::NAN));
        }
        let n = count as f64;
        // Rounding can push the numerator slightly below zero
        let variance = ((n * sum2 - sum * sum) / (n * n)).max(0.0);
        Ok(Value::Float64(variance.sqrt()))
    }
}
