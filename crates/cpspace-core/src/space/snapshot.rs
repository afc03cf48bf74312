//! Serializable snapshots of a whole space.
//!
//! A snapshot records content, not derived state: captured baselines and
//! buddy links are recomputed after reload by
//! `init_constraints_internals` and `link_buddy_constraints`.

use serde::{Deserialize, Serialize};

use super::{
    ConstrainedParameterSpace, ConstraintParams, GlobalConstraintParams, PairingParams, PointParams,
};
use crate::error::Result;
use crate::functor::{point_from_f64, scalar_from_f64, to_f64, FunctorRecord, FunctorRegistry};
use crate::id::{ConstraintId, LayerId, PairingId, PointId};
use crate::point::ParametricPoint;

/// One point: layer, value and owned unary functors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub layer: LayerId,
    pub coordinates: Vec<f64>,
    pub importance: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unary: Vec<FunctorRecord>,
}

/// One constraint: endpoints in declaration order and binary functors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub endpoints: [PointId; 2],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functors: Vec<FunctorRecord>,
}

/// One global constraint, always bound to a concrete layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConstraintRecord {
    pub layer: LayerId,
    pub functor: FunctorRecord,
}

/// Content of a [`ConstrainedParameterSpace`], in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpsSnapshot {
    pub layers_count: usize,
    pub points: Vec<PointRecord>,
    pub pairings: Vec<[PointId; 2]>,
    pub constraints: Vec<ConstraintRecord>,
    pub globals: Vec<GlobalConstraintRecord>,
}

/// Splits `items` into maximal runs sharing the same key.
fn runs<T, K: PartialEq>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<(K, Vec<T>)> {
    let mut out: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let k = key(&item);
        match out.last_mut() {
            Some((last, run)) if *last == k => run.push(item),
            _ => out.push((k, vec![item])),
        }
    }
    out
}

impl<P: ParametricPoint> ConstrainedParameterSpace<P> {
    /// Records the whole content of the space.
    pub fn snapshot(&self) -> CpsSnapshot {
        let values = self.lock_values();
        let points = self
            .points
            .iter()
            .zip(values.iter())
            .map(|(content, value)| PointRecord {
                layer: content.layer,
                coordinates: value.coordinates().iter().map(|&c| to_f64(c)).collect(),
                importance: to_f64(value.importance()),
                unary: content
                    .unary
                    .iter()
                    .map(|f| FunctorRecord::of_unary::<P, _>(f.functor()))
                    .collect(),
            })
            .collect();
        drop(values);

        let pairings = (0..self.pairings.len())
            .map(|i| {
                let (a, b) = self.pairing_endpoints(PairingId::new(i));
                [a, b]
            })
            .collect();

        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let (a, b) = self.constraint_endpoints(ConstraintId::new(i));
                ConstraintRecord {
                    endpoints: [a, b],
                    functors: content
                        .functors
                        .iter()
                        .map(|f| FunctorRecord::of_binary::<P, _>(f.functor()))
                        .collect(),
                }
            })
            .collect();

        let globals = self
            .globals
            .iter()
            .map(|content| GlobalConstraintRecord {
                layer: content.layer,
                functor: FunctorRecord::of_nary::<P, _>(content.functor.functor()),
            })
            .collect();

        CpsSnapshot {
            layers_count: self.layers.len(),
            points,
            pairings,
            constraints,
            globals,
        }
    }

    /// Rebuilds a space by replaying the `add_*` operations in id order,
    /// so every id matches the recorded one.
    ///
    /// # Errors
    ///
    /// `NotFound` for a functor kind the registry does not know, `Invalid`
    /// for malformed records, and any error the replayed operation reports.
    pub fn from_snapshot(snapshot: CpsSnapshot, registry: &FunctorRegistry<P>) -> Result<Self> {
        let mut cps = Self::new(snapshot.layers_count);

        for (layer, records) in runs(snapshot.points, |r| r.layer) {
            let params = records
                .into_iter()
                .map(|record| {
                    let mut value = point_from_f64::<P>(&record.coordinates)?;
                    value.set_importance(scalar_from_f64(record.importance)?);
                    let unary = record
                        .unary
                        .iter()
                        .map(|r| registry.build_unary(r))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(PointParams { value, unary })
                })
                .collect::<Result<Vec<_>>>()?;
            cps.add_parametric_points(layer, params)?;
        }

        if !snapshot.pairings.is_empty() {
            let params: Vec<_> = snapshot
                .pairings
                .iter()
                .map(|&[a, b]| PairingParams::new(a, b))
                .collect();
            cps.add_pairings(&params)?;
        }

        if !snapshot.constraints.is_empty() {
            let params = snapshot
                .constraints
                .iter()
                .map(|record| {
                    let [a, b] = record.endpoints;
                    let functors = record
                        .functors
                        .iter()
                        .map(|r| registry.build_binary(r))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(ConstraintParams { a, b, functors })
                })
                .collect::<Result<Vec<_>>>()?;
            cps.add_constraints(params)?;
        }

        for (layer, records) in runs(snapshot.globals, |r| r.layer) {
            let params = records
                .iter()
                .map(|r| registry.build_nary(&r.functor).map(GlobalConstraintParams::boxed))
                .collect::<Result<Vec<_>>>()?;
            cps.add_global_constraints(layer, params)?;
        }

        Ok(cps)
    }
}
