//! Functor records and the factory registry that rebuilds them.

use std::collections::HashMap;
use std::fmt;

use num_traits::NumCast;
use serde::{Deserialize, Serialize};

use super::kind::{ADD, ANCHOR, LINEAR_DEVIATION, MULTIPLY, NARY_ANCHOR};
use super::{
    to_f64, Add, Anchor, BinaryFunctor, BoxedBinary, BoxedNary, BoxedUnary, LinearDeviation,
    Multiply, NaryAnchor, NaryFunctor, Scalar, UnaryFunctor,
};
use crate::error::{CpsError, Result};
use crate::point::ParametricPoint;

/// Serializable description of one functor.
///
/// `kind` selects the factory, `params` and `children` are interpreted by
/// it. Weight and per-point weights are restored by the registry itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctorRecord {
    pub kind: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub point_weights: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FunctorRecord>,
}

impl FunctorRecord {
    /// Records a unary functor.
    pub fn of_unary<P, F>(functor: &F) -> Self
    where
        P: ParametricPoint,
        F: UnaryFunctor<P> + ?Sized,
    {
        Self {
            kind: functor.kind().name().to_string(),
            weight: to_f64(functor.weight()),
            params: functor.params(),
            point_weights: Vec::new(),
            children: functor.children(),
        }
    }

    /// Records a binary functor.
    pub fn of_binary<P, F>(functor: &F) -> Self
    where
        P: ParametricPoint,
        F: BinaryFunctor<P> + ?Sized,
    {
        Self {
            kind: functor.kind().name().to_string(),
            weight: to_f64(functor.weight()),
            params: functor.params(),
            point_weights: Vec::new(),
            children: functor.children(),
        }
    }

    /// Records an n-ary functor, including its per-point weights.
    pub fn of_nary<P, F>(functor: &F) -> Self
    where
        P: ParametricPoint,
        F: NaryFunctor<P> + ?Sized,
    {
        Self {
            kind: functor.kind().name().to_string(),
            weight: to_f64(functor.weight()),
            params: functor.params(),
            point_weights: functor.point_weights().iter().map(|&w| to_f64(w)).collect(),
            children: functor.children(),
        }
    }

    /// Returns child `index`, or `Invalid` if the record has too few.
    pub fn child(&self, index: usize) -> Result<&FunctorRecord> {
        self.children.get(index).ok_or_else(|| {
            CpsError::Invalid(format!(
                "functor '{}' expects child #{index}, found {}",
                self.kind,
                self.children.len()
            ))
        })
    }
}

/// Converts an `f64` parameter into a point scalar.
pub fn scalar_from_f64<S: NumCast>(value: f64) -> Result<S> {
    num_traits::cast(value)
        .ok_or_else(|| CpsError::Invalid(format!("{value} is not representable as a scalar")))
}

/// Builds a point from `f64` coordinates.
pub fn point_from_f64<P: ParametricPoint>(coordinates: &[f64]) -> Result<P> {
    let scalars = coordinates
        .iter()
        .map(|&c| scalar_from_f64::<Scalar<P>>(c))
        .collect::<Result<Vec<_>>>()?;
    P::from_coordinates(&scalars).ok_or_else(|| {
        CpsError::Invalid(format!(
            "{} coordinates do not form a point",
            coordinates.len()
        ))
    })
}

type UnaryFactory<P> =
    Box<dyn Fn(&FunctorRecord, &FunctorRegistry<P>) -> Result<BoxedUnary<P>> + Send + Sync>;
type BinaryFactory<P> =
    Box<dyn Fn(&FunctorRecord, &FunctorRegistry<P>) -> Result<BoxedBinary<P>> + Send + Sync>;
type NaryFactory<P> =
    Box<dyn Fn(&FunctorRecord, &FunctorRegistry<P>) -> Result<BoxedNary<P>> + Send + Sync>;

/// Factories keyed by [`FunctorKind`](super::FunctorKind) name, per arity.
///
/// Domain libraries register their concrete functors here; the registry
/// is then used to rebuild a space from a snapshot.
pub struct FunctorRegistry<P: ParametricPoint> {
    unary: HashMap<&'static str, UnaryFactory<P>>,
    binary: HashMap<&'static str, BinaryFactory<P>>,
    nary: HashMap<&'static str, NaryFactory<P>>,
}

impl<P: ParametricPoint> fmt::Debug for FunctorRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut unary: Vec<_> = self.unary.keys().collect();
        let mut binary: Vec<_> = self.binary.keys().collect();
        let mut nary: Vec<_> = self.nary.keys().collect();
        unary.sort();
        binary.sort();
        nary.sort();
        f.debug_struct("FunctorRegistry")
            .field("unary", &unary)
            .field("binary", &binary)
            .field("nary", &nary)
            .finish()
    }
}

impl<P: ParametricPoint> Default for FunctorRegistry<P> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl<P: ParametricPoint> FunctorRegistry<P> {
    /// Creates a registry with no factories at all.
    pub fn empty() -> Self {
        Self {
            unary: HashMap::new(),
            binary: HashMap::new(),
            nary: HashMap::new(),
        }
    }

    /// Creates a registry knowing the combinators and delegating functors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register_unary(ADD.name(), |r, reg| {
            let lhs = reg.build_unary(r.child(0)?)?;
            let rhs = reg.build_unary(r.child(1)?)?;
            Ok(Box::new(Add::<_, _, Scalar<P>>::new(lhs, rhs)))
        });
        registry.register_unary(MULTIPLY.name(), |r, reg| {
            let lhs = reg.build_unary(r.child(0)?)?;
            let rhs = reg.build_unary(r.child(1)?)?;
            Ok(Box::new(Multiply::<_, _, Scalar<P>>::new(lhs, rhs)))
        });
        registry.register_unary(ANCHOR.name(), |r, reg| {
            let inner = reg.build_binary(r.child(0)?)?;
            Ok(Box::new(Anchor::new(inner, point_from_f64::<P>(&r.params)?)))
        });
        registry.register_unary(LINEAR_DEVIATION.name(), |r, reg| {
            if r.params.len() % 2 != 0 {
                return Err(CpsError::Invalid(format!(
                    "linear_deviation expects an even parameter count, found {}",
                    r.params.len()
                )));
            }
            let (start, end) = r.params.split_at(r.params.len() / 2);
            let inner = reg.build_binary(r.child(0)?)?;
            Ok(Box::new(LinearDeviation::new(
                inner,
                point_from_f64::<P>(start)?,
                point_from_f64::<P>(end)?,
            )))
        });

        registry.register_binary(ADD.name(), |r, reg| {
            let lhs = reg.build_binary(r.child(0)?)?;
            let rhs = reg.build_binary(r.child(1)?)?;
            Ok(Box::new(Add::<_, _, Scalar<P>>::new(lhs, rhs)))
        });
        registry.register_binary(MULTIPLY.name(), |r, reg| {
            let lhs = reg.build_binary(r.child(0)?)?;
            let rhs = reg.build_binary(r.child(1)?)?;
            Ok(Box::new(Multiply::<_, _, Scalar<P>>::new(lhs, rhs)))
        });

        registry.register_nary(ADD.name(), |r, reg| {
            let lhs = reg.build_nary(r.child(0)?)?;
            let rhs = reg.build_nary(r.child(1)?)?;
            Ok(Box::new(Add::<_, _, Scalar<P>>::new(lhs, rhs)))
        });
        registry.register_nary(MULTIPLY.name(), |r, reg| {
            let lhs = reg.build_nary(r.child(0)?)?;
            let rhs = reg.build_nary(r.child(1)?)?;
            Ok(Box::new(Multiply::<_, _, Scalar<P>>::new(lhs, rhs)))
        });
        registry.register_nary(NARY_ANCHOR.name(), |r, reg| {
            let inner = reg.build_binary(r.child(0)?)?;
            Ok(Box::new(NaryAnchor::new(inner, point_from_f64::<P>(&r.params)?)))
        });

        registry
    }

    /// Registers (or replaces) the factory of a unary kind.
    pub fn register_unary<F>(&mut self, kind: &'static str, factory: F)
    where
        F: Fn(&FunctorRecord, &FunctorRegistry<P>) -> Result<BoxedUnary<P>> + Send + Sync + 'static,
    {
        self.unary.insert(kind, Box::new(factory));
    }

    /// Registers (or replaces) the factory of a binary kind.
    pub fn register_binary<F>(&mut self, kind: &'static str, factory: F)
    where
        F: Fn(&FunctorRecord, &FunctorRegistry<P>) -> Result<BoxedBinary<P>>
            + Send
            + Sync
            + 'static,
    {
        self.binary.insert(kind, Box::new(factory));
    }

    /// Registers (or replaces) the factory of an n-ary kind.
    pub fn register_nary<F>(&mut self, kind: &'static str, factory: F)
    where
        F: Fn(&FunctorRecord, &FunctorRegistry<P>) -> Result<BoxedNary<P>> + Send + Sync + 'static,
    {
        self.nary.insert(kind, Box::new(factory));
    }

    fn unknown(arity: &str, record: &FunctorRecord) -> CpsError {
        CpsError::NotFound(format!("no {arity} functor factory for '{}'", record.kind))
    }

    /// Rebuilds a unary functor, restoring its weight.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unregistered kind, `Invalid` for malformed records.
    pub fn build_unary(&self, record: &FunctorRecord) -> Result<BoxedUnary<P>> {
        let factory = self
            .unary
            .get(record.kind.as_str())
            .ok_or_else(|| Self::unknown("unary", record))?;
        let mut functor = factory(record, self)?;
        functor.set_weight(scalar_from_f64(record.weight)?);
        Ok(functor)
    }

    /// Rebuilds a binary functor, restoring its weight.
    pub fn build_binary(&self, record: &FunctorRecord) -> Result<BoxedBinary<P>> {
        let factory = self
            .binary
            .get(record.kind.as_str())
            .ok_or_else(|| Self::unknown("binary", record))?;
        let mut functor = factory(record, self)?;
        functor.set_weight(scalar_from_f64(record.weight)?);
        Ok(functor)
    }

    /// Rebuilds an n-ary functor, restoring its weight and per-point weights.
    pub fn build_nary(&self, record: &FunctorRecord) -> Result<BoxedNary<P>> {
        let factory = self
            .nary
            .get(record.kind.as_str())
            .ok_or_else(|| Self::unknown("nary", record))?;
        let mut functor = factory(record, self)?;
        functor.set_weight(scalar_from_f64(record.weight)?);
        if !record.point_weights.is_empty() {
            let weights = record
                .point_weights
                .iter()
                .map(|&w| scalar_from_f64(w))
                .collect::<Result<Vec<_>>>()?;
            functor.set_point_weights(weights);
        }
        Ok(functor)
    }
}
