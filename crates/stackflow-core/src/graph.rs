//! Dependency graph over stack specifications.
//!
//! The graph is an explicit adjacency structure with a memoized topological
//! order, computed once at build time with Kahn's algorithm. Ties between
//! independent units are broken by declaration order so that every walk is
//! deterministic and the logs reproducible. Apply walks the order forward;
//! destroy walks the exact reverse.

use crate::error::{CoreError, Result};
use crate::model::StackSpec;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Specs in declaration order.
    specs: Vec<StackSpec>,

    /// Unit name -> position in `specs`.
    index: HashMap<String, usize>,

    /// `dependencies[i]` = indices that must complete before `specs[i]`.
    dependencies: Vec<Vec<usize>>,

    /// `dependents[i]` = indices waiting on `specs[i]`.
    dependents: Vec<Vec<usize>>,

    /// Memoized topological order (apply order).
    order: Vec<usize>,
}

impl DependencyGraph {
    /// Build and validate the graph.
    ///
    /// Fails fast on a dependency cycle, an edge to an undeclared unit, or
    /// an output reference to a unit that is not a (transitive) ancestor.
    /// All of that is caught here, before any provisioning call is made.
    pub fn build(specs: Vec<StackSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            index.insert(spec.unit.clone(), i);
        }

        let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); specs.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); specs.len()];
        for (i, spec) in specs.iter().enumerate() {
            for dep in &spec.depends_on {
                let Some(&j) = index.get(dep) else {
                    return Err(CoreError::UnknownDependency {
                        stack: spec.unit.clone(),
                        dependency: dep.clone(),
                    });
                };
                dependencies[i].push(j);
                dependents[j].push(i);
            }
        }

        let order = topological_order(&specs, &dependencies, &dependents)?;

        let graph = Self {
            specs,
            index,
            dependencies,
            dependents,
            order,
        };
        graph.validate_references()?;

        tracing::debug!(
            order = %graph
                .order
                .iter()
                .map(|&i| graph.specs[i].unit.as_str())
                .collect::<Vec<_>>()
                .join(" -> "),
            "computed apply order"
        );
        Ok(graph)
    }

    /// Every `FromOutput` parameter must point at a transitive ancestor:
    /// anything else could never have its outputs cached by the time the
    /// referencing node is applied.
    fn validate_references(&self) -> Result<()> {
        for (i, spec) in self.specs.iter().enumerate() {
            let ancestors = self.ancestors(i);
            for unit in spec.referenced_units() {
                let Some(&j) = self.index.get(unit) else {
                    return Err(CoreError::UnknownDependency {
                        stack: spec.unit.clone(),
                        dependency: unit.to_string(),
                    });
                };
                if !ancestors.contains(&j) {
                    let key = spec
                        .parameters
                        .iter()
                        .find_map(|p| match &p.value {
                            crate::model::ParameterValue::FromOutput { unit: u, key }
                                if u == unit =>
                            {
                                Some(key.clone())
                            }
                            _ => None,
                        })
                        .unwrap_or_default();
                    return Err(CoreError::InvalidReference {
                        stack: spec.unit.clone(),
                        source: unit.to_string(),
                        key,
                    });
                }
            }
        }
        Ok(())
    }

    /// Transitive closure of dependencies for `specs[i]`.
    fn ancestors(&self, i: usize) -> HashSet<usize> {
        let mut seen = HashSet::new();
        let mut stack: Vec<usize> = self.dependencies[i].clone();
        while let Some(j) = stack.pop() {
            if seen.insert(j) {
                stack.extend(&self.dependencies[j]);
            }
        }
        seen
    }

    /// Stacks in apply order: every dependency strictly precedes its
    /// dependents.
    pub fn apply_order(&self) -> impl Iterator<Item = &StackSpec> {
        self.order.iter().map(|&i| &self.specs[i])
    }

    /// Stacks in destroy order: the exact reverse of [`Self::apply_order`].
    pub fn destroy_order(&self) -> impl Iterator<Item = &StackSpec> {
        self.order.iter().rev().map(|&i| &self.specs[i])
    }

    pub fn get(&self, unit: &str) -> Option<&StackSpec> {
        self.index.get(unit).map(|&i| &self.specs[i])
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Units that directly depend on `unit`.
    pub fn dependents_of(&self, unit: &str) -> Vec<&str> {
        self.index
            .get(unit)
            .map(|&i| {
                self.dependents[i]
                    .iter()
                    .map(|&j| self.specs[j].unit.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Kahn's algorithm with a min-heap on declaration index, so independent
/// units come out in declaration order.
fn topological_order(
    specs: &[StackSpec],
    dependencies: &[Vec<usize>],
    dependents: &[Vec<usize>],
) -> Result<Vec<usize>> {
    let mut indegree: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(specs.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for &j in &dependents[i] {
            indegree[j] -= 1;
            if indegree[j] == 0 {
                ready.push(Reverse(j));
            }
        }
    }

    if order.len() != specs.len() {
        let in_order: HashSet<usize> = order.iter().copied().collect();
        let remaining: Vec<&str> = specs
            .iter()
            .enumerate()
            .filter(|(i, _)| !in_order.contains(i))
            .map(|(_, s)| s.unit.as_str())
            .collect();
        return Err(CoreError::DependencyCycle(remaining.join(", ")));
    }
    Ok(order)
}
