//! The person collaborators a generator wires together.
//!
//! Persons are referenced by their stable position in the population array;
//! the "knows" relation is a per-person sorted set of neighbor indices.
//! [`Population::create_edge`] is the only mutation path into those sets,
//! so every realized edge is symmetric and capacity-checked by construction.

use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::BTreeSet;

/// A member of the population, identified by an external account id and
/// bounded by a lifetime knows capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    account_id: u64,
    max_knows: u64,
    knows: BTreeSet<usize>,
}

impl Person {
    /// Create a person with an empty knows-set.
    pub fn new(account_id: u64, max_knows: u64) -> Self {
        Self {
            account_id,
            max_knows,
            knows: BTreeSet::new(),
        }
    }

    /// External account identifier.
    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    /// Lifetime cap on the size of the knows-set.
    pub fn max_knows(&self) -> u64 {
        self.max_knows
    }

    /// Number of realized edges.
    pub fn degree(&self) -> usize {
        self.knows.len()
    }

    /// Neighbor indices, in ascending order.
    pub fn knows(&self) -> &BTreeSet<usize> {
        &self.knows
    }

    /// The prescribed degree for one generation step: the step's share of
    /// this person's total capacity, rounded up.
    pub fn target_edges(&self, percentages: &[f64], step_index: usize) -> u64 {
        (self.max_knows as f64 * percentages[step_index]).ceil() as u64
    }
}

/// An indexed collection of persons and their knows-sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    persons: Vec<Person>,
}

impl Population {
    /// Wrap a person array. Index order is significant: generators treat
    /// adjacency in this array as the similarity order.
    pub fn new(persons: Vec<Person>) -> Self {
        Self { persons }
    }

    /// Number of persons.
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    /// Whether the population holds no persons.
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// The person at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn person(&self, index: usize) -> &Person {
        &self.persons[index]
    }

    /// Iterate persons in array order.
    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.persons.iter()
    }

    /// Attempt to insert an undirected edge between persons `a` and `b`.
    ///
    /// Returns `false` without mutating anything when the pair is rejected:
    /// self-pairs, already-connected pairs, and pairs where either endpoint
    /// has exhausted its knows capacity.
    pub fn create_edge(&mut self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        if self.persons[a].knows.contains(&b) {
            return false;
        }
        if self.persons[a].knows.len() as u64 >= self.persons[a].max_knows
            || self.persons[b].knows.len() as u64 >= self.persons[b].max_knows
        {
            return false;
        }
        self.persons[a].knows.insert(b);
        self.persons[b].knows.insert(a);
        true
    }

    /// Clear every person's knows-set.
    pub fn clear_knows(&mut self) {
        for person in &mut self.persons {
            person.knows.clear();
        }
    }

    /// Snapshot the realized knows graph. Node order matches array order;
    /// node weights carry account ids.
    pub fn to_graph(&self) -> UnGraph<u64, ()> {
        let mut graph = UnGraph::with_capacity(self.persons.len(), 0);
        for person in &self.persons {
            let _ = graph.add_node(person.account_id);
        }
        for (i, person) in self.persons.iter().enumerate() {
            for &j in &person.knows {
                if i < j {
                    let _ = graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
                }
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_edge_is_symmetric() {
        let mut population = Population::new(vec![Person::new(10, 5), Person::new(11, 5)]);

        assert!(population.create_edge(0, 1));
        assert!(population.person(0).knows().contains(&1));
        assert!(population.person(1).knows().contains(&0));
    }

    #[test]
    fn test_create_edge_rejects_duplicates_and_self_pairs() {
        let mut population = Population::new(vec![Person::new(10, 5), Person::new(11, 5)]);

        assert!(!population.create_edge(0, 0));
        assert!(population.create_edge(0, 1));
        assert!(!population.create_edge(0, 1));
        assert!(!population.create_edge(1, 0));
        assert_eq!(population.person(0).degree(), 1);
    }

    #[test]
    fn test_create_edge_respects_capacity() {
        let mut population = Population::new(vec![
            Person::new(10, 1),
            Person::new(11, 5),
            Person::new(12, 5),
        ]);

        assert!(population.create_edge(0, 1));
        // Person 0 is full.
        assert!(!population.create_edge(0, 2));
        assert!(!population.create_edge(2, 0));
        assert_eq!(population.person(0).degree(), 1);
        assert_eq!(population.person(2).degree(), 0);
    }

    #[test]
    fn test_clear_knows_resets_every_person() {
        let mut population = Population::new(vec![
            Person::new(10, 5),
            Person::new(11, 5),
            Person::new(12, 5),
        ]);
        assert!(population.create_edge(0, 1));
        assert!(population.create_edge(1, 2));

        population.clear_knows();
        assert!(population.iter().all(|p| p.degree() == 0));
    }

    #[test]
    fn test_target_edges_rounds_up() {
        let person = Person::new(0, 10);
        assert_eq!(person.target_edges(&[0.45], 0), 5);
        assert_eq!(person.target_edges(&[1.0], 0), 10);
        assert_eq!(person.target_edges(&[0.0], 0), 0);
    }

    #[test]
    fn test_to_graph_round_trips_edges() {
        let mut population = Population::new(vec![
            Person::new(10, 5),
            Person::new(11, 5),
            Person::new(12, 5),
        ]);
        assert!(population.create_edge(0, 1));
        assert!(population.create_edge(1, 2));

        let graph = population.to_graph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let degree_sum: usize = population.iter().map(|p| p.degree()).sum();
        assert_eq!(graph.edge_count() * 2, degree_sum);
    }
}
