//! # cohort
//!
//! Synthetic social-graph wiring: generate undirected acquaintance
//! ("knows") edges over a population so that each person approximates a
//! prescribed degree while the graph's mean clustering coefficient
//! approximates a configured target.
//!
//! The population array is expected to be pre-sorted by similarity, so that
//! nearby persons are plausible acquaintances; the generator carves it into
//! contiguous communities and wires them with tunable density.
//!
//! ```
//! use cohort::{ClusteredKnows, Person, Population};
//!
//! let persons = (0..8).map(|i| Person::new(i, 4)).collect();
//! let mut population = Population::new(persons);
//!
//! let generator = ClusteredKnows::new()
//!     .with_target_clustering(0.3)
//!     .with_max_iterations(10);
//! let report = generator.generate(&mut population, 42, &[1.0], 0)?;
//!
//! assert!(report.iterations >= 1);
//! assert!(population.iter().all(|p| p.degree() as u64 <= p.max_knows()));
//! # Ok::<(), cohort::Error>(())
//! ```

pub mod error;
pub mod generator;
pub mod metrics;
pub mod population;

pub use error::{Error, Result};
pub use generator::{ClusteredKnows, GenerationReport, KnowsGenerator, WiringStats};
pub use population::{Person, Population};
