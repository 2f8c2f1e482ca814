//! Namespace-seeded answer derivation.
//!
//! The seed is the sum of the namespace's Unicode scalar values. One
//! `ChaCha12Rng` is seeded from it per derivation and drawn from in a fixed
//! order: replicas, CPU request, memory request, then the question shuffle.
//! The generator is named rather than `StdRng`, whose stream may change
//! between `rand` releases.
//! Namespaces with equal character sums (anagrams, for instance) therefore
//! share answers and question order.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::Serialize;
use thiserror::Error;

/// A candidate list was configured empty.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no {0} candidates configured")]
pub struct EmptyCandidates(pub &'static str);

/// The questions the quiz can ask, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKey {
    Replicas,
    CpuRequest,
    MemoryRequest,
    YourName,
    Image,
    AriseId,
}

impl QuestionKey {
    pub const ALL: [Self; 6] = [
        Self::Replicas,
        Self::CpuRequest,
        Self::MemoryRequest,
        Self::YourName,
        Self::Image,
        Self::AriseId,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replicas => "replicas",
            Self::CpuRequest => "cpu_request",
            Self::MemoryRequest => "memory_request",
            Self::YourName => "your_name",
            Self::Image => "image",
            Self::AriseId => "arise_id",
        }
    }

    /// Whether the answer is a free-text environment variable.
    pub const fn is_free_text(self) -> bool {
        matches!(self, Self::YourName | Self::Image | Self::AriseId)
    }
}

/// Validated candidate lists. Every list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLists {
    replicas: Vec<i32>,
    cpu_requests: Vec<String>,
    memory_requests: Vec<String>,
}

impl CandidateLists {
    pub fn new(
        replicas: Vec<i32>,
        cpu_requests: Vec<String>,
        memory_requests: Vec<String>,
    ) -> Result<Self, EmptyCandidates> {
        if replicas.is_empty() {
            return Err(EmptyCandidates("replica"));
        }
        if cpu_requests.is_empty() {
            return Err(EmptyCandidates("cpu request"));
        }
        if memory_requests.is_empty() {
            return Err(EmptyCandidates("memory request"));
        }
        Ok(Self {
            replicas,
            cpu_requests,
            memory_requests,
        })
    }
}

impl TryFrom<&crate::config::Candidates> for CandidateLists {
    type Error = EmptyCandidates;

    fn try_from(c: &crate::config::Candidates) -> Result<Self, Self::Error> {
        Self::new(
            c.replicas.clone(),
            c.cpu_requests.clone(),
            c.memory_requests.clone(),
        )
    }
}

/// Expected deployment values for one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExpectedAnswers {
    pub replicas: i32,
    pub cpu_request: String,
    pub memory_request: String,
}

/// Everything derived from a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub seed: u64,
    pub expected: ExpectedAnswers,
    /// Question order; declaration order when shuffling is off.
    pub order: Vec<QuestionKey>,
}

/// Sum of the namespace's character codes.
pub fn namespace_seed(namespace: &str) -> u64 {
    namespace.chars().map(|c| u64::from(u32::from(c))).sum()
}

fn pick<'a, T>(rng: &mut ChaCha12Rng, list: &'a [T]) -> &'a T {
    &list[rng.gen_range(0..list.len())]
}

/// Derive expected answers and question order for `namespace`.
pub fn derive(namespace: &str, candidates: &CandidateLists, shuffle: bool) -> Derivation {
    let seed = namespace_seed(namespace);
    let mut rng = ChaCha12Rng::seed_from_u64(seed);

    let replicas = *pick(&mut rng, &candidates.replicas);
    let cpu_request = pick(&mut rng, &candidates.cpu_requests).clone();
    let memory_request = pick(&mut rng, &candidates.memory_requests).clone();

    let mut order = QuestionKey::ALL.to_vec();
    if shuffle {
        order.shuffle(&mut rng);
    }

    Derivation {
        seed,
        expected: ExpectedAnswers {
            replicas,
            cpu_request,
            memory_request,
        },
        order,
    }
}
