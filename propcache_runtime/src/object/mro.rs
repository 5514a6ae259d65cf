//! Method resolution order via C3 linearization.
//!
//! ```text
//! class A: ...
//! class B(A): ...
//! class C(A): ...
//! class D(B, C): ...
//!
//! D.__mro__ == (D, B, C, A)
//! ```
//!
//! The linearization of a class is the class followed by the merge of its
//! bases' linearizations and the base list itself. A merge step takes the
//! first head that appears in no other list's tail. If no such head exists
//! the hierarchy is inconsistent.
//!
//! There is no implicit root class here: a class without bases linearizes to
//! itself alone.

use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identity of a class for MRO purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Allocate a fresh, process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        ClassId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Inline storage for typical hierarchies.
pub type Mro = SmallVec<[ClassId; 8]>;

/// Why a linearization could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MroError {
    /// The same class appears twice in the base list.
    DuplicateBase(ClassId),
    /// No consistent ordering exists. Holds the heads left in the merge.
    Inconsistent(Vec<ClassId>),
}

/// Compute the C3 linearization of `class`.
///
/// `base_mros` holds the linearization of each direct base, in declaration
/// order; each must start with the base itself.
pub fn compute_c3_mro(class: ClassId, base_mros: &[&[ClassId]]) -> Result<Mro, MroError> {
    let bases: SmallVec<[ClassId; 4]> = base_mros
        .iter()
        .filter_map(|m| m.first().copied())
        .collect();
    for (i, base) in bases.iter().enumerate() {
        if bases[i + 1..].contains(base) {
            return Err(MroError::DuplicateBase(*base));
        }
    }

    let mut result = Mro::new();
    result.push(class);

    // Sequences are consumed from the front.
    let mut seqs: Vec<&[ClassId]> = base_mros.to_vec();
    seqs.push(bases.as_slice());

    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Ok(result);
        }

        let head = seqs
            .iter()
            .map(|s| s[0])
            .find(|candidate| !seqs.iter().any(|s| s[1..].contains(candidate)));

        let Some(head) = head else {
            return Err(MroError::Inconsistent(seqs.iter().map(|s| s[0]).collect()));
        };

        result.push(head);
        for s in &mut seqs {
            let seq = *s;
            if seq[0] == head {
                *s = &seq[1..];
            }
        }
    }
}
