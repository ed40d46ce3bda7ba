use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier of a cluster. Ordering defines label order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterId(pub usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A partition of dataset indices into clusters.
///
/// Members are stored as indices into the dataset, in ascending order,
/// so points with equal coordinates stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clustering {
    clusters: BTreeMap<ClusterId, Vec<usize>>,
}

impl Clustering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group point `i` under `assignments[i]`. Clusters nobody is assigned to are absent.
    pub fn from_assignments(assignments: &[usize]) -> Self {
        let mut clusters: BTreeMap<ClusterId, Vec<usize>> = BTreeMap::new();
        for (i, &c) in assignments.iter().enumerate() {
            clusters.entry(ClusterId(c)).or_default().push(i);
        }
        Self { clusters }
    }

    pub(crate) fn insert(&mut self, id: ClusterId, mut members: Vec<usize>) {
        members.sort_unstable();
        self.clusters.insert(id, members);
    }

    pub(crate) fn remove(&mut self, id: ClusterId) -> Option<Vec<usize>> {
        self.clusters.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters in ascending id order.
    pub fn clusters(&self) -> impl Iterator<Item = (ClusterId, &[usize])> + '_ {
        self.clusters.iter().map(|(id, m)| (*id, m.as_slice()))
    }

    pub fn ids(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.clusters.keys().copied()
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&[usize]> {
        self.clusters.get(&id).map(Vec::as_slice)
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.clusters.values().map(Vec::len).collect()
    }

    /// True when every index in `0..n` appears in exactly one non-empty cluster.
    pub fn is_partition_of(&self, n: usize) -> bool {
        let mut seen = vec![false; n];
        for members in self.clusters.values() {
            if members.is_empty() {
                return false;
            }
            for &i in members {
                if i >= n || seen[i] {
                    return false;
                }
                seen[i] = true;
            }
        }
        seen.into_iter().all(|s| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_assignments() {
        let c = Clustering::from_assignments(&[2, 0, 2, 0, 2]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.cluster(ClusterId(0)), Some(&[1, 3][..]));
        assert_eq!(c.cluster(ClusterId(2)), Some(&[0, 2, 4][..]));
        assert_eq!(c.cluster(ClusterId(1)), None);
        assert_eq!(c.sizes(), vec![2, 3]);
        assert!(c.is_partition_of(5));
    }

    #[test]
    fn test_partition_check() {
        let mut c = Clustering::new();
        c.insert(ClusterId(0), vec![0, 1]);
        assert!(!c.is_partition_of(3));
        c.insert(ClusterId(1), vec![2, 1]);
        assert!(!c.is_partition_of(3));
        c.insert(ClusterId(1), vec![2]);
        assert!(c.is_partition_of(3));
        c.insert(ClusterId(5), vec![]);
        assert!(!c.is_partition_of(3));
    }
}
