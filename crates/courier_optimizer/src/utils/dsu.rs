// Disjoint set union over dense ids `0..len`
pub struct Dsu {
    parent: Vec<usize>,
}

impl Dsu {
    pub fn new(len: usize) -> Self {
        Dsu {
            parent: (0..len).collect(),
        }
    }

    pub fn find(&mut self, i: usize) -> usize {
        let parent = self.parent[i];
        if parent == i {
            i
        } else {
            let root = self.find(parent);
            self.parent[i] = root;
            root
        }
    }

    /// Merges the sets of `i` and `j`. The smaller root wins so the
    /// representative of a set does not depend on the union order.
    pub fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i != root_j {
            let (keep, merged) = if root_i < root_j {
                (root_i, root_j)
            } else {
                (root_j, root_i)
            };
            self.parent[merged] = keep;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_is_transitive() {
        let mut dsu = Dsu::new(5);
        dsu.union(0, 1);
        dsu.union(3, 1);

        assert_eq!(dsu.find(3), dsu.find(0));
        assert_ne!(dsu.find(2), dsu.find(0));
        assert_eq!(dsu.find(4), 4);
    }

    #[test]
    fn test_smallest_id_is_root() {
        let mut dsu = Dsu::new(4);
        dsu.union(3, 2);
        dsu.union(2, 1);

        assert_eq!(dsu.find(3), 1);
    }
}
